use core::fmt;

use zerocopy::{Immutable, TryFromBytes};

use crate::utils::row_major_strides;
use crate::{Elem, wrap};

/// Borrowed buffer-plus-shape view, the boundary handed to rendering and
/// upload code. Carries no ownership and no storage-strategy information.
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a, T> {
    pub(crate) buf: &'a [T],
    pub(crate) shape: &'a [usize],
}

impl<'a, T> ArrayView<'a, T> {
    /// Wraps an existing buffer. The buffer length is not checked against
    /// the shape.
    pub fn from_buf_shape_unchecked(buf: &'a [T], shape: &'a [usize]) -> Self {
        ArrayView { buf, shape }
    }

    /// Adopts a byte buffer (e.g. a GPU readback) as a typed view,
    /// checking length, alignment, and bit validity.
    pub fn from_bytes_shape(bytes: &'a [u8], shape: &'a [usize]) -> Option<Self>
    where
        [T]: TryFromBytes + Immutable,
    {
        let count = shape.iter().product();
        let buf = <[T]>::try_ref_from_bytes_with_elems(bytes, count).ok()?;
        Some(ArrayView { buf, shape })
    }

    /// Reinterprets the buffer as raw bytes, e.g. for texture upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        // Safe because we only read the bytes and every T is aligned for u8.
        unsafe {
            core::slice::from_raw_parts(
                self.buf.as_ptr() as *const u8,
                core::mem::size_of_val(self.buf),
            )
        }
    }

    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    pub fn shape(&self) -> &[usize] {
        self.shape
    }

    pub fn buf(&self) -> &[T] {
        self.buf
    }

    /// Total element count implied by the shape.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Elem> ArrayView<'_, T> {
    /// Wraparound multi-index access, one signed index per dimension.
    pub fn get(&self, index: &[isize]) -> T {
        let strides = row_major_strides(self.shape);
        let i: usize = strides
            .iter()
            .zip(index.iter())
            .zip(self.shape.iter())
            .map(|((&stride, &idx), &extent)| stride * wrap(idx, extent))
            .sum();
        self.buf[i]
    }
}

impl<T: fmt::Display> fmt::Display for ArrayView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_slice(f, self.buf, self.shape)
    }
}

fn fmt_slice<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    buf: &[T],
    shape: &[usize],
) -> fmt::Result {
    match shape {
        [] => write!(f, "{}", buf[0]),
        [_] => {
            write!(f, "[")?;
            for (i, v) in buf.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}")?;
            }
            write!(f, "]")
        }
        [n, rest @ ..] => {
            let chunk: usize = rest.iter().product();
            write!(f, "[")?;
            for i in 0..*n {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_slice(f, &buf[i * chunk..(i + 1) * chunk], rest)?;
            }
            write!(f, "]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_shape_and_bytes() {
        let buf = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = ArrayView::from_buf_shape_unchecked(&buf, &[2, 3]);
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.len(), 6);
        assert_eq!(view.as_bytes().len(), 6 * core::mem::size_of::<f32>());
        assert_eq!(view.as_ptr(), buf.as_ptr());
    }

    #[test]
    fn test_bytes_round_trip() {
        let buf = [1.0f32, 2.0, 3.0, 4.0];
        let shape = [2usize, 2];
        let view = ArrayView::from_buf_shape_unchecked(&buf, &shape);
        let bytes = view.as_bytes();
        let back = ArrayView::<f32>::from_bytes_shape(bytes, &shape).unwrap();
        assert_eq!(back.buf(), &buf);

        // Wrong length is rejected.
        assert!(ArrayView::<f32>::from_bytes_shape(&bytes[..4], &shape).is_none());
    }

    #[test]
    fn test_view_get_wraps() {
        let buf = [1, 2, 3, 4, 5, 6];
        let view = ArrayView::from_buf_shape_unchecked(&buf, &[2, 3]);
        assert_eq!(view.get(&[1, 2]), 6);
        assert_eq!(view.get(&[-1, -1]), 6);
        assert_eq!(view.get(&[0, 3]), 1);
    }

    #[test]
    fn test_display() {
        let buf = [1, 2, 3, 4, 5, 6];
        let view = ArrayView::from_buf_shape_unchecked(&buf, &[2, 3]);
        assert_eq!(format!("{view}"), "[[1, 2, 3], [4, 5, 6]]");

        let flat = ArrayView::from_buf_shape_unchecked(&buf, &[6]);
        assert_eq!(format!("{flat}"), "[1, 2, 3, 4, 5, 6]");
    }
}
