use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::ptr;

use smallvec::SmallVec;

use crate::{Array, ArrayBuf, Dim, DimAt, Dyn, Elem, Error, wrap};

/// Heap-resident, runtime-shaped storage.
///
/// The buffer has exactly one owner: moves transfer it, duplication is the
/// explicit [`DynArray::copy`], and there is deliberately no `Clone`.
/// [`DynArray::release`] hands the allocation to the caller and leaves the
/// array empty; element access on an empty array panics.
#[derive(Debug)]
pub struct DynArray<T: Elem> {
    storage: Option<Box<[T]>>,
    shape: SmallVec<[usize; 4]>,
}

impl<T: Elem> DynArray<T> {
    /// Allocates a default-filled buffer for `shape`.
    pub fn new(shape: &[usize]) -> Self {
        let len = shape.iter().product();
        DynArray {
            storage: Some(vec![T::default(); len].into_boxed_slice()),
            shape: SmallVec::from_slice(shape),
        }
    }

    /// Builds an array from an existing buffer without reallocating.
    pub fn from_shape_vec(shape: &[usize], storage: Vec<T>) -> Result<Self, Error> {
        let expected: usize = shape.iter().product();
        if expected != storage.len() {
            return Err(Error::BufferSizeMismatch {
                expected,
                found: storage.len(),
            });
        }
        Ok(DynArray {
            storage: Some(storage.into_boxed_slice()),
            shape: SmallVec::from_slice(shape),
        })
    }

    /// Adopts a raw buffer without copying; this array becomes its sole
    /// owner.
    ///
    /// # Safety
    ///
    /// `ptr` must have been produced by [`DynArray::release`] on an array
    /// of the same element type and element count
    /// (`shape.iter().product()`), and must not be used afterwards.
    pub unsafe fn from_raw(ptr: *mut T, shape: &[usize]) -> Self {
        let len = shape.iter().product();
        let storage = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)) };
        DynArray {
            storage: Some(storage),
            shape: SmallVec::from_slice(shape),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element count, recomputed from the recorded extents.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Duplicates into an independent, freshly allocated buffer.
    pub fn copy(&self) -> Self {
        DynArray {
            storage: Some(Box::from(self.as_buf())),
            shape: self.shape.clone(),
        }
    }

    /// Hands the buffer to the caller without freeing it and leaves this
    /// array empty. Null if the array was already empty. The array must
    /// not be used for element access until reconstructed.
    pub fn release(&mut self) -> *mut T {
        match self.storage.take() {
            Some(storage) => Box::into_raw(storage) as *mut T,
            None => ptr::null_mut(),
        }
    }

    /// Drops the current buffer and reconstructs in place for `shape`.
    pub fn reset(&mut self, shape: &[usize]) {
        *self = DynArray::new(shape);
    }

    /// Frees and reallocates a buffer of the same size, discarding the
    /// contents.
    pub fn reallocate(&mut self) {
        let len = self.size();
        self.storage = Some(vec![T::default(); len].into_boxed_slice());
    }

    pub fn as_ptr(&self) -> *const T {
        match &self.storage {
            Some(storage) => storage.as_ptr(),
            None => ptr::null(),
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        match &mut self.storage {
            Some(storage) => storage.as_mut_ptr(),
            None => ptr::null_mut(),
        }
    }
}

/// The empty, unallocated state: no buffer, zero extents.
impl<T: Elem> Default for DynArray<T> {
    fn default() -> Self {
        DynArray {
            storage: None,
            shape: SmallVec::new(),
        }
    }
}

impl<T: Elem> ArrayBuf<T> for DynArray<T> {
    fn as_buf(&self) -> &[T] {
        match &self.storage {
            Some(storage) => storage,
            None => panic!("dynamic array buffer accessed after release"),
        }
    }

    fn as_mut_buf(&mut self) -> &mut [T] {
        match &mut self.storage {
            Some(storage) => storage,
            None => panic!("dynamic array buffer accessed after release"),
        }
    }

    fn default(dims: &[usize]) -> Self {
        DynArray::new(dims)
    }
}

macro_rules! impl_dyn_dim {
    ($($dim:ty),* $(,)?) => {
        $(
            impl Dim for $dim {
                type Buf<T>
                    = DynArray<T>
                where
                    T: Elem;
                type Shape = SmallVec<[usize; 4]>;
                type Dynamic = $dim;

                fn array_shape<T: Elem>(buf: &Self::Buf<T>) -> Self::Shape {
                    buf.shape.clone()
                }

                fn shape_slice<T: Elem>(buf: &Self::Buf<T>) -> &'_ [usize] {
                    &buf.shape
                }
            }
        )*
    };
}

impl_dyn_dim!(Dyn, (Dyn, Dyn), (Dyn, Dyn, Dyn));

impl DimAt for Dyn {
    type Index = isize;

    #[inline]
    fn offset<T: Elem>(buf: &Self::Buf<T>, index: isize) -> usize {
        wrap(index, buf.shape[0])
    }
}

impl DimAt for (Dyn, Dyn) {
    type Index = [isize; 2];

    #[inline]
    fn offset<T: Elem>(buf: &Self::Buf<T>, [a, b]: [isize; 2]) -> usize {
        let s = &buf.shape;
        wrap(a, s[0]) * s[1] + wrap(b, s[1])
    }
}

impl DimAt for (Dyn, Dyn, Dyn) {
    type Index = [isize; 3];

    #[inline]
    fn offset<T: Elem>(buf: &Self::Buf<T>, [a, b, c]: [isize; 3]) -> usize {
        let s = &buf.shape;
        wrap(a, s[0]) * s[1] * s[2] + wrap(b, s[1]) * s[2] + wrap(c, s[2])
    }
}

macro_rules! impl_dyn_array {
    ($dim:ty, $rank:literal) => {
        impl<T: Elem> Array<T, $dim> {
            /// Allocates a default-filled array with the given extents.
            pub fn with_shape(shape: &[usize; $rank]) -> Self {
                Array {
                    buf: DynArray::new(shape),
                }
            }

            /// Builds an array from an existing buffer without copying.
            pub fn from_shape_vec(shape: &[usize; $rank], storage: Vec<T>) -> Result<Self, Error> {
                Ok(Array {
                    buf: DynArray::from_shape_vec(shape, storage)?,
                })
            }

            /// Adopts a raw buffer without copying; see [`DynArray::from_raw`].
            ///
            /// # Safety
            ///
            /// Same contract as [`DynArray::from_raw`].
            pub unsafe fn from_raw(ptr: *mut T, shape: &[usize; $rank]) -> Self {
                Array {
                    buf: unsafe { DynArray::from_raw(ptr, shape) },
                }
            }

            /// Duplicates into an independent, freshly allocated buffer.
            /// Mutating the copy never affects the source and vice versa.
            pub fn copy(&self) -> Self {
                Array {
                    buf: self.buf.copy(),
                }
            }

            /// Hands the buffer to the caller and leaves this array empty;
            /// see [`DynArray::release`].
            pub fn release(&mut self) -> *mut T {
                self.buf.release()
            }

            /// Drops the buffer and reconstructs in place with new extents.
            pub fn reset(&mut self, shape: &[usize; $rank]) {
                self.buf.reset(shape)
            }

            /// Frees and reallocates a same-sized buffer, discarding the
            /// contents.
            pub fn reallocate(&mut self) {
                self.buf.reallocate()
            }

            pub fn as_ptr(&self) -> *const T {
                self.buf.as_ptr()
            }

            pub fn as_mut_ptr(&mut self) -> *mut T {
                self.buf.as_mut_ptr()
            }
        }
    };
}

impl_dyn_array!(Dyn, 1);
impl_dyn_array!((Dyn, Dyn), 2);
impl_dyn_array!((Dyn, Dyn, Dyn), 3);

#[cfg(test)]
mod tests {
    use crate::{Array, Dyn, DynMatrix, DynVector, Error};

    #[test]
    fn test_write_read_wraparound() {
        let mut a = DynMatrix::<f64>::with_shape(&[2, 3]);
        *a.at_mut([1, 2]) = 7.0;
        assert_eq!(a[[1, 2]], 7.0);
        // Negative indices address the same cell from the end.
        assert_eq!(a[[-1, -1]], 7.0);
        assert_eq!(a[[3, 5]], 7.0);
    }

    #[test]
    fn test_row_major_layout() {
        let a = DynMatrix::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(a[[0, 0]], 1);
        assert_eq!(a[[0, 2]], 3);
        assert_eq!(a[[1, 0]], 4);
        assert_eq!(a[[1, 2]], 6);
        assert_eq!(a.size(), 6);
        assert_eq!(a.len(), 2);
        assert_eq!(a.shape_slice(), &[2, 3]);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut a = DynVector::<i32>::with_shape(&[4]);
        *a.at_mut(0) = 1;
        let mut b = a.copy();
        *b.at_mut(0) = 9;
        assert_eq!(a[0], 1);
        assert_eq!(b[0], 9);
        *a.at_mut(1) = 5;
        assert_eq!(b[1], 0);
    }

    #[test]
    fn test_move_transfers_ownership() {
        let mut a = DynMatrix::<f64>::with_shape(&[2, 2]);
        *a.at_mut([0, 1]) = 3.5;
        let b = a;
        assert_eq!(b[[0, 1]], 3.5);
        // `a` is statically unusable from here on; only the hand-off is
        // observable.
    }

    #[test]
    fn test_release_adopt_round_trip() {
        let mut a = DynMatrix::<u32>::with_shape(&[2, 3]);
        *a.at_mut([1, 2]) = 42;
        let ptr = a.release();
        assert!(!ptr.is_null());
        assert!(a.as_ptr().is_null());
        let b = unsafe { DynMatrix::<u32>::from_raw(ptr, &[2, 3]) };
        assert_eq!(b[[1, 2]], 42);
    }

    #[test]
    #[should_panic(expected = "accessed after release")]
    fn test_access_after_release_panics() {
        let mut a = DynVector::<f32>::with_shape(&[4]);
        let ptr = a.release();
        // Reconstruct and drop so the buffer is not leaked by this test.
        drop(unsafe { DynVector::<f32>::from_raw(ptr, &[4]) });
        let _ = a[0];
    }

    #[test]
    fn test_reset_and_reallocate() {
        let mut a = DynVector::<i32>::with_shape(&[3]);
        a.fill(7);
        a.reset(&[5]);
        assert_eq!(a.size(), 5);
        assert_eq!(a[0], 0);

        a.fill(9);
        a.reallocate();
        assert_eq!(a.size(), 5);
        assert_eq!(a[0], 0);
    }

    #[test]
    fn test_from_shape_vec_checks_len() {
        let err = DynMatrix::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::BufferSizeMismatch {
                expected: 6,
                found: 3
            }
        );
    }

    #[test]
    fn test_default_is_empty() {
        let a = Array::<f64, Dyn>::default();
        assert!(a.as_ptr().is_null());
        assert_eq!(a.shape_slice(), &[] as &[usize]);
    }
}
