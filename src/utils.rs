use smallvec::SmallVec;

/// Row-major strides for `shape`: dimension `d` advances by the product of
/// all extents after it.
pub(crate) fn row_major_strides(shape: &[usize]) -> SmallVec<[usize; 4]> {
    let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, shape.len());
    let mut acc = 1;
    for (stride, &extent) in strides.iter_mut().zip(shape.iter()).rev() {
        *stride = acc;
        acc *= extent;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[4]).as_slice(), &[1]);
        assert_eq!(row_major_strides(&[2, 3]).as_slice(), &[3, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert!(row_major_strides(&[]).is_empty());
    }
}
