//! The generic array facade over both storage strategies.
use core::fmt;
use core::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div, DivAssign,
    Index, IndexMut, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

use approx::{AbsDiffEq, RelativeEq};
use num_traits::AsPrimitive;
use smallvec::SmallVec;

use crate::{
    ArrayBuf, ConcatDims, Const, ConstDim, Dim, DimAt, DimConcat, DimRow, Dyn, Elem, Error, Field,
    RealField, RowDim, ScalarDim, ShapeConstraint, SizeCompat, Truthy, wrap,
};

mod dynamic;
mod view;

pub use dynamic::*;
pub use view::*;

pub type Vector<T, const N: usize> = Array<T, Const<N>>;
pub type Matrix<T, const R: usize, const C: usize> = Array<T, (Const<R>, Const<C>)>;
pub type Tensor3<T, const A: usize, const B: usize, const C: usize> =
    Array<T, (Const<A>, Const<B>, Const<C>)>;

pub type DynVector<T> = Array<T, Dyn>;
pub type DynMatrix<T> = Array<T, (Dyn, Dyn)>;
pub type DynTensor3<T> = Array<T, (Dyn, Dyn, Dyn)>;

/// An array with a type-safe dimension and element type, backed by
/// whichever storage strategy the dimension selects.
pub struct Array<T: Elem, D: Dim> {
    pub buf: D::Buf<T>,
}

impl<T: Elem, D: Dim> Clone for Array<T, D>
where
    D::Buf<T>: Clone,
{
    fn clone(&self) -> Self {
        Array {
            buf: self.buf.clone(),
        }
    }
}

impl<T: Elem, D: Dim> Copy for Array<T, D> where D::Buf<T>: Copy {}

impl<T: Elem, D: Dim> Default for Array<T, D>
where
    D::Buf<T>: Default,
{
    fn default() -> Self {
        Array {
            buf: Default::default(),
        }
    }
}

impl<T: Elem, D: Dim> fmt::Debug for Array<T, D>
where
    D::Buf<T>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.buf.fmt(f)
    }
}

impl<T: Elem, D: Dim> Array<T, D> {
    /// Builds a default-filled array. Compile-time shapes ignore `dims`;
    /// runtime shapes take their extents from it.
    pub fn zeroed(dims: &[usize]) -> Self {
        Array {
            buf: D::Buf::<T>::default(dims),
        }
    }

    pub fn shape(&self) -> D::Shape {
        D::array_shape(&self.buf)
    }

    pub fn shape_slice(&self) -> &[usize] {
        D::shape_slice(&self.buf)
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape_slice().len()
    }

    /// Total element count, the product of all extents.
    pub fn size(&self) -> usize {
        self.shape_slice().iter().product()
    }

    /// Extent of the outermost dimension only, not the element count.
    pub fn len(&self) -> usize {
        self.shape_slice().first().copied().unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Raw flat access with no normalization; `i` must be in `[0, size())`.
    pub fn get(&self, i: usize) -> T {
        self.buf.as_buf()[i]
    }

    pub fn get_mut(&mut self, i: usize) -> &mut T {
        &mut self.buf.as_mut_buf()[i]
    }

    /// Borrowed buffer-plus-shape view for upload and diagnostics.
    pub fn view(&self) -> ArrayView<'_, T> {
        ArrayView {
            buf: self.buf.as_buf(),
            shape: D::shape_slice(&self.buf),
        }
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) -> &mut Self {
        self.buf.as_mut_buf().fill(value);
        self
    }

    /// Elementwise transform into a same-shaped array, possibly changing
    /// the element type.
    pub fn map<U: Elem>(&self, f: impl Fn(T) -> U) -> Array<U, D> {
        let mut out: Array<U, D> = Array::zeroed(self.shape_slice());
        for (o, a) in out.buf.as_mut_buf().iter_mut().zip(self.buf.as_buf()) {
            *o = f(*a);
        }
        out
    }

    /// Elementwise `as` conversion; float-to-int casts truncate toward
    /// zero.
    pub fn as_type<U: Elem + 'static>(&self) -> Array<U, D>
    where
        T: AsPrimitive<U>,
    {
        self.map(T::as_)
    }

    /// Combines two arrays elementwise into a new array shaped like
    /// `self`. Compatibility is decided at compile time; element counts
    /// are still asserted so a runtime-shaped mismatch fails loudly
    /// instead of reading out of bounds.
    pub fn zip_with<U: Elem, V: Elem, D2: Dim>(
        &self,
        other: &Array<U, D2>,
        f: impl Fn(T, U) -> V,
    ) -> Array<V, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        assert_eq!(
            self.size(),
            other.size(),
            "elementwise operands must have equal element counts"
        );
        let mut out: Array<V, D> = Array::zeroed(self.shape_slice());
        for ((o, a), b) in out
            .buf
            .as_mut_buf()
            .iter_mut()
            .zip(self.buf.as_buf())
            .zip(other.buf.as_buf())
        {
            *o = f(*a, *b);
        }
        out
    }

    /// Left-fold addition over the flat element sequence.
    pub fn sum(&self) -> T
    where
        T: Add<Output = T>,
    {
        self.buf
            .as_buf()
            .iter()
            .copied()
            .reduce(Add::add)
            .unwrap_or_default()
    }

    /// Left-fold multiplication over the flat element sequence, starting
    /// from `seed`.
    pub fn product(&self, seed: T) -> T
    where
        T: Mul<Output = T>,
    {
        self.buf.as_buf().iter().copied().fold(seed, Mul::mul)
    }

    /// Copies into a runtime-shaped array with the same extents and
    /// elements. Works from either storage strategy.
    pub fn to_dyn(&self) -> Array<T, D::Dynamic> {
        let mut out: Array<T, D::Dynamic> = Array::zeroed(self.shape_slice());
        out.buf.as_mut_buf().copy_from_slice(self.buf.as_buf());
        out
    }

    /// Rebuilds a compile-time-shaped array, checking the recorded shape.
    pub fn try_to_fixed<D2: Dim + ConstDim>(&self) -> Result<Array<T, D2>, Error> {
        if self.shape_slice() != D2::DIM {
            return Err(Error::ShapeMismatch {
                expected: SmallVec::from_slice(D2::DIM),
                found: SmallVec::from_slice(self.shape_slice()),
            });
        }
        let mut out: Array<T, D2> = Array::zeroed(D2::DIM);
        out.buf.as_mut_buf().copy_from_slice(self.buf.as_buf());
        Ok(out)
    }
}

impl<T: Truthy, D: Dim> Array<T, D> {
    /// True if any element is truthy, recursing into nested array
    /// elements.
    pub fn any(&self) -> bool {
        self.buf.as_buf().iter().any(Truthy::any)
    }

    /// True if every element is truthy, recursing into nested array
    /// elements.
    pub fn all(&self) -> bool {
        self.buf.as_buf().iter().all(Truthy::all)
    }
}

impl<T: Elem, D: DimAt> Array<T, D> {
    /// Wraparound multi-index access.
    pub fn at(&self, index: D::Index) -> &T {
        let i = D::offset(&self.buf, index);
        &self.buf.as_buf()[i]
    }

    pub fn at_mut(&mut self, index: D::Index) -> &mut T {
        let i = D::offset(&self.buf, index);
        &mut self.buf.as_mut_buf()[i]
    }
}

impl<T: Elem, D: DimAt> Index<D::Index> for Array<T, D> {
    type Output = T;

    fn index(&self, index: D::Index) -> &T {
        self.at(index)
    }
}

impl<T: Elem, D: DimAt> IndexMut<D::Index> for Array<T, D> {
    fn index_mut(&mut self, index: D::Index) -> &mut T {
        self.at_mut(index)
    }
}

impl<T: Elem, D: Dim> Array<T, D>
where
    ShapeConstraint: DimRow<D>,
{
    /// The sub-array at outer index `index` (wraparound), by value: one
    /// dimension shorter for rank two and up, a scalar array for rank
    /// one.
    pub fn row(&self, index: isize) -> Array<T, RowDim<D>> {
        let shape = self.shape_slice();
        let i = wrap(index, shape[0]);
        let inner: usize = shape[1..].iter().product();
        let mut out: Array<T, RowDim<D>> = Array::zeroed(&shape[1..]);
        out.buf
            .as_mut_buf()
            .copy_from_slice(&self.buf.as_buf()[i * inner..(i + 1) * inner]);
        out
    }

    /// Restartable forward iteration over the outermost dimension.
    pub fn outer_iter(&self) -> impl ExactSizeIterator<Item = Array<T, RowDim<D>>> + '_ {
        (0..self.len()).map(|i| self.row(i as isize))
    }
}

impl<T: Elem, D: Dim + ConstDim> Array<T, D> {
    /// Broadcasts `value` to every element.
    pub fn splat(value: T) -> Self {
        let mut out = Array::zeroed(D::DIM);
        out.fill(value);
        out
    }

    /// Tiles this array under extra leading dimensions: destination flat
    /// index `i` takes source flat index `i % size()`.
    pub fn repeat<New>(&self) -> Array<T, ConcatDims<New, D>>
    where
        New: Dim + ConstDim,
        ShapeConstraint: DimConcat<New, D>,
        ConcatDims<New, D>: ConstDim,
    {
        let mut out: Array<T, ConcatDims<New, D>> = Array::zeroed(<ConcatDims<New, D>>::DIM);
        let src = self.buf.as_buf();
        for (i, o) in out.buf.as_mut_buf().iter_mut().enumerate() {
            *o = src[i % src.len()];
        }
        out
    }
}

impl<T: Field, D: Dim + ConstDim> Array<T, D> {
    pub fn zeros() -> Self {
        Array::zeroed(D::DIM)
    }

    pub fn ones() -> Self {
        Array::splat(T::one_prim())
    }
}

macro_rules! impl_op {
    ($op_trait:ident, $fn_name:ident) => {
        impl<T, V, D1, D2> $op_trait<&Array<T, D2>> for &Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: &Array<T, D2>) -> Self::Output {
                self.zip_with(rhs, $op_trait::$fn_name)
            }
        }

        impl<T, V, D1, D2> $op_trait<&Array<T, D2>> for Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: &Array<T, D2>) -> Self::Output {
                $op_trait::$fn_name(&self, rhs)
            }
        }

        impl<T, V, D1, D2> $op_trait<Array<T, D2>> for &Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: Array<T, D2>) -> Self::Output {
                $op_trait::$fn_name(self, &rhs)
            }
        }

        impl<T, V, D1, D2> $op_trait<Array<T, D2>> for Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: Array<T, D2>) -> Self::Output {
                $op_trait::$fn_name(&self, &rhs)
            }
        }

        impl<T, V, D1> $op_trait<T> for &Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: T) -> Self::Output {
                self.map(|a| $op_trait::$fn_name(a, rhs))
            }
        }

        impl<T, V, D1> $op_trait<T> for Array<T, D1>
        where
            T: Elem + $op_trait<T, Output = V>,
            V: Elem,
            D1: Dim,
        {
            type Output = Array<V, D1>;

            fn $fn_name(self, rhs: T) -> Self::Output {
                $op_trait::$fn_name(&self, rhs)
            }
        }
    };
}

impl_op!(Add, add);
impl_op!(Sub, sub);
impl_op!(Mul, mul);
impl_op!(Div, div);
impl_op!(Rem, rem);
impl_op!(BitAnd, bitand);
impl_op!(BitOr, bitor);
impl_op!(BitXor, bitxor);
impl_op!(Shl, shl);
impl_op!(Shr, shr);

macro_rules! impl_op_assign {
    ($op_trait:ident, $fn_name:ident) => {
        impl<T, D1, D2> $op_trait<&Array<T, D2>> for Array<T, D1>
        where
            T: Elem + $op_trait<T>,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            fn $fn_name(&mut self, rhs: &Array<T, D2>) {
                assert_eq!(
                    self.size(),
                    rhs.size(),
                    "elementwise operands must have equal element counts"
                );
                for (a, b) in self.buf.as_mut_buf().iter_mut().zip(rhs.buf.as_buf()) {
                    a.$fn_name(*b);
                }
            }
        }

        impl<T, D1, D2> $op_trait<Array<T, D2>> for Array<T, D1>
        where
            T: Elem + $op_trait<T>,
            D1: Dim,
            D2: Dim,
            ShapeConstraint: SizeCompat<D1, D2>,
        {
            fn $fn_name(&mut self, rhs: Array<T, D2>) {
                $op_trait::$fn_name(self, &rhs)
            }
        }

        impl<T, D1> $op_trait<T> for Array<T, D1>
        where
            T: Elem + $op_trait<T>,
            D1: Dim,
        {
            fn $fn_name(&mut self, rhs: T) {
                for a in self.buf.as_mut_buf().iter_mut() {
                    a.$fn_name(rhs);
                }
            }
        }
    };
}

impl_op_assign!(AddAssign, add_assign);
impl_op_assign!(SubAssign, sub_assign);
impl_op_assign!(MulAssign, mul_assign);
impl_op_assign!(DivAssign, div_assign);
impl_op_assign!(RemAssign, rem_assign);
impl_op_assign!(BitAndAssign, bitand_assign);
impl_op_assign!(BitOrAssign, bitor_assign);
impl_op_assign!(BitXorAssign, bitxor_assign);
impl_op_assign!(ShlAssign, shl_assign);
impl_op_assign!(ShrAssign, shr_assign);

macro_rules! impl_prim {
    ($ty:ty) => {
        impl<D: Dim> Mul<Array<$ty, D>> for $ty {
            type Output = Array<$ty, D>;

            fn mul(self, rhs: Array<$ty, D>) -> Self::Output {
                rhs.map(|x| self * x)
            }
        }

        impl<'a, D: Dim> Mul<&'a Array<$ty, D>> for $ty {
            type Output = Array<$ty, D>;

            fn mul(self, rhs: &'a Array<$ty, D>) -> Self::Output {
                rhs.map(|x| self * x)
            }
        }
    };
}

impl_prim!(f64);
impl_prim!(f32);
impl_prim!(u64);
impl_prim!(u32);
impl_prim!(i64);
impl_prim!(i32);

macro_rules! impl_unary_op {
    ($op_trait:ident, $fn_name:ident) => {
        impl<T, V, D> $op_trait for &Array<T, D>
        where
            T: Elem + $op_trait<Output = V>,
            V: Elem,
            D: Dim,
        {
            type Output = Array<V, D>;

            fn $fn_name(self) -> Self::Output {
                self.map($op_trait::$fn_name)
            }
        }

        impl<T, V, D> $op_trait for Array<T, D>
        where
            T: Elem + $op_trait<Output = V>,
            V: Elem,
            D: Dim,
        {
            type Output = Array<V, D>;

            fn $fn_name(self) -> Self::Output {
                $op_trait::$fn_name(&self)
            }
        }
    };
}

impl_unary_op!(Neg, neg);
impl_unary_op!(Not, not);

impl<T: Elem + PartialEq, D: Dim> Array<T, D> {
    /// Elementwise equality, one `bool` per element, never a single
    /// verdict. Whole-array equality is the `PartialEq` impl.
    pub fn cmp_eq<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a == b)
    }

    pub fn cmp_ne<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a != b)
    }
}

impl<T: Elem + PartialOrd, D: Dim> Array<T, D> {
    pub fn cmp_lt<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a < b)
    }

    pub fn cmp_le<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a <= b)
    }

    pub fn cmp_gt<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a > b)
    }

    pub fn cmp_ge<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a >= b)
    }
}

impl<T: Truthy, D: Dim> Array<T, D> {
    /// Elementwise, non-short-circuiting conjunction of truthiness.
    pub fn and<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a.any() && b.any())
    }

    /// Elementwise, non-short-circuiting disjunction of truthiness.
    pub fn or<D2: Dim>(&self, other: &Array<T, D2>) -> Array<bool, D>
    where
        ShapeConstraint: SizeCompat<D, D2>,
    {
        self.zip_with(other, |a, b| a.any() || b.any())
    }
}

macro_rules! impl_unary_math {
    ($($fn_name:ident),* $(,)?) => {
        $(
            impl<T: RealField, D: Dim> Array<T, D> {
                #[doc = concat!("Applies `", stringify!($fn_name), "` to every element.")]
                pub fn $fn_name(&self) -> Array<T, D> {
                    self.map(T::$fn_name)
                }
            }
        )*
    };
}

impl_unary_math!(
    sqrt, cbrt, sin, cos, tan, asin, acos, atan, sinh, cosh, tanh, exp, ln, log2, log10, floor,
    ceil, round, trunc, abs,
);

macro_rules! impl_binary_math {
    ($($fn_name:ident),* $(,)?) => {
        $(
            impl<T: RealField, D1: Dim> Array<T, D1> {
                #[doc = concat!("Applies `", stringify!($fn_name), "` elementwise over both operands.")]
                pub fn $fn_name<D2: Dim>(&self, other: &Array<T, D2>) -> Array<T, D1>
                where
                    ShapeConstraint: SizeCompat<D1, D2>,
                {
                    self.zip_with(other, T::$fn_name)
                }
            }
        )*
    };
}

impl_binary_math!(atan2, hypot, pow, copysign, min, max);

impl<T: RealField, D: Dim> Array<T, D> {
    /// Raises every element to the scalar power `e`.
    pub fn powf(&self, e: T) -> Array<T, D> {
        self.map(|x| x.pow(e))
    }

    /// Elementwise minimum against a scalar.
    pub fn min_scalar(&self, v: T) -> Array<T, D> {
        self.map(|x| x.min(v))
    }

    /// Elementwise maximum against a scalar.
    pub fn max_scalar(&self, v: T) -> Array<T, D> {
        self.map(|x| x.max(v))
    }
}

impl<T: Elem> From<T> for Array<T, ScalarDim> {
    fn from(buf: T) -> Self {
        Array { buf }
    }
}

impl<T: Elem, const D1: usize> From<[T; D1]> for Array<T, Const<D1>> {
    fn from(buf: [T; D1]) -> Self {
        Array { buf }
    }
}

impl<T: Elem, const D1: usize, const D2: usize> From<[[T; D2]; D1]>
    for Array<T, (Const<D1>, Const<D2>)>
{
    fn from(buf: [[T; D2]; D1]) -> Self {
        Array { buf }
    }
}

impl<T: Elem, const D1: usize, const D2: usize, const D3: usize> From<[[[T; D3]; D2]; D1]>
    for Array<T, (Const<D1>, Const<D2>, Const<D3>)>
{
    fn from(buf: [[[T; D3]; D2]; D1]) -> Self {
        Array { buf }
    }
}

#[macro_export]
macro_rules! array {
    ($([$([$($x:expr),* $(,)*]),+ $(,)*]),+ $(,)*) => {{
        $crate::Array::from([$([$([$($x,)*],)*],)*])
    }};
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::Array::from([$([$($x,)*],)*])
    }};
    ($($x:expr),* $(,)*) => {{
        $crate::Array::from([$($x,)*])
    }};

    ($elem:expr; $n:expr) => {{
        $crate::Array::from([$elem; $n])
    }};
}

impl<T: Elem + PartialEq, D: Dim> PartialEq for Array<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.shape_slice() == other.shape_slice() && self.buf.as_buf() == other.buf.as_buf()
    }
}

impl<T, D: Dim> AbsDiffEq for Array<T, D>
where
    T: Elem + AbsDiffEq,
    T::Epsilon: Elem,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.buf.as_buf().abs_diff_eq(other.buf.as_buf(), epsilon)
    }
}

impl<T, D: Dim> RelativeEq for Array<T, D>
where
    T: Elem + RelativeEq,
    T::Epsilon: Elem,
{
    fn default_max_relative() -> T::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T::Epsilon, max_relative: T::Epsilon) -> bool {
        self.buf
            .as_buf()
            .relative_eq(other.buf.as_buf(), epsilon, max_relative)
    }
}

impl<T: Elem, D: Dim> Elem for Array<T, D> where D::Buf<T>: Copy + Default {}

impl<T: Truthy, D: Dim> Truthy for Array<T, D>
where
    D::Buf<T>: Copy + Default,
{
    fn any(&self) -> bool {
        Array::any(self)
    }

    fn all(&self) -> bool {
        Array::all(self)
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use crate::*;

    #[test]
    fn test_add_elementwise() {
        let c = array![1, 2, 3] + array![10, 20, 30];
        assert_eq!(c, array![11, 22, 33]);
    }

    #[test]
    fn test_scalar_broadcast() {
        let a = array![1.0, 2.0, 3.0];
        assert_eq!(&a * 2.0, array![2.0, 4.0, 6.0]);
        assert_eq!(2.0 * &a, array![2.0, 4.0, 6.0]);
        assert_eq!(&a + 1.0, array![2.0, 3.0, 4.0]);
        assert_eq!(a - 1.0, array![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_wraparound_indexing() {
        let a: Vector<i32, 4> = array![1, 2, 3, 4];
        assert_eq!(a[-1], 4);
        // Past-the-end indices are cyclic addresses, not faults.
        assert_eq!(a[4], 1);
        assert_eq!(a[0], 1);

        let m = array![[1, 2], [3, 4]];
        assert_eq!(m[[1, 1]], 4);
        assert_eq!(m[[-1, -2]], 3);
        assert_eq!(m[[2, 2]], 1);
    }

    #[test]
    fn test_index_mut() {
        let mut m: Matrix<i32, 2, 2> = Array::zeros();
        m[[0, 1]] = 5;
        m[[-1, 0]] = 6;
        assert_eq!(m, array![[0, 5], [6, 0]]);
    }

    #[test]
    fn test_sum_product() {
        let a = array![1, 2, 3, 4];
        assert_eq!(a.sum(), 10);
        assert_eq!(a.product(1), 24);
        assert_eq!(a.product(2), 48);
    }

    #[test]
    fn test_any_all() {
        assert!(array![0, 0, 1].any());
        assert!(!array![0, 0, 1].all());
        assert!(array![1, 1, 1].all());
        assert!(!array![0, 0, 0].any());
    }

    #[test]
    fn test_any_all_recurse_nested() {
        let zero: Vector<i32, 2> = array![0, 0];
        let mixed: Vector<i32, 2> = array![0, 1];
        let nested: Vector<Vector<i32, 2>, 2> = Array::from([zero, mixed]);
        assert!(nested.any());
        assert!(!nested.all());

        let ones: Vector<i32, 2> = array![1, 1];
        let nested: Vector<Vector<i32, 2>, 2> = Array::from([ones, ones]);
        assert!(nested.all());
    }

    #[test]
    fn test_as_type_truncates() {
        let a = array![1.9, -2.7, 0.2];
        assert_eq!(a.as_type::<i32>(), array![1, -2, 0]);
    }

    #[test]
    fn test_map_changes_type() {
        let a = array![1, 2, 3];
        let b = a.map(|x| x as f64 * 0.5);
        assert_eq!(b, array![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_fill() {
        let mut a: Matrix<f32, 2, 3> = Array::zeros();
        a.fill(7.0);
        assert_eq!(a, Matrix::splat(7.0));
    }

    #[test]
    fn test_splat_zeros_ones() {
        assert_eq!(Vector::<i32, 3>::splat(2), array![2, 2, 2]);
        assert_eq!(Vector::<f64, 2>::zeros(), array![0.0, 0.0]);
        assert_eq!(Matrix::<f64, 2, 2>::ones(), array![[1.0, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_repeat_tiles_cyclically() {
        let w = array![1, 2, 3];
        let t: Matrix<i32, 2, 3> = w.repeat::<Const<2>>();
        assert_eq!(t, array![[1, 2, 3], [1, 2, 3]]);

        let t3: Tensor3<i32, 2, 2, 3> = w.repeat::<(Const<2>, Const<2>)>();
        assert_eq!(t3, array![[[1, 2, 3], [1, 2, 3]], [[1, 2, 3], [1, 2, 3]]]);
    }

    #[test]
    fn test_row_and_outer_iter() {
        let m = array![[1.0, 2.0], [5.0, 8.0], [9.0, 9.0]];
        assert_eq!(m.row(0), array![1.0, 2.0]);
        assert_eq!(m.row(-1), array![9.0, 9.0]);
        assert_eq!(m.len(), 3);

        let rows: Vec<_> = m.outer_iter().collect();
        assert_eq!(
            rows,
            vec![array![1.0, 2.0], array![5.0, 8.0], array![9.0, 9.0]]
        );
        // Restartable: a second pass yields the same sequence.
        assert_eq!(m.outer_iter().count(), 3);

        let v = array![4, 5];
        let scalars: Vec<i32> = v.outer_iter().map(|s| s.buf).collect();
        assert_eq!(scalars, vec![4, 5]);
    }

    #[test]
    fn test_comparisons_return_arrays() {
        let a = array![1, 5, 3];
        let b = array![2, 2, 3];
        assert_eq!(a.cmp_lt(&b), array![true, false, false]);
        assert_eq!(a.cmp_ge(&b), array![false, true, true]);
        assert_eq!(a.cmp_eq(&b), array![false, false, true]);
        assert_eq!(a.cmp_ne(&b), array![true, true, false]);
    }

    #[test]
    fn test_and_or_truthiness() {
        let a = array![1, 0, 2];
        let b = array![1, 1, 0];
        assert_eq!(a.and(&b), array![true, false, false]);
        assert_eq!(a.or(&b), array![true, true, true]);
    }

    #[test]
    fn test_compound_assignment() {
        let mut a = array![1, 2, 3];
        a += &array![10, 10, 10];
        assert_eq!(a, array![11, 12, 13]);
        a *= 2;
        assert_eq!(a, array![22, 24, 26]);
        a -= array![2, 4, 6];
        assert_eq!(a, array![20, 20, 20]);
        a %= 7;
        assert_eq!(a, array![6, 6, 6]);
    }

    #[test]
    fn test_bit_and_shift_ops() {
        let a = array![0b1100u8, 0b1010];
        assert_eq!(a & 0b1000u8, array![0b1000u8, 0b1000]);
        assert_eq!(a | 0b0001u8, array![0b1101u8, 0b1011]);
        assert_eq!(a ^ a, array![0u8, 0]);

        let s = array![1u32, 2, 3];
        assert_eq!(s << 1u32, array![2u32, 4, 6]);
        assert_eq!(s >> 1u32, array![0u32, 1, 1]);
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(-array![1, -2, 3], array![-1, 2, -3]);
        assert_eq!(!array![true, false], array![false, true]);
        assert_eq!(!array![0u8, 0xff], array![0xffu8, 0]);
    }

    #[test]
    fn test_div_rem() {
        let a = array![7, 8, 9];
        assert_eq!(&a / 2, array![3, 4, 4]);
        assert_eq!(a % array![3, 3, 5], array![1, 2, 4]);
    }

    #[test]
    fn test_lifted_math() {
        let a = array![0.0, FRAC_PI_2];
        assert_relative_eq!(a.sin(), array![0.0, 1.0]);
        assert_relative_eq!(array![4.0, 9.0].sqrt(), array![2.0, 3.0]);
        assert_relative_eq!(array![2.0, 3.0].powf(2.0), array![4.0, 9.0]);
        assert_relative_eq!(
            array![3.0, -3.0].atan2(&array![-3.0, 3.0]),
            array![3.0 * core::f64::consts::FRAC_PI_4, -core::f64::consts::FRAC_PI_4]
        );
        assert_eq!(
            array![1.0, 5.0].max(&array![3.0, 2.0]),
            array![3.0, 5.0]
        );
        assert_eq!(array![1.0, 5.0].min_scalar(2.0), array![1.0, 2.0]);
        assert_eq!(array![-1.5, 1.5].abs(), array![1.5, 1.5]);
    }

    #[test]
    fn test_fixed_dyn_round_trip() {
        let f = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let d = f.to_dyn();
        assert_eq!(d.shape_slice(), &[2, 3]);
        assert_eq!(d[[1, 2]], 6.0);
        let g: Matrix<f64, 2, 3> = d.try_to_fixed().unwrap();
        assert_eq!(f, g);
    }

    #[test]
    fn test_try_to_fixed_checks_shape() {
        let d = DynMatrix::<f64>::with_shape(&[2, 3]);
        let err = d.try_to_fixed::<(Const<3>, Const<2>)>().unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_mixed_strategy_ops() {
        let d = DynVector::from_shape_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        let f = array![10.0, 20.0, 30.0];
        let sum = &d + &f;
        assert_eq!(sum.shape_slice(), &[3]);
        assert_eq!(sum.get(0), 11.0);
        assert_eq!(sum.get(2), 33.0);
    }

    #[test]
    #[should_panic(expected = "equal element counts")]
    fn test_dyn_size_mismatch_panics() {
        let a = DynVector::<f64>::with_shape(&[3]);
        let b = DynVector::<f64>::with_shape(&[4]);
        let _ = &a + &b;
    }

    #[test]
    fn test_raw_flat_access() {
        let m = array![[1, 2], [3, 4]];
        assert_eq!(m.get(0), 1);
        assert_eq!(m.get(3), 4);
        assert_eq!(m.size(), 4);
        assert_eq!(m.len(), 2);
        assert_eq!(m.rank(), 2);
    }
}
