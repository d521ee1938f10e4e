//! Element traits: what a type must provide to live inside an array.

/// Element types storable in arrays: plain `Copy` data with a default.
///
/// Implemented by the primitives below and by fixed-shape arrays
/// themselves, which is what lets nested arrays act as elements.
pub trait Elem: Copy + Default {}

macro_rules! impl_elem {
    ($($t:ty),* $(,)?) => {
        $(
            impl Elem for $t {}
        )*
    };
}

impl_elem!(bool, f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

/// Primitive scalars with additive and multiplicative identities.
pub trait Field: Elem {
    fn zero_prim() -> Self;
    fn one_prim() -> Self;
}

macro_rules! impl_field {
    ($($t:ty => ($zero:expr, $one:expr)),* $(,)?) => {
        $(
            impl Field for $t {
                #[inline]
                fn zero_prim() -> Self {
                    $zero
                }

                #[inline]
                fn one_prim() -> Self {
                    $one
                }
            }
        )*
    };
}

impl_field! {
    f32 => (0.0, 1.0),
    f64 => (0.0, 1.0),
    i8 => (0, 1),
    i16 => (0, 1),
    i32 => (0, 1),
    i64 => (0, 1),
    u8 => (0, 1),
    u16 => (0, 1),
    u32 => (0, 1),
    u64 => (0, 1),
    usize => (0, 1),
    isize => (0, 1),
}

/// Boolean collapse of an element, used by the `any`/`all` reductions.
///
/// Primitives are truthy when non-zero. Fixed-shape arrays implement this
/// themselves, so the reductions recurse through nested array elements.
pub trait Truthy: Elem {
    fn any(&self) -> bool;
    fn all(&self) -> bool;
}

impl Truthy for bool {
    #[inline]
    fn any(&self) -> bool {
        *self
    }

    #[inline]
    fn all(&self) -> bool {
        *self
    }
}

macro_rules! impl_truthy {
    ($($t:ty => $zero:expr),* $(,)?) => {
        $(
            impl Truthy for $t {
                #[inline]
                fn any(&self) -> bool {
                    *self != $zero
                }

                #[inline]
                fn all(&self) -> bool {
                    *self != $zero
                }
            }
        )*
    };
}

impl_truthy! {
    f32 => 0.0,
    f64 => 0.0,
    i8 => 0,
    i16 => 0,
    i32 => 0,
    i64 => 0,
    u8 => 0,
    u16 => 0,
    u32 => 0,
    u64 => 0,
    usize => 0,
    isize => 0,
}

/// Real-valued scalars exposing the `libm` math surface lifted elementwise
/// by the facade.
pub trait RealField: Field {
    fn sqrt(self) -> Self;
    fn cbrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn log2(self) -> Self;
    fn log10(self) -> Self;
    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    fn round(self) -> Self;
    fn trunc(self) -> Self;
    fn abs(self) -> Self;
    fn atan2(self, other: Self) -> Self;
    fn hypot(self, other: Self) -> Self;
    fn pow(self, other: Self) -> Self;
    fn copysign(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

macro_rules! impl_real_field {
    ($t:ty, unary { $($ufn:ident => $ulibm:ident),* $(,)? }, binary { $($bfn:ident => $blibm:ident),* $(,)? }) => {
        impl RealField for $t {
            $(
                #[inline]
                fn $ufn(self) -> Self {
                    libm::$ulibm(self)
                }
            )*
            $(
                #[inline]
                fn $bfn(self, other: Self) -> Self {
                    libm::$blibm(self, other)
                }
            )*
        }
    };
}

impl_real_field!(
    f64,
    unary {
        sqrt => sqrt,
        cbrt => cbrt,
        sin => sin,
        cos => cos,
        tan => tan,
        asin => asin,
        acos => acos,
        atan => atan,
        sinh => sinh,
        cosh => cosh,
        tanh => tanh,
        exp => exp,
        ln => log,
        log2 => log2,
        log10 => log10,
        floor => floor,
        ceil => ceil,
        round => round,
        trunc => trunc,
        abs => fabs,
    },
    binary {
        atan2 => atan2,
        hypot => hypot,
        pow => pow,
        copysign => copysign,
        min => fmin,
        max => fmax,
    }
);

impl_real_field!(
    f32,
    unary {
        sqrt => sqrtf,
        cbrt => cbrtf,
        sin => sinf,
        cos => cosf,
        tan => tanf,
        asin => asinf,
        acos => acosf,
        atan => atanf,
        sinh => sinhf,
        cosh => coshf,
        tanh => tanhf,
        exp => expf,
        ln => logf,
        log2 => log2f,
        log10 => log10f,
        floor => floorf,
        ceil => ceilf,
        round => roundf,
        trunc => truncf,
        abs => fabsf,
    },
    binary {
        atan2 => atan2f,
        hypot => hypotf,
        pow => powf,
        copysign => copysignf,
        min => fminf,
        max => fmaxf,
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_scalars() {
        assert!(1i32.any());
        assert!(!0i32.any());
        assert!(0.5f64.all());
        assert!(!false.any());
        assert!(true.all());
    }

    #[test]
    fn test_real_field_matches_libm() {
        assert_eq!(RealField::sqrt(4.0f64), 2.0);
        assert_eq!(RealField::abs(-3.0f32), 3.0);
        assert_eq!(RealField::max(1.0f64, 2.0), 2.0);
        assert_eq!(RealField::pow(2.0f32, 3.0), 8.0);
    }
}
