#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    String(&'a str),
    Integer(i64),
    Float(f64),
}

/// Conversion from a record attribute to a queryable [`Scalar`].
///
/// Integers that do not fit in `i64` and types with no scalar kind (such as
/// `bool`) return `None`, which makes every comparison against them false.
pub trait ToScalar {
    fn to_scalar(&self) -> Option<Scalar<'_>>;
}

impl ToScalar for str {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        Some(Scalar::String(self))
    }
}

impl ToScalar for String {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        Some(Scalar::String(self))
    }
}

macro_rules! integer_to_scalar {
    ($($ty:ty),*) => {
        $(
            impl ToScalar for $ty {
                fn to_scalar(&self) -> Option<Scalar<'_>> {
                    i64::try_from(*self).ok().map(Scalar::Integer)
                }
            }
        )*
    };
}

integer_to_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToScalar for f64 {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        Some(Scalar::Float(*self))
    }
}

impl ToScalar for f32 {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        Some(Scalar::Float(f64::from(*self)))
    }
}

impl ToScalar for bool {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        None
    }
}

impl<T: ToScalar> ToScalar for Option<T> {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        self.as_ref().and_then(ToScalar::to_scalar)
    }
}

impl<T: ToScalar + ?Sized> ToScalar for &T {
    fn to_scalar(&self) -> Option<Scalar<'_>> {
        (**self).to_scalar()
    }
}
