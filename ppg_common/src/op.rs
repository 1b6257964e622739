//! Operator boilerplate for transparent newtypes.
//!
//! `op!(binary T, Add, add)` expands to the `Add` implementation for `T`, operating on the wrapped
//! value. `inplace` and `unary` cover the `*Assign` and negation traits respectively.

#[macro_export]
macro_rules! op {
    (binary $ty:ident, $trait:ident, $method:ident) => {
        impl $trait for $ty {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self($trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $ty:ident, $trait:ident, $method:ident) => {
        impl $trait for $ty {
            fn $method(&mut self, rhs: Self) {
                $trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $ty:ident, $trait:ident, $method:ident) => {
        impl $trait for $ty {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self($trait::$method(self.0))
            }
        }
    };
}
