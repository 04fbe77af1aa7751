use nalgebra::RealField;

pub use nalgebra;

/// Scalar type used throughout meshfun.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Numerical differentiation by central finite differences
pub mod calculus;
/// Compensated (Kahan) summation
pub mod summation;
