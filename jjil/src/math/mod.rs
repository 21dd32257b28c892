//! Scaled-integer arithmetic: fixed-point helpers, integer trig and complex numbers.

mod complex;
mod fixed;


pub use complex::Complex;
pub use fixed::{
    cos_deg, div, is_power_of_two, isqrt, log2, mul_scaled, round_shift, sin_deg, PI, SCALE,
    SCALE_BITS,
};
pub(crate) use fixed::isqrt_u64;
