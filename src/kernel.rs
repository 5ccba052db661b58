//! Smoothing kernels.

use std::f32::consts::PI;

/// Poly6 kernel with its normalisation precomputed for one radius.
///
/// `W(r, h) = 315 / (64 π h⁹) · (h² − r²)³` for `r < h`, else `0`.
#[derive(Clone, Copy, Debug)]
pub struct Poly6 {
    h_sq: f32,
    coeff: f32,
}

impl Poly6 {
    /// Kernel for radius `h`. `h` must be positive.
    pub fn new(h: f32) -> Self {
        Self {
            h_sq: h * h,
            coeff: 315.0 / (64.0 * PI * h.powi(9)),
        }
    }

    /// Kernel value at squared distance `r_sq`.
    #[inline]
    pub fn eval_sq(&self, r_sq: f32) -> f32 {
        if r_sq >= self.h_sq {
            return 0.0;
        }
        let diff = self.h_sq - r_sq;
        self.coeff * diff * diff * diff
    }

    /// Kernel value at distance `r`.
    #[inline]
    pub fn eval(&self, r: f32) -> f32 {
        self.eval_sq(r * r)
    }
}
