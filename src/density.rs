//! Density and pressure estimation.
//!
//! For every active particle `i`:
//!
//! ```text
//! density_i  = Σ_j mass_j · W_poly6(|p_i − p_j|, h)     (j ≠ i, active, |p_i − p_j| < h)
//! pressure_i = stiffness · (density_i − rest_density)
//! ```
//!
//! Pressure is not clamped: sparse regions carry negative pressure.
//!
//! Both fields are rewritten from scratch every tick before anything reads
//! them; dormant particles get zero.

use crate::kernel::Poly6;
use crate::params::SimulationParams;
use crate::spatial::NeighborQuery;
use glam::Vec3;

/// Recompute `densities` and `pressures` for every slot.
pub fn evaluate<N: NeighborQuery + ?Sized>(
    query: &N,
    params: &SimulationParams,
    positions: &[Vec3],
    masses: &[f32],
    active: &[bool],
    densities: &mut [f32],
    pressures: &mut [f32],
) {
    let kernel = Poly6::new(params.kernel_radius);

    for i in 0..positions.len() {
        if !active[i] {
            densities[i] = 0.0;
            pressures[i] = 0.0;
            continue;
        }

        let mut density = 0.0;
        query.for_each_neighbor(i, positions, active, params.kernel_radius, &mut |j, _, dist| {
            density += masses[j] * kernel.eval(dist);
        });

        densities[i] = density;
        pressures[i] = params.stiffness * (density - params.rest_density);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::AllPairs;

    #[test]
    fn test_isolated_particle_has_negative_pressure() {
        let params = SimulationParams::default().with_pressure(2.0, 10.0);
        let positions = vec![Vec3::ZERO];
        let mut densities = vec![1.0];
        let mut pressures = vec![1.0];

        evaluate(&AllPairs, &params, &positions, &[1.0], &[true], &mut densities, &mut pressures);

        assert_eq!(densities[0], 0.0);
        assert_eq!(pressures[0], -20.0);
    }

    #[test]
    fn test_pair_density_symmetric() {
        let params = SimulationParams::default().with_kernel_radius(1.0);
        let positions = vec![Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)];
        let masses = [2.0, 2.0];
        let mut densities = vec![0.0; 2];
        let mut pressures = vec![0.0; 2];

        evaluate(&AllPairs, &params, &positions, &masses, &[true, true], &mut densities, &mut pressures);

        let expected = 2.0 * Poly6::new(1.0).eval(0.5);
        assert!((densities[0] - expected).abs() < 1e-5);
        assert_eq!(densities[0], densities[1]);
    }

    #[test]
    fn test_dormant_particles_ignored() {
        let params = SimulationParams::default().with_kernel_radius(1.0);
        let positions = vec![Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0)];
        let mut densities = vec![5.0; 2];
        let mut pressures = vec![5.0; 2];

        evaluate(&AllPairs, &params, &positions, &[1.0, 1.0], &[true, false], &mut densities, &mut pressures);

        assert_eq!(densities, vec![0.0, 0.0]);
        assert_eq!(pressures[1], 0.0);
    }
}
