//! Procedural cloud wisps: small triangles scattered over a shell just above
//! the surface. Geometry is fixed per seed; motion comes from the layer's
//! time-driven rotation.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Maximum angular offset of a triangle corner from its centre, in radians.
const CORNER_JITTER: f32 = 0.05;

/// One cloud triangle, in planet-radius units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudPatch {
    pub vertices: [Vec3; 3],
}

#[derive(Clone, Debug)]
pub struct CloudGenerator {
    seed: u64,
    candidates: u32,
    keep_fraction: f32,
    radius_scale: f32,
}

impl CloudGenerator {
    /// 200 candidates, ~30% kept, shell at 1.02 planet radii.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            candidates: 200,
            keep_fraction: 0.3,
            radius_scale: 1.02,
        }
    }

    pub fn with_candidates(mut self, candidates: u32, keep_fraction: f32) -> Self {
        self.candidates = candidates;
        self.keep_fraction = keep_fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_radius_scale(mut self, radius_scale: f32) -> Self {
        self.radius_scale = radius_scale;
        self
    }

    pub fn generate(&self) -> Vec<CloudPatch> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut patches = Vec::new();
        for _ in 0..self.candidates {
            let azimuth = rng.random::<f32>() * std::f32::consts::TAU;
            let polar = rng.random::<f32>() * std::f32::consts::PI;
            if rng.random::<f32>() >= self.keep_fraction {
                continue;
            }
            let vertices = std::array::from_fn(|_| {
                let a = azimuth + rng.random_range(-CORNER_JITTER..=CORNER_JITTER);
                let p = polar + rng.random_range(-CORNER_JITTER..=CORNER_JITTER);
                spherical(a, p) * self.radius_scale
            });
            patches.push(CloudPatch { vertices });
        }
        patches
    }
}

/// Cloud patches with the default candidate count and shell.
pub fn procedural_clouds(seed: u64) -> Vec<CloudPatch> {
    CloudGenerator::new(seed).generate()
}

fn spherical(azimuth: f32, polar: f32) -> Vec3 {
    Vec3::new(
        polar.sin() * azimuth.cos(),
        polar.cos(),
        polar.sin() * azimuth.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generation() {
        assert_eq!(procedural_clouds(11), procedural_clouds(11));
    }

    #[test]
    fn test_roughly_thirty_percent_kept() {
        let patches = procedural_clouds(11);
        assert!(
            (30..=90).contains(&patches.len()),
            "kept {} of 200",
            patches.len()
        );
    }

    #[test]
    fn test_vertices_on_cloud_shell() {
        for patch in procedural_clouds(5) {
            for v in patch.vertices {
                assert!((v.length() - 1.02).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_triangles_are_small() {
        for patch in procedural_clouds(5) {
            let [a, b, c] = patch.vertices;
            // Two corners at most 0.1 rad apart in each angle.
            for edge in [a - b, b - c, c - a] {
                assert!(edge.length() < 0.3, "edge {}", edge.length());
            }
        }
    }

    #[test]
    fn test_keep_fraction_bounds() {
        assert!(CloudGenerator::new(1).with_candidates(50, 0.0).generate().is_empty());
        assert_eq!(CloudGenerator::new(1).with_candidates(50, 1.0).generate().len(), 50);
    }
}
