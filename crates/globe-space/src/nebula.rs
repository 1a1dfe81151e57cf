//! Procedural nebula patches: translucent coloured quads scattered through a
//! thick spherical shell behind the star field.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::starfield::angular_sphere_point;

/// The three nebula hues: purple, blue, pink.
pub const NEBULA_HUES: [[f32; 3]; 3] = [[0.5, 0.2, 0.7], [0.2, 0.35, 0.8], [0.8, 0.3, 0.5]];

/// One nebula billboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaPatch {
    pub position: Vec3,
    /// RGB hue plus opacity in [0.05, 0.15].
    pub color: [f32; 4],
    /// Quad half-size in [2, 5].
    pub half_size: f32,
}

/// Seeded generator for nebula patches.
#[derive(Clone, Debug)]
pub struct NebulaGenerator {
    seed: u64,
    count: u32,
    inner_radius: f32,
    outer_radius: f32,
}

impl NebulaGenerator {
    /// `count` patches in the shell [35, 40].
    pub fn new(seed: u64, count: u32) -> Self {
        Self {
            seed,
            count,
            inner_radius: 35.0,
            outer_radius: 40.0,
        }
    }

    pub fn with_shell(mut self, inner_radius: f32, outer_radius: f32) -> Self {
        self.inner_radius = inner_radius;
        self.outer_radius = outer_radius.max(inner_radius);
        self
    }

    pub fn generate(&self) -> Vec<NebulaPatch> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| {
                let radius = self.inner_radius
                    + rng.random::<f32>() * (self.outer_radius - self.inner_radius);
                let position = angular_sphere_point(&mut rng, radius);
                let [r, g, b] = NEBULA_HUES[rng.random_range(0..NEBULA_HUES.len())];
                let alpha = 0.05 + 0.1 * rng.random::<f32>();
                let half_size = 2.0 + 3.0 * rng.random::<f32>();
                NebulaPatch {
                    position,
                    color: [r, g, b, alpha],
                    half_size,
                }
            })
            .collect()
    }
}

/// Nebula patches in the default shell.
pub fn nebula_patches(count: u32, seed: u64) -> Vec<NebulaPatch> {
    NebulaGenerator::new(seed, count).generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generation() {
        assert_eq!(nebula_patches(20, 7), nebula_patches(20, 7));
    }

    #[test]
    fn test_patch_count() {
        assert_eq!(nebula_patches(20, 7).len(), 20);
        assert!(nebula_patches(0, 7).is_empty());
    }

    #[test]
    fn test_patches_in_shell() {
        for patch in nebula_patches(200, 3) {
            let r = patch.position.length();
            assert!((35.0 - 1e-3..=40.0 + 1e-3).contains(&r), "radius {r}");
        }
    }

    #[test]
    fn test_colour_from_fixed_hues() {
        for patch in nebula_patches(100, 11) {
            let rgb = [patch.color[0], patch.color[1], patch.color[2]];
            assert!(NEBULA_HUES.contains(&rgb));
            assert!((0.05..=0.15).contains(&patch.color[3]));
        }
    }

    #[test]
    fn test_half_size_range() {
        for patch in nebula_patches(100, 12) {
            assert!((2.0..=5.0).contains(&patch.half_size));
        }
    }

    #[test]
    fn test_custom_shell() {
        for patch in NebulaGenerator::new(1, 50).with_shell(10.0, 12.0).generate() {
            let r = patch.position.length();
            assert!((10.0 - 1e-3..=12.0 + 1e-3).contains(&r));
        }
    }
}
