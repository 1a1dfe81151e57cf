//! Procedural star field: deterministic star placement on a fixed-radius sky
//! sphere, classified into four size/colour classes.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// ChaCha stream used for class draws, independent of the position stream.
const CLASS_STREAM: u64 = 1;
/// ChaCha stream used for the extra batch of bright stars.
const BRIGHT_STREAM: u64 = 2;

/// Fraction of stars drawn as blue giants.
pub const BLUE_GIANT_FRACTION: f32 = 0.05;
/// Fraction of stars drawn as red giants.
pub const RED_GIANT_FRACTION: f32 = 0.05;

/// Size and colour class of a star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StarClass {
    Normal,
    RedGiant,
    BlueGiant,
    Bright,
}

impl StarClass {
    /// Classes in draw order, smallest points first.
    pub const DRAW_ORDER: [StarClass; 4] = [
        StarClass::Normal,
        StarClass::RedGiant,
        StarClass::BlueGiant,
        StarClass::Bright,
    ];

    /// Point size in pixels.
    pub fn point_size(self) -> f32 {
        match self {
            StarClass::Normal => 1.0,
            StarClass::RedGiant => 1.5,
            StarClass::BlueGiant => 2.0,
            StarClass::Bright => 3.0,
        }
    }

    /// Position of this class in [`Self::DRAW_ORDER`].
    pub fn index(self) -> usize {
        match self {
            StarClass::Normal => 0,
            StarClass::RedGiant => 1,
            StarClass::BlueGiant => 2,
            StarClass::Bright => 3,
        }
    }
}

/// A single star of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarRecord {
    /// Position on the star sphere, in world units.
    pub position: Vec3,
    /// Linear RGB colour.
    pub color: [f32; 3],
    pub class: StarClass,
}

/// Generates a deterministic star field from a seed.
#[derive(Clone, Debug)]
pub struct StarFieldGenerator {
    seed: u64,
    star_count: u32,
    radius: f32,
    bright_count: u32,
    bright_radius: f32,
}

impl StarFieldGenerator {
    /// `star_count` stars at radius 50 plus 50 bright stars at radius 55.
    pub fn new(seed: u64, star_count: u32) -> Self {
        Self {
            seed,
            star_count,
            radius: 50.0,
            bright_count: 50,
            bright_radius: 55.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Size and radius of the extra bright batch.
    pub fn with_bright_stars(mut self, count: u32, radius: f32) -> Self {
        self.bright_count = count;
        self.bright_radius = radius;
        self
    }

    /// Number of records [`generate`](Self::generate) returns.
    pub fn total_count(&self) -> usize {
        (self.star_count as usize).saturating_add(self.bright_count as usize)
    }

    /// Generate the field. The first `star_count` records are the main field,
    /// followed by the bright batch.
    pub fn generate(&self) -> Vec<StarRecord> {
        let mut position_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut class_rng = ChaCha8Rng::seed_from_u64(self.seed);
        class_rng.set_stream(CLASS_STREAM);
        let mut bright_rng = ChaCha8Rng::seed_from_u64(self.seed);
        bright_rng.set_stream(BRIGHT_STREAM);

        let mut stars = Vec::with_capacity(self.total_count());

        for _ in 0..self.star_count {
            let position = angular_sphere_point(&mut position_rng, self.radius);
            let roll: f32 = class_rng.random();
            let (class, color) = if roll < BLUE_GIANT_FRACTION {
                (StarClass::BlueGiant, [0.6, 0.75, 1.0])
            } else if roll < BLUE_GIANT_FRACTION + RED_GIANT_FRACTION {
                (StarClass::RedGiant, [1.0, 0.45, 0.3])
            } else {
                let b = 0.6 + 0.4 * class_rng.random::<f32>();
                (StarClass::Normal, [b, b, b])
            };
            stars.push(StarRecord {
                position,
                color,
                class,
            });
        }

        for _ in 0..self.bright_count {
            let position = angular_sphere_point(&mut bright_rng, self.bright_radius);
            let blue = 0.9 + 0.1 * bright_rng.random::<f32>();
            stars.push(StarRecord {
                position,
                color: [1.0, 1.0, blue],
                class: StarClass::Bright,
            });
        }

        stars
    }
}

/// Star field with the default radii.
pub fn star_field(count: u32, seed: u64) -> Vec<StarRecord> {
    StarFieldGenerator::new(seed, count).generate()
}

/// A point at `radius` from uniformly drawn azimuth in [0, 2π) and polar angle
/// in [0, π). Uniform polar angles crowd points towards the poles.
pub(crate) fn angular_sphere_point(rng: &mut ChaCha8Rng, radius: f32) -> Vec3 {
    let azimuth = rng.random::<f32>() * std::f32::consts::TAU;
    let polar = rng.random::<f32>() * std::f32::consts::PI;
    Vec3::new(
        polar.sin() * azimuth.cos(),
        polar.cos(),
        polar.sin() * azimuth.sin(),
    ) * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generation() {
        let a = star_field(500, 42);
        let b = star_field(500, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = star_field(100, 1);
        let b = star_field(100, 2);
        assert_ne!(a[0].position, b[0].position);
    }

    #[test]
    fn test_count_includes_bright_batch() {
        let stars = star_field(2000, 42);
        assert_eq!(stars.len(), 2050);
        let bright = stars.iter().filter(|s| s.class == StarClass::Bright).count();
        assert_eq!(bright, 50);
        assert!(stars[2000..].iter().all(|s| s.class == StarClass::Bright));
    }

    #[test]
    fn test_total_count_does_not_overflow() {
        let generator = StarFieldGenerator::new(1, u32::MAX).with_bright_stars(u32::MAX, 55.0);
        assert_eq!(generator.total_count(), 2 * u32::MAX as usize);
        assert_eq!(StarFieldGenerator::new(1, 2000).total_count(), 2050);
    }

    #[test]
    fn test_stars_lie_on_their_sphere() {
        for star in star_field(300, 9) {
            let expected = if star.class == StarClass::Bright { 55.0 } else { 50.0 };
            assert!((star.position.length() - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_class_proportions() {
        let stars = star_field(2000, 42);
        let blue = stars.iter().filter(|s| s.class == StarClass::BlueGiant).count();
        let red = stars.iter().filter(|s| s.class == StarClass::RedGiant).count();
        assert!((50..=160).contains(&blue), "blue giants: {blue}");
        assert!((50..=160).contains(&red), "red giants: {red}");
    }

    #[test]
    fn test_normal_stars_are_grey_in_range() {
        for star in star_field(500, 3) {
            if star.class == StarClass::Normal {
                let [r, g, b] = star.color;
                assert_eq!(r, g);
                assert_eq!(g, b);
                assert!((0.6..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn test_polar_sampling_clusters_at_poles() {
        // Uniform polar angles put ~29% of points within |y| > 0.9; an
        // area-uniform distribution would put 10% there.
        let stars = star_field(2000, 42);
        let polar = stars[..2000]
            .iter()
            .filter(|s| (s.position.y / s.position.length()).abs() > 0.9)
            .count();
        let fraction = polar as f32 / 2000.0;
        assert!(fraction > 0.2, "polar fraction {fraction}");
    }

    #[test]
    fn test_draw_order_sizes_increase() {
        let sizes: Vec<f32> = StarClass::DRAW_ORDER.iter().map(|c| c.point_size()).collect();
        assert_eq!(sizes, vec![1.0, 1.5, 2.0, 3.0]);
        for (i, class) in StarClass::DRAW_ORDER.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
    }

    #[test]
    fn test_custom_bright_batch() {
        let stars = StarFieldGenerator::new(5, 10)
            .with_radius(20.0)
            .with_bright_stars(3, 25.0)
            .generate();
        assert_eq!(stars.len(), 13);
        assert!((stars[0].position.length() - 20.0).abs() < 1e-3);
        assert!((stars[12].position.length() - 25.0).abs() < 1e-3);
    }
}
