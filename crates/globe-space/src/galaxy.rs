//! Fallback backdrop texture: a three-armed spiral galaxy sprinkled with stars.

use image::{Rgb, RgbImage};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BACKGROUND: Rgb<u8> = Rgb([5, 5, 12]);
const BRIGHT_STAR_CHANCE: f32 = 0.001;
const TINTED_STAR_CHANCE: f32 = 0.003;

/// Synthesise a `size`×`size` galaxy texture.
///
/// Each pixel draws from its own generator seeded by `seed` and its
/// coordinates, so the output depends only on `(seed, size)`.
pub fn fallback_galaxy_texture(size: u32, seed: u64) -> RgbImage {
    let size = size.max(1);
    RgbImage::from_fn(size, size, |x, y| {
        let nx = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
        let ny = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
        let distance = (nx * nx + ny * ny).sqrt();
        let angle = ny.atan2(nx);
        let spiral = (angle * 3.0 + distance * 10.0).sin() * (-distance * 1.5).exp();

        let mut rng = ChaCha8Rng::seed_from_u64(pixel_seed(seed, x, y));
        let roll: f32 = rng.random();
        if roll < BRIGHT_STAR_CHANCE {
            let v = rng.random_range(200..=255);
            Rgb([v, v, v])
        } else if roll < BRIGHT_STAR_CHANCE + TINTED_STAR_CHANCE {
            if rng.random::<bool>() {
                Rgb([170, 190, 255])
            } else {
                Rgb([255, 235, 170])
            }
        } else if spiral > 0.0 {
            Rgb([
                (20.0 + 80.0 * spiral) as u8,
                (10.0 + 40.0 * spiral) as u8,
                (40.0 + 110.0 * spiral) as u8,
            ])
        } else {
            BACKGROUND
        }
    })
}

fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    seed ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}
