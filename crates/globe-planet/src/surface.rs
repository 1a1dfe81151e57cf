//! Fallback planet surface: continents from three summed sinusoids.
//!
//! The texture is a pure function of pixel coordinates, so no seed is needed.

use image::{Rgb, RgbImage};

/// `land_value` above this is land.
pub const LAND_THRESHOLD: f32 = 0.1;

/// Land/ocean decision for one texel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceClass {
    Land,
    Ocean,
}

/// Scalar "elevation" in [-1, 1] at normalised texture coordinates.
pub fn land_value(u: f32, v: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (u * TAU * 3.0).sin() * (v * PI * 2.0).cos() * 0.5
        + (u * TAU * 7.0 + 1.3).sin() * (v * PI * 5.0).sin() * 0.3
        + (u * TAU * 13.0).cos() * (v * PI * 11.0 + 0.7).sin() * 0.2
}

pub fn classify(land: f32) -> SurfaceClass {
    if land > LAND_THRESHOLD {
        SurfaceClass::Land
    } else {
        SurfaceClass::Ocean
    }
}

fn surface_color(land: f32) -> Rgb<u8> {
    match classify(land) {
        SurfaceClass::Land => Rgb([
            (60.0 + 100.0 * land) as u8,
            (110.0 + 90.0 * land) as u8,
            (40.0 + 30.0 * land) as u8,
        ]),
        SurfaceClass::Ocean => {
            let depth = land.abs().min(1.0);
            Rgb([
                (10.0 + 20.0 * depth) as u8,
                (50.0 + 60.0 * depth) as u8,
                (130.0 + 110.0 * depth) as u8,
            ])
        }
    }
}

/// Synthesise a `size`×`size` RGB surface texture.
pub fn fallback_planet_texture(size: u32) -> RgbImage {
    let size = size.max(1);
    RgbImage::from_fn(size, size, |x, y| {
        let u = x as f32 / size as f32;
        let v = y as f32 / size as f32;
        surface_color(land_value(u, v))
    })
}
