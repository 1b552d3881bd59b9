//! Procedural stand-ins for textures that could not be fetched.
//!
//! All generators are pure functions of their arguments and the supplied RNG, so a seeded
//! `StdRng` reproduces the same images.

use image::{Rgba, RgbaImage};
use rand::Rng;

/// Texel of a normal map that leaves the surface normal untouched.
pub const FLAT_NORMAL: Rgba<u8> = Rgba([128, 128, 255, 255]);

pub const OCEAN: Rgba<u8> = Rgba([0x1a, 0x3b, 0x8b, 255]);
pub const LAND: Rgba<u8> = Rgba([0x3a, 0x5f, 0x0b, 255]);

/// Continents of the fallback globe: centre and radius in texels of a 1024x512 map.
const CONTINENTS: [((f32, f32), f32); 2] = [((300.0, 200.0), 80.0), ((700.0, 300.0), 120.0)];

pub const GLOBE_WIDTH: u32 = 1024;
pub const GLOBE_HEIGHT: u32 = 512;

pub const SPRITE_SIZE: u32 = 64;

/// Independent uniform grayscale noise per texel between the gray levels `low` and `high`.
pub fn noise_texture(size: u32, low: u8, high: u8, rng: &mut impl Rng) -> RgbaImage {
    let (low, high) = (low.min(high), low.max(high));
    let mut img = RgbaImage::new(size, size);
    for pixel in img.pixels_mut() {
        let v = rng.gen_range(low..=high);
        *pixel = Rgba([v, v, v, 255]);
    }
    img
}

pub fn flat_normal_texture(size: u32) -> RgbaImage {
    RgbaImage::from_pixel(size, size, FLAT_NORMAL)
}

pub fn solid_texture(size: u32, gray: u8) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba([gray, gray, gray, 255]))
}

/// Sum of three sine/cosine octaves, in `[-0.875, 0.875]`.
pub fn pseudo_perlin(x: f32, y: f32) -> f32 {
    (x * 2.0).sin() * (y * 3.0).cos() * 0.5
        + (x * 4.0).sin() * (y * 2.0).cos() * 0.25
        + (x * 8.0).sin() * (y * 6.0).cos() * 0.125
}

/// Band-limited pseudo-Perlin pattern sampled every 0.01 units per texel.
pub fn perlin_texture(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |px, py| {
        let n = pseudo_perlin(px as f32 * 0.01, py as f32 * 0.01);
        let v = ((n + 1.0) * 127.5).floor().clamp(0.0, 255.0) as u8;
        Rgba([v, v, v, 255])
    })
}

/// Ocean-blue map with two round green continents.
pub fn globe_texture() -> RgbaImage {
    RgbaImage::from_fn(GLOBE_WIDTH, GLOBE_HEIGHT, |px, py| {
        let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
        let on_land = CONTINENTS
            .iter()
            .any(|&((cx, cy), r)| (x - cx).powi(2) + (y - cy).powi(2) <= r * r);
        if on_land { LAND } else { OCEAN }
    })
}

/// White radial gradient used as the snowflake sprite.
pub fn snowflake_sprite() -> RgbaImage {
    let half = SPRITE_SIZE as f32 / 2.0;
    RgbaImage::from_fn(SPRITE_SIZE, SPRITE_SIZE, |px, py| {
        let dx = px as f32 + 0.5 - half;
        let dy = py as f32 + 0.5 - half;
        let t = ((dx * dx + dy * dy).sqrt() / half).min(1.0);
        let alpha = radial_falloff(t);
        Rgba([255, 255, 255, (alpha * 255.0).round() as u8])
    })
}

/// Alpha of the sprite gradient at normalized radius `t`: 1.0 at the centre, 0.8 at 0.4,
/// 0.0 at the rim, linear in between.
pub fn radial_falloff(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.4 {
        1.0 - 0.2 * (t / 0.4)
    } else {
        0.8 * (1.0 - (t - 0.4) / 0.6)
    }
}
