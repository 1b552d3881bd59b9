use std::borrow::Cow;

use alpine_backdrop::{
    config::{BackdropConfig, TextureConfig},
    resources::{
        fallback::{self, FLAT_NORMAL, LAND, OCEAN, radial_falloff},
        texture::{ImageSet, TextureKey, TextureOrigin, fit_within, load_image_set},
    },
    scenes::{SceneController, alpine::AlpineBackdrop},
};
use image::{Rgba, RgbaImage};

use crate::common::test_utils::{assert_close, seeded_rng};
mod common;

#[tokio::test]
async fn should_fall_back_when_textures_are_missing() {
    let manifest = TextureConfig::default().terrain;
    let images = load_image_set(&manifest, 16, &mut seeded_rng(1)).await;
    assert_eq!(images.origin(), TextureOrigin::Fallback);
    assert_eq!(images.len(), 6);
    for key in TextureKey::TERRAIN {
        assert!(images.contains(key), "missing {}", key.name());
    }
}

#[tokio::test]
async fn should_fall_back_when_a_texture_does_not_decode() {
    let manifest = vec![(TextureKey::Albedo, "backdrop.ron".to_string())];
    let images = load_image_set(&manifest, 8, &mut seeded_rng(2)).await;
    assert_eq!(images.origin(), TextureOrigin::Fallback);
    let albedo = images.get(TextureKey::Albedo).expect("albedo fallback");
    assert_eq!(albedo.dimensions(), (8, 8));
}

#[tokio::test]
async fn should_replace_whole_batch_on_single_failure() {
    let manifest = vec![
        (TextureKey::Albedo, "backdrop.ron".to_string()),
        (TextureKey::Normal, "textures/missing.webp".to_string()),
    ];
    let images = load_image_set(&manifest, 8, &mut seeded_rng(3)).await;
    assert_eq!(images.origin(), TextureOrigin::Fallback);
    assert_eq!(images.keys().collect::<Vec<_>>(), vec![TextureKey::Albedo, TextureKey::Normal]);
    let normal = images.get(TextureKey::Normal).expect("normal fallback");
    assert!(normal.pixels().all(|p| *p == FLAT_NORMAL));
}

#[tokio::test]
async fn should_complete_an_empty_manifest() {
    let mut config = BackdropConfig::default();
    config.textures.terrain.clear();
    config.textures.fallback_size = 8;
    let images = SceneController::<AlpineBackdrop>::load_images(&config, &mut seeded_rng(4)).await;
    assert_eq!(images.len(), 6);
    assert!(TextureKey::TERRAIN.iter().all(|key| images.contains(*key)));
}

#[test]
fn should_only_add_missing_keys() {
    let mut rng = seeded_rng(5);
    let mut images = ImageSet::fallback([TextureKey::Albedo], 4, &mut rng);
    assert_eq!(images.complete(&TextureKey::TERRAIN, 4, &mut rng), 5);
    assert_eq!(images.complete(&TextureKey::TERRAIN, 4, &mut rng), 0);
    assert_eq!(images.len(), 6);
}

#[test]
fn should_keep_noise_within_gray_range() {
    let mut rng = seeded_rng(6);
    for (key, low, high) in [
        (TextureKey::Albedo, 120, 150),
        (TextureKey::Roughness, 102, 153),
        (TextureKey::Snow, 240, 255),
    ] {
        let img = key.fallback(32, &mut rng);
        for p in img.pixels() {
            assert!(p[0] >= low && p[0] <= high, "{} out of range for {}", p[0], key.name());
            assert_eq!(p[0], p[1]);
            assert_eq!(p[3], 255);
        }
    }
}

#[test]
fn should_draw_two_continents_on_the_fallback_globe() {
    let globe = fallback::globe_texture();
    assert_eq!(globe.dimensions(), (1024, 512));
    assert_eq!(*globe.get_pixel(300, 200), LAND);
    assert_eq!(*globe.get_pixel(700, 300), LAND);
    assert_eq!(*globe.get_pixel(0, 0), OCEAN);
    assert_eq!(*globe.get_pixel(500, 450), OCEAN);
}

#[test]
fn should_fade_sprite_towards_the_rim() {
    assert_eq!(radial_falloff(0.0), 1.0);
    assert_close(radial_falloff(0.4), 0.8, 1e-6);
    assert_close(radial_falloff(1.0), 0.0, 1e-6);
    let sprite = fallback::snowflake_sprite();
    let centre = sprite.get_pixel(32, 32);
    assert!(centre[3] > 240);
    assert_eq!(*sprite.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
}

#[test]
fn should_keep_perlin_pattern_deterministic() {
    assert_eq!(fallback::perlin_texture(16), fallback::perlin_texture(16));
    for i in 0..100 {
        let v = fallback::pseudo_perlin(i as f32 * 0.13, i as f32 * 0.29);
        assert!(v.abs() <= 0.875 + 1e-6);
    }
}

#[test]
fn should_reproduce_noise_from_seed() {
    let a = TextureKey::Noise.fallback(16, &mut seeded_rng(9));
    let b = TextureKey::Noise.fallback(16, &mut seeded_rng(9));
    assert_eq!(a, b);
}

#[test]
fn should_downscale_images_above_the_texture_limit() {
    let wide = RgbaImage::from_pixel(4096, 2048, Rgba([10, 20, 30, 255]));
    let fitted = fit_within(&wide, 2048);
    assert!(matches!(fitted, Cow::Owned(_)));
    assert_eq!(fitted.dimensions(), (2048, 1024));

    let tall = RgbaImage::new(30, 64);
    assert_eq!(fit_within(&tall, 16).dimensions(), (7, 16));

    let small = RgbaImage::new(64, 32);
    assert!(matches!(fit_within(&small, 2048), Cow::Borrowed(_)));
}

#[test]
fn should_never_produce_empty_textures() {
    let empty = RgbaImage::new(0, 0);
    assert_eq!(fit_within(&empty, 2048).dimensions(), (1, 1));

    let images = ImageSet::fallback(TextureKey::TERRAIN, 0, &mut seeded_rng(9));
    for key in TextureKey::TERRAIN {
        let img = images.get(key).expect("fallback image");
        assert!(img.width() >= 1 && img.height() >= 1, "{} is empty", key.name());
    }
}
