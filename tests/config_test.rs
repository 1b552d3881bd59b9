use alpine_backdrop::{
    config::{BackdropConfig, hex_to_rgb},
    resources::texture::TextureKey,
};

use crate::common::test_utils::assert_close;
mod common;

#[test]
fn should_provide_complete_defaults() {
    let config = BackdropConfig::default();
    assert_eq!(config.clock_step, 0.016);
    assert_eq!(config.terrain.size, 100.0);
    assert_eq!(config.terrain.segments, 128);
    assert_eq!(config.snow.floor, Some(-10.0));
    assert_eq!(config.textures.terrain.len(), TextureKey::TERRAIN.len());
    assert_eq!(config.textures.globe.len(), TextureKey::GLOBE.len());
    assert_eq!(config.page.section_heights, vec![900.0, 1100.0, 1000.0, 800.0]);
}

#[test]
fn should_fill_missing_fields_from_defaults() {
    let config = BackdropConfig::from_ron("(clock_step: 0.02, terrain: (segments: 64))")
        .expect("partial config should parse");
    assert_eq!(config.clock_step, 0.02);
    assert_eq!(config.terrain.segments, 64);
    assert_eq!(config.terrain.size, 100.0);
    assert_eq!(config.stars.count, BackdropConfig::default().stars.count);
}

#[test]
fn should_reject_invalid_config() {
    assert!(BackdropConfig::from_ron("(clock_step: \"fast\")").is_err());
    assert!(BackdropConfig::from_ron("(terrain: (segments: 64)").is_err());
}

#[test]
fn should_parse_shipped_config() {
    let text = std::fs::read_to_string("assets/backdrop.ron").expect("shipped config exists");
    let config = BackdropConfig::from_ron(&text).expect("shipped config should parse");
    assert_eq!(config.terrain.displacement_scale, 8.0);
    assert_eq!(config.textures.terrain.len(), 6);
    assert_eq!(config.textures.terrain[0], (TextureKey::Albedo, "textures/4.webp".to_string()));
    assert_eq!(config.textures.globe[0].0, TextureKey::EarthColor);
}

#[tokio::test]
async fn should_load_config_from_asset_directory() {
    let config = BackdropConfig::load().await;
    assert_eq!(config.terrain.snow_level, 0.6);
    assert_eq!(config.globe.spin_per_frame, 0.0005);
}

#[test]
fn should_split_hex_colours() {
    let [r, g, b] = hex_to_rgb(0xFF8000);
    assert_eq!(r, 1.0);
    assert_close(g, 128.0 / 255.0, 1e-6);
    assert_eq!(b, 0.0);
    assert_eq!(hex_to_rgb(0x000000), [0.0, 0.0, 0.0]);
}
