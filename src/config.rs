//! Backdrop configuration. Loaded from `backdrop.ron` in the asset directory at startup.
//!
//! Every section falls back to its defaults field by field, so a config file only has to
//! name the values it wants to change. Colours are written as `0xRRGGBB` integers.

use serde::{Deserialize, Serialize};

use crate::resources::{load_string, texture::TextureKey};

/// Name of the config file inside the asset directory.
pub const CONFIG_FILE: &str = "backdrop.ron";

pub const SKY_BLUE: u32 = 0x87CEEB;
pub const DIM_GRAY: u32 = 0x404040;
pub const SPECULAR_GREY: u32 = 0x808080;
pub const GLOW_BLUE: u32 = 0x00AAFF;
pub const SUNSET_ORANGE: u32 = 0xFF6600;
pub const EARTH_BROWN: u32 = 0x362D1D;
pub const NIGHT_BLUE: u32 = 0x020924;
pub const WHITE: u32 = 0xFFFFFF;

/// Converts a `0xRRGGBB` colour to linear-ish float channels in `[0, 1]`.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

pub fn hex_to_color(hex: u32) -> wgpu::Color {
    let [r, g, b] = hex_to_rgb(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Fixed amount the scene clock advances per animation frame.
    pub clock_step: f32,
    pub terrain: TerrainConfig,
    pub snow: ParticleConfig,
    pub atmosphere: ParticleConfig,
    pub stars: ParticleConfig,
    pub peaks: PeakConfig,
    pub clouds: CloudConfig,
    pub globe: GlobeConfig,
    pub alpine_lights: LightConfig,
    pub globe_lights: LightConfig,
    pub alpine_camera: CameraConfig,
    pub globe_camera: CameraConfig,
    pub textures: TextureConfig,
    pub page: PageConfig,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            clock_step: 0.016,
            terrain: TerrainConfig::default(),
            snow: ParticleConfig::snow(),
            atmosphere: ParticleConfig::atmosphere(),
            stars: ParticleConfig::stars(),
            peaks: PeakConfig::default(),
            clouds: CloudConfig::default(),
            globe: GlobeConfig::default(),
            alpine_lights: LightConfig::alpine(),
            globe_lights: LightConfig::globe(),
            alpine_camera: CameraConfig::alpine(),
            globe_camera: CameraConfig::globe(),
            textures: TextureConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl BackdropConfig {
    /// Parses a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Load the config from the asset directory. A missing file yields the defaults, an
    /// invalid one logs a warning and yields the defaults as well.
    pub async fn load() -> Self {
        match load_string(CONFIG_FILE).await {
            Ok(text) => match Self::from_ron(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Invalid config {}: {}, using defaults", CONFIG_FILE, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No {} found ({}), using defaults", CONFIG_FILE, e);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of the square terrain plane.
    pub size: f32,
    /// Grid subdivisions per edge.
    pub segments: u32,
    /// World height of the undisplaced plane.
    pub elevation: f32,
    pub uv_scale: f32,
    pub displacement_scale: f32,
    /// Amplitude of the slow idle wave added on top of the displacement.
    pub idle_amplitude: f32,
    pub snow_level: f32,
    pub snow_blend: f32,
    pub threshold_low: f32,
    pub threshold_high: f32,
    pub light_direction: [f32; 3],
    pub light_color: u32,
    pub ambient_color: u32,
    pub fog_color: u32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            segments: 128,
            elevation: -5.0,
            uv_scale: 4.0,
            displacement_scale: 8.0,
            idle_amplitude: 0.2,
            snow_level: 0.6,
            snow_blend: 0.3,
            threshold_low: 0.2,
            threshold_high: 1.0,
            light_direction: [-1.0, 1.0, 1.0],
            light_color: WHITE,
            ambient_color: DIM_GRAY,
            fog_color: SKY_BLUE,
            fog_near: 10.0,
            fog_far: 200.0,
        }
    }
}

/// Spawn volume, attribute ranges and lifecycle of one particle system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub spawn_min: [f32; 3],
    pub spawn_max: [f32; 3],
    pub velocity_min: [f32; 3],
    pub velocity_max: [f32; 3],
    pub size_min: f32,
    pub size_max: f32,
    /// Brightness range of the per-particle tint.
    pub brightness_min: f32,
    pub brightness_max: f32,
    /// Multiplier on the blue channel of the tint.
    pub blue_boost: f32,
    pub opacity: f32,
    /// World units per unit of particle size.
    pub sprite_scale: f32,
    /// Particles dropping below this height are recycled. `None` disables recycling.
    pub floor: Option<f32>,
    pub recycle_offset: f32,
    pub band_depth: f32,
    pub fade_near: f32,
    pub fade_far: f32,
    pub wind_strength: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self::snow()
    }
}

impl ParticleConfig {
    pub fn snow() -> Self {
        Self {
            count: 2000,
            spawn_min: [-50.0, 10.0, -50.0],
            spawn_max: [50.0, 60.0, 50.0],
            velocity_min: [-0.25, -2.5, -0.25],
            velocity_max: [0.25, -0.5, 0.25],
            size_min: 1.0,
            size_max: 4.0,
            brightness_min: 1.0,
            brightness_max: 1.0,
            blue_boost: 1.0,
            opacity: 0.8,
            sprite_scale: 0.15,
            floor: Some(-10.0),
            recycle_offset: 60.0,
            band_depth: 40.0,
            fade_near: 20.0,
            fade_far: 50.0,
            wind_strength: 2.0,
        }
    }

    pub fn atmosphere() -> Self {
        Self {
            count: 500,
            spawn_min: [-100.0, 0.0, -100.0],
            spawn_max: [100.0, 100.0, 100.0],
            velocity_min: [0.0; 3],
            velocity_max: [0.0; 3],
            size_min: 0.5,
            size_max: 0.5,
            brightness_min: 0.3,
            brightness_max: 0.7,
            blue_boost: 1.1,
            opacity: 0.6,
            sprite_scale: 0.4,
            floor: None,
            recycle_offset: 0.0,
            band_depth: 0.0,
            fade_near: 0.0,
            fade_far: 0.0,
            wind_strength: 0.0,
        }
    }

    pub fn stars() -> Self {
        Self {
            count: 2000,
            spawn_min: [-1000.0; 3],
            spawn_max: [1000.0; 3],
            velocity_min: [0.0; 3],
            velocity_max: [0.0; 3],
            size_min: 0.0,
            size_max: 1.5,
            brightness_min: 1.0,
            brightness_max: 1.0,
            blue_boost: 1.0,
            opacity: 0.8,
            sprite_scale: 3.0,
            floor: None,
            recycle_offset: 0.0,
            band_depth: 0.0,
            fade_near: 0.0,
            fade_far: 0.0,
            wind_strength: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    pub count: usize,
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
    pub opacity: f32,
    pub hue: f32,
    pub saturation: f32,
    pub lightness_min: f32,
    pub lightness_max: f32,
    pub spawn_min: [f32; 3],
    pub spawn_max: [f32; 3],
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            count: 5,
            radius: 8.0,
            height: 20.0,
            segments: 8,
            opacity: 0.8,
            hue: 0.1,
            saturation: 0.1,
            lightness_min: 0.3,
            lightness_max: 0.6,
            spawn_min: [-40.0, 5.0, -50.0],
            spawn_max: [40.0, 15.0, -30.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub count: usize,
    pub radius: f32,
    pub segments: u32,
    pub opacity_min: f32,
    pub opacity_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub spawn_min: [f32; 3],
    pub spawn_max: [f32; 3],
    pub color: [f32; 3],
    /// Displacement along the normal at full noise coverage.
    pub breathing: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            count: 8,
            radius: 15.0,
            segments: 16,
            opacity_min: 0.3,
            opacity_max: 0.5,
            scale_min: 0.5,
            scale_max: 1.0,
            spawn_min: [-40.0, 20.0, -60.0],
            spawn_max: [40.0, 35.0, -40.0],
            color: [0.9, 0.95, 1.0],
            breathing: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub radius: f32,
    pub segments: u32,
    pub bump_scale: f32,
    pub shininess: f32,
    pub specular_color: u32,
    /// Yaw added to the globe every frame, in radians.
    pub spin_per_frame: f32,
    pub wireframe_color: u32,
    pub wireframe_opacity: f32,
    pub wireframe_scale: f32,
    pub atmosphere_radius: f32,
    pub glow_color: u32,
    pub glow_bias: f32,
    pub glow_power: f32,
    pub glow_alpha: f32,
    pub fog_color: u32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            segments: 64,
            bump_scale: 0.05,
            shininess: 5.0,
            specular_color: SPECULAR_GREY,
            spin_per_frame: 0.0005,
            wireframe_color: GLOW_BLUE,
            wireframe_opacity: 0.1,
            wireframe_scale: 1.001,
            atmosphere_radius: 10.2,
            glow_color: GLOW_BLUE,
            glow_bias: 0.7,
            glow_power: 2.0,
            glow_alpha: 0.3,
            fog_color: NIGHT_BLUE,
            fog_near: 15.0,
            fog_far: 30.0,
        }
    }
}

/// One directional light plus ambient and hemisphere fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub sun_position: [f32; 3],
    pub sun_color: u32,
    pub sun_intensity: f32,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub sky_color: u32,
    pub ground_color: u32,
    pub hemisphere_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::alpine()
    }
}

impl LightConfig {
    pub fn alpine() -> Self {
        Self {
            sun_position: [-10.0, 20.0, 5.0],
            sun_color: WHITE,
            sun_intensity: 1.2,
            ambient_color: SKY_BLUE,
            ambient_intensity: 0.4,
            sky_color: SKY_BLUE,
            ground_color: EARTH_BROWN,
            hemisphere_intensity: 0.3,
        }
    }

    pub fn globe() -> Self {
        Self {
            sun_position: [5.0, 3.0, 5.0],
            sun_color: WHITE,
            sun_intensity: 1.2,
            ambient_color: DIM_GRAY,
            ambient_intensity: 1.0,
            sky_color: GLOW_BLUE,
            ground_color: SUNSET_ORANGE,
            hemisphere_intensity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    pub look_at: [f32; 3],
    /// Pointer offset applied to the eye target at full deflection, per axis.
    pub pointer_reach: [f32; 2],
    /// Fraction of the remaining distance covered per frame.
    pub damping: f32,
    /// Eye offset at full scroll progress. Zero disables the dolly.
    pub scroll_dolly: [f32; 3],
    /// Orbit speed around the origin in radians per frame. Zero disables orbiting.
    pub orbit_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub clear_color: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::alpine()
    }
}

impl CameraConfig {
    pub fn alpine() -> Self {
        Self {
            fovy_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            eye: [0.0, 15.0, 25.0],
            look_at: [0.0, 0.0, -10.0],
            pointer_reach: [2.0, 1.0],
            damping: 0.02,
            scroll_dolly: [0.0, 5.0, 10.0],
            orbit_speed: 0.0,
            min_distance: 0.0,
            max_distance: f32::MAX,
            clear_color: SKY_BLUE,
        }
    }

    pub fn globe() -> Self {
        Self {
            fovy_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: [0.0, 0.0, 20.0],
            look_at: [0.0, 0.0, 0.0],
            pointer_reach: [1.0, 1.0],
            damping: 0.05,
            scroll_dolly: [0.0; 3],
            orbit_speed: std::f32::consts::TAU / 3600.0 * 0.5,
            min_distance: 15.0,
            max_distance: 30.0,
            clear_color: NIGHT_BLUE,
        }
    }
}

/// Texture manifests for both scenes, as `(key, path)` pairs relative to the asset root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub terrain: Vec<(TextureKey, String)>,
    pub globe: Vec<(TextureKey, String)>,
    /// Edge length of synthesized fallback textures.
    pub fallback_size: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            terrain: vec![
                (TextureKey::Albedo, "textures/4.webp".to_string()),
                (TextureKey::Normal, "textures/5.webp".to_string()),
                (TextureKey::Noise, "textures/1.webp".to_string()),
                (TextureKey::Roughness, "textures/2.webp".to_string()),
                (TextureKey::Perlin, "textures/3.webp".to_string()),
                (TextureKey::Snow, "textures/6.webp".to_string()),
            ],
            globe: vec![
                (TextureKey::EarthColor, "textures/earth-map.webp".to_string()),
                (TextureKey::EarthBump, "textures/earth-bump.webp".to_string()),
                (TextureKey::EarthSpecular, "textures/earth-specular.webp".to_string()),
            ],
            fallback_size: 512,
        }
    }
}

/// Layout of the virtual page scrolled with the mouse wheel in native builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Heights of the page sections in physical pixels, top to bottom.
    pub section_heights: Vec<f32>,
    /// Pixels scrolled per wheel line.
    pub line_height: f32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            section_heights: vec![900.0, 1100.0, 1000.0, 800.0],
            line_height: 40.0,
            window_width: 1280,
            window_height: 800,
        }
    }
}
