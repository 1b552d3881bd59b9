use std::{borrow::Cow, collections::BTreeMap};

use image::{Rgba, RgbaImage, imageops::FilterType};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    data_structures::texture::Texture,
    resources::{fallback, load_binary},
};

/// Semantic slot of a texture consumed by one of the backdrop shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextureKey {
    Albedo,
    Normal,
    Noise,
    Roughness,
    Perlin,
    Snow,
    EarthColor,
    EarthBump,
    EarthSpecular,
}

impl TextureKey {
    pub const TERRAIN: [TextureKey; 6] = [
        TextureKey::Albedo,
        TextureKey::Normal,
        TextureKey::Noise,
        TextureKey::Roughness,
        TextureKey::Perlin,
        TextureKey::Snow,
    ];

    pub const GLOBE: [TextureKey; 3] = [
        TextureKey::EarthColor,
        TextureKey::EarthBump,
        TextureKey::EarthSpecular,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextureKey::Albedo => "albedo",
            TextureKey::Normal => "normal",
            TextureKey::Noise => "noise",
            TextureKey::Roughness => "roughness",
            TextureKey::Perlin => "perlin",
            TextureKey::Snow => "snow",
            TextureKey::EarthColor => "earthColor",
            TextureKey::EarthBump => "earthBump",
            TextureKey::EarthSpecular => "earthSpecular",
        }
    }

    /// Colour maps are sampled as sRGB, data maps (normals, noise, masks) linearly.
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            TextureKey::Albedo | TextureKey::Snow | TextureKey::EarthColor
        )
    }

    /// Synthesizes the stand-in used when this texture cannot be loaded. `size` is at
    /// least one texel.
    pub fn fallback(&self, size: u32, rng: &mut impl Rng) -> RgbaImage {
        let size = size.max(1);
        match self {
            TextureKey::Albedo => fallback::noise_texture(size, 120, 150, rng),
            TextureKey::Normal => fallback::flat_normal_texture(size),
            TextureKey::Noise => fallback::noise_texture(size, 0, 255, rng),
            TextureKey::Roughness => fallback::noise_texture(size, 102, 153, rng),
            TextureKey::Perlin => fallback::perlin_texture(size),
            TextureKey::Snow => fallback::noise_texture(size, 240, 255, rng),
            TextureKey::EarthColor => fallback::globe_texture(),
            TextureKey::EarthBump => fallback::solid_texture(size, 128),
            TextureKey::EarthSpecular => fallback::solid_texture(size, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureOrigin {
    Loaded,
    Fallback,
}

/// Decoded images for every key of a manifest, ready to be uploaded.
#[derive(Debug, Clone)]
pub struct ImageSet {
    images: BTreeMap<TextureKey, RgbaImage>,
    origin: TextureOrigin,
}

impl ImageSet {
    /// A complete set of procedural stand-ins for `keys`.
    pub fn fallback(
        keys: impl IntoIterator<Item = TextureKey>,
        size: u32,
        rng: &mut impl Rng,
    ) -> Self {
        let images = keys
            .into_iter()
            .map(|key| (key, key.fallback(size, rng)))
            .collect();
        Self {
            images,
            origin: TextureOrigin::Fallback,
        }
    }

    /// Adds procedural stand-ins for those of `keys` the set lacks, e.g. when a config
    /// manifest leaves a shader slot out. Returns how many were added.
    pub fn complete(&mut self, keys: &[TextureKey], size: u32, rng: &mut impl Rng) -> usize {
        let mut added = 0;
        for key in keys {
            if !self.images.contains_key(key) {
                log::warn!("No texture configured for {}, using a procedural one", key.name());
                self.images.insert(*key, key.fallback(size, rng));
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, key: TextureKey) -> Option<&RgbaImage> {
        self.images.get(&key)
    }

    pub fn contains(&self, key: TextureKey) -> bool {
        self.images.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = TextureKey> + '_ {
        self.images.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn origin(&self) -> TextureOrigin {
        self.origin
    }
}

async fn fetch_image(path: &str) -> anyhow::Result<RgbaImage> {
    let bytes = load_binary(path).await?;
    let img = image::load_from_memory(&bytes)?.to_rgba8();
    anyhow::ensure!(img.width() > 0 && img.height() > 0, "image has no pixels");
    Ok(img)
}

/// `img` scaled down so neither side exceeds `max_dimension`, keeping its aspect ratio.
/// Images that already fit are borrowed as is; an image with no pixels becomes one gray
/// texel.
pub fn fit_within(img: &RgbaImage, max_dimension: u32) -> Cow<'_, RgbaImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Cow::Owned(RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255])));
    }
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension {
        return Cow::Borrowed(img);
    }
    let scale = |side: u32| {
        ((side as u64 * max_dimension as u64) / longest as u64).clamp(1, max_dimension as u64) as u32
    };
    Cow::Owned(image::imageops::resize(
        img,
        scale(width),
        scale(height),
        FilterType::Triangle,
    ))
}

/// Fetch and decode every texture of `manifest` concurrently.
///
/// Resolves once all fetches have settled. If any of them failed the whole set is replaced
/// by procedural fallbacks, so callers never observe a partially loaded set.
pub async fn load_image_set<R: Rng>(
    manifest: &[(TextureKey, String)],
    fallback_size: u32,
    rng: &mut R,
) -> ImageSet {
    let fetches = manifest
        .iter()
        .map(|(key, path)| async move { (*key, path.as_str(), fetch_image(path).await) });
    let results = futures::future::join_all(fetches).await;

    let mut images = BTreeMap::new();
    let mut failed = Vec::new();
    for (key, path, result) in results {
        match result {
            Ok(img) => {
                images.insert(key, img);
            }
            Err(e) => {
                log::warn!("Texture {} ({}) could not be loaded: {}", key.name(), path, e);
                failed.push(key.name());
            }
        }
    }

    if failed.is_empty() {
        return ImageSet {
            images,
            origin: TextureOrigin::Loaded,
        };
    }
    log::warn!(
        "Using procedural textures for [{}] after failing to load [{}]",
        manifest
            .iter()
            .map(|(key, _)| key.name())
            .collect::<Vec<_>>()
            .join(", "),
        failed.join(", ")
    );
    ImageSet::fallback(manifest.iter().map(|(key, _)| *key), fallback_size, rng)
}

/// GPU textures of one scene, keyed by their shader slot.
#[derive(Debug)]
pub struct TextureSet {
    textures: BTreeMap<TextureKey, Texture>,
}

impl TextureSet {
    /// Images larger than the device's 2D texture limit (2048 on WebGL2) are downscaled
    /// before upload.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, images: &ImageSet) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let textures = images
            .images
            .iter()
            .map(|(key, img)| {
                let fitted = fit_within(img, max_dimension);
                if let Cow::Owned(resized) = &fitted {
                    log::warn!(
                        "Texture {} is {}x{}, resized to {}x{} to fit the device limit",
                        key.name(),
                        img.width(),
                        img.height(),
                        resized.width(),
                        resized.height()
                    );
                }
                let texture =
                    Texture::from_rgba(device, queue, &fitted, key.name(), !key.is_color());
                (*key, texture)
            })
            .collect();
        Self { textures }
    }

    pub fn get(&self, key: TextureKey) -> anyhow::Result<&Texture> {
        self.textures
            .get(&key)
            .ok_or_else(|| anyhow::anyhow!("texture set has no {} binding", key.name()))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
