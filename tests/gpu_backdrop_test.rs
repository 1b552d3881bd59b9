#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use alpine_backdrop::{
        config::BackdropConfig,
        render::Batches,
        resources::texture::{ImageSet, TextureKey},
        scenes::{Phase, SceneController, alpine::AlpineBackdrop, globe::GlobeBackdrop},
    };

    use crate::common::test_utils::{headless_gpu, seeded_rng};

    #[tokio::test]
    async fn should_build_terrain_backdrop_from_fallbacks() {
        let gpu = headless_gpu().await;
        let config = BackdropConfig::default();
        let mut rng = seeded_rng(1);
        let images = ImageSet::fallback(TextureKey::TERRAIN, 16, &mut rng);

        let mut scene = SceneController::<AlpineBackdrop>::new("alpine", &config);
        scene
            .finish_loading(&gpu, &images, &config, &mut rng)
            .expect("terrain backdrop builds");
        assert_eq!(scene.phase(), Phase::Ready);
        assert_eq!(scene.time_driven().len(), 3);

        scene.update();
        scene.write_to_buffers(&gpu.queue);
        let batches = Batches::from_render(scene.on_render());
        assert_eq!(batches.terrain.len(), 1);
        assert!(batches.len() >= 4);
    }

    #[tokio::test]
    async fn should_build_globe_backdrop_from_fallbacks() {
        let gpu = headless_gpu().await;
        let config = BackdropConfig::default();
        let mut rng = seeded_rng(2);
        let images = ImageSet::fallback(TextureKey::GLOBE, 16, &mut rng);

        let mut scene = SceneController::<GlobeBackdrop>::new("globe", &config);
        scene
            .finish_loading(&gpu, &images, &config, &mut rng)
            .expect("globe backdrop builds");
        assert_eq!(scene.time_driven().len(), 1);

        scene.update();
        scene.write_to_buffers(&gpu.queue);
        let batches = Batches::from_render(scene.on_render());
        assert_eq!(batches.lit.len(), 1);
        assert_eq!(batches.wireframe.len(), 1);
        assert_eq!(batches.glow.len(), 1);
        assert_eq!(batches.sprites.len(), 1);
    }
}
