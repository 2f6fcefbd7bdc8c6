use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::dpi::LogicalSize;

use tinsel_engine::device::GpuInit;
use tinsel_engine::logging::{init_logging, LoggingConfig};
use tinsel_engine::window::{Runtime, RuntimeConfig};

use tinsel_tree::app::TreeApp;
use tinsel_tree::config::SceneConfig;
use tinsel_tree::geometry::SceneGeometry;

const WINDOW_TITLE: &str = "Merry Christmas";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = SceneConfig::default();
    let mut rng = StdRng::from_entropy();

    let started = Instant::now();
    let geometry =
        SceneGeometry::generate(&config, &mut rng).context("failed to generate scene geometry")?;
    log::info!(
        "generated {} points (tree {}, ground {}, stars {}, heart {}) in {:.1?}",
        geometry.len(),
        config.tree.count,
        config.ground.count,
        config.stars.count,
        config.heart.count,
        started.elapsed(),
    );

    let runtime = RuntimeConfig {
        title: WINDOW_TITLE.to_string(),
        initial_size: LogicalSize::new(config.screen.width as f64, config.screen.height as f64),
        // Projection constants assume a fixed frame.
        resizable: false,
        target_fps: config.target_fps,
    };

    // Colours are authored as bytes for direct display; skip sRGB encoding.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    let app = TreeApp::new(&config, geometry, rng);
    Runtime::run(runtime, gpu_init, app)
}
