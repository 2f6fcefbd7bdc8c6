//! Glue between the compositor and the engine's frame loop.

use rand::rngs::StdRng;

use tinsel_engine::core::{App, AppControl, FrameCtx};
use tinsel_engine::paint::Color;
use tinsel_engine::render::shapes::circle::CircleRenderer;
use tinsel_engine::render::shapes::text::TextRenderer;
use tinsel_engine::text::{FontId, FontSystem};

use crate::compositor::{Compositor, FrameLayers};
use crate::config::SceneConfig;
use crate::geometry::SceneGeometry;

/// System fonts tried in order; an italic serif suits the greeting best.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Italic.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif-Italic.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif-Italic.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Italic.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Italic.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

/// Loads the first readable and parseable font from `candidates`.
///
/// Returns `None` (after a warning) when nothing loads; the scene then
/// renders without text.
pub fn load_first_font(fonts: &mut FontSystem, candidates: &[&str]) -> Option<FontId> {
    for path in candidates {
        let Ok(bytes) = std::fs::read(path) else { continue };
        match fonts.load_font(&bytes) {
            Ok(id) => {
                log::info!("using font {path}");
                return Some(id);
            }
            Err(e) => log::warn!("skipping {path}: {e}"),
        }
    }
    log::warn!("no usable font found, greeting text disabled");
    None
}

/// The tree scene as an engine app.
pub struct TreeApp {
    compositor: Compositor,
    layers: FrameLayers,
    fonts: FontSystem,
    font: Option<FontId>,
    rng: StdRng,

    // Scene and overlay upload separate instance buffers within one frame,
    // so each list needs its own renderer.
    scene_circles: CircleRenderer,
    overlay_circles: CircleRenderer,
    text: TextRenderer,

    first_frame_logged: bool,
}

impl TreeApp {
    pub fn new(config: &SceneConfig, geometry: SceneGeometry, mut rng: StdRng) -> Self {
        let mut fonts = FontSystem::new();
        let font = load_first_font(&mut fonts, FONT_CANDIDATES);
        let compositor = Compositor::new(geometry, config, &mut rng);

        Self {
            compositor,
            layers: FrameLayers::new(),
            fonts,
            font,
            rng,
            scene_circles: CircleRenderer::new(),
            overlay_circles: CircleRenderer::new(),
            text: TextRenderer::new(),
            first_frame_logged: false,
        }
    }
}

impl App for TreeApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.compositor.frame(
            ctx.time.dt,
            &mut self.rng,
            &mut self.layers,
            &self.fonts,
            self.font,
        );

        if !self.first_frame_logged {
            self.first_frame_logged = true;
            log::debug!(
                "first frame: {} of {} points visible, {} overlay circles",
                self.layers.scene.len(),
                self.compositor.geometry().len(),
                self.layers.overlay.len(),
            );
        }

        let scene = &mut self.layers.scene;
        let overlay = &mut self.layers.overlay;
        let fonts = &self.fonts;
        let r_scene = &mut self.scene_circles;
        let r_overlay = &mut self.overlay_circles;
        let r_text = &mut self.text;

        ctx.render(Color::black(), |rctx, target| {
            r_scene.render(rctx, target, scene);
            r_text.render(rctx, target, scene, fonts);
            r_overlay.render(rctx, target, overlay);
        })
    }
}
