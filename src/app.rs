use std::time::Duration;

use anyhow::Context;
use lib_app::{AppContext, AppEvent, AppFlow, AppHandler};
use lib_arena::FrameArena;
use lib_gpu::TextureView;
use lib_input::InputTable;
use lib_math::{Camera, vec2, vec3};
use lib_renderer::{
    AtlasBuilder, BLACK, DEBUG_DUMP_DIR, Font, FontConfig, FrameAssets, QuadBatch, Renderer,
    RendererConfig, with_alpha,
};
use lib_window::{WindowAttributes, dpi::LogicalSize};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    assets::{FONT_PATH, Textures},
    input::ControlBindings,
    world::{VIEW_HALF_HEIGHT, World},
};

/// Frames longer than this are simulated as if they took this long.
const MAX_FRAME_TIME: f32 = 1.0 / 20.0;
const FRAME_ARENA_BYTES: usize = 64 * 1024;
const HUD_FONT_SIZE: f32 = 8.0;

#[derive(Debug)]
pub struct Game {
    renderer: Renderer,
    batch: QuadBatch,
    arena: FrameArena,
    textures: Textures,
    camera: Camera,
    input: InputTable,
    bindings: ControlBindings,
    world: World,
}

impl AppHandler for Game {
    const TITLE: &str = "Drill Arcade";

    fn window_attributes() -> WindowAttributes {
        WindowAttributes::default()
            .with_title(Self::TITLE)
            .with_inner_size(LogicalSize::new(960.0, 720.0))
    }

    fn new(ctx: AppContext<'_>) -> anyhow::Result<Self> {
        let config = RendererConfig::default();

        let mut builder = AtlasBuilder::new();
        let textures = Textures::load(&mut builder).context("failed to load textures")?;
        let atlas = builder
            .build(config.atlas_width, config.atlas_height)
            .context("failed to pack the texture atlas")?;

        let font =
            Font::load(FONT_PATH, &FontConfig::default()).context("failed to bake the font")?;

        if cfg!(debug_assertions) {
            let dumps = [atlas.dump_png(DEBUG_DUMP_DIR), font.dump_png(DEBUG_DUMP_DIR)];

            for err in dumps.into_iter().filter_map(Result::err) {
                tracing::warn!(error = %err, "debug dump skipped");
            }
        }

        Ok(Self {
            renderer: Renderer::new(ctx.into(), &config, atlas, font),
            batch: QuadBatch::new(config.max_quads),
            arena: FrameArena::new(FRAME_ARENA_BYTES),
            textures,
            camera: Camera {
                position: vec3(0.0, 0.0, 1.0),
                orthographic_size: VIEW_HALF_HEIGHT,
                ..Camera::default()
            },
            input: InputTable::new(),
            bindings: ControlBindings::default(),
            world: World::new(StdRng::from_entropy()),
        })
    }

    fn update(&mut self, delta_time: Duration, ctx: AppContext<'_>) -> AppFlow {
        let size = ctx.window.inner_size();
        let window_size = vec2(size.width as f32, size.height as f32);

        let controls = self.bindings.read(&self.input, &self.camera, window_size);
        self.input.next_frame();

        if controls.exit {
            return AppFlow::Exit;
        }

        if self.world.is_over() {
            if !controls.fire {
                return AppFlow::Continue;
            }

            self.world.restart();
        }

        let delta_time = delta_time.as_secs_f32().min(MAX_FRAME_TIME);
        let half_extents = vec2(VIEW_HALF_HEIGHT * ctx.aspect_ratio(), VIEW_HALF_HEIGHT);

        self.world.update(delta_time, &controls, half_extents);

        AppFlow::Continue
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::Device { device: _, event } => self.input.event(event),
            AppEvent::CloseRequested => return AppFlow::Exit,
            _ => {}
        }

        AppFlow::Continue
    }

    fn draw(&mut self, output: &TextureView, ctx: AppContext<'_>) {
        let aspect_ratio = ctx.aspect_ratio();
        let half_extents = vec2(VIEW_HALF_HEIGHT * aspect_ratio, VIEW_HALF_HEIGHT);

        let assets = FrameAssets {
            atlas: self.renderer.atlas(),
            font: self.renderer.font(),
            arena: &self.arena,
        };

        let mut frame = self.batch.begin_frame(&self.camera, aspect_ratio, assets);

        self.world.draw(&mut frame, &self.textures);
        self.world.draw_health(&mut frame, half_extents);

        frame.draw_text(
            &score_text(self.world.score()),
            vec2(0.0, half_extents.y - 12.0),
            HUD_FONT_SIZE,
            BLACK,
        );

        let help = if self.world.is_over() {
            "GAME OVER - FIRE TO RESTART"
        } else {
            "MOVE WASD  AIM MOUSE  FIRE SPACE  QUIT ESC"
        };
        frame.draw_text(
            help,
            vec2(0.0, -half_extents.y + 6.0),
            HUD_FONT_SIZE * 0.75,
            with_alpha(BLACK, 0.6),
        );

        frame.finish();

        self.renderer.submit(&mut self.batch, output, ctx.into());
        self.arena.reset();
    }
}

fn score_text(score: u32) -> String {
    format!("SCORE {score}")
}
