use lib_arena::{FixedVec, FrameArena};
use lib_math::{Camera, Mat4, Vec2, Vec3, Vec4, model_view_projection, transform_corners, vec3};

use crate::{
    DEFAULT_UVS, DrawType, Font, Quad, TextureAtlas, TextureHandle, UvCorners, Vertex, layout_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Filling,
    Ready,
}

/// CPU-side quads for one frame, mirrored into the GPU vertex buffer on submit.
#[derive(Debug)]
pub struct QuadBatch {
    quads: FixedVec<Quad>,
    state: BatchState,
}

impl QuadBatch {
    pub fn new(max_quads: usize) -> Self {
        Self {
            quads: FixedVec::new("quad batch", max_quads),
            state: BatchState::Empty,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.quads.capacity()
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Starts filling the batch. The camera is fixed for the rest of the frame.
    pub fn begin_frame<'a>(
        &'a mut self,
        camera: &Camera,
        aspect_ratio: f32,
        assets: FrameAssets<'a>,
    ) -> QuadFrame<'a> {
        assert_eq!(
            self.state,
            BatchState::Empty,
            "quad batch must be reset before a new frame"
        );

        self.state = BatchState::Filling;

        QuadFrame {
            batch: self,
            view_projection: camera.view_projection(aspect_ratio),
            assets,
        }
    }

    /// Empties a submitted batch.
    pub fn reset(&mut self) {
        assert_eq!(
            self.state,
            BatchState::Ready,
            "only a finished quad batch can be reset"
        );

        self.quads.clear();
        self.state = BatchState::Empty;
    }
}

/// Read-only data draw calls can reference during a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameAssets<'a> {
    pub atlas: &'a TextureAtlas,
    pub font: &'a Font,
    pub arena: &'a FrameArena,
}

/// One kind of draw request, carrying only what that kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand<'a> {
    Rectangle {
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
    },
    Circle {
        position: Vec3,
        radius: f32,
        color: Vec4,
    },
    Texture {
        texture: TextureHandle,
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
    },
    Text {
        text: &'a str,
        position: Vec2,
        font_size: f32,
        color: Vec4,
    },
    Line {
        start: Vec2,
        end: Vec2,
        thickness: f32,
        color: Vec4,
    },
}

/// The batch while draw calls are being recorded. Dropping it marks the batch ready.
#[derive(Debug)]
pub struct QuadFrame<'a> {
    batch: &'a mut QuadBatch,
    view_projection: Mat4,
    assets: FrameAssets<'a>,
}

impl QuadFrame<'_> {
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Transforms a unit quad and appends it. Panics if the batch is full.
    pub fn push_quad(
        &mut self,
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
        draw_type: DrawType,
        uvs: &UvCorners,
    ) {
        let mvp = model_view_projection(&self.view_projection, position, size, rotation);
        let corners = transform_corners(&mvp);

        let mut quad = Quad::default();
        for ((vertex, corner), uv) in quad.vertices.iter_mut().zip(corners).zip(uvs) {
            *vertex = Vertex {
                position: corner.to_array(),
                color: color.to_array(),
                uv: uv.to_array(),
                draw_type: draw_type as u32,
            };
        }

        if let Err(err) = self.batch.quads.push(quad) {
            panic!("{err}: raise the renderer's max_quads");
        }
    }

    pub fn draw_quad(
        &mut self,
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
        draw_type: DrawType,
    ) {
        self.push_quad(position, size, rotation, color, draw_type, &DEFAULT_UVS);
    }

    pub fn draw_quad_with_uv(
        &mut self,
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
        draw_type: DrawType,
        uvs: &UvCorners,
    ) {
        self.push_quad(position, size, rotation, color, draw_type, uvs);
    }

    pub fn draw_rectangle(&mut self, position: Vec3, size: Vec2, rotation: f32, color: Vec4) {
        self.draw_quad(position, size, rotation, color, DrawType::Rectangle);
    }

    pub fn draw_circle(&mut self, position: Vec3, radius: f32, color: Vec4) {
        self.draw_quad(
            position,
            Vec2::splat(radius * 2.0),
            0.0,
            color,
            DrawType::Circle,
        );
    }

    pub fn draw_texture(
        &mut self,
        texture: TextureHandle,
        position: Vec3,
        size: Vec2,
        rotation: f32,
        color: Vec4,
    ) {
        let uvs = *self.assets.atlas.uvs(texture);
        self.push_quad(position, size, rotation, color, DrawType::Texture, &uvs);
    }

    /// Draws `text` centered on `position`, one quad per visible glyph.
    pub fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Vec4) {
        let FrameAssets { font, arena, .. } = self.assets;

        for glyph in layout_text(font, arena, text, position, font_size) {
            if glyph.size.x <= 0.0 || glyph.size.y <= 0.0 {
                continue;
            }

            self.push_quad(
                glyph.position.extend(0.0),
                glyph.size,
                0.0,
                color,
                DrawType::Text,
                &glyph.uvs,
            );
        }
    }

    /// A rectangle `thickness` wide joining `start` and `end`.
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, thickness: f32, color: Vec4) {
        let direction = end - start;
        let length = direction.length();

        if length <= 0.0 {
            return;
        }

        let center = start + direction * 0.5;
        let rotation = direction.to_angle().to_degrees();

        self.draw_rectangle(
            vec3(center.x, center.y, 0.0),
            Vec2::new(length, thickness),
            rotation,
            color,
        );
    }

    pub fn submit(&mut self, command: DrawCommand<'_>) {
        match command {
            DrawCommand::Rectangle {
                position,
                size,
                rotation,
                color,
            } => self.draw_rectangle(position, size, rotation, color),
            DrawCommand::Circle {
                position,
                radius,
                color,
            } => self.draw_circle(position, radius, color),
            DrawCommand::Texture {
                texture,
                position,
                size,
                rotation,
                color,
            } => self.draw_texture(texture, position, size, rotation, color),
            DrawCommand::Text {
                text,
                position,
                font_size,
                color,
            } => self.draw_text(text, position, font_size, color),
            DrawCommand::Line {
                start,
                end,
                thickness,
                color,
            } => self.draw_line(start, end, thickness, color),
        }
    }

    /// Stops recording; the batch is ready for upload.
    pub fn finish(self) {}
}

impl Drop for QuadFrame<'_> {
    fn drop(&mut self) {
        self.batch.state = BatchState::Ready;

        tracing::trace!(quads = self.batch.len(), "quad batch ready");
    }
}
