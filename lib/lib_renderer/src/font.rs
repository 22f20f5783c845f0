use std::path::{Path, PathBuf};

use fontdue::FontSettings;
use image::ColorType;
use lib_math::vec2;

use crate::{FontError, RenderError, UvCorners};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontConfig {
    pub bitmap_width: u32,
    pub bitmap_height: u32,
    /// Rasterization size in pixels.
    pub pixel_height: f32,
    pub first_char: char,
    pub char_count: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            bitmap_width: 256,
            bitmap_height: 256,
            pixel_height: 24.0,
            first_char: ' ',
            char_count: 96,
        }
    }
}

/// One character's region in the font bitmap and its placement metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BakedGlyph {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
    /// Offset from the pen position to the glyph's top-left corner, y down.
    pub xoff: f32,
    pub yoff: f32,
    pub xadvance: f32,
    pub yadvance: f32,
}

impl BakedGlyph {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0) as f32
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0) as f32
    }
}

/// A font rasterized once into a single coverage bitmap.
#[derive(Debug, Clone)]
pub struct Font {
    width: u32,
    height: u32,
    bitmap: Vec<u8>,
    first_char: u32,
    glyphs: Vec<BakedGlyph>,
}

const FALLBACK_CHAR: char = '?';

impl Font {
    pub fn load(path: impl AsRef<Path>, config: &FontConfig) -> Result<Self, FontError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::bake(&bytes, config)
    }

    /// Rasterizes `config.char_count` characters starting at `config.first_char`.
    ///
    /// Glyphs are laid out left to right in shelves with one pixel of padding. A glyph
    /// that would cross the bottom of the bitmap fails the bake.
    pub fn bake(bytes: &[u8], config: &FontConfig) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(bytes, FontSettings::default())
            .map_err(FontError::Parse)?;

        let width = config.bitmap_width;
        let height = config.bitmap_height;
        let mut bitmap = vec![0; width as usize * height as usize];
        let mut glyphs = Vec::with_capacity(config.char_count as usize);

        let mut shelves = ShelfCursor::new(width, height);

        let first = config.first_char as u32;

        for code in first..first + config.char_count {
            let character = char::from_u32(code).unwrap_or(FALLBACK_CHAR);
            let (metrics, coverage) = font.rasterize(character, config.pixel_height);

            let glyph_width = metrics.width as u32;
            let glyph_height = metrics.height as u32;

            let Some((x, y)) = shelves.place(glyph_width, glyph_height) else {
                return Err(FontError::BitmapTooSmall {
                    character,
                    width,
                    height,
                });
            };

            for row in 0..glyph_height as usize {
                let src = &coverage[row * glyph_width as usize..][..glyph_width as usize];
                let dst = (y as usize + row) * width as usize + x as usize;

                bitmap[dst..dst + glyph_width as usize].copy_from_slice(src);
            }

            glyphs.push(BakedGlyph {
                x0: x as u16,
                y0: y as u16,
                x1: (x + glyph_width) as u16,
                y1: (y + glyph_height) as u16,
                xoff: metrics.xmin as f32,
                yoff: -(metrics.ymin as f32 + metrics.height as f32),
                xadvance: metrics.advance_width,
                yadvance: metrics.advance_height,
            });
        }

        tracing::info!(
            glyphs = glyphs.len(),
            width,
            height,
            pixel_height = config.pixel_height,
            "font baked"
        );

        Ok(Self {
            width,
            height,
            bitmap,
            first_char: first,
            glyphs,
        })
    }

    /// Builds a font from an existing bitmap and metrics table.
    pub fn from_parts(
        width: u32,
        height: u32,
        bitmap: Vec<u8>,
        first_char: char,
        glyphs: Vec<BakedGlyph>,
    ) -> Self {
        assert_eq!(
            bitmap.len(),
            width as usize * height as usize,
            "font bitmap size does not match {width}x{height}"
        );
        assert!(!glyphs.is_empty(), "font needs at least one glyph");

        Self {
            width,
            height,
            bitmap,
            first_char: first_char as u32,
            glyphs,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// One byte of coverage per pixel, rows top to bottom.
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    fn index(&self, character: char) -> Option<usize> {
        (character as u32)
            .checked_sub(self.first_char)
            .map(|index| index as usize)
            .filter(|&index| index < self.glyphs.len())
    }

    /// The glyph for `character`, or `?` (then the first glyph) when it was not baked.
    pub fn glyph(&self, character: char) -> &BakedGlyph {
        let index = self
            .index(character)
            .or_else(|| self.index(FALLBACK_CHAR))
            .unwrap_or(0);

        &self.glyphs[index]
    }

    pub fn uvs(&self, glyph: &BakedGlyph) -> UvCorners {
        let w = self.width as f32;
        let h = self.height as f32;

        let left = glyph.x0 as f32 / w;
        let right = glyph.x1 as f32 / w;
        let top = glyph.y0 as f32 / h;
        let bottom = glyph.y1 as f32 / h;

        [
            vec2(left, top),
            vec2(right, top),
            vec2(right, bottom),
            vec2(left, bottom),
        ]
    }

    /// Writes `font.png` into `dir` for inspection.
    pub fn dump_png(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        crate::dump::save(
            dir.as_ref().join("font.png"),
            &self.bitmap,
            self.width,
            self.height,
            ColorType::L8,
        )
    }
}

/// Row-shelf placement with one pixel of padding after and below each glyph.
struct ShelfCursor {
    x: u32,
    y: u32,
    shelf_bottom: u32,
    width: u32,
    height: u32,
}

impl ShelfCursor {
    fn new(width: u32, height: u32) -> Self {
        Self {
            x: 1,
            y: 1,
            shelf_bottom: 1,
            width,
            height,
        }
    }

    /// Top-left corner for the next glyph, starting a new shelf when the row is full.
    fn place(&mut self, glyph_width: u32, glyph_height: u32) -> Option<(u32, u32)> {
        if self.x + glyph_width + 1 > self.width {
            self.x = 1;
            self.y = self.shelf_bottom;
        }

        if self.x + glyph_width + 1 > self.width || self.y + glyph_height + 1 > self.height {
            return None;
        }

        let corner = (self.x, self.y);

        self.x += glyph_width + 1;
        self.shelf_bottom = self.shelf_bottom.max(self.y + glyph_height + 1);

        Some(corner)
    }
}
