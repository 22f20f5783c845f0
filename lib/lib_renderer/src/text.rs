use lib_arena::FrameArena;
use lib_math::{Vec2, vec2};

use crate::{DEFAULT_UVS, Font, UvCorners};

/// One laid-out glyph: a quad center and size in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub position: Vec2,
    pub size: Vec2,
    pub uvs: UvCorners,
}

impl Default for GlyphQuad {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            uvs: DEFAULT_UVS,
        }
    }
}

/// Lays `text` out horizontally centered on `anchor`, with `anchor.y` as the baseline.
///
/// `font_size` is the world height of the tallest glyph in the string. The result lives
/// in `arena` until it is reset. Strings with no visible height produce no glyphs.
pub fn layout_text<'a>(
    font: &Font,
    arena: &'a FrameArena,
    text: &str,
    anchor: Vec2,
    font_size: f32,
) -> &'a [GlyphQuad] {
    let count = text.chars().count();
    if count == 0 {
        return &[];
    }

    let glyphs = arena.alloc_slice(count, GlyphQuad::default());

    // Pixel space, y up from the baseline: position is the glyph's bottom-left corner.
    let mut pen_x = 0.0;
    let mut max_height: f32 = 0.0;

    for (i, character) in text.chars().enumerate() {
        let baked = font.glyph(character);
        let width = baked.width();
        let height = baked.height();

        glyphs[i] = GlyphQuad {
            position: vec2(pen_x + baked.xoff, -(baked.yoff + height)),
            size: vec2(width, height),
            uvs: font.uvs(baked),
        };

        // The last glyph ends at its right edge, not at its advance.
        pen_x += if i + 1 < count {
            baked.xadvance
        } else {
            baked.xoff + width
        };
        max_height = max_height.max(height);
    }

    if max_height <= 0.0 || pen_x <= 0.0 {
        return &[];
    }

    let scale = font_size / max_height;
    let offset = vec2(-pen_x * scale * 0.5, 0.0);

    for glyph in glyphs.iter_mut() {
        let size = glyph.size * scale;

        glyph.position = anchor + offset + glyph.position * scale + size * 0.5;
        glyph.size = size;
    }

    tracing::trace!(text, glyphs = count, width = pen_x * scale, "text laid out");

    glyphs
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::BakedGlyph;

    /// 'A': advance 8, 7x10. 'B': advance 6, 6x10. Both sit on the baseline.
    fn two_glyph_font() -> Font {
        let a = BakedGlyph {
            x0: 0,
            y0: 0,
            x1: 7,
            y1: 10,
            xoff: 0.0,
            yoff: -10.0,
            xadvance: 8.0,
            yadvance: 0.0,
        };
        let b = BakedGlyph {
            x0: 8,
            y0: 0,
            x1: 14,
            y1: 10,
            xadvance: 6.0,
            ..a
        };

        Font::from_parts(16, 16, vec![0; 16 * 16], 'A', vec![a, b])
    }

    #[test]
    fn last_glyph_counts_its_width() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);

        let glyphs = layout_text(&font, &arena, "AB", Vec2::ZERO, 10.0);

        assert_eq!(glyphs.len(), 2);
        assert_abs_diff_eq!(glyphs[0].position.x, -3.5, epsilon = 1e-5);
        assert_abs_diff_eq!(glyphs[1].position.x, 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(glyphs[0].position.y, 5.0, epsilon = 1e-5);
        assert_eq!(glyphs[0].size, vec2(7.0, 10.0));
        assert_eq!(glyphs[1].size, vec2(6.0, 10.0));
    }

    #[test]
    fn left_bearing_shifts_each_glyph() {
        let base = two_glyph_font();
        let font = Font::from_parts(
            base.width(),
            base.height(),
            base.bitmap().to_vec(),
            'A',
            vec![
                BakedGlyph {
                    xoff: 1.0,
                    ..*base.glyph('A')
                },
                BakedGlyph {
                    xoff: 2.0,
                    ..*base.glyph('B')
                },
            ],
        );
        let arena = FrameArena::new(4096);

        let glyphs = layout_text(&font, &arena, "AB", Vec2::ZERO, 10.0);

        // Pen box: A at 1..8, B at 10..16, total 16.
        assert_abs_diff_eq!(glyphs[0].position.x, -3.5, epsilon = 1e-5);
        assert_abs_diff_eq!(glyphs[1].position.x, 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(glyphs[1].position.x + glyphs[1].size.x * 0.5, 8.0, epsilon = 1e-5);
    }

    #[test]
    fn text_is_centered_on_the_anchor() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);
        let anchor = vec2(3.0, -2.0);

        let glyphs = layout_text(&font, &arena, "ABAB", anchor, 5.0);

        let first = glyphs[0];
        let last = glyphs[glyphs.len() - 1];
        let left = first.position.x - first.size.x * 0.5;
        let right = last.position.x + last.size.x * 0.5;

        // (8 + 6 + 8 + 6) * 0.5
        let total = 14.0;

        assert_abs_diff_eq!(left, anchor.x - total / 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(right, anchor.x + total / 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(left + right, 2.0 * anchor.x, epsilon = 1e-5);
    }

    #[test]
    fn font_size_is_the_tallest_glyph_height() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);

        let glyphs = layout_text(&font, &arena, "A", vec2(0.0, 1.0), 2.0);

        assert_abs_diff_eq!(glyphs[0].size.y, 2.0, epsilon = 1e-5);
        // Bottom edge on the baseline.
        assert_abs_diff_eq!(glyphs[0].position.y - glyphs[0].size.y * 0.5, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn uvs_come_from_the_baked_rect() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);

        let glyphs = layout_text(&font, &arena, "B", Vec2::ZERO, 1.0);

        assert_eq!(glyphs[0].uvs, font.uvs(font.glyph('B')));
    }

    #[test]
    fn empty_text_produces_nothing() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);

        assert!(layout_text(&font, &arena, "", Vec2::ZERO, 10.0).is_empty());
        assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    fn invisible_text_produces_nothing() {
        let blank = BakedGlyph {
            xadvance: 4.0,
            ..BakedGlyph::default()
        };
        let font = Font::from_parts(4, 4, vec![0; 16], ' ', vec![blank]);
        let arena = FrameArena::new(4096);

        assert!(layout_text(&font, &arena, "   ", Vec2::ZERO, 10.0).is_empty());
    }

    #[test]
    fn unknown_characters_use_a_fallback_glyph() {
        let font = two_glyph_font();
        let arena = FrameArena::new(4096);

        let glyphs = layout_text(&font, &arena, "A\u{2603}", Vec2::ZERO, 10.0);

        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[1].uvs, font.uvs(font.glyph('A')));
    }
}
