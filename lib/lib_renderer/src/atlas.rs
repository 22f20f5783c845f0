use std::path::{Path, PathBuf};

use image::{ColorType, Rgba, RgbaImage};
use lib_math::vec2;

use crate::{AtlasError, RenderError, UvCorners};

/// Fill for atlas pixels no texture was copied into.
pub const MISSING_TEXTURE_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// A pixel rectangle inside the atlas, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    pub fn uvs(&self, atlas_width: u32, atlas_height: u32) -> UvCorners {
        let w = atlas_width as f32;
        let h = atlas_height as f32;

        let left = self.x as f32 / w;
        let right = (self.x + self.width) as f32 / w;
        let top = self.y as f32 / h;
        let bottom = (self.y + self.height) as f32 / h;

        [
            vec2(left, top),
            vec2(right, top),
            vec2(right, bottom),
            vec2(left, bottom),
        ]
    }
}

#[derive(Debug, Clone, Copy)]
struct SkylineSegment {
    x: u32,
    y: u32,
    width: u32,
}

/// Skyline bin packing.
///
/// Rectangles are placed in the order given, each at the lowest point of the skyline
/// where it fits (leftmost on ties). If any rectangle cannot be placed the whole pack fails.
pub fn pack_rects(
    atlas_width: u32,
    atlas_height: u32,
    sizes: &[(u32, u32)],
) -> Result<Vec<AtlasRect>, AtlasError> {
    let mut skyline = vec![SkylineSegment {
        x: 0,
        y: 0,
        width: atlas_width,
    }];

    let mut placements = Vec::with_capacity(sizes.len());

    for (index, &(width, height)) in sizes.iter().enumerate() {
        if width == 0 || height == 0 {
            placements.push(AtlasRect {
                x: 0,
                y: 0,
                width,
                height,
            });
            continue;
        }

        let mut best: Option<(usize, u32)> = None;

        for segment_index in 0..skyline.len() {
            let fit = skyline_fit(
                &skyline,
                segment_index,
                width,
                height,
                atlas_width,
                atlas_height,
            );

            let Some(y) = fit else {
                continue;
            };

            if best.is_none_or(|(_, best_y)| y < best_y) {
                best = Some((segment_index, y));
            }
        }

        let Some((segment_index, y)) = best else {
            return Err(AtlasError::DoesNotFit {
                index,
                width,
                height,
                atlas_width,
                atlas_height,
            });
        };

        let rect = AtlasRect {
            x: skyline[segment_index].x,
            y,
            width,
            height,
        };

        raise_skyline(&mut skyline, segment_index, &rect);
        placements.push(rect);
    }

    Ok(placements)
}

/// The y a rect would rest at if its left edge sat on `skyline[index]`.
fn skyline_fit(
    skyline: &[SkylineSegment],
    index: usize,
    width: u32,
    height: u32,
    atlas_width: u32,
    atlas_height: u32,
) -> Option<u32> {
    let x = skyline[index].x;
    let right = x.checked_add(width)?;

    if right > atlas_width {
        return None;
    }

    let y = skyline[index..]
        .iter()
        .take_while(|segment| segment.x < right)
        .map(|segment| segment.y)
        .max()
        .unwrap_or(0);

    let bottom = y.checked_add(height)?;

    (bottom <= atlas_height).then_some(y)
}

fn raise_skyline(skyline: &mut Vec<SkylineSegment>, index: usize, rect: &AtlasRect) {
    skyline.insert(
        index,
        SkylineSegment {
            x: rect.x,
            y: rect.y + rect.height,
            width: rect.width,
        },
    );

    let right = rect.x + rect.width;

    while index + 1 < skyline.len() {
        let next = &mut skyline[index + 1];

        if next.x >= right {
            break;
        }

        let overlap = right - next.x;

        if next.width <= overlap {
            skyline.remove(index + 1);
        } else {
            next.x += overlap;
            next.width -= overlap;
            break;
        }
    }

    let mut i = 0;
    while i + 1 < skyline.len() {
        if skyline[i].y == skyline[i + 1].y {
            skyline[i].width += skyline[i + 1].width;
            skyline.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

/// Index of a texture inside a [`TextureAtlas`], in the order it was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

/// Collects source images for one atlas pack at startup.
#[derive(Debug, Default)]
pub struct AtlasBuilder {
    sources: Vec<RgbaImage>,
}

impl AtlasBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, image: RgbaImage) -> TextureHandle {
        self.sources.push(image);

        TextureHandle(self.sources.len() as u32 - 1)
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle, RenderError> {
        let path = path.as_ref();

        let image = image::open(path)
            .map_err(|source| RenderError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        tracing::debug!(?path, width = image.width(), height = image.height(), "texture loaded");

        Ok(self.add_image(image))
    }

    pub fn build(self, width: u32, height: u32) -> Result<TextureAtlas, AtlasError> {
        let sizes = self
            .sources
            .iter()
            .map(|image| image.dimensions())
            .collect::<Vec<_>>();

        let rects = pack_rects(width, height, &sizes)?;

        let mut image = RgbaImage::from_pixel(width, height, MISSING_TEXTURE_COLOR);

        for (source, rect) in self.sources.iter().zip(&rects) {
            copy_rows(&mut image, source, rect);
        }

        let uvs = rects.iter().map(|rect| rect.uvs(width, height)).collect();

        tracing::info!(width, height, textures = rects.len(), "texture atlas packed");

        Ok(TextureAtlas { image, rects, uvs })
    }
}

/// Copies `source` row by row, stepping the destination by the atlas stride.
fn copy_rows(atlas: &mut RgbaImage, source: &RgbaImage, rect: &AtlasRect) {
    let atlas_stride = atlas.width() as usize * 4;
    let row_bytes = rect.width as usize * 4;
    let pixels: &mut [u8] = atlas;

    for row in 0..rect.height as usize {
        let src = &source.as_raw()[row * row_bytes..][..row_bytes];
        let dst_start = (rect.y as usize + row) * atlas_stride + rect.x as usize * 4;

        pixels[dst_start..dst_start + row_bytes].copy_from_slice(src);
    }
}

/// Every startup texture packed into one RGBA image.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    image: RgbaImage,
    rects: Vec<AtlasRect>,
    uvs: Vec<UvCorners>,
}

impl TextureAtlas {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn rect(&self, texture: TextureHandle) -> AtlasRect {
        self.rects[texture.0 as usize]
    }

    pub fn uvs(&self, texture: TextureHandle) -> &UvCorners {
        &self.uvs[texture.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Writes `atlas.png` into `dir` for inspection.
    pub fn dump_png(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        crate::dump::save(
            dir.as_ref().join("atlas.png"),
            &self.image,
            self.image.width(),
            self.image.height(),
            ColorType::Rgba8,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn assert_disjoint(rects: &[AtlasRect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    fn assert_inside(rects: &[AtlasRect], width: u32, height: u32) {
        for rect in rects {
            assert!(rect.x + rect.width <= width && rect.y + rect.height <= height, "{rect:?}");
        }
    }

    #[test]
    fn two_textures_fit_without_overlap() {
        let rects = pack_rects(64, 64, &[(32, 32), (16, 16)]).unwrap();

        assert_eq!(rects[0], AtlasRect { x: 0, y: 0, width: 32, height: 32 });
        assert_eq!(rects[1], AtlasRect { x: 32, y: 0, width: 16, height: 16 });
        assert_disjoint(&rects);

        let used: u32 = rects.iter().map(|rect| rect.width * rect.height).sum();
        assert!(used <= 64 * 64);
    }

    #[test]
    fn mixed_sizes_never_overlap() {
        let sizes = [
            (10, 30),
            (20, 5),
            (7, 7),
            (30, 12),
            (3, 40),
            (16, 16),
            (25, 4),
            (9, 21),
            (12, 12),
            (5, 5),
        ];

        let rects = pack_rects(64, 64, &sizes).unwrap();

        assert_eq!(rects.len(), sizes.len());
        for (rect, &(width, height)) in rects.iter().zip(&sizes) {
            assert_eq!((rect.width, rect.height), (width, height));
        }
        assert_disjoint(&rects);
        assert_inside(&rects, 64, 64);
    }

    #[test]
    fn full_row_fills_exactly() {
        let rects = pack_rects(32, 32, &[(16, 16); 4]).unwrap();

        assert_disjoint(&rects);
        assert_inside(&rects, 32, 32);
    }

    #[test]
    fn packing_is_deterministic() {
        let sizes = [(13, 7), (4, 19), (22, 3), (8, 8), (17, 11)];

        assert_eq!(
            pack_rects(48, 48, &sizes).unwrap(),
            pack_rects(48, 48, &sizes).unwrap()
        );
    }

    #[test]
    fn oversized_rect_fails_the_whole_pack() {
        let err = pack_rects(64, 64, &[(16, 16), (65, 1)]).unwrap_err();

        assert!(matches!(err, AtlasError::DoesNotFit { index: 1, .. }));
    }

    #[test]
    fn running_out_of_height_fails() {
        assert!(pack_rects(32, 32, &[(32, 20), (32, 20)]).is_err());
    }

    #[test]
    fn extreme_sizes_skip_positions_instead_of_overflowing() {
        let wide = pack_rects(u32::MAX, 4, &[(u32::MAX - 1, 1), (5, 1)]).unwrap();
        assert_eq!(
            wide[1],
            AtlasRect {
                x: 0,
                y: 1,
                width: 5,
                height: 1
            }
        );

        let tall = pack_rects(4, u32::MAX, &[(2, u32::MAX - 1), (2, 5)]).unwrap();
        assert_eq!(
            tall[1],
            AtlasRect {
                x: 2,
                y: 0,
                width: 2,
                height: 5
            }
        );

        assert!(pack_rects(u32::MAX, u32::MAX, &[(u32::MAX, u32::MAX), (1, 1)]).is_err());
    }

    #[test]
    fn uvs_map_back_to_pixels() {
        let rect = AtlasRect { x: 12, y: 40, width: 20, height: 8 };
        let [tl, tr, br, bl] = rect.uvs(64, 128);

        assert_relative_eq!(tl.x * 64.0, 12.0);
        assert_relative_eq!(tl.y * 128.0, 40.0);
        assert_relative_eq!((tr.x - tl.x) * 64.0, 20.0);
        assert_relative_eq!((bl.y - tl.y) * 128.0, 8.0);
        assert_eq!(br, vec2(tr.x, bl.y));
    }

    #[test]
    fn build_copies_rows_with_atlas_stride() {
        let mut builder = AtlasBuilder::new();
        let red = builder.add_image(RgbaImage::from_pixel(2, 3, Rgba([255, 0, 0, 255])));
        let blue = builder.add_image(RgbaImage::from_pixel(3, 1, Rgba([0, 0, 255, 255])));

        let atlas = builder.build(8, 8).unwrap();

        let red_rect = atlas.rect(red);
        let blue_rect = atlas.rect(blue);

        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(
                    *atlas.image().get_pixel(red_rect.x + x, red_rect.y + y),
                    Rgba([255, 0, 0, 255])
                );
            }
        }
        for x in 0..3 {
            assert_eq!(
                *atlas.image().get_pixel(blue_rect.x + x, blue_rect.y),
                Rgba([0, 0, 255, 255])
            );
        }

        assert_eq!(*atlas.image().get_pixel(7, 7), MISSING_TEXTURE_COLOR);
        assert_eq!(atlas.uvs(red)[0], vec2(red_rect.x as f32 / 8.0, red_rect.y as f32 / 8.0));
    }
}
