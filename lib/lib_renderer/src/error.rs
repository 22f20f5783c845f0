use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error(
        "texture {index} ({width}x{height}) does not fit in the {atlas_width}x{atlas_height} atlas"
    )]
    DoesNotFit {
        index: usize,
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse font: {0}")]
    Parse(&'static str),
    #[error("glyph {character:?} does not fit in the {width}x{height} font bitmap")]
    BitmapTooSmall {
        character: char,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load texture {path:?}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("failed to write debug image {path:?}")]
    Dump {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
