use std::path::PathBuf;

use image::ColorType;

use crate::RenderError;

/// Where debug images are written when a caller asks for them.
pub const DEBUG_DUMP_DIR: &str = "build";

pub(crate) fn save(
    path: PathBuf,
    bytes: &[u8],
    width: u32,
    height: u32,
    color: ColorType,
) -> Result<PathBuf, RenderError> {
    let dump_err = |source| RenderError::Dump {
        path: path.clone(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|err| dump_err(image::ImageError::IoError(err)))?;
    }

    image::save_buffer(&path, bytes, width, height, color).map_err(dump_err)?;

    tracing::debug!(?path, "debug image written");

    Ok(path)
}
