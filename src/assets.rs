use lib_renderer::{AtlasBuilder, RenderError, TextureHandle};

#[macro_export]
macro_rules! asset_path {
    ($path:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $path)
    };
}

pub const FONT_PATH: &str = asset_path!("fonts/DejaVuSansMono.ttf");

/// Handles to every sprite packed into the atlas.
#[derive(Debug, Clone, Copy)]
pub struct Textures {
    pub ship: TextureHandle,
    pub asteroid: TextureHandle,
}

impl Textures {
    pub fn load(builder: &mut AtlasBuilder) -> Result<Self, RenderError> {
        Ok(Self {
            ship: builder.load(asset_path!("textures/ship.png"))?,
            asteroid: builder.load(asset_path!("textures/asteroid.png"))?,
        })
    }
}
