use std::path::Path;

use tmg_core::TmgError;

/// A decoded source image as packed RGB24.
pub struct SourceImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode any format the `image` crate understands and drop alpha.
pub fn load_rgb(path: &Path) -> Result<SourceImage, TmgError> {
    let img = image::open(path)
        .map_err(|e| TmgError::DecodeSourceImage(format!("{}: {e}", path.display())))?
        .into_rgb8();
    let (width, height) = img.dimensions();
    Ok(SourceImage {
        data: img.into_raw(),
        width,
        height,
    })
}
