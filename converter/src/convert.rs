use std::path::{Path, PathBuf};

use anyhow::Context;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use tmg_core::{EncodeOptions, EncodeSummary, PixelGrid, TmgWriter};

use crate::load::{load_rgb, SourceImage};

/// Target cell grid for `--cols/--rows`. Sources are scaled to `cols` x
/// `rows * 2` pixels so each stored cell maps to one source pixel pair.
pub struct CellFit {
    width: u32,
    height: u32,
    resizer: Resizer,
}

impl CellFit {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            width: cols as u32,
            height: rows as u32 * 2,
            resizer: Resizer::new(),
        }
    }

    pub fn apply(&mut self, src: SourceImage) -> anyhow::Result<SourceImage> {
        let (width, height) = (self.width, self.height);
        if (src.width, src.height) == (width, height) {
            return Ok(src);
        }
        if width == 0 || height == 0 || src.width == 0 || src.height == 0 {
            anyhow::bail!("cannot fit {}x{} pixels into {width}x{height}", src.width, src.height);
        }

        let (src_width, src_height) = (src.width, src.height);
        let from = Image::from_vec_u8(src_width, src_height, src.data, PixelType::U8x3)
            .context("pixel buffer does not match image size")?;
        let mut to = Image::new(width, height, PixelType::U8x3);
        let lanczos = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
        self.resizer
            .resize(&from, &mut to, &lanczos)
            .with_context(|| format!("failed to scale {src_width}x{src_height} to {width}x{height}"))?;

        Ok(SourceImage {
            data: to.into_vec(),
            width,
            height,
        })
    }
}

/// Outcome of converting one source file.
pub struct ConvertResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: anyhow::Result<EncodeSummary>,
}

impl ConvertResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Image name stored in the header when none is given: the file stem.
pub fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load, optionally resize, encode and write one image. The output file is
/// written in one piece after encoding succeeds.
pub fn convert_file(
    input: &Path,
    output: &Path,
    opts: &EncodeOptions,
    fit: Option<&mut CellFit>,
) -> anyhow::Result<EncodeSummary> {
    let mut src = load_rgb(input)?;
    if let Some(fit) = fit {
        src = fit.apply(src)?;
    }
    let grid = PixelGrid::from_rgb24(src.width, src.height, &src.data)?;

    let mut writer = TmgWriter::new(Vec::new());
    let summary = writer.write_image(&grid, opts)?;
    let bytes = writer.finish()?;

    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(summary)
}

/// Log the outcome of one conversion.
pub fn report(result: &ConvertResult) {
    match &result.outcome {
        Ok(summary) => {
            let h = &summary.header;
            log::info!(
                "converted {} -> {}",
                result.input.display(),
                result.output.display()
            );
            log::info!(
                "size: {}x{} cells, depth: {}-bit, name: {:?}",
                h.width,
                h.stored_height,
                h.depth.bits(),
                h.name
            );
            log::info!(
                "compression: rle={} diff={} extended={} ({} -> {} bytes)",
                h.rle,
                h.diff,
                h.extended,
                summary.raw_len,
                summary.payload_len
            );
        }
        Err(e) => {
            log::error!("error converting {}: {e:#}", result.input.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmg_core::{ColorDepth, Scheme, Toggle, TmgReader};

    #[test]
    fn fit_scales_to_cell_grid() {
        let mut fit = CellFit::new(8, 3);
        let src = SourceImage {
            data: vec![200; 32 * 20 * 3],
            width: 32,
            height: 20,
        };
        let out = fit.apply(src).unwrap();
        assert_eq!((out.width, out.height), (8, 6));
        assert_eq!(out.data.len(), 8 * 6 * 3);
    }

    #[test]
    fn fit_keeps_matching_size() {
        let data: Vec<u8> = (1..=12).collect();
        let out = CellFit::new(2, 1)
            .apply(SourceImage { data: data.clone(), width: 2, height: 2 })
            .unwrap();
        assert_eq!(out.data, data);
    }

    #[test]
    fn fit_rejects_empty_target() {
        let src = SourceImage { data: vec![0; 12], width: 2, height: 2 };
        assert!(CellFit::new(0, 4).apply(src).is_err());
    }

    #[test]
    fn default_name_is_stem() {
        assert_eq!(default_name(Path::new("art/Logo.Big.png")), "Logo.Big");
        assert_eq!(default_name(Path::new("")), "");
    }

    #[test]
    fn converts_png_to_tmg() {
        let dir = std::env::temp_dir().join(format!("tmg-convert-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("stripes.png");
        let output = dir.join("stripes.tmg");
        image::RgbImage::from_fn(20, 9, |x, _| {
            if x < 10 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        })
        .save(&input)
        .unwrap();

        let opts = EncodeOptions {
            depth: ColorDepth::Four,
            rle: Toggle::On,
            ..EncodeOptions::new(default_name(&input))
        };
        let summary = convert_file(&input, &output, &opts, None).unwrap();
        assert_eq!(summary.scheme(), Scheme::RLE);

        let reader = TmgReader::new(std::fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(reader.header.name, "stripes");
        assert_eq!(reader.header.width, 20);
        assert_eq!(reader.header.stored_height, 5);
        let indices = reader.read_indices().unwrap();
        assert_eq!(indices[0], 0x11);
        assert_eq!(indices[10], 0xFF);
        // Last stored row pairs the ninth pixel row with black.
        assert_eq!(indices[80], 0x10);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unreadable_source_fails() {
        let dir = std::env::temp_dir().join(format!("tmg-convert-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("broken.png");
        std::fs::write(&input, b"not a png").unwrap();

        let result = convert_file(&input, &dir.join("broken.tmg"), &EncodeOptions::new("b"), None);
        assert!(result.is_err());
        assert!(!dir.join("broken.tmg").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
