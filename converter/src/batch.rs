use std::path::{Path, PathBuf};

use anyhow::Context;
use tmg_core::EncodeOptions;

use crate::convert::{convert_file, default_name, report, CellFit, ConvertResult};

/// Source extensions picked up by batch mode, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Supported image files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every supported image in `input_dir` into `output_dir/<stem>.tmg`.
/// A failing image is recorded and the run continues.
pub fn convert_dir(
    input_dir: &Path,
    output_dir: &Path,
    template: &EncodeOptions,
    mut fit: Option<&mut CellFit>,
) -> anyhow::Result<Vec<ConvertResult>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let files = list_images(input_dir)?;
    log::info!("found {} images in {}", files.len(), input_dir.display());

    let mut results = Vec::with_capacity(files.len());
    for input in files {
        let name = default_name(&input);
        let output = output_dir.join(format!("{name}.tmg"));
        let opts = EncodeOptions {
            name,
            ..template.clone()
        };
        let outcome = convert_file(&input, &output, &opts, fit.as_deref_mut());
        let result = ConvertResult { input, output, outcome };
        report(&result);
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmg_core::TmgReader;

    #[test]
    fn extension_filter() {
        assert!(is_supported(Path::new("a.png")));
        assert!(is_supported(Path::new("a.JPEG")));
        assert!(is_supported(Path::new("dir/a.Gif")));
        assert!(!is_supported(Path::new("a.tmg")));
        assert!(!is_supported(Path::new("png")));
        assert!(!is_supported(Path::new("a.webp")));
    }

    #[test]
    fn batch_continues_past_failures() {
        let root = std::env::temp_dir().join(format!("tmg-batch-{}", std::process::id()));
        let input_dir = root.join("in");
        let output_dir = root.join("out");
        std::fs::create_dir_all(&input_dir).unwrap();

        image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 255]))
            .save(input_dir.join("b.png"))
            .unwrap();
        std::fs::write(input_dir.join("a.bmp"), b"garbage").unwrap();
        std::fs::write(input_dir.join("notes.txt"), b"skip me").unwrap();

        let results = convert_dir(&input_dir, &output_dir, &EncodeOptions::new(""), None).unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results[0].is_ok());
        assert!(results[1].is_ok());

        let reader = TmgReader::new(std::fs::File::open(output_dir.join("b.tmg")).unwrap()).unwrap();
        assert_eq!(reader.header.name, "b");
        assert_eq!(reader.read_indices().unwrap(), vec![4; 16]);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_input_dir_is_an_error() {
        let out = std::env::temp_dir().join(format!("tmg-batch-none-{}", std::process::id()));
        assert!(convert_dir(Path::new("/nonexistent/tmg"), &out, &EncodeOptions::new(""), None).is_err());
        let _ = std::fs::remove_dir_all(&out);
    }
}
