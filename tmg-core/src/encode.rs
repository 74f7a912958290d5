use std::io::Write;

use crate::compress::{self, Scheme, Toggle};
use crate::error::Result;
use crate::format::*;
use crate::pack::pack;
use crate::palette::ColorDepth;

/// Settings for one conversion.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    pub depth: ColorDepth,
    pub name: String,
    pub rle: Toggle,
    pub diff: Toggle,
    pub extended: bool,
}

impl EncodeOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            depth: ColorDepth::Eight,
            name: name.into(),
            rle: Toggle::Off,
            diff: Toggle::Off,
            extended: false,
        }
    }
}

/// What was written for one image.
#[derive(Clone, Debug)]
pub struct EncodeSummary {
    pub header: TmgHeader,
    /// Index stream length before compression.
    pub raw_len: usize,
    /// Payload length as stored.
    pub payload_len: usize,
}

impl EncodeSummary {
    pub fn scheme(&self) -> Scheme {
        Scheme {
            rle: self.header.rle,
            diff: self.header.diff,
        }
    }
}

/// Writes .tmg files.
pub struct TmgWriter<W: Write> {
    writer: W,
}

impl<W: Write> TmgWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Quantize, pack, compress and write one image.
    pub fn write_image(&mut self, grid: &PixelGrid, opts: &EncodeOptions) -> Result<EncodeSummary> {
        let raw = pack(grid, opts.depth);
        let (payload, scheme) = compress::select(&raw, opts.rle, opts.diff);

        let header = TmgHeader {
            depth: opts.depth,
            rle: scheme.rle,
            diff: scheme.diff,
            extended: opts.extended,
            name: opts.name.clone(),
            width: grid.width(),
            stored_height: stored_height(grid.height()),
        };
        self.writer.write_all(&header.to_bytes()?)?;
        self.writer.write_all(&payload)?;

        Ok(EncodeSummary {
            header,
            raw_len: raw.len(),
            payload_len: payload.len(),
        })
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode an image to the bytes of a .tmg file.
pub fn encode(grid: &PixelGrid, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let mut writer = TmgWriter::new(Vec::new());
    writer.write_image(grid, opts)?;
    writer.finish()
}
