use std::io::Read;

use crate::compress::{self, Scheme};
use crate::error::{Result, TmgError};
use crate::format::*;
use crate::pack::unpack;

/// Reads .tmg files.
pub struct TmgReader {
    pub header: TmgHeader,
    payload: Vec<u8>,
}

impl TmgReader {
    /// Read the whole stream and parse the header.
    pub fn new<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (header, offset) = TmgHeader::parse(buf)?;
        Ok(Self {
            header,
            payload: buf[offset..].to_vec(),
        })
    }

    /// Payload as stored, before decompression.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn scheme(&self) -> Scheme {
        Scheme {
            rle: self.header.rle,
            diff: self.header.diff,
        }
    }

    /// Decompress the payload and check it against the header dimensions.
    pub fn read_indices(&self) -> Result<Vec<u8>> {
        let expected = self.header.index_len()?;
        let indices = compress::decompress_bounded(&self.payload, self.scheme(), expected)?;
        if indices.len() != expected {
            return Err(TmgError::CorruptPayload(format!(
                "decompressed {} bytes, header implies {expected}",
                indices.len()
            )));
        }
        Ok(indices)
    }

    /// Decode into palette colors, `width` x `stored_height * 2` pixels.
    pub fn read_pixels(&self) -> Result<PixelGrid> {
        let indices = self.read_indices()?;
        unpack(&indices, self.header.width, self.header.stored_height, self.header.depth)
    }
}
