use crate::error::{Result, TmgError};
use crate::palette::ColorDepth;

/// One source pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Row-major RGB pixel grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        if pixels.len() as u64 != width as u64 * height as u64 {
            return Err(TmgError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, pixels })
    }

    /// Build from packed RGB24 bytes.
    pub fn from_rgb24(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        if data.len() as u64 != width as u64 * height as u64 * 3 {
            return Err(TmgError::InvalidDimensions { width, height });
        }
        let pixels = data.chunks_exact(3).map(|p| Rgb::new(p[0], p[1], p[2])).collect();
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Pixel at (x, y), or None outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }
}

pub const MAGIC: &[u8; 4] = b"tmg\n";

const FLAG_DEPTH_8: u8 = 0b1000;
const FLAG_RLE: u8 = 0b0100;
const FLAG_DIFF: u8 = 0b0010;
const FLAG_EXTENDED: u8 = 0b0001;

/// Header of a .tmg file. The payload follows it with no length field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TmgHeader {
    pub depth: ColorDepth,
    pub rle: bool,
    pub diff: bool,
    /// Reserved; written and read back but not interpreted.
    pub extended: bool,
    pub name: String,
    pub width: u32,
    /// Number of stored rows, each holding two pixel rows.
    pub stored_height: u32,
}

impl TmgHeader {
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.depth == ColorDepth::Eight {
            flags |= FLAG_DEPTH_8;
        }
        if self.rle {
            flags |= FLAG_RLE;
        }
        if self.diff {
            flags |= FLAG_DIFF;
        }
        if self.extended {
            flags |= FLAG_EXTENDED;
        }
        flags
    }

    /// Length of the index stream once the payload is decompressed.
    pub fn index_len(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.stored_height as usize)
            .and_then(|n| n.checked_mul(self.depth.bytes_per_cell()))
            .ok_or_else(|| {
                TmgError::MalformedContainer(format!(
                    "dimensions {}x{} overflow",
                    self.width, self.stored_height
                ))
            })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.name.contains('\n') {
            return Err(TmgError::InvalidName(self.name.clone()));
        }
        let mut buf = Vec::with_capacity(MAGIC.len() + 2 + self.name.len() + 24);
        buf.extend_from_slice(MAGIC);
        buf.push(self.flags());
        buf.push(b'\n');
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(b'\n');
        buf.extend_from_slice(format!("{}\n{}\n", self.width, self.stored_height).as_bytes());
        Ok(buf)
    }

    /// Parse a header from the start of `buf`. Returns the header and the
    /// offset where the payload begins.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
            return Err(TmgError::MalformedContainer("invalid magic: expected tmg".into()));
        }
        // The flags byte is read by position since it can itself be b'\n'.
        let flags = *buf
            .get(4)
            .ok_or_else(|| TmgError::MalformedContainer("missing flags byte".into()))?;
        if buf.get(5) != Some(&b'\n') {
            return Err(TmgError::MalformedContainer("flags byte not followed by newline".into()));
        }

        let mut pos = 6;
        let name = read_line(buf, &mut pos, "name")?;
        let name = String::from_utf8(name.to_vec())
            .map_err(|_| TmgError::MalformedContainer("name is not valid UTF-8".into()))?;
        let width = parse_number(read_line(buf, &mut pos, "width")?, "width")?;
        let stored_height = parse_number(read_line(buf, &mut pos, "height")?, "height")?;

        let depth = if flags & FLAG_DEPTH_8 != 0 {
            ColorDepth::Eight
        } else {
            ColorDepth::Four
        };
        let header = Self {
            depth,
            rle: flags & FLAG_RLE != 0,
            diff: flags & FLAG_DIFF != 0,
            extended: flags & FLAG_EXTENDED != 0,
            name,
            width,
            stored_height,
        };
        Ok((header, pos))
    }
}

/// Rows needed to store `height` pixel rows, two per row.
pub fn stored_height(height: u32) -> u32 {
    height.div_ceil(2)
}

fn read_line<'a>(buf: &'a [u8], pos: &mut usize, what: &str) -> Result<&'a [u8]> {
    let rest = &buf[*pos..];
    let end = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| TmgError::MalformedContainer(format!("missing {what} line")))?;
    *pos += end + 1;
    Ok(&rest[..end])
}

fn parse_number(line: &[u8], what: &str) -> Result<u32> {
    std::str::from_utf8(line)
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            TmgError::MalformedContainer(format!(
                "{what} is not a number: {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}
