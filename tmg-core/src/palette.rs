//! Fixed palettes of the target display.
//!
//! The 8-bit palette is a 6x8x5 color cube (indices 0..=239) followed by a
//! 16-step grey ramp (indices 240..=255). The 4-bit palette is a flat list of
//! 16 colors.

use crate::format::Rgb;

pub const REDS: [u8; 6] = [0x00, 0x33, 0x66, 0x99, 0xCC, 0xFF];
pub const GREENS: [u8; 8] = [0x00, 0x24, 0x49, 0x6D, 0x92, 0xB6, 0xDB, 0xFF];
pub const BLUES: [u8; 5] = [0x00, 0x40, 0x80, 0xBF, 0xFF];

pub const GREYS: [u8; 16] = [
    0x0F, 0x1E, 0x2D, 0x3C, 0x4B, 0x5A, 0x69, 0x78, 0x87, 0x96, 0xA5, 0xB4, 0xC3, 0xD2, 0xE1, 0xF0,
];

/// First index of the grey ramp in the 8-bit palette.
pub const GREY_BASE: u8 = 240;
/// Cube index of pure black, also used for exact (0,0,0).
pub const BLACK_8BIT: u8 = 0;
/// Cube index of pure white, also used for exact (255,255,255).
pub const WHITE_8BIT: u8 = 239;

pub const PALETTE_4BIT: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00), // black
    Rgb::new(0xFF, 0x00, 0x00), // red
    Rgb::new(0x00, 0xFF, 0x00), // green
    Rgb::new(0x96, 0x4B, 0x00), // brown
    Rgb::new(0x00, 0x00, 0xFF), // blue
    Rgb::new(0xFF, 0x00, 0xFF), // purple
    Rgb::new(0x00, 0xFF, 0xFF), // cyan
    Rgb::new(0x40, 0x40, 0x40), // dark gray
    Rgb::new(0x80, 0x80, 0x80), // light gray
    Rgb::new(0xFF, 0x80, 0x80), // pink
    Rgb::new(0x80, 0xFF, 0x80), // lime
    Rgb::new(0xFF, 0xFF, 0x00), // yellow
    Rgb::new(0x80, 0x80, 0xFF), // light blue
    Rgb::new(0xFF, 0x00, 0x80), // magenta
    Rgb::new(0xFF, 0xCC, 0x00), // gold
    Rgb::new(0xFF, 0xFF, 0xFF), // white
];

/// Palette width of a conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorDepth {
    /// 16 colors, two indices packed into one byte.
    Four,
    /// 256 colors, one byte per index.
    Eight,
}

impl ColorDepth {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            4 => Some(ColorDepth::Four),
            8 => Some(ColorDepth::Eight),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            ColorDepth::Four => 4,
            ColorDepth::Eight => 8,
        }
    }

    /// Bytes emitted per stored cell (one top/bottom pixel pair).
    pub fn bytes_per_cell(self) -> usize {
        match self {
            ColorDepth::Four => 1,
            ColorDepth::Eight => 2,
        }
    }
}

/// Color displayed for a palette index. Returns None for 4-bit indices above 15.
pub fn palette_color(index: u8, depth: ColorDepth) -> Option<Rgb> {
    match depth {
        ColorDepth::Four => PALETTE_4BIT.get(index as usize).copied(),
        ColorDepth::Eight => {
            if index >= GREY_BASE {
                let g = GREYS[(index - GREY_BASE) as usize];
                return Some(Rgb::new(g, g, g));
            }
            let i = index as usize;
            Some(Rgb::new(REDS[i / 40], GREENS[(i / 5) % 8], BLUES[i % 5]))
        }
    }
}
