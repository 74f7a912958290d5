use crate::format::Rgb;
use crate::palette::*;

/// Map a color to its palette index for the given depth.
pub fn nearest_index(color: Rgb, depth: ColorDepth) -> u8 {
    match depth {
        ColorDepth::Four => nearest_4bit(color),
        ColorDepth::Eight => nearest_8bit(color),
    }
}

/// Index of the level closest to `value`. Ties keep the lowest index.
fn nearest_level(value: u8, levels: &[u8]) -> usize {
    let mut best_idx = 0;
    let mut best_diff = u16::MAX;
    for (i, &level) in levels.iter().enumerate() {
        let diff = value.abs_diff(level) as u16;
        if diff < best_diff {
            best_diff = diff;
            best_idx = i;
        }
    }
    best_idx
}

/// True greys go to the ramp (or the black/white cube corners). Everything else
/// is quantized one channel at a time against the cube levels; the channels are
/// never searched jointly.
fn nearest_8bit(c: Rgb) -> u8 {
    if c.r == c.g && c.g == c.b {
        return match c.r {
            0 => BLACK_8BIT,
            255 => WHITE_8BIT,
            v => GREY_BASE + nearest_level(v, &GREYS) as u8,
        };
    }

    let r = nearest_level(c.r, &REDS);
    let g = nearest_level(c.g, &GREENS);
    let b = nearest_level(c.b, &BLUES);
    (r * 40 + g * 5 + b) as u8
}

/// Manhattan distance scan over the 16-color palette, stopping at the first
/// exact match.
fn nearest_4bit(c: Rgb) -> u8 {
    let mut best_idx = 0;
    let mut best_diff = u32::MAX;
    for (i, p) in PALETTE_4BIT.iter().enumerate() {
        let diff = c.r.abs_diff(p.r) as u32 + c.g.abs_diff(p.g) as u32 + c.b.abs_diff(p.b) as u32;
        if diff < best_diff {
            best_diff = diff;
            best_idx = i;
            if diff == 0 {
                break;
            }
        }
    }
    best_idx as u8
}
