use crate::error::{Result, TmgError};
use crate::format::{stored_height, PixelGrid, Rgb};
use crate::palette::{palette_color, ColorDepth};
use crate::quantize::nearest_index;

/// Convert a pixel grid into the raw index stream using the half-block trick.
/// Each stored cell = 2 vertical pixels: top and bottom.
///
/// Rows are walked in pairs; an odd final row is paired with a black pixel.
/// 8-bit depth writes two bytes per cell (top, bottom). 4-bit depth writes one
/// byte per cell with top in the high nibble.
pub fn pack(grid: &PixelGrid, depth: ColorDepth) -> Vec<u8> {
    let cols = grid.width();
    let rows = stored_height(grid.height());
    let mut out = Vec::with_capacity(cols as usize * rows as usize * depth.bytes_per_cell());

    for row in 0..rows {
        let top_y = row * 2;
        let bot_y = top_y + 1;

        for col in 0..cols {
            let top = grid.get(col, top_y).unwrap_or(Rgb::BLACK);
            let bottom = grid.get(col, bot_y).unwrap_or(Rgb::BLACK);
            let top_idx = nearest_index(top, depth);
            let bottom_idx = nearest_index(bottom, depth);

            match depth {
                ColorDepth::Four => out.push((top_idx << 4) | bottom_idx),
                ColorDepth::Eight => {
                    out.push(top_idx);
                    out.push(bottom_idx);
                }
            }
        }
    }

    out
}

/// Split the index stream into (top, bottom) palette indices, one per cell,
/// row-major.
pub fn cell_pairs(indices: &[u8], depth: ColorDepth) -> Vec<(u8, u8)> {
    match depth {
        ColorDepth::Four => indices.iter().map(|&b| (b >> 4, b & 0x0F)).collect(),
        ColorDepth::Eight => indices.chunks_exact(2).map(|p| (p[0], p[1])).collect(),
    }
}

/// Expand an index stream back into palette colors. The result is
/// `width` x `stored_height * 2` pixels; padding rows come back black.
pub fn unpack(indices: &[u8], width: u32, stored_height: u32, depth: ColorDepth) -> Result<PixelGrid> {
    let overflow = || {
        TmgError::MalformedContainer(format!("dimensions {width}x{stored_height} overflow"))
    };
    let height = stored_height.checked_mul(2).ok_or_else(overflow)?;
    let cols = width as usize;
    let rows = stored_height as usize;
    let expected = cols
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(depth.bytes_per_cell()))
        .ok_or_else(overflow)?;
    let pixel_count = cols.checked_mul(height as usize).ok_or_else(overflow)?;
    if indices.len() != expected {
        return Err(TmgError::CorruptPayload(format!(
            "index stream is {} bytes, expected {expected}",
            indices.len()
        )));
    }

    let cells = cell_pairs(indices, depth);
    let mut pixels = vec![Rgb::BLACK; pixel_count];
    for (i, &(top, bottom)) in cells.iter().enumerate() {
        let row = i / cols;
        let col = i % cols;
        pixels[row * 2 * cols + col] = color(top, depth)?;
        pixels[(row * 2 + 1) * cols + col] = color(bottom, depth)?;
    }

    PixelGrid::new(width, height, pixels)
}

fn color(index: u8, depth: ColorDepth) -> Result<Rgb> {
    palette_color(index, depth)
        .ok_or_else(|| TmgError::CorruptPayload(format!("palette index {index} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantized(grid: &PixelGrid, depth: ColorDepth) -> Vec<Rgb> {
        grid.pixels()
            .iter()
            .map(|&c| palette_color(nearest_index(c, depth), depth).unwrap())
            .collect()
    }

    fn sample_grid(width: u32, height: u32) -> PixelGrid {
        let pixels = (0..width * height)
            .map(|i| Rgb::new((i * 37) as u8, (i * 91 + 7) as u8, (i * 13 + 200) as u8))
            .collect();
        PixelGrid::new(width, height, pixels).unwrap()
    }

    #[test]
    fn two_by_two_eight_bit() {
        let grid = PixelGrid::new(
            2,
            2,
            vec![
                Rgb::new(255, 0, 0),
                Rgb::new(0, 0, 0),
                Rgb::new(0, 255, 0),
                Rgb::new(0, 0, 255),
            ],
        )
        .unwrap();
        // Column 0: red over green, column 1: black over blue.
        assert_eq!(pack(&grid, ColorDepth::Eight), vec![200, 35, 0, 4]);
        assert_eq!(pack(&grid, ColorDepth::Four), vec![0x12, 0x04]);
    }

    #[test]
    fn odd_height_pads_with_black() {
        let grid = PixelGrid::new(1, 3, vec![Rgb::new(255, 255, 255); 3]).unwrap();
        assert_eq!(stored_height(grid.height()), 2);
        assert_eq!(pack(&grid, ColorDepth::Eight), vec![239, 239, 239, 0]);
        assert_eq!(pack(&grid, ColorDepth::Four), vec![0xFF, 0xF0]);
    }

    #[test]
    fn stream_length_matches_depth() {
        let grid = sample_grid(7, 5);
        assert_eq!(pack(&grid, ColorDepth::Four).len(), 7 * 3);
        assert_eq!(pack(&grid, ColorDepth::Eight).len(), 7 * 3 * 2);
    }

    #[test]
    fn unpack_restores_quantized_pixels() {
        for depth in [ColorDepth::Four, ColorDepth::Eight] {
            let grid = sample_grid(6, 4);
            let stream = pack(&grid, depth);
            let back = unpack(&stream, 6, 2, depth).unwrap();
            assert_eq!(back.pixels(), quantized(&grid, depth).as_slice());
        }
    }

    #[test]
    fn unpack_odd_height_keeps_source_rows() {
        let grid = sample_grid(3, 5);
        let stream = pack(&grid, ColorDepth::Eight);
        let back = unpack(&stream, 3, 3, ColorDepth::Eight).unwrap();
        assert_eq!(back.height(), 6);
        assert_eq!(&back.pixels()[..15], quantized(&grid, ColorDepth::Eight).as_slice());
        assert!(back.pixels()[15..].iter().all(|&c| c == Rgb::BLACK));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        assert!(matches!(
            unpack(&[1, 2, 3], 2, 1, ColorDepth::Eight),
            Err(TmgError::CorruptPayload(_))
        ));
    }

    #[test]
    fn unpack_rejects_height_overflow() {
        assert!(matches!(
            unpack(&[], 0, 4_000_000_000, ColorDepth::Eight),
            Err(TmgError::MalformedContainer(_))
        ));
    }

    #[test]
    fn cell_pairs_split_nibbles() {
        assert_eq!(cell_pairs(&[0xA5], ColorDepth::Four), vec![(0xA, 0x5)]);
        assert_eq!(cell_pairs(&[9, 200], ColorDepth::Eight), vec![(9, 200)]);
    }
}
