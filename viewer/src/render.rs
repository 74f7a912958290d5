use tmg_core::pack::cell_pairs;
use tmg_core::palette::palette_color;
use tmg_core::{ColorDepth, Rgb};

const HALF_BLOCK: &str = "▄";

/// Render a decoded index stream to an ANSI byte buffer.
/// Background = top pixel, foreground (lower half block) = bottom pixel.
/// Escapes are skipped when a color repeats the previous cell's.
pub fn render_image(indices: &[u8], depth: ColorDepth, cols: u32, buf: &mut Vec<u8>) {
    buf.clear();
    let cells = cell_pairs(indices, depth);
    if cols == 0 {
        return;
    }

    let mut prev_bg = Rgb::BLACK;
    let mut prev_fg = Rgb::BLACK;
    let mut first = true;

    for (row, line) in cells.chunks(cols as usize).enumerate() {
        if row > 0 {
            buf.extend_from_slice(b"\x1b[0m\r\n");
            first = true;
        }
        for &(top, bottom) in line {
            let bg = color(top, depth);
            let fg = color(bottom, depth);

            if first || bg != prev_bg {
                write_bg(buf, bg);
                prev_bg = bg;
            }
            if first || fg != prev_fg {
                write_fg(buf, fg);
                prev_fg = fg;
            }
            first = false;

            buf.extend_from_slice(HALF_BLOCK.as_bytes());
        }
    }

    // Reset colors
    buf.extend_from_slice(b"\x1b[0m");
}

fn color(index: u8, depth: ColorDepth) -> Rgb {
    palette_color(index, depth).unwrap_or(Rgb::BLACK)
}

fn write_bg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[48;2;");
    write_rgb(buf, c);
}

fn write_fg(buf: &mut Vec<u8>, c: Rgb) {
    buf.extend_from_slice(b"\x1b[38;2;");
    write_rgb(buf, c);
}

fn write_rgb(buf: &mut Vec<u8>, c: Rgb) {
    write_u8(buf, c.r);
    buf.push(b';');
    write_u8(buf, c.g);
    buf.push(b';');
    write_u8(buf, c.b);
    buf.push(b'm');
}

/// Fast integer-to-ASCII for u8 values (0-255), no allocation.
fn write_u8(buf: &mut Vec<u8>, v: u8) {
    if v >= 100 {
        buf.push(b'0' + v / 100);
        buf.push(b'0' + (v / 10) % 10);
        buf.push(b'0' + v % 10);
    } else if v >= 10 {
        buf.push(b'0' + v / 10);
        buf.push(b'0' + v % 10);
    } else {
        buf.push(b'0' + v);
    }
}
