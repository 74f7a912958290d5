mod render;

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::terminal;

use tmg_core::{TmgHeader, TmgReader};

#[derive(Parser)]
#[command(name = "tmg-view", about = "Show .tmg images in the terminal")]
struct Cli {
    /// Path to .tmg file
    input: PathBuf,

    /// Print the header and exit
    #[arg(long)]
    info: bool,

    /// Keep the image on screen until a key is pressed
    #[arg(long)]
    wait: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let reader = TmgReader::new(BufReader::new(file))
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    if cli.info {
        println!("{}", describe(&reader.header, reader.payload().len()));
        return Ok(());
    }

    let indices = reader
        .read_indices()
        .with_context(|| format!("failed to decode {}", cli.input.display()))?;
    let header = &reader.header;

    // Check terminal size
    if let Ok((term_cols, term_rows)) = terminal::size() {
        if (term_cols as u32) < header.width || (term_rows as u32) < header.stored_height {
            log::warn!(
                "terminal is {}x{} but image needs {}x{}; it will wrap",
                term_cols,
                term_rows,
                header.width,
                header.stored_height
            );
        }
    }

    let mut buf = Vec::with_capacity(indices.len() * 24);
    render::render_image(&indices, header.depth, header.width, &mut buf);

    let mut stdout = std::io::stdout().lock();
    if cli.wait {
        stdout.write_all(b"\x1b[?1049h\x1b[?25l\x1b[H")?; // alternate screen, hidden cursor
        stdout.write_all(&buf)?;
        stdout.flush()?;
        let result = wait_for_key();
        stdout.write_all(b"\x1b[0m\x1b[?25h\x1b[?1049l")?;
        stdout.flush()?;
        result
    } else {
        stdout.write_all(&buf)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        Ok(())
    }
}

fn wait_for_key() -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(_)) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }
    };
    terminal::disable_raw_mode()?;
    result
}

fn describe(h: &TmgHeader, payload_len: usize) -> String {
    format!(
        "name: {:?}\nsize: {}x{} cells ({}x{} pixels)\ndepth: {}-bit\nrle: {}\ndiff: {}\nextended: {}\npayload: {} bytes",
        h.name,
        h.width,
        h.stored_height,
        h.width,
        h.stored_height as u64 * 2,
        h.depth.bits(),
        h.rle,
        h.diff,
        h.extended,
        payload_len
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmg_core::ColorDepth;

    #[test]
    fn describe_lists_header_fields() {
        let h = TmgHeader {
            depth: ColorDepth::Four,
            rle: true,
            diff: false,
            extended: false,
            name: "logo".into(),
            width: 160,
            stored_height: 50,
        };
        let text = describe(&h, 321);
        assert!(text.contains("size: 160x50 cells (160x100 pixels)"));
        assert!(text.contains("depth: 4-bit"));
        assert!(text.contains("rle: true"));
        assert!(text.contains("payload: 321 bytes"));
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from(["tmg-view", "a.tmg", "--info"]).unwrap();
        assert!(cli.info);
        assert!(!cli.wait);
    }
}
