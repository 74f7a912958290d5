mod batch;
mod convert;
mod load;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tmg_core::{ColorDepth, EncodeOptions, Toggle};

use crate::convert::{convert_file, default_name, report, CellFit, ConvertResult};

#[derive(Parser)]
#[command(name = "tmg-convert", about = "Convert images to .tmg format")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a single image
    Convert {
        /// Input image path
        input: PathBuf,

        /// Output .tmg path
        output: PathBuf,

        /// Palette depth
        #[arg(default_value = "8")]
        depth: DepthArg,

        /// Image name stored in the header (default: input file stem)
        name: Option<String>,

        /// RLE compression
        #[arg(default_value = "0")]
        rle: ToggleArg,

        /// Difference compression
        #[arg(default_value = "0")]
        diff: ToggleArg,

        /// Reserved extended flag
        #[arg(default_value = "0", value_parser = clap::value_parser!(u8).range(0..=1))]
        extended: u8,

        #[command(flatten)]
        resize: ResizeArgs,
    },

    /// Convert every image in a directory
    Batch {
        /// Directory of .png/.jpg/.jpeg/.bmp/.gif files
        input_dir: PathBuf,

        /// Output directory, created if missing
        #[arg(default_value = "converted")]
        output_dir: PathBuf,

        /// Palette depth
        #[arg(default_value = "8")]
        depth: DepthArg,

        /// RLE compression
        #[arg(default_value = "0")]
        rle: ToggleArg,

        /// Difference compression
        #[arg(default_value = "0")]
        diff: ToggleArg,

        #[command(flatten)]
        resize: ResizeArgs,
    },
}

#[derive(Args)]
struct ResizeArgs {
    /// Resize to this many columns first
    #[arg(long, requires = "rows")]
    cols: Option<u16>,

    /// Resize to this many rows (2 pixels each) first
    #[arg(long, requires = "cols")]
    rows: Option<u16>,
}

impl ResizeArgs {
    fn fit(&self) -> Option<CellFit> {
        match (self.cols, self.rows) {
            (Some(cols), Some(rows)) => Some(CellFit::new(cols, rows)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DepthArg {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

impl From<DepthArg> for ColorDepth {
    fn from(d: DepthArg) -> Self {
        match d {
            DepthArg::Four => ColorDepth::Four,
            DepthArg::Eight => ColorDepth::Eight,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ToggleArg {
    #[value(name = "0", alias = "off")]
    Off,
    #[value(name = "1", alias = "on")]
    On,
    #[value(name = "auto")]
    Auto,
}

impl From<ToggleArg> for Toggle {
    fn from(t: ToggleArg) -> Self {
        match t {
            ToggleArg::Off => Toggle::Off,
            ToggleArg::On => Toggle::On,
            ToggleArg::Auto => Toggle::Auto,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            depth,
            name,
            rle,
            diff,
            extended,
            resize,
        } => {
            let opts = EncodeOptions {
                depth: depth.into(),
                name: name.unwrap_or_else(|| default_name(&input)),
                rle: rle.into(),
                diff: diff.into(),
                extended: extended == 1,
            };
            let mut fit = resize.fit();
            let outcome = convert_file(&input, &output, &opts, fit.as_mut());
            let result = ConvertResult { input, output, outcome };
            report(&result);
            Ok(exit_code(usize::from(!result.is_ok())))
        }
        Command::Batch {
            input_dir,
            output_dir,
            depth,
            rle,
            diff,
            resize,
        } => {
            let template = EncodeOptions {
                depth: depth.into(),
                rle: rle.into(),
                diff: diff.into(),
                ..EncodeOptions::new("")
            };
            let mut fit = resize.fit();
            let results = batch::convert_dir(&input_dir, &output_dir, &template, fit.as_mut())?;
            let failed = results.iter().filter(|r| !r.is_ok()).count();
            log::info!(
                "batch done: {} converted, {failed} failed",
                results.len() - failed
            );
            Ok(exit_code(failed))
        }
    }
}

fn exit_code(failed: usize) -> ExitCode {
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
