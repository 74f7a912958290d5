pub mod error;
pub mod palette;
pub mod format;
pub mod quantize;
pub mod pack;
pub mod compress;
pub mod encode;
pub mod decode;

pub use compress::{Scheme, Toggle};
pub use decode::TmgReader;
pub use encode::{encode, EncodeOptions, EncodeSummary, TmgWriter};
pub use error::TmgError;
pub use format::{PixelGrid, Rgb, TmgHeader};
pub use palette::ColorDepth;
