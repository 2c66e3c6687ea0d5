//! # Symbol Encoding
//!
//! Turns a reference/tracking string into a drawable linear barcode.
//!
//! The renderer only depends on the [`SymbolEncoder`] contract. The production
//! adapter, [`BarcodersEncoder`], wraps the `barcoders` crate.
//!
//! ```
//! use etiket::barcode::{BarcodersEncoder, EncodeOptions, SymbolEncoder};
//!
//! let symbol = BarcodersEncoder
//!     .encode("ABC123", &EncodeOptions::code128(200, 50))
//!     .unwrap();
//! assert!(symbol.to_svg().starts_with("<svg"));
//! ```

mod encoder;
mod symbol;

pub use encoder::BarcodersEncoder;
pub use symbol::{Bar, RenderableSymbol};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported linear symbologies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbology {
    #[default]
    Code128,
    Code39,
}

/// Geometry and palette for one encode call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub symbology: Symbology,
    pub width_px: u32,
    pub height_px: u32,
    pub foreground: String,
    pub background: String,
}

impl EncodeOptions {
    /// Black-on-white Code 128 at the given size.
    pub fn code128(width_px: u32, height_px: u32) -> Self {
        Self {
            symbology: Symbology::Code128,
            width_px,
            height_px,
            foreground: "#000000".into(),
            background: "#FFFFFF".into(),
        }
    }
}

/// Errors from the symbol encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingError {
    #[error("barcode payload is empty")]
    EmptyPayload,

    #[error("character {ch:?} is not supported by {symbology:?}")]
    UnsupportedCharacter { ch: char, symbology: Symbology },

    #[error("symbology encoder failed: {0}")]
    Symbology(String),
}

/// Encodes a payload into a drawable symbol.
pub trait SymbolEncoder: Send + Sync {
    fn encode(
        &self,
        payload: &str,
        options: &EncodeOptions,
    ) -> Result<RenderableSymbol, EncodingError>;
}
