//! `barcoders`-backed encoder for Code 128 and Code 39.

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;

use super::{EncodeOptions, EncodingError, RenderableSymbol, SymbolEncoder, Symbology};

/// Characters accepted by Code 39 (without full-ASCII extension).
const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Production symbol encoder built on the `barcoders` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodersEncoder;

impl BarcodersEncoder {
    fn modules(payload: &str, symbology: Symbology) -> Result<Vec<u8>, EncodingError> {
        match symbology {
            Symbology::Code128 => {
                if let Some(ch) = payload.chars().find(|c| !(' '..='~').contains(c)) {
                    return Err(EncodingError::UnsupportedCharacter { ch, symbology });
                }
                // Character Set B (Ɓ) covers every printable ASCII character
                let prefixed = format!("\u{0181}{}", payload);
                Code128::new(&prefixed)
                    .map(|b| b.encode())
                    .map_err(|e| EncodingError::Symbology(format!("{:?}", e)))
            }
            Symbology::Code39 => {
                if let Some(ch) = payload.chars().find(|c| !CODE39_CHARSET.contains(*c)) {
                    return Err(EncodingError::UnsupportedCharacter { ch, symbology });
                }
                Code39::new(payload)
                    .map(|b| b.encode())
                    .map_err(|e| EncodingError::Symbology(format!("{:?}", e)))
            }
        }
    }
}

impl SymbolEncoder for BarcodersEncoder {
    fn encode(
        &self,
        payload: &str,
        options: &EncodeOptions,
    ) -> Result<RenderableSymbol, EncodingError> {
        if payload.is_empty() {
            return Err(EncodingError::EmptyPayload);
        }

        let encoded = Self::modules(payload, options.symbology)?;
        let modules: Vec<bool> = encoded.iter().map(|&m| m == 1).collect();

        Ok(RenderableSymbol::new(payload, options, modules))
    }
}
