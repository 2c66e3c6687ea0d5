//! Drawable representation of an encoded symbol.

use serde::Serialize;
use std::fmt::Write;

use super::{EncodeOptions, Symbology};

/// One dark bar, in pixels from the symbol's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
}

/// An encoded symbol stretched to a fixed pixel box.
///
/// `pattern` holds one character per module: `1` for a bar, `0` for a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderableSymbol {
    pub symbology: Symbology,
    pub payload: String,
    pub pattern: String,
    pub width_px: u32,
    pub height_px: u32,
    pub foreground: String,
    pub background: String,
}

impl RenderableSymbol {
    pub fn new(payload: &str, options: &EncodeOptions, modules: Vec<bool>) -> Self {
        Self {
            symbology: options.symbology,
            payload: payload.to_string(),
            pattern: modules.iter().map(|&m| if m { '1' } else { '0' }).collect(),
            width_px: options.width_px,
            height_px: options.height_px,
            foreground: options.foreground.clone(),
            background: options.background.clone(),
        }
    }

    pub fn module_count(&self) -> usize {
        self.pattern.len()
    }

    /// Width of a single module when the symbol fills `width_px`.
    pub fn module_width(&self) -> f64 {
        if self.pattern.is_empty() {
            0.0
        } else {
            self.width_px as f64 / self.pattern.len() as f64
        }
    }

    /// Runs of adjacent dark modules, scaled to the pixel box.
    pub fn bars(&self) -> Vec<Bar> {
        let unit = self.module_width();
        let mut bars = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i, module) in self.pattern.chars().chain(std::iter::once('0')).enumerate() {
            match (module, run_start) {
                ('1', None) => run_start = Some(i),
                ('0', Some(start)) => {
                    bars.push(Bar {
                        x: start as f64 * unit,
                        width: (i - start) as f64 * unit,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        bars
    }

    /// Standalone SVG markup for embedding in a label.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width_px,
            h = self.height_px
        );
        let _ = write!(
            svg,
            r#"<rect width="{}" height="{}" fill="{}"/>"#,
            self.width_px, self.height_px, self.background
        );
        for bar in self.bars() {
            let _ = write!(
                svg,
                r#"<rect x="{:.3}" width="{:.3}" height="{}" fill="{}"/>"#,
                bar.x, bar.width, self.height_px, self.foreground
            );
        }
        svg.push_str("</svg>");
        svg
    }
}
