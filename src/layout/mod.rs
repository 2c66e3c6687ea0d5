//! # Label Layout Model
//!
//! A [`LayoutConfiguration`] is a named, persisted visual configuration for a
//! shipment label. Its editable part, [`LayoutStyle`], is what the renderer
//! consumes and what an editor draft carries.
//!
//! Stored rows are backfilled: any style field missing from a legacy record
//! takes its safe default instead of failing to load.
//!
//! ```
//! use etiket::layout::{LayoutConfiguration, LayoutStyle};
//!
//! let row = r#"{
//!     "id": "6f1c1a7e-8f55-4a8e-9a55-2d0f1d5f3a10",
//!     "name": "Legacy",
//!     "owner_scope": {"kind": "tenant"},
//!     "is_default": true,
//!     "created_at": "2024-03-01T10:00:00Z",
//!     "font_size": 11
//! }"#;
//! let layout: LayoutConfiguration = serde_json::from_str(row).unwrap();
//! assert_eq!(layout.style.font_size, 11);
//! assert_eq!(layout.style.logo_width, LayoutStyle::default().logo_width);
//! ```

mod field;
mod range;
mod types;

pub use field::{ColorField, FieldEdit, Toggle};
pub use range::{Clamped, NumericField};
pub use types::{FontFamily, LayoutId, LogoPosition, OwnerScope, is_hex_color};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EtiketError, Result};

/// Default footer line on new layouts.
pub const DEFAULT_FOOTER_TEXT: &str = "Bu etiket otomatik olarak oluşturulmuştur.";

/// Name given to the layout seeded into an empty owner scope.
pub const SEEDED_LAYOUT_NAME: &str = "Varsayılan Etiket";

/// Longest accepted layout name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// The editable visual composition of a label.
///
/// `Default` is the safe-defaults factory: a fully populated style used as
/// the starting point for new layouts and for backfilling partial records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    // Geometry (pixels)
    pub label_width: u32,
    pub label_height: u32,
    pub barcode_width: u32,
    pub barcode_height: u32,
    pub logo_width: u32,
    pub logo_height: u32,

    // Typography and palette
    pub font_family: FontFamily,
    /// Body font size in points.
    pub font_size: u32,
    pub header_color: String,
    pub text_color: String,
    pub border_color: String,
    pub background_color: String,
    pub footer_color: String,

    // Content toggles
    pub show_logo: bool,
    pub show_barcode_text: bool,
    pub show_shipment_type: bool,
    pub show_payment_type: bool,
    pub show_sender: bool,
    pub show_receiver: bool,
    pub show_line_items: bool,
    pub show_weight: bool,
    pub show_package_info: bool,
    pub show_agreement_type: bool,

    /// Public URL of the uploaded logo; empty means none uploaded.
    pub logo_url: String,
    pub logo_position: LogoPosition,
    pub footer_text: String,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            label_width: 400,
            label_height: 600,
            barcode_width: 200,
            barcode_height: 50,
            logo_width: 100,
            logo_height: 50,
            font_family: FontFamily::Arial,
            font_size: 12,
            header_color: "#000000".into(),
            text_color: "#333333".into(),
            border_color: "#000000".into(),
            background_color: "#FFFFFF".into(),
            footer_color: "#666666".into(),
            show_logo: true,
            show_barcode_text: true,
            show_shipment_type: true,
            show_payment_type: true,
            show_sender: true,
            show_receiver: true,
            show_line_items: true,
            show_weight: true,
            show_package_info: true,
            show_agreement_type: true,
            logo_url: String::new(),
            logo_position: LogoPosition::Left,
            footer_text: DEFAULT_FOOTER_TEXT.into(),
        }
    }
}

impl LayoutStyle {
    /// Whether the top row carries a logo region at all.
    pub fn logo_visible(&self) -> bool {
        self.show_logo && self.logo_position != LogoPosition::None
    }

    /// Clamp every ranged field, returning the adjustments made.
    pub fn clamp_ranges(&mut self) -> Vec<Clamped> {
        let mut adjusted = Vec::new();
        for field in NumericField::ALL {
            let current = field.get(self);
            let applied = field.clamp(current as i64);
            if applied != current {
                field.set(self, applied);
                adjusted.push(Clamped {
                    field,
                    requested: current as i64,
                    applied,
                });
            }
        }
        adjusted
    }

    /// Copy of this style with every ranged field clamped.
    pub fn normalized(mut self) -> Self {
        self.clamp_ranges();
        self
    }

    /// Check ranges and colour formats.
    pub fn validate(&self) -> Result<()> {
        for field in NumericField::ALL {
            let value = field.get(self);
            if !field.contains(value) {
                let range = field.range();
                return Err(EtiketError::validation(
                    field.name(),
                    format!(
                        "{} is outside {}..={}",
                        value,
                        range.start(),
                        range.end()
                    ),
                ));
            }
        }
        for (name, color) in self.colors() {
            if !is_hex_color(color) {
                return Err(EtiketError::validation(
                    name,
                    format!("'{}' is not a hex colour", color),
                ));
            }
        }
        Ok(())
    }

    /// Every colour field with its stored name.
    pub fn colors(&self) -> [(&'static str, &str); 5] {
        [
            ("header_color", &self.header_color),
            ("text_color", &self.text_color),
            ("border_color", &self.border_color),
            ("background_color", &self.background_color),
            ("footer_color", &self.footer_color),
        ]
    }
}

/// Mutable payload for creating or replacing a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDraft {
    pub name: String,
    #[serde(flatten)]
    pub style: LayoutStyle,
}

impl LayoutDraft {
    /// Draft with safe defaults and the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: LayoutStyle::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EtiketError::validation("name", "must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(EtiketError::validation(
                "name",
                format!("longer than {} characters", MAX_NAME_LEN),
            ));
        }
        self.style.validate()
    }
}

/// A named, persisted label layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfiguration {
    pub id: LayoutId,
    pub name: String,
    pub owner_scope: OwnerScope,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub style: LayoutStyle,
}

impl LayoutConfiguration {
    /// The mutable part of this layout, as a draft.
    pub fn to_draft(&self) -> LayoutDraft {
        LayoutDraft {
            name: self.name.clone(),
            style: self.style.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legacy_row() -> serde_json::Value {
        serde_json::json!({
            "id": "6f1c1a7e-8f55-4a8e-9a55-2d0f1d5f3a10",
            "name": "Eski Etiket",
            "owner_scope": {"kind": "user", "user_id": "m-1"},
            "is_default": true,
            "created_at": "2024-03-01T10:00:00Z",
            "label_width": 500,
            "header_color": "#123456",
            "logo_position": "center"
        })
    }

    #[test]
    fn test_backfill_missing_logo_dimensions() {
        let layout: LayoutConfiguration = serde_json::from_value(legacy_row()).unwrap();
        assert_eq!(layout.style.logo_width, 100);
        assert_eq!(layout.style.logo_height, 50);
        assert_eq!(layout.style.label_width, 500);
        assert_eq!(layout.style.header_color, "#123456");
        assert_eq!(layout.style.logo_position, LogoPosition::Center);
        assert_eq!(layout.owner_scope, OwnerScope::user("m-1"));
    }

    #[test]
    fn test_backfill_empty_style() {
        let row = serde_json::json!({
            "id": "6f1c1a7e-8f55-4a8e-9a55-2d0f1d5f3a10",
            "name": "Bare",
            "owner_scope": {"kind": "tenant"},
            "created_at": "2024-03-01T10:00:00Z"
        });
        let layout: LayoutConfiguration = serde_json::from_value(row).unwrap();
        assert_eq!(layout.style, LayoutStyle::default());
        assert!(!layout.is_default);
    }

    #[test]
    fn test_safe_defaults_validate() {
        assert!(LayoutStyle::default().validate().is_ok());
        assert!(LayoutDraft::new("Retail Label").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let style = LayoutStyle {
            font_size: 20,
            ..Default::default()
        };
        let err = style.validate().unwrap_err();
        assert_eq!(err.field(), Some("font_size"));
    }

    #[test]
    fn test_validate_rejects_bad_color() {
        let style = LayoutStyle {
            footer_color: "grey".into(),
            ..Default::default()
        };
        let err = style.validate().unwrap_err();
        assert_eq!(err.field(), Some("footer_color"));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let err = LayoutDraft::new("   ").validate().unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_clamp_ranges_reports_adjustments() {
        let mut style = LayoutStyle {
            font_size: 30,
            barcode_height: 5,
            ..Default::default()
        };
        let adjusted = style.clamp_ranges();
        assert_eq!(style.font_size, 16);
        assert_eq!(style.barcode_height, 20);
        assert_eq!(adjusted.len(), 2);
        assert_eq!(adjusted[0].field, NumericField::FontSize);
        assert_eq!(adjusted[0].requested, 30);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_logo_visibility() {
        let mut style = LayoutStyle::default();
        assert!(style.logo_visible());
        style.logo_position = LogoPosition::None;
        assert!(!style.logo_visible());
        style.logo_position = LogoPosition::Right;
        style.show_logo = false;
        assert!(!style.logo_visible());
    }
}
