//! Ranged numeric fields of a layout style.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::LayoutStyle;

/// A numeric layout field with a declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    FontSize,
    LabelWidth,
    LabelHeight,
    BarcodeWidth,
    BarcodeHeight,
    LogoWidth,
    LogoHeight,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        Self::FontSize,
        Self::LabelWidth,
        Self::LabelHeight,
        Self::BarcodeWidth,
        Self::BarcodeHeight,
        Self::LogoWidth,
        Self::LogoHeight,
    ];

    /// Inclusive bounds for this field.
    pub const fn range(self) -> RangeInclusive<u32> {
        match self {
            Self::FontSize => 8..=16,
            Self::LabelWidth | Self::LabelHeight => 300..=800,
            Self::BarcodeWidth => 100..=300,
            Self::BarcodeHeight => 20..=80,
            Self::LogoWidth => 50..=200,
            Self::LogoHeight => 30..=150,
        }
    }

    /// Field name as stored.
    pub fn name(self) -> &'static str {
        match self {
            Self::FontSize => "font_size",
            Self::LabelWidth => "label_width",
            Self::LabelHeight => "label_height",
            Self::BarcodeWidth => "barcode_width",
            Self::BarcodeHeight => "barcode_height",
            Self::LogoWidth => "logo_width",
            Self::LogoHeight => "logo_height",
        }
    }

    /// Clamp a raw (possibly negative) value into range.
    pub fn clamp(self, value: i64) -> u32 {
        let range = self.range();
        value.clamp(*range.start() as i64, *range.end() as i64) as u32
    }

    pub fn contains(self, value: u32) -> bool {
        self.range().contains(&value)
    }

    pub fn get(self, style: &LayoutStyle) -> u32 {
        match self {
            Self::FontSize => style.font_size,
            Self::LabelWidth => style.label_width,
            Self::LabelHeight => style.label_height,
            Self::BarcodeWidth => style.barcode_width,
            Self::BarcodeHeight => style.barcode_height,
            Self::LogoWidth => style.logo_width,
            Self::LogoHeight => style.logo_height,
        }
    }

    pub fn set(self, style: &mut LayoutStyle, value: u32) {
        let slot = match self {
            Self::FontSize => &mut style.font_size,
            Self::LabelWidth => &mut style.label_width,
            Self::LabelHeight => &mut style.label_height,
            Self::BarcodeWidth => &mut style.barcode_width,
            Self::BarcodeHeight => &mut style.barcode_height,
            Self::LogoWidth => &mut style.logo_width,
            Self::LogoHeight => &mut style.logo_height,
        };
        *slot = value;
    }
}

/// Record of a value pulled back into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clamped {
    pub field: NumericField,
    pub requested: i64,
    pub applied: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(NumericField::FontSize.clamp(30), 16);
        assert_eq!(NumericField::FontSize.clamp(-4), 8);
        assert_eq!(NumericField::FontSize.clamp(11), 11);
        assert_eq!(NumericField::BarcodeHeight.clamp(1000), 80);
        assert_eq!(NumericField::LogoHeight.clamp(0), 30);
    }

    #[test]
    fn test_defaults_are_in_range() {
        let style = LayoutStyle::default();
        for field in NumericField::ALL {
            assert!(
                field.contains(field.get(&style)),
                "{} default out of range",
                field.name()
            );
        }
    }

    #[test]
    fn test_get_set() {
        let mut style = LayoutStyle::default();
        NumericField::LabelHeight.set(&mut style, 700);
        assert_eq!(style.label_height, 700);
        assert_eq!(NumericField::LabelHeight.get(&style), 700);
    }
}
