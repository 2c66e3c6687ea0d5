//! Field-level edits applied to a layout draft.
//!
//! The editor UI addresses fields by string key (`"headerColor"`,
//! `"font_size"`, ...). [`FieldEdit::parse`] turns such a key/value pair into
//! a typed edit; unknown keys and mistyped values are rejected.

use serde_json::Value;

use super::range::{Clamped, NumericField};
use super::types::{FontFamily, LogoPosition};
use super::{LayoutDraft, LayoutStyle};
use crate::error::{EtiketError, Result};

/// Colour slots of a layout style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Header,
    Text,
    Border,
    Background,
    Footer,
}

impl ColorField {
    fn slot(self, style: &mut LayoutStyle) -> &mut String {
        match self {
            Self::Header => &mut style.header_color,
            Self::Text => &mut style.text_color,
            Self::Border => &mut style.border_color,
            Self::Background => &mut style.background_color,
            Self::Footer => &mut style.footer_color,
        }
    }
}

/// Independent content toggles of a layout style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Logo,
    BarcodeText,
    ShipmentType,
    PaymentType,
    Sender,
    Receiver,
    LineItems,
    Weight,
    PackageInfo,
    AgreementType,
}

impl Toggle {
    fn slot(self, style: &mut LayoutStyle) -> &mut bool {
        match self {
            Self::Logo => &mut style.show_logo,
            Self::BarcodeText => &mut style.show_barcode_text,
            Self::ShipmentType => &mut style.show_shipment_type,
            Self::PaymentType => &mut style.show_payment_type,
            Self::Sender => &mut style.show_sender,
            Self::Receiver => &mut style.show_receiver,
            Self::LineItems => &mut style.show_line_items,
            Self::Weight => &mut style.show_weight,
            Self::PackageInfo => &mut style.show_package_info,
            Self::AgreementType => &mut style.show_agreement_type,
        }
    }
}

/// One typed edit to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    /// Raw numeric value; clamped into range when applied.
    Numeric(NumericField, i64),
    FontFamily(FontFamily),
    Color(ColorField, String),
    Toggle(Toggle, bool),
    LogoUrl(String),
    LogoPosition(LogoPosition),
    FooterText(String),
}

impl FieldEdit {
    /// Parse a UI key/value pair. Keys match case-insensitively with
    /// underscores ignored, so `headerColor` and `header_color` are the same.
    pub fn parse(key: &str, value: &Value) -> Result<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let numeric = |field| as_number(key, value).map(|n| FieldEdit::Numeric(field, n));
        let color = |slot| as_string(key, value).map(|s| FieldEdit::Color(slot, s));
        let toggle = |slot| as_bool(key, value).map(|b| FieldEdit::Toggle(slot, b));

        match normalized.as_str() {
            "name" => as_string(key, value).map(FieldEdit::Name),
            "fontsize" => numeric(NumericField::FontSize),
            "labelwidth" => numeric(NumericField::LabelWidth),
            "labelheight" => numeric(NumericField::LabelHeight),
            "barcodewidth" => numeric(NumericField::BarcodeWidth),
            "barcodeheight" => numeric(NumericField::BarcodeHeight),
            "logowidth" => numeric(NumericField::LogoWidth),
            "logoheight" => numeric(NumericField::LogoHeight),
            "fontfamily" => {
                let name = as_string(key, value)?;
                FontFamily::parse(&name)
                    .map(FieldEdit::FontFamily)
                    .ok_or_else(|| EtiketError::validation(key, format!("unknown font family '{}'", name)))
            }
            "headercolor" => color(ColorField::Header),
            "textcolor" => color(ColorField::Text),
            "bordercolor" => color(ColorField::Border),
            "backgroundcolor" => color(ColorField::Background),
            "footercolor" => color(ColorField::Footer),
            "showlogo" => toggle(Toggle::Logo),
            "showbarcodetext" => toggle(Toggle::BarcodeText),
            "showshipmenttype" => toggle(Toggle::ShipmentType),
            "showpaymenttype" => toggle(Toggle::PaymentType),
            "showsender" => toggle(Toggle::Sender),
            "showreceiver" => toggle(Toggle::Receiver),
            "showlineitems" | "showitems" => toggle(Toggle::LineItems),
            "showweight" | "showvolumetric" => toggle(Toggle::Weight),
            "showpackageinfo" => toggle(Toggle::PackageInfo),
            "showagreementtype" => toggle(Toggle::AgreementType),
            "logourl" => as_string(key, value).map(FieldEdit::LogoUrl),
            "logoposition" => {
                let pos = as_string(key, value)?;
                LogoPosition::parse(&pos)
                    .map(FieldEdit::LogoPosition)
                    .ok_or_else(|| EtiketError::validation(key, format!("unknown logo position '{}'", pos)))
            }
            "footertext" => as_string(key, value).map(FieldEdit::FooterText),
            _ => Err(EtiketError::validation(key, "unknown layout field")),
        }
    }

    /// Apply this edit to a draft. Returns the clamp record when a numeric
    /// value had to be pulled into range.
    pub fn apply(self, draft: &mut LayoutDraft) -> Option<Clamped> {
        let style = &mut draft.style;
        match self {
            Self::Name(name) => draft.name = name,
            Self::Numeric(field, requested) => {
                let applied = field.clamp(requested);
                field.set(style, applied);
                if applied as i64 != requested {
                    return Some(Clamped {
                        field,
                        requested,
                        applied,
                    });
                }
            }
            Self::FontFamily(family) => style.font_family = family,
            Self::Color(slot, value) => *slot.slot(style) = value,
            Self::Toggle(slot, on) => *slot.slot(style) = on,
            Self::LogoUrl(url) => style.logo_url = url,
            Self::LogoPosition(pos) => style.logo_position = pos,
            Self::FooterText(text) => style.footer_text = text,
        }
        None
    }
}

fn as_number(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| EtiketError::validation(key, "not a finite number")),
        // Form inputs deliver numbers as strings
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.round() as i64)
            .map_err(|_| EtiketError::validation(key, format!("'{}' is not a number", s))),
        other => Err(EtiketError::validation(key, format!("expected a number, got {}", other))),
    }
}

fn as_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(EtiketError::validation(key, format!("expected a string, got {}", other))),
    }
}

fn as_bool(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(EtiketError::validation(key, format!("expected a boolean, got {}", other))),
    }
}
