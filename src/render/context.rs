//! Shipment data a label is rendered against.
//!
//! At print time this comes from a real shipment; the editor preview uses
//! [`ShipmentRenderContext::mock`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

const MOCK_CREATED_AT: &str = "2024-05-14T14:30:00+03:00";

/// Receiver block of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub name: String,
    pub address: String,
    pub district: String,
    pub city: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Position of this parcel in a multi-parcel shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub index: u32,
    pub total: u32,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self { index: 1, total: 1 }
    }
}

/// Everything a label shows about one shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRenderContext {
    /// Reference/tracking code; also the barcode payload.
    pub reference: String,
    pub shipment_type: String,
    pub payment_type: String,
    /// Shipment creation time, shown in its own UTC offset.
    pub created_at: DateTime<FixedOffset>,
    pub sender_name: String,
    pub receiver: Receiver,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Weight or volumetric (desi) value.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub package: PackageInfo,
    #[serde(default)]
    pub agreement_type: String,
}

impl ShipmentRenderContext {
    /// Fixed sample shipment used by the editor preview.
    pub fn mock() -> Self {
        Self {
            reference: "KRG2024051400123".into(),
            shipment_type: "STANDART KARGO".into(),
            payment_type: "GÖNDERİCİ ÖDEMELİ".into(),
            created_at: DateTime::parse_from_rfc3339(MOCK_CREATED_AT).unwrap_or_default(),
            sender_name: "Örnek Mağaza".into(),
            receiver: Receiver {
                name: "Ayşe Yılmaz".into(),
                address: "Atatürk Cad. No: 12 D: 4".into(),
                district: "Kadıköy".into(),
                city: "İstanbul".into(),
                phone: "0532 123 45 67".into(),
            },
            items: vec![
                LineItem::new("Pamuklu Tişört", 2),
                LineItem::new("Kot Pantolon", 1),
            ],
            weight: 2.5,
            package: PackageInfo::default(),
            agreement_type: "ANLAŞMALI".into(),
        }
    }

    /// Mock context with a different reference code.
    pub fn mock_with_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::mock()
        }
    }

    /// Number of distinct item names.
    pub fn distinct_item_count(&self) -> usize {
        let mut names: Vec<&str> = self.items.iter().map(|i| i.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}
