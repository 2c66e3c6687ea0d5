//! # Etiket - Shipping Label Layout Engine
//!
//! Etiket models, renders and stores the visual layout of shipping labels.
//! It provides:
//!
//! - **Layout model**: typed label styles with ranges, safe defaults and backfill
//! - **Barcodes**: Code128 encoding through `barcoders`
//! - **Rendering**: a pure layout + shipment → visual tree function
//! - **Repository**: named layouts per owner scope with one default each
//! - **Editor**: a draft-based controller with live preview
//!
//! ## Quick Start
//!
//! ```
//! use etiket::layout::{FieldEdit, LayoutDraft, LogoPosition};
//! use etiket::render::{self, SectionKind, ShipmentRenderContext};
//!
//! let mut draft = LayoutDraft::new("Retail Label");
//! FieldEdit::LogoPosition(LogoPosition::None).apply(&mut draft);
//!
//! let ctx = ShipmentRenderContext::mock_with_reference("ABC123");
//! let tree = render::render(&draft.style, &ctx);
//!
//! assert_eq!(tree.sections[0].kind, SectionKind::TopRow);
//! assert_eq!(tree.barcode_symbol().map(|s| s.payload.as_str()), Some("ABC123"));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Layout configuration model |
//! | [`barcode`] | Symbol encoder adapter |
//! | [`render`] | Layout renderer and visual tree |
//! | [`repository`] | Layout and logo storage |
//! | [`editor`] | Editor controller |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod barcode;
pub mod editor;
pub mod error;
pub mod layout;
pub mod render;
pub mod repository;
pub mod server;

// Re-exports for convenience
pub use error::EtiketError;
pub use layout::{LayoutConfiguration, LayoutDraft, LayoutStyle, OwnerScope};
pub use render::{ShipmentRenderContext, VisualTree};
