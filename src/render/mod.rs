//! # Label Renderer
//!
//! Pure transformation from a [`LayoutStyle`] and a [`ShipmentRenderContext`]
//! to a [`VisualTree`].
//!
//! ## Sections
//!
//! | Order | Section | Shown when |
//! |-------|---------|------------|
//! | 1 | Logo + barcode | always (logo iff `show_logo` and position is not `none`) |
//! | 2 | Shipment / payment type | either toggle |
//! | 3 | Sender / receiver | either toggle |
//! | 4 | Line items | `show_line_items` |
//! | 5 | Footer metadata | always (`NO:` cell plus optional cells) |
//! | 6 | Footer line | always |
//!
//! Rendering never fails. A payload the encoder rejects leaves the barcode
//! slot empty and adds a [`RenderDiagnostic`] to the tree.
//!
//! ```
//! use etiket::layout::LayoutStyle;
//! use etiket::render::{render, SectionKind, ShipmentRenderContext};
//!
//! let tree = render(&LayoutStyle::default(), &ShipmentRenderContext::mock());
//! assert_eq!(tree.sections[0].kind, SectionKind::TopRow);
//! assert!(tree.barcode_symbol().is_some());
//! ```

pub mod context;
mod sections;
mod tree;

pub use context::{LineItem, PackageInfo, Receiver, ShipmentRenderContext};
pub use sections::{LOGO_PLACEHOLDER_CAPTION, TIMESTAMP_FORMAT, encode_options};
pub use tree::{Align, Node, RenderDiagnostic, Section, SectionKind, TextNode, VisualTree};

use crate::barcode::{BarcodersEncoder, SymbolEncoder};
use crate::layout::LayoutStyle;

/// Renders layouts with a given symbol encoder.
#[derive(Debug, Clone, Default)]
pub struct Renderer<E = BarcodersEncoder> {
    encoder: E,
}

impl Renderer<BarcodersEncoder> {
    pub fn new() -> Self {
        Self {
            encoder: BarcodersEncoder,
        }
    }
}

impl<E: SymbolEncoder> Renderer<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    /// Render `style` against `ctx`. Identical inputs give identical trees.
    pub fn render(&self, style: &LayoutStyle, ctx: &ShipmentRenderContext) -> VisualTree {
        let mut out = Vec::with_capacity(6);
        let mut diagnostics = Vec::new();

        let (top, encode_error) = sections::top_row(style, ctx, &self.encoder);
        out.push(Section {
            kind: SectionKind::TopRow,
            content: top,
        });
        if let Some(error) = encode_error {
            diagnostics.push(RenderDiagnostic::Barcode { error });
        }

        let optional = [
            (SectionKind::ShipmentPayment, sections::shipment_payment(style, ctx)),
            (SectionKind::SenderReceiver, sections::sender_receiver(style, ctx)),
            (SectionKind::LineItems, sections::line_items(style, ctx)),
        ];
        for (kind, content) in optional {
            if let Some(content) = content {
                out.push(Section { kind, content });
            }
        }

        out.push(Section {
            kind: SectionKind::FooterMeta,
            content: sections::footer_meta(style, ctx),
        });
        out.push(Section {
            kind: SectionKind::FooterLine,
            content: sections::footer_line(style),
        });

        VisualTree {
            width: style.label_width,
            height: style.label_height,
            font_family: style.font_family,
            font_size: style.font_size,
            background_color: style.background_color.clone(),
            border_color: style.border_color.clone(),
            sections: out,
            diagnostics,
        }
    }
}

/// Render with the default `barcoders` encoder.
pub fn render(style: &LayoutStyle, ctx: &ShipmentRenderContext) -> VisualTree {
    Renderer::new().render(style, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::{EncodeOptions, EncodingError, RenderableSymbol};
    use crate::layout::LogoPosition;
    use pretty_assertions::assert_eq;

    fn ctx() -> ShipmentRenderContext {
        ShipmentRenderContext::mock_with_reference("ABC123")
    }

    fn all_kinds() -> Vec<SectionKind> {
        vec![
            SectionKind::TopRow,
            SectionKind::ShipmentPayment,
            SectionKind::SenderReceiver,
            SectionKind::LineItems,
            SectionKind::FooterMeta,
            SectionKind::FooterLine,
        ]
    }

    fn top_row_children(tree: &VisualTree) -> &[Node] {
        match &tree.section(SectionKind::TopRow).unwrap().content {
            Node::Row { children } => children,
            other => panic!("top row is not a row: {:?}", other),
        }
    }

    #[test]
    fn test_default_layout_renders_all_sections_in_order() {
        let tree = render(&LayoutStyle::default(), &ctx());
        assert_eq!(tree.section_kinds(), all_kinds());
        assert!(tree.diagnostics.is_empty());
        assert_eq!(tree.barcode_symbol().unwrap().payload, "ABC123");
        assert!(tree.find_text("ABC123").is_some());
    }

    #[test]
    fn test_logo_position_none_hides_logo() {
        let style = LayoutStyle {
            logo_position: LogoPosition::None,
            logo_url: "https://cdn.example/logo.png".into(),
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        let children = top_row_children(&tree);
        assert_eq!(children.len(), 1);
        assert!(
            !tree
                .nodes()
                .iter()
                .any(|n| matches!(n, Node::Image { .. } | Node::Placeholder { .. }))
        );
    }

    #[test]
    fn test_empty_logo_url_renders_placeholder() {
        let style = LayoutStyle {
            logo_width: 140,
            logo_height: 70,
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        let placeholder = tree.nodes().into_iter().find_map(|n| match n {
            Node::Placeholder {
                width,
                height,
                caption,
            } => Some((*width, *height, caption.clone())),
            _ => None,
        });
        assert_eq!(
            placeholder,
            Some((140, 70, LOGO_PLACEHOLDER_CAPTION.to_string()))
        );
    }

    #[test]
    fn test_uploaded_logo_aligned_per_position() {
        let style = LayoutStyle {
            logo_url: "https://cdn.example/logo.png".into(),
            logo_position: LogoPosition::Center,
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        let children = top_row_children(&tree);
        assert_eq!(children.len(), 2);
        match &children[0] {
            Node::Column {
                align, children, ..
            } => {
                assert_eq!(*align, Align::Center);
                assert_eq!(
                    children[0],
                    Node::Image {
                        url: "https://cdn.example/logo.png".into(),
                        width: 100,
                        height: 50
                    }
                );
            }
            other => panic!("unexpected logo node {:?}", other),
        }
    }

    #[test]
    fn test_barcode_column_reserved_without_logo_or_text() {
        let style = LayoutStyle {
            show_logo: false,
            show_barcode_text: false,
            barcode_width: 250,
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        let children = top_row_children(&tree);
        assert_eq!(children.len(), 1);
        match &children[0] {
            Node::Column {
                align,
                width,
                children,
            } => {
                assert_eq!(*align, Align::Right);
                assert_eq!(*width, Some(250));
                assert_eq!(children.len(), 1);
            }
            other => panic!("unexpected barcode column {:?}", other),
        }
    }

    #[test]
    fn test_colors_applied_verbatim() {
        let style = LayoutStyle {
            header_color: "#FF0000".into(),
            text_color: "#0a0b0c".into(),
            footer_color: "#123".into(),
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        assert_eq!(tree.find_text("ALICI").unwrap().color, "#FF0000");
        assert_eq!(tree.find_text("GÖNDERİ TİPİ").unwrap().color, "#FF0000");
        assert_eq!(tree.find_text("NO: ABC123").unwrap().color, "#0a0b0c");
        let footer = tree.find_text(&style.footer_text).unwrap();
        assert_eq!(footer.color, "#123");
        assert_eq!(footer.align, Align::Right);
        assert!(footer.size < style.font_size);
        assert_eq!(tree.barcode_symbol().unwrap().foreground, "#0a0b0c");
    }

    #[test]
    fn test_payment_column_shows_timestamp() {
        let tree = render(&LayoutStyle::default(), &ctx());
        assert!(tree.find_text("14/05/2024 14:30").is_some());
    }

    #[test]
    fn test_receiver_lines() {
        let tree = render(&LayoutStyle::default(), &ctx());
        let texts: Vec<&str> = tree.texts().iter().map(|t| t.content.as_str()).collect();
        let start = texts.iter().position(|t| *t == "ALICI").unwrap();
        assert_eq!(
            &texts[start + 1..start + 5],
            &[
                "Ayşe Yılmaz",
                "Atatürk Cad. No: 12 D: 4",
                "Kadıköy - İstanbul",
                "0532 123 45 67"
            ]
        );
    }

    #[test]
    fn test_line_items_header_counts_distinct_items() {
        let mut context = ctx();
        context.items = vec![
            LineItem::new("Kupa", 1),
            LineItem::new("Tabak", 4),
            LineItem::new("Kupa", 2),
        ];
        let tree = render(&LayoutStyle::default(), &context);
        assert!(tree.find_text("ÜRÜNLER (2)").is_some());
        assert!(tree.find_text("4 Adet").is_some());
        let rows = match &tree.section(SectionKind::LineItems).unwrap().content {
            Node::Column { children, .. } => children.len(),
            _ => 0,
        };
        assert_eq!(rows, 4);
    }

    #[test]
    fn test_toggles_hide_sections_and_cells() {
        let style = LayoutStyle {
            show_shipment_type: false,
            show_payment_type: false,
            show_line_items: false,
            show_weight: false,
            show_package_info: false,
            show_agreement_type: false,
            show_sender: false,
            ..Default::default()
        };
        let tree = render(&style, &ctx());
        assert_eq!(
            tree.section_kinds(),
            vec![
                SectionKind::TopRow,
                SectionKind::SenderReceiver,
                SectionKind::FooterMeta,
                SectionKind::FooterLine
            ]
        );
        match &tree.section(SectionKind::FooterMeta).unwrap().content {
            Node::Row { children } => assert_eq!(children.len(), 1),
            other => panic!("unexpected footer meta {:?}", other),
        }
        assert!(tree.find_text("GÖNDERİCİ").is_none());
    }

    #[test]
    fn test_footer_meta_cells() {
        let tree = render(&LayoutStyle::default(), &ctx());
        assert!(tree.find_text("KG/DS: 2.50").is_some());
        assert!(tree.find_text("PAKET: 1/1").is_some());
        assert!(tree.find_text("ANLAŞMA: ANLAŞMALI").is_some());
    }

    #[test]
    fn test_render_is_idempotent() {
        let style = LayoutStyle::default();
        let context = ctx();
        let a = render(&style, &context);
        let b = render(&style, &context);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_unencodable_reference_degrades() {
        let context = ShipmentRenderContext::mock_with_reference("");
        let tree = render(&LayoutStyle::default(), &context);
        assert_eq!(tree.section_kinds(), all_kinds());
        assert!(tree.barcode_symbol().is_none());
        assert_eq!(
            tree.diagnostics,
            vec![RenderDiagnostic::Barcode {
                error: EncodingError::EmptyPayload
            }]
        );
        assert!(
            tree.nodes()
                .iter()
                .any(|n| matches!(n, Node::Barcode { symbol: None, .. }))
        );
    }

    struct FixedEncoder;

    impl SymbolEncoder for FixedEncoder {
        fn encode(
            &self,
            payload: &str,
            options: &EncodeOptions,
        ) -> Result<RenderableSymbol, EncodingError> {
            Ok(RenderableSymbol::new(payload, options, vec![true, false, true]))
        }
    }

    #[test]
    fn test_custom_encoder_receives_geometry() {
        let style = LayoutStyle {
            barcode_width: 120,
            barcode_height: 40,
            ..Default::default()
        };
        let tree = Renderer::with_encoder(FixedEncoder).render(&style, &ctx());
        let symbol = tree.barcode_symbol().unwrap();
        assert_eq!(symbol.pattern, "101");
        assert_eq!((symbol.width_px, symbol.height_px), (120, 40));
    }
}
