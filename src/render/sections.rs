//! Builders for the fixed label sections.
//!
//! Each builder returns `None` when its toggles hide the section entirely.

use super::context::ShipmentRenderContext;
use super::tree::{Align, Node, TextNode};
use crate::barcode::{EncodeOptions, EncodingError, SymbolEncoder, Symbology};
use crate::layout::{LayoutStyle, LogoPosition};

/// Caption of the dashed box shown when a logo is enabled but not uploaded.
pub const LOGO_PLACEHOLDER_CAPTION: &str = "Logo Alanı";

/// Display format of the shipment creation timestamp.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Smallest font the footer line shrinks to.
const MIN_FOOTER_FONT: u32 = 6;

fn header(style: &LayoutStyle, content: impl Into<String>, align: Align) -> Node {
    Node::Text(TextNode {
        content: content.into(),
        color: style.header_color.clone(),
        size: style.font_size,
        bold: true,
        align,
    })
}

fn body(style: &LayoutStyle, content: impl Into<String>, align: Align) -> Node {
    Node::Text(TextNode {
        content: content.into(),
        color: style.text_color.clone(),
        size: style.font_size,
        bold: false,
        align,
    })
}

fn column(align: Align, children: Vec<Node>) -> Node {
    Node::Column {
        align,
        width: None,
        children,
    }
}

/// Options the barcode is encoded with: the label palette and barcode box.
pub fn encode_options(style: &LayoutStyle) -> EncodeOptions {
    EncodeOptions {
        symbology: Symbology::Code128,
        width_px: style.barcode_width,
        height_px: style.barcode_height,
        foreground: style.text_color.clone(),
        background: style.background_color.clone(),
    }
}

/// Logo beside the barcode. The barcode column is always present so every
/// layout keeps the same top-row height.
pub fn top_row(
    style: &LayoutStyle,
    ctx: &ShipmentRenderContext,
    encoder: &dyn SymbolEncoder,
) -> (Node, Option<EncodingError>) {
    let mut children = Vec::with_capacity(2);

    if style.logo_visible() {
        let align = match style.logo_position {
            LogoPosition::Center => Align::Center,
            LogoPosition::Right => Align::Right,
            LogoPosition::Left | LogoPosition::None => Align::Left,
        };
        let logo = if style.logo_url.trim().is_empty() {
            Node::Placeholder {
                width: style.logo_width,
                height: style.logo_height,
                caption: LOGO_PLACEHOLDER_CAPTION.into(),
            }
        } else {
            Node::Image {
                url: style.logo_url.clone(),
                width: style.logo_width,
                height: style.logo_height,
            }
        };
        children.push(column(align, vec![logo]));
    }

    let (symbol, error) = match encoder.encode(&ctx.reference, &encode_options(style)) {
        Ok(symbol) => (Some(symbol), None),
        Err(e) => (None, Some(e)),
    };

    let mut barcode_column = vec![Node::Barcode {
        width: style.barcode_width,
        height: style.barcode_height,
        symbol,
    }];
    if style.show_barcode_text {
        barcode_column.push(body(style, ctx.reference.clone(), Align::Center));
    }
    children.push(Node::Column {
        align: Align::Right,
        width: Some(style.barcode_width),
        children: barcode_column,
    });

    (Node::Row { children }, error)
}

pub fn shipment_payment(style: &LayoutStyle, ctx: &ShipmentRenderContext) -> Option<Node> {
    let mut children = Vec::new();
    if style.show_shipment_type {
        children.push(column(
            Align::Left,
            vec![
                header(style, "GÖNDERİ TİPİ", Align::Left),
                body(style, ctx.shipment_type.clone(), Align::Left),
            ],
        ));
    }
    if style.show_payment_type {
        children.push(column(
            Align::Right,
            vec![
                header(style, "ÖDEME TİPİ", Align::Right),
                body(style, ctx.payment_type.clone(), Align::Right),
                body(
                    style,
                    ctx.created_at.format(TIMESTAMP_FORMAT).to_string(),
                    Align::Right,
                ),
            ],
        ));
    }
    (!children.is_empty()).then_some(Node::Row { children })
}

pub fn sender_receiver(style: &LayoutStyle, ctx: &ShipmentRenderContext) -> Option<Node> {
    let mut children = Vec::new();
    if style.show_sender {
        children.push(column(
            Align::Left,
            vec![
                header(style, "GÖNDERİCİ", Align::Left),
                body(style, ctx.sender_name.clone(), Align::Left),
            ],
        ));
    }
    if style.show_receiver {
        let r = &ctx.receiver;
        children.push(column(
            Align::Left,
            vec![
                header(style, "ALICI", Align::Left),
                body(style, r.name.clone(), Align::Left),
                body(style, r.address.clone(), Align::Left),
                body(style, format!("{} - {}", r.district, r.city), Align::Left),
                body(style, r.phone.clone(), Align::Left),
            ],
        ));
    }
    (!children.is_empty()).then_some(Node::Row { children })
}

pub fn line_items(style: &LayoutStyle, ctx: &ShipmentRenderContext) -> Option<Node> {
    if !style.show_line_items {
        return None;
    }
    let mut children = vec![header(
        style,
        format!("ÜRÜNLER ({})", ctx.distinct_item_count()),
        Align::Left,
    )];
    for item in &ctx.items {
        children.push(Node::Row {
            children: vec![
                body(style, item.name.clone(), Align::Left),
                body(style, format!("{} Adet", item.quantity), Align::Right),
            ],
        });
    }
    Some(column(Align::Left, children))
}

/// Reference cell plus the optional weight, package and agreement cells.
pub fn footer_meta(style: &LayoutStyle, ctx: &ShipmentRenderContext) -> Node {
    let mut children = vec![body(style, format!("NO: {}", ctx.reference), Align::Left)];
    if style.show_weight {
        children.push(body(style, format!("KG/DS: {:.2}", ctx.weight), Align::Left));
    }
    if style.show_package_info {
        children.push(body(
            style,
            format!("PAKET: {}/{}", ctx.package.index, ctx.package.total),
            Align::Left,
        ));
    }
    if style.show_agreement_type {
        children.push(body(
            style,
            format!("ANLAŞMA: {}", ctx.agreement_type),
            Align::Left,
        ));
    }
    Node::Row { children }
}

pub fn footer_line(style: &LayoutStyle) -> Node {
    Node::Text(TextNode {
        content: style.footer_text.clone(),
        color: style.footer_color.clone(),
        size: style.font_size.saturating_sub(2).max(MIN_FOOTER_FONT),
        bold: false,
        align: Align::Right,
    })
}
