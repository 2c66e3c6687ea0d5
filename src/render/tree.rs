//! Visual tree produced by the renderer.
//!
//! The tree is a layout description, not pixels: a print/export surface
//! walks it to produce a PDF or PNG, and the editor serialises it to drive
//! the live preview.

use serde::Serialize;

use crate::barcode::{EncodingError, RenderableSymbol};
use crate::layout::FontFamily;

/// Horizontal alignment inside a column or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A run of text with its resolved style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub content: String,
    pub color: String,
    /// Font size in points.
    pub size: u32,
    pub bold: bool,
    pub align: Align,
}

/// A node of the visual tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Children laid out side by side.
    Row { children: Vec<Node> },
    /// Children stacked top to bottom. `width: None` takes the remaining space.
    Column {
        align: Align,
        width: Option<u32>,
        children: Vec<Node>,
    },
    Text(TextNode),
    Image { url: String, width: u32, height: u32 },
    /// Dashed box reserving space for content that is not there yet.
    Placeholder {
        width: u32,
        height: u32,
        caption: String,
    },
    /// Barcode slot; `symbol` is `None` when encoding failed.
    Barcode {
        width: u32,
        height: u32,
        symbol: Option<RenderableSymbol>,
    },
}

impl Node {
    /// Visit this node and every descendant, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Node::Row { children } | Node::Column { children, .. } = self {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

/// Fixed label sections, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    TopRow,
    ShipmentPayment,
    SenderReceiver,
    LineItems,
    FooterMeta,
    FooterLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub content: Node,
}

/// Non-fatal problems found while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDiagnostic {
    /// The barcode could not be encoded; its region is rendered empty.
    Barcode { error: EncodingError },
}

/// A rendered label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualTree {
    pub width: u32,
    pub height: u32,
    pub font_family: FontFamily,
    pub font_size: u32,
    pub background_color: String,
    pub border_color: String,
    pub sections: Vec<Section>,
    pub diagnostics: Vec<RenderDiagnostic>,
}

impl VisualTree {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Every node in the tree, in document order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.content.walk(&mut |n| out.push(n));
        }
        out
    }

    /// Every text run in the tree, in document order.
    pub fn texts(&self) -> Vec<&TextNode> {
        self.nodes()
            .into_iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// The first text run with exactly this content.
    pub fn find_text(&self, content: &str) -> Option<&TextNode> {
        self.texts().into_iter().find(|t| t.content == content)
    }

    /// The encoded barcode, if encoding succeeded.
    pub fn barcode_symbol(&self) -> Option<&RenderableSymbol> {
        self.nodes().into_iter().find_map(|n| match n {
            Node::Barcode { symbol, .. } => symbol.as_ref(),
            _ => None,
        })
    }

    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
