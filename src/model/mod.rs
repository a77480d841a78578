//! # Document Model
//!
//! The input to the engine: a tree of formatting objects whose properties
//! have already been parsed. Documents deserialize from JSON, with node
//! kinds tagged by `"type"` and fields in camelCase.
//!
//! A document is a list of page sequences. Each sequence names the page
//! geometry it flows into, optional static content for the side regions,
//! and the flow itself.

use serde::{Deserialize, Serialize};

use crate::font::FontSource;
use crate::style::Style;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub metadata: Metadata,
    /// Embedded faces, registered before layout.
    #[serde(default)]
    pub fonts: Vec<FontSource>,
    /// The document outline. Each entry points at an id.
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    pub page_sequences: Vec<PageSequence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub title: String,
    pub ref_id: String,
    #[serde(default)]
    pub children: Vec<Bookmark>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSequence {
    #[serde(default)]
    pub master: PageMaster,
    pub title: Option<String>,
    /// First page number of the sequence. Continues from the previous
    /// sequence when unset.
    pub initial_page_number: Option<usize>,
    /// Inherited by everything in the sequence.
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub static_content: StaticContent,
    pub flow: Vec<Node>,
}

/// Content repeated on every page, per side region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticContent {
    #[serde(default)]
    pub before: Vec<Node>,
    #[serde(default)]
    pub after: Vec<Node>,
    #[serde(default)]
    pub start: Vec<Node>,
    #[serde(default)]
    pub end: Vec<Node>,
}

impl StaticContent {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty() && self.start.is_empty() && self.end.is_empty()
    }
}

/// Page geometry, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMaster {
    pub width: f64,
    pub height: f64,
    /// Page margins around the region area.
    pub margin: Edges,
    /// Margins of the body region inside the region area.
    pub body_margin: Edges,
    pub region_before_extent: f64,
    pub region_after_extent: f64,
    pub region_start_extent: f64,
    pub region_end_extent: f64,
    pub column_count: usize,
    pub column_gap: f64,
    /// Rotation of the body reference area: 0, 90, 180 or 270 (or negative).
    pub reference_orientation: i32,
    pub writing_mode: WritingMode,
}

impl Default for PageMaster {
    fn default() -> Self {
        // A4
        Self {
            width: 595.28,
            height: 841.89,
            margin: Edges::uniform(54.0),
            body_margin: Edges::default(),
            region_before_extent: 0.0,
            region_after_extent: 0.0,
            region_start_extent: 0.0,
            region_end_extent: 0.0,
            column_count: 1,
            column_gap: 12.0,
            reference_orientation: 0,
            writing_mode: WritingMode::LrTb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WritingMode {
    #[default]
    LrTb,
    RlTb,
    TbRl,
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<Node>,
    /// Target for page-number citations, links and bookmarks.
    #[serde(default)]
    pub id: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            children: Vec::new(),
            id: None,
        }
    }

    pub fn text(content: &str) -> Self {
        Self::new(NodeKind::Text {
            content: content.to_string(),
        })
    }

    pub fn block(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(NodeKind::Block)
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::Block)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// A block: stacks its children vertically, wrapping inline content into lines.
    Block,
    /// A run of text.
    Text { content: String },
    /// An inline wrapper that only contributes style.
    Inline,
    /// An inline wrapper whose content links somewhere.
    #[serde(rename_all = "camelCase")]
    BasicLink {
        internal_destination: Option<String>,
        external_destination: Option<String>,
    },
    Leader,
    /// The number of the current page.
    PageNumber,
    /// The number of the page where `refId` is defined.
    #[serde(rename_all = "camelCase")]
    PageNumberCitation { ref_id: String },
    Character { character: char },
    /// A fixed-size inline box, in points.
    ExternalGraphic {
        src: Option<String>,
        width: f64,
        height: f64,
    },
    /// The children form the inline citation; `body` is placed at the foot of the page.
    Footnote { body: Vec<Node> },
    /// Content retrievable from static regions of the pages this block lands on.
    #[serde(rename_all = "camelCase")]
    Marker { class_name: String },
    #[serde(rename_all = "camelCase")]
    RetrieveMarker {
        class_name: String,
        #[serde(default)]
        position: RetrievePosition,
    },
    /// Force a page break.
    PageBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetrievePosition {
    #[default]
    FirstStartingWithinPage,
    FirstIncludingCarryover,
    LastStartingWithinPage,
    LastEndingWithinPage,
}
