//! # Area Tree
//!
//! The geometric output of layout. A page owns up to five region viewports;
//! each wraps a reference area with its own coordinate system (see
//! [`Ctm`]); the body region holds spans of per-column flows; flows hold
//! blocks; blocks hold lines and nested blocks; lines hold inline areas.
//!
//! Children own their subtree. There are no parent pointers: the layout
//! keeps the stack of open blocks itself and answers "how much room is left
//! above me" from that stack.
//!
//! Everything here serializes, because a page is the unit of caching.
//! Lengths are millipoints.

pub mod block;
pub mod cache;
pub mod ctm;
pub mod extension;
pub mod inline;
pub mod model;
pub mod page;
pub mod region;
pub mod resolve;
pub mod tree;

pub use block::{Block, BlockChild, Line, Positioning};
pub use ctm::Ctm;
pub use cache::{PageCache, PageStash, ResidentPages};
pub use extension::{ExtensionTiming, Outline, OutlineItem, TreeExtension};
pub use inline::{
    GraphicArea, InlineArea, InlineSpace, LeaderArea, LinkKind, LinkSet, PageNumberArea, WordArea,
    UNRESOLVED_PAGE_TEXT,
};
pub use model::{AreaTreeModel, CachedRenderPagesModel, RenderPagesModel, StorePagesModel};
pub use page::{Markers, Page, PageKey, PageViewport};
pub use region::{BodyRegion, Flow, MainReference, RegionContent, RegionName, RegionReference, RegionViewport, Span};
pub use resolve::{PageRef, Resolvable};
pub use tree::{AreaStore, AreaTree, Consumer};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::style::{BoxEdges, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Shrink by the given edges.
    pub fn inset(&self, edges: &BoxEdges) -> Rect {
        Rect::new(
            self.x + edges.start,
            self.y + edges.before,
            (self.width - edges.inline()).max(0),
            (self.height - edges.block()).max(0),
        )
    }
}

/// Which part of the page an area belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaClass {
    #[default]
    Normal,
    Fixed,
    Absolute,
    BeforeFloat,
    Footnote,
    SideFloat,
}

/// Renderer-visible attributes of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraitKey {
    Id,
    BackgroundColor,
    BorderBefore,
    BorderAfter,
    BorderStart,
    BorderEnd,
    PaddingBefore,
    PaddingAfter,
    PaddingStart,
    PaddingEnd,
    /// This fragment continues a block started on an earlier page.
    IsContinuation,
    /// The block continues on a later page.
    IsContinued,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraitValue {
    Text(String),
    Length(i32),
    Color(Color),
    Border { width: i32, color: Color },
    Flag(bool),
}

pub type Traits = BTreeMap<TraitKey, TraitValue>;

/// Common capability of every area.
pub trait Area {
    fn class(&self) -> AreaClass {
        AreaClass::Normal
    }
    /// Inline-progression dimension.
    fn ipd(&self) -> i32;
    /// Block-progression dimension.
    fn bpd(&self) -> i32;
    fn traits(&self) -> Option<&Traits> {
        None
    }

    fn trait_value(&self, key: TraitKey) -> Option<&TraitValue> {
        self.traits().and_then(|t| t.get(&key))
    }
}
