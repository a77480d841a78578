//! Regions of a page and the body's span/flow structure.

use serde::{Deserialize, Serialize};

use super::{Block, Ctm, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionName {
    Before,
    Start,
    Body,
    End,
    After,
}

impl RegionName {
    pub const ALL: [RegionName; 5] = [
        RegionName::Before,
        RegionName::Start,
        RegionName::Body,
        RegionName::End,
        RegionName::After,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// The visible window of a region on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionViewport {
    pub name: RegionName,
    /// Absolute position on the page.
    pub view_area: Rect,
    pub clip: bool,
    pub region: RegionReference,
}

impl RegionViewport {
    /// Same geometry, no content.
    pub fn copy_template(&self) -> RegionViewport {
        RegionViewport {
            name: self.name,
            view_area: self.view_area,
            clip: self.clip,
            region: self.region.copy_template(),
        }
    }
}

/// The reference area inside a viewport, with its own coordinate system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReference {
    pub ctm: Ctm,
    pub ipd: i32,
    pub bpd: i32,
    pub content: RegionContent,
}

impl RegionReference {
    pub fn copy_template(&self) -> RegionReference {
        RegionReference {
            ctm: self.ctm,
            ipd: self.ipd,
            bpd: self.bpd,
            content: match &self.content {
                RegionContent::Static(_) => RegionContent::Static(Vec::new()),
                RegionContent::Body(body) => RegionContent::Body(body.copy_template()),
            },
        }
    }

    pub fn blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.content {
            RegionContent::Static(blocks) => Some(blocks),
            RegionContent::Body(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegionContent {
    Static(Vec<Block>),
    Body(BodyRegion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRegion {
    pub column_count: usize,
    pub column_gap: i32,
    pub before_float: Vec<Block>,
    pub main: MainReference,
    pub footnote: Vec<Block>,
}

impl BodyRegion {
    /// A body with one span of `column_count` empty flows.
    pub fn new(ipd: i32, bpd: i32, column_count: usize, column_gap: i32) -> Self {
        let column_count = column_count.max(1);
        Self {
            column_count,
            column_gap,
            before_float: Vec::new(),
            main: MainReference {
                spans: vec![Span::new(ipd, bpd, column_count, column_gap)],
            },
            footnote: Vec::new(),
        }
    }

    /// Geometry kept, floats, footnotes and flow content dropped.
    pub fn copy_template(&self) -> BodyRegion {
        BodyRegion {
            column_count: self.column_count,
            column_gap: self.column_gap,
            before_float: Vec::new(),
            main: MainReference {
                spans: self.main.spans.iter().map(Span::copy_template).collect(),
            },
            footnote: Vec::new(),
        }
    }

    pub fn footnote_height(&self) -> i32 {
        self.footnote.iter().map(|b| b.bpd).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReference {
    pub spans: Vec<Span>,
}

/// A band of the main reference area with a fixed column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub ipd: i32,
    pub bpd: i32,
    pub flows: Vec<Flow>,
}

impl Span {
    pub fn new(ipd: i32, bpd: i32, columns: usize, gap: i32) -> Self {
        let columns = columns.max(1) as i32;
        let width = (ipd - gap * (columns - 1)) / columns;
        Self {
            ipd,
            bpd,
            flows: (0..columns)
                .map(|i| Flow {
                    x_offset: i * (width + gap),
                    ipd: width,
                    blocks: Vec::new(),
                })
                .collect(),
        }
    }

    fn copy_template(&self) -> Span {
        Span {
            ipd: self.ipd,
            bpd: self.bpd,
            flows: self
                .flows
                .iter()
                .map(|f| Flow {
                    x_offset: f.x_offset,
                    ipd: f.ipd,
                    blocks: Vec::new(),
                })
                .collect(),
        }
    }
}

/// One column of normal flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub x_offset: i32,
    pub ipd: i32,
    pub blocks: Vec<Block>,
}

impl Flow {
    pub fn used_height(&self) -> i32 {
        self.blocks
            .iter()
            .filter(|b| b.positioning != super::Positioning::Absolute)
            .map(|b| b.bpd)
            .sum()
    }
}
