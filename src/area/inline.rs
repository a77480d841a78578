//! Inline areas: the children of a line.

use serde::{Deserialize, Serialize};

use super::{PageRef, Rect};
use crate::font::FontRef;
use crate::style::{Color, Decoration, RuleStyle, VerticalAlign};

/// Text placeholder of a citation whose target page is not known yet.
pub const UNRESOLVED_PAGE_TEXT: &str = "?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InlineArea {
    Word(WordArea),
    Space(InlineSpace),
    Leader(LeaderArea),
    PageNumber(PageNumberArea),
    Graphic(GraphicArea),
}

impl InlineArea {
    /// Advance along the line.
    pub fn width(&self) -> i32 {
        match self {
            InlineArea::Word(w) => w.width,
            InlineArea::Space(s) => s.size,
            InlineArea::Leader(l) => l.length,
            InlineArea::PageNumber(p) => p.width,
            InlineArea::Graphic(g) => g.width,
        }
    }

    pub fn height(&self) -> i32 {
        match self {
            InlineArea::Word(w) => w.height,
            InlineArea::Space(_) => 0,
            InlineArea::Leader(l) => l.thickness,
            InlineArea::PageNumber(p) => p.height,
            InlineArea::Graphic(g) => g.height,
        }
    }

    pub fn vertical_align(&self) -> VerticalAlign {
        match self {
            InlineArea::Word(w) => w.vertical_align,
            InlineArea::Graphic(g) => g.vertical_align,
            _ => VerticalAlign::Baseline,
        }
    }

    pub fn set_y_offset(&mut self, offset: i32) {
        match self {
            InlineArea::Word(w) => w.y_offset = offset,
            InlineArea::Leader(l) => l.y_offset = offset,
            InlineArea::PageNumber(p) => p.y_offset = offset,
            InlineArea::Graphic(g) => g.y_offset = offset,
            InlineArea::Space(_) => {}
        }
    }

    /// Index of the line link this area belongs to.
    pub fn link(&self) -> Option<usize> {
        match self {
            InlineArea::Word(w) => w.link,
            InlineArea::Space(s) => s.link,
            InlineArea::Leader(l) => l.link,
            InlineArea::PageNumber(p) => p.link,
            InlineArea::Graphic(g) => g.link,
        }
    }

    pub fn set_link(&mut self, link: Option<usize>) {
        match self {
            InlineArea::Word(w) => w.link = link,
            InlineArea::Space(s) => s.link = link,
            InlineArea::Leader(l) => l.link = link,
            InlineArea::PageNumber(p) => p.link = link,
            InlineArea::Graphic(g) => g.link = link,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InlineArea::Word(w) => Some(&w.text),
            InlineArea::PageNumber(p) => Some(&p.text),
            _ => None,
        }
    }

    pub fn as_space(&self) -> Option<&InlineSpace> {
        match self {
            InlineArea::Space(s) => Some(s),
            _ => None,
        }
    }
}

/// A run of glyphs in one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordArea {
    pub text: String,
    pub width: i32,
    /// Ascender minus descender of the font.
    pub height: i32,
    pub font: FontRef,
    pub color: Color,
    #[serde(default)]
    pub decoration: Decoration,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    /// Baseline offset from the top of the line.
    pub y_offset: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
}

/// White space between inline areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSpace {
    pub size: i32,
    /// Justification may widen it.
    pub resizeable: bool,
    /// Dropped when it would start a line.
    pub eatable: bool,
    #[serde(default)]
    pub decoration: Decoration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
}

impl InlineSpace {
    pub fn new(size: i32) -> Self {
        Self {
            size,
            resizeable: true,
            eatable: false,
            decoration: Decoration::default(),
            link: None,
        }
    }

    /// A space justification leaves alone.
    pub fn fixed(size: i32) -> Self {
        Self {
            resizeable: false,
            ..Self::new(size)
        }
    }
}

/// A rule leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderArea {
    pub length: i32,
    pub thickness: i32,
    pub rule_style: RuleStyle,
    pub color: Color,
    pub y_offset: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
}

/// The page number of an id, filled in once the id is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNumberArea {
    pub ref_id: String,
    pub text: String,
    /// Reserved when the area was created. Resolution does not relayout.
    pub width: i32,
    pub height: i32,
    pub font: FontRef,
    pub color: Color,
    #[serde(default)]
    pub decoration: Decoration,
    pub y_offset: i32,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
}

impl PageNumberArea {
    /// Fill in the page number. `None` means the id never turned up; the
    /// placeholder stays.
    pub fn resolve(&mut self, pages: Option<&[PageRef]>) {
        if let Some(first) = pages.and_then(|p| p.first()) {
            self.text = first.number.clone();
        } else {
            log::warn!("page-number-citation: id '{}' was never placed", self.ref_id);
        }
        self.resolved = true;
    }
}

/// A fixed-size inline box such as an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicArea {
    pub src: Option<String>,
    pub width: i32,
    pub height: i32,
    pub y_offset: i32,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// Destination is an id in this document.
    Internal,
    /// Destination is a URI.
    External,
}

/// A link and the rectangles it covers on one line, relative to the line's
/// content origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    pub destination: String,
    pub kind: LinkKind,
    pub rects: Vec<Rect>,
}

impl LinkSet {
    pub fn new(destination: &str, kind: LinkKind) -> Self {
        Self {
            destination: destination.to_string(),
            kind,
            rects: Vec::new(),
        }
    }

    pub fn add_rect(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    /// Merge rectangles that touch or overlap on the same row.
    pub fn merge_links(&mut self) {
        self.rects.sort_by_key(|r| (r.y, r.x));
        let mut merged: Vec<Rect> = Vec::with_capacity(self.rects.len());
        for r in self.rects.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.y == r.y && last.height == r.height && r.x <= last.right() {
                    let right = last.right().max(r.right());
                    last.width = right - last.x;
                    continue;
                }
            }
            merged.push(r);
        }
        self.rects = merged;
    }
}
