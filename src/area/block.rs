//! Block and line areas.

use serde::{Deserialize, Serialize};

use super::{Area, AreaClass, InlineArea, LinkSet, TraitKey, TraitValue, Traits};

/// How a block is placed relative to its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Positioning {
    /// After the previous sibling in block-progression direction.
    #[default]
    Stack,
    /// Stacked, then shifted by its offsets without moving siblings.
    Relative,
    /// At its offsets from the parent's content origin, taking no space.
    Absolute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockChild {
    Block(Block),
    Line(Line),
    /// Display space in block-progression direction.
    Space { size: i32 },
}

impl BlockChild {
    /// Height this child takes in its parent's stack.
    pub fn extent(&self) -> i32 {
        match self {
            BlockChild::Block(b) if b.positioning == Positioning::Absolute => 0,
            BlockChild::Block(b) => b.bpd,
            BlockChild::Line(l) => l.bpd,
            BlockChild::Space { size } => *size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub class: AreaClass,
    pub positioning: Positioning,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Allocation width.
    pub ipd: i32,
    /// Total height, padding and borders included.
    pub bpd: i32,
    pub start_indent: i32,
    pub end_indent: i32,
    pub traits: Traits,
    pub children: Vec<BlockChild>,
}

impl Block {
    pub fn new(ipd: i32) -> Self {
        Self {
            ipd,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Display space between blocks of a flow.
    pub fn spacer(size: i32) -> Self {
        Self {
            bpd: size,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self.traits.get(&TraitKey::Id) {
            Some(TraitValue::Text(id)) => Some(id),
            _ => None,
        }
    }

    pub fn add_child(&mut self, child: BlockChild) {
        self.bpd += child.extent();
        self.children.push(child);
    }

    /// Every line in document order, nested blocks included.
    pub fn lines(&self) -> Vec<&Line> {
        let mut out = Vec::new();
        self.collect_lines(&mut out);
        out
    }

    fn collect_lines<'a>(&'a self, out: &mut Vec<&'a Line>) {
        for child in &self.children {
            match child {
                BlockChild::Line(l) => out.push(l),
                BlockChild::Block(b) => b.collect_lines(out),
                BlockChild::Space { .. } => {}
            }
        }
    }

    /// Height of each direct line together with the display spaces directly
    /// around it (the half-leading).
    pub fn line_extents(&self) -> Vec<i32> {
        let mut extents = Vec::new();
        let mut pending_space = 0;
        let mut last_was_line = false;
        for child in &self.children {
            match child {
                BlockChild::Space { size } if last_was_line => {
                    if let Some(last) = extents.last_mut() {
                        *last += size;
                    }
                    last_was_line = false;
                }
                BlockChild::Space { size } => pending_space += size,
                BlockChild::Line(l) => {
                    extents.push(pending_space + l.bpd);
                    pending_space = 0;
                    last_was_line = true;
                }
                BlockChild::Block(b) => {
                    extents.push(pending_space + b.bpd);
                    pending_space = 0;
                    last_was_line = false;
                }
            }
        }
        extents
    }

    pub fn for_each_inline_mut(&mut self, f: &mut dyn FnMut(&mut InlineArea)) {
        for child in &mut self.children {
            match child {
                BlockChild::Line(l) => l.children.iter_mut().for_each(&mut *f),
                BlockChild::Block(b) => b.for_each_inline_mut(f),
                BlockChild::Space { .. } => {}
            }
        }
    }

    /// The visible text of every line, one entry per line.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines().iter().map(|l| l.text()).collect()
    }
}

impl Area for Block {
    fn class(&self) -> AreaClass {
        self.class
    }

    fn ipd(&self) -> i32 {
        self.ipd
    }

    fn bpd(&self) -> i32 {
        self.bpd
    }

    fn traits(&self) -> Option<&Traits> {
        Some(&self.traits)
    }
}

/// A finished line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// Offset of the first inline area from the block's content start,
    /// alignment slack included.
    pub start_indent: i32,
    pub end_indent: i32,
    /// Content width available to the line.
    pub ipd: i32,
    pub bpd: i32,
    /// Baseline offset from the top of the line.
    pub baseline: i32,
    pub children: Vec<InlineArea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkSet>,
}

impl Line {
    /// Sum of the inline advances.
    pub fn content_width(&self) -> i32 {
        self.children.iter().map(|c| c.width()).sum()
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                InlineArea::Space(_) => out.push(' '),
                other => {
                    if let Some(t) = other.text() {
                        out.push_str(t);
                    }
                }
            }
        }
        out
    }
}

impl Area for Line {
    fn ipd(&self) -> i32 {
        self.ipd
    }

    fn bpd(&self) -> i32 {
        self.bpd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::InlineSpace;

    fn line(bpd: i32) -> Line {
        Line {
            bpd,
            ..Default::default()
        }
    }

    #[test]
    fn add_child_accumulates_height() {
        let mut b = Block::new(1000);
        b.add_child(BlockChild::Space { size: 10 });
        b.add_child(BlockChild::Line(line(100)));
        let mut abs = Block::new(10);
        abs.bpd = 500;
        abs.positioning = Positioning::Absolute;
        b.add_child(BlockChild::Block(abs));
        assert_eq!(b.bpd, 110);
    }

    #[test]
    fn line_extents_include_half_leading() {
        let mut b = Block::new(1000);
        for _ in 0..3 {
            b.add_child(BlockChild::Space { size: 5 });
            b.add_child(BlockChild::Line(line(100)));
            b.add_child(BlockChild::Space { size: 5 });
        }
        assert_eq!(b.line_extents(), vec![110, 110, 110]);
        assert_eq!(b.line_extents().iter().sum::<i32>(), b.bpd);
    }

    #[test]
    fn spaces_render_as_blanks_in_text() {
        let mut l = line(10);
        l.children.push(InlineArea::Space(InlineSpace::new(100)));
        assert_eq!(l.text(), " ");
    }
}
