//! # Flow Cursor
//!
//! Where the driver is on the current page: the column being filled, how
//! far down it is, the blocks already placed in it, and the stack of blocks
//! still open. Open blocks own their [`BlockArea`]; a parent only learns
//! about a child when the child is closed and handed back.

use std::collections::BTreeMap;

use super::block::BlockArea;
use crate::area::{Block, PageViewport, Positioning, RegionName};
use crate::font::FontState;
use crate::model::Node;
use crate::style::{BreakKind, ResolvedStyle};

/// What the cursor is filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The body flow. Overflow starts a new column or page.
    Body,
    /// A side region. Overflow is truncated.
    Static(RegionName),
    /// A scratch pass with unlimited height, used to measure content.
    Measure,
}

/// A block that has been opened and not yet closed.
pub struct OpenBlock {
    pub area: BlockArea,
    pub style: ResolvedStyle,
    pub font: FontState,
    pub allocation_width: i32,
    pub markers: BTreeMap<String, Vec<Node>>,
    pub id: Option<String>,
    /// No fragment of this block has been emitted yet.
    pub first_fragment: bool,
}

/// Footnote bodies, laid out and waiting for room at the foot of a page.
pub struct FootnoteBody {
    pub blocks: Vec<Block>,
    pub ids: Vec<String>,
}

impl FootnoteBody {
    pub fn height(&self) -> i32 {
        self.blocks.iter().map(|b| b.bpd).sum()
    }
}

pub struct FlowCursor {
    pub mode: Mode,
    pub pv: PageViewport,
    width: i32,
    height: i32,
    y: i32,
    column: usize,
    placed: Vec<Block>,
    pub stack: Vec<OpenBlock>,
    footnotes: Vec<Block>,
    footnote_height: i32,
    /// Footnotes that did not fit on their page.
    pub deferred_footnotes: Vec<FootnoteBody>,
    /// A page or column break asked for by the content before.
    pub break_pending: Option<BreakKind>,
    /// Set once a static region overflows; later content is dropped.
    pub truncated: bool,
}

impl FlowCursor {
    pub fn new(mode: Mode, pv: PageViewport, width: i32, height: i32) -> Self {
        let height = if mode == Mode::Measure { i32::MAX / 2 } else { height };
        Self {
            mode,
            pv,
            width,
            height,
            y: 0,
            column: 0,
            placed: Vec::new(),
            stack: Vec::new(),
            footnotes: Vec::new(),
            footnote_height: 0,
            deferred_footnotes: Vec::new(),
            break_pending: None,
            truncated: false,
        }
    }

    /// Width available to the next child: the innermost open block's
    /// content width, or the column.
    pub fn allocation_width(&self) -> i32 {
        self.stack.last().map(|o| o.area.content_width()).unwrap_or(self.width)
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Height left in the column below everything placed and open.
    pub fn available(&self) -> i32 {
        let open: i32 = self.stack.iter().map(|o| o.area.used_height()).sum();
        self.height - self.footnote_height - self.y - open
    }

    /// Content height a new child block with `edges_block` of padding and
    /// border may grow to.
    pub fn child_max_height(&self, edges_block: i32) -> i32 {
        self.available() - edges_block
    }

    /// Nothing has been placed in this column and no open block holds
    /// content.
    pub fn is_fresh(&self) -> bool {
        self.y == 0 && self.placed.is_empty() && self.stack.iter().all(|o| o.area.is_empty())
    }

    /// Whether anything sits on this page, in any column.
    pub fn page_has_content(&self) -> bool {
        self.column > 0 || !self.is_fresh()
    }

    /// Stack a closed block (or spacer) into the column.
    pub fn place(&mut self, block: Block) {
        if block.positioning != Positioning::Absolute {
            self.y += block.bpd;
        }
        self.placed.push(block);
    }

    /// Display space between two top-level blocks.
    pub fn add_space(&mut self, size: i32) {
        if size > 0 {
            self.place(Block::spacer(size));
        }
    }

    /// Reserve room for a footnote body. False when it does not fit below
    /// the lines still open, including the one that cites it. Open blocks
    /// lose the reserved height from their limit.
    pub fn reserve_footnote(&mut self, body: &FootnoteBody) -> bool {
        let height = body.height();
        let open_lines: i32 = self.stack.iter().map(|o| o.area.open_line_height()).sum();
        if self.mode != Mode::Body || height > self.available() - open_lines {
            return false;
        }
        self.accept_footnote(body);
        for open in &mut self.stack {
            let max = open.area.max_height();
            open.area.set_max_height(max - height);
        }
        true
    }

    fn accept_footnote(&mut self, body: &FootnoteBody) {
        self.footnote_height += body.height();
        self.footnotes.extend(body.blocks.iter().cloned());
        for id in &body.ids {
            self.pv.add_id(id);
        }
    }

    /// Blocks placed so far in this column, taken out of the cursor.
    pub fn take_placed(&mut self) -> Vec<Block> {
        self.y = 0;
        std::mem::take(&mut self.placed)
    }

    /// Move the column's blocks into the page and go to the next column.
    /// False when this was the last column.
    pub fn next_column(&mut self, columns: usize) -> bool {
        if self.column + 1 >= columns {
            return false;
        }
        self.store_column();
        self.column += 1;
        true
    }

    fn close_body(&mut self) {
        self.store_column();
        let footnotes = std::mem::take(&mut self.footnotes);
        if let Some(body) = self.pv.page.as_mut().and_then(|p| p.body_mut()) {
            body.footnote.extend(footnotes);
        }
        self.footnote_height = 0;
        self.column = 0;
    }

    fn store_column(&mut self) {
        let blocks = self.take_placed();
        let column = self.column;
        if let Some(flow) = self
            .pv
            .page
            .as_mut()
            .and_then(|p| p.body_mut())
            .and_then(|b| b.main.spans.first_mut())
            .and_then(|s| s.flows.get_mut(column))
        {
            flow.blocks.extend(blocks);
        }
    }

    /// Close the body of the page: the last column and the footnotes go
    /// into the page, which is returned. The cursor continues on `next`,
    /// with deferred footnotes placed first.
    pub fn turn_page(&mut self, next: PageViewport) -> PageViewport {
        self.close_body();
        let finished = std::mem::replace(&mut self.pv, next);

        let deferred = std::mem::take(&mut self.deferred_footnotes);
        for body in deferred {
            if body.height() <= self.available() || self.footnotes.is_empty() {
                self.accept_footnote(&body);
            } else {
                self.deferred_footnotes.push(body);
            }
        }
        finished
    }

    /// Close the body of the last page.
    pub fn finish(mut self) -> PageViewport {
        self.close_body();
        self.pv
    }

    /// Everything placed, for static regions and measuring passes.
    pub fn into_blocks(mut self) -> (Vec<Block>, PageViewport) {
        let blocks = self.take_placed();
        (blocks, self.pv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Page, PageKey, Rect};

    fn pv() -> PageViewport {
        PageViewport::new(PageKey(0), Rect::default(), 1, "1".to_string(), 0, Page::new())
    }

    fn filled(bpd: i32) -> Block {
        let mut block = Block::new(1000);
        block.bpd = bpd;
        block
    }

    #[test]
    fn placing_consumes_height() {
        let mut cursor = FlowCursor::new(Mode::Body, pv(), 1000, 5000);
        assert!(cursor.is_fresh());
        cursor.place(filled(1200));
        cursor.add_space(300);
        assert_eq!(cursor.available(), 3500);
        assert!(!cursor.is_fresh());
    }

    #[test]
    fn absolute_blocks_take_no_room() {
        let mut cursor = FlowCursor::new(Mode::Body, pv(), 1000, 5000);
        let mut block = filled(1200);
        block.positioning = Positioning::Absolute;
        cursor.place(block);
        assert_eq!(cursor.available(), 5000);
    }

    #[test]
    fn footnotes_reserve_room_from_the_bottom() {
        let mut cursor = FlowCursor::new(Mode::Body, pv(), 1000, 5000);
        let note = FootnoteBody {
            blocks: vec![filled(1000)],
            ids: vec!["fn1".to_string()],
        };
        assert!(cursor.reserve_footnote(&note));
        assert_eq!(cursor.available(), 4000);
        assert_eq!(cursor.pv.ids, vec!["fn1".to_string()]);

        let big = FootnoteBody {
            blocks: vec![filled(4500)],
            ids: Vec::new(),
        };
        assert!(!cursor.reserve_footnote(&big));
    }

    #[test]
    fn deferred_footnotes_open_the_next_page() {
        let mut cursor = FlowCursor::new(Mode::Body, pv(), 1000, 5000);
        cursor.place(filled(4000));
        cursor.deferred_footnotes.push(FootnoteBody {
            blocks: vec![filled(2000)],
            ids: Vec::new(),
        });
        cursor.turn_page(pv());
        assert!(cursor.deferred_footnotes.is_empty());
        assert_eq!(cursor.available(), 3000);
    }

    #[test]
    fn measuring_never_runs_out_of_room() {
        let mut cursor = FlowCursor::new(Mode::Measure, pv(), 1000, 5000);
        cursor.place(filled(1_000_000));
        assert!(cursor.available() > 1_000_000);
    }
}
