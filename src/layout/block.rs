//! # Block Stacking
//!
//! A [`BlockArea`] builds one block's fragment on one page: lines from the
//! inline content it is fed, nested blocks the driver hands back finished,
//! and display spaces, stacked top to bottom. It stops as soon as the next
//! line would cross `max_height` and reports where the input should resume.
//!
//! Lines sit between two half-leading display spaces, so a line's share of
//! the block is its glyph height plus `line_height - font_size`.

use std::sync::Arc;

use super::line::{CharacterStatus, LineArea, TextProps};
use crate::area::{Block, BlockChild, GraphicArea, Positioning, TraitKey, TraitValue};
use crate::font::FontState;
use crate::hyphenation::Hyphenator;
use crate::style::{BoxEdges, LeaderSpec, Position, ResolvedStyle, TextAlign};

pub struct BlockArea {
    block: Block,
    font: FontState,
    hyphenator: Arc<dyn Hyphenator>,
    edges: BoxEdges,
    content_width: i32,
    text_indent: i32,
    align: TextAlign,
    align_last: TextAlign,
    half_leading: i32,
    max_height: i32,
    max_lines: Option<usize>,
    current_height: i32,
    line: Option<LineArea>,
    started_lines: bool,
    line_count: usize,
}

impl BlockArea {
    /// A block of `allocation_width` whose content may grow to
    /// `max_height`.
    pub fn new(
        style: &ResolvedStyle,
        font: FontState,
        allocation_width: i32,
        max_height: i32,
        hyphenator: Arc<dyn Hyphenator>,
    ) -> Self {
        let edges = style.edges();
        let mut block = Block::new(allocation_width);
        block.start_indent = style.start_indent;
        block.end_indent = style.end_indent;
        block.positioning = match style.position {
            Position::Static => Positioning::Stack,
            Position::Relative => Positioning::Relative,
            Position::Absolute => Positioning::Absolute,
        };
        if block.positioning != Positioning::Stack {
            block.x_offset = style.left;
            block.y_offset = style.top;
        }
        set_box_traits(&mut block, style);

        Self {
            block,
            content_width: allocation_width - style.start_indent - style.end_indent - edges.inline(),
            hyphenator,
            edges,
            text_indent: style.text_indent,
            align: style.text_align,
            align_last: style.text_align_last,
            half_leading: (style.line_height - style.font_size) / 2,
            max_height,
            max_lines: None,
            current_height: 0,
            line: None,
            started_lines: false,
            line_count: 0,
            font,
        }
    }

    /// Mark this block as the continuation of one cut at the end of an
    /// earlier page. Its first line gets no text indent.
    pub fn continuation(mut self) -> Self {
        self.block.traits.insert(TraitKey::IsContinuation, TraitValue::Flag(true));
        self.started_lines = true;
        self
    }

    /// Resume with the unfinished line handed back by
    /// [`split`](Self::split).
    pub fn with_line(mut self, carried: Option<LineArea>) -> Self {
        if carried.is_some() {
            self.started_lines = true;
            self.line = carried;
        }
        self
    }

    /// Open the first line. The first line of a block carries the text
    /// indent.
    pub fn start(&mut self) {
        self.current_line();
    }

    fn current_line(&mut self) -> &mut LineArea {
        let indent = if self.started_lines { 0 } else { self.text_indent };
        self.started_lines = true;
        let (font, width, hyphenator) = (&self.font, self.content_width, &self.hyphenator);
        self.line
            .get_or_insert_with(|| LineArea::new(font.clone(), width, indent, 0, Arc::clone(hyphenator)))
    }

    // ── Geometry ────────────────────────────────────────────────

    pub fn content_width(&self) -> i32 {
        self.content_width
    }

    pub fn edges(&self) -> BoxEdges {
        self.edges
    }

    /// Content height so far.
    pub fn current_height(&self) -> i32 {
        self.current_height
    }

    /// What the block takes from its parent so far, edges included.
    pub fn used_height(&self) -> i32 {
        self.current_height + self.edges.block()
    }

    /// Height the unfinished line will take once committed, leading
    /// included. Zero when it holds nothing.
    pub fn open_line_height(&self) -> i32 {
        match &self.line {
            Some(line) if !line.is_empty() => line.height() + 2 * self.half_leading,
            _ => 0,
        }
    }

    pub fn space_left(&self) -> i32 {
        self.max_height - self.current_height
    }

    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    pub fn set_max_height(&mut self, max_height: i32) {
        self.max_height = max_height;
    }

    /// Stop after this many lines, as if the page ended there.
    pub fn set_max_lines(&mut self, max_lines: Option<usize>) {
        self.max_lines = max_lines;
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.block.children.is_empty() && self.line.as_ref().map(LineArea::is_empty).unwrap_or(true)
    }

    pub fn set_id(&mut self, id: &str) {
        self.block.traits.insert(TraitKey::Id, TraitValue::Text(id.to_string()));
    }

    fn line_fits(&self, line: &LineArea) -> bool {
        if let Some(max) = self.max_lines {
            if self.line_count >= max {
                return false;
            }
        }
        self.current_height + line.height() + 2 * self.half_leading <= self.max_height
    }

    // ── Lines ───────────────────────────────────────────────────

    fn add_line_area(&mut self, mut line: LineArea, align: TextAlign) {
        if line.is_empty() {
            return;
        }
        line.align(align);
        line.vertical_align();
        let line = line.into_line();
        self.add_display_space(self.half_leading);
        self.current_height += line.bpd;
        self.block.add_child(BlockChild::Line(line));
        self.add_display_space(self.half_leading);
        self.line_count += 1;
    }

    /// Feed one text run. Returns where to resume when the block is full.
    pub fn add_text(&mut self, props: &TextProps, chars: &[char], start: usize, end: usize) -> Option<usize> {
        let width = self.content_width;
        let line = self.current_line();
        line.apply(props);
        let height = line.height();
        if self.current_height + height + 2 * self.half_leading > self.max_height {
            return Some(start);
        }

        let mut position = start;
        loop {
            let Some(line) = self.line.as_mut() else {
                return None;
            };
            let Some(next) = line.add_text(chars, position, end, props.decoration) else {
                return None;
            };
            let fresh = line.next_line(width, 0, 0);
            if let Some(full) = self.line.replace(fresh) {
                self.add_line_area(full, self.align);
            }
            let fits = self.line.as_ref().map(|l| self.line_fits(l)).unwrap_or(false);
            if !fits {
                return Some(next);
            }
            position = next;
        }
    }

    /// End the current line and open the next. `None` when the next line
    /// would not fit.
    pub fn create_next_line_area(&mut self) -> Option<&mut LineArea> {
        if let Some(mut line) = self.line.take() {
            line.add_pending();
            let next = line.next_line(self.content_width, 0, 0);
            self.add_line_area(line, self.align);
            self.line = Some(next);
        } else {
            self.start();
        }
        let fits = self.line.as_ref().map(|l| self.line_fits(l)).unwrap_or(false);
        if fits {
            self.line.as_mut()
        } else {
            None
        }
    }

    /// End the current line as the last of its paragraph. Done before a
    /// nested block opens.
    pub fn close_line(&mut self) {
        if let Some(mut line) = self.line.take() {
            line.drop_trailing_space();
            line.add_pending();
            self.add_line_area(line, self.align_last);
        }
    }

    pub fn add_leader(&mut self, props: &TextProps, leader: &LeaderSpec) -> bool {
        let line = self.current_line();
        line.apply(props);
        if line.remaining_width() <= 0 {
            match self.create_next_line_area() {
                Some(line) => line.apply(props),
                None => return false,
            }
        }
        self.current_line().add_leader(leader);
        true
    }

    /// A citation whose page is not known yet.
    pub fn add_page_number_citation(&mut self, props: &TextProps, ref_id: &str) -> bool {
        let needed = 3 * props.font.char_width('0');
        let line = self.current_line();
        line.apply(props);
        if line.remaining_width() < needed && !line.is_empty() {
            match self.create_next_line_area() {
                Some(line) => line.apply(props),
                None => return false,
            }
        }
        self.current_line().add_page_number_citation(ref_id, props.decoration);
        true
    }

    pub fn add_character(&mut self, props: &TextProps, c: char) -> bool {
        let line = self.current_line();
        line.apply(props);
        if line.add_character(c, props.decoration) == CharacterStatus::Ok {
            return true;
        }
        let was_empty = line.is_empty();
        let Some(line) = self.create_next_line_area() else {
            return false;
        };
        line.apply(props);
        if line.add_character(c, props.decoration) == CharacterStatus::DoesNotFit && was_empty {
            log::warn!("character '{}' is wider than the line, dropping it", c);
        }
        true
    }

    pub fn add_inline_area(&mut self, props: &TextProps, graphic: GraphicArea) -> bool {
        let line = self.current_line();
        line.apply(props);
        if graphic.width > line.remaining_width() && !line.is_empty() {
            match self.create_next_line_area() {
                Some(line) => line.apply(props),
                None => return false,
            }
        }
        self.current_line().add_inline_area(graphic);
        true
    }

    // ── Blocks and spaces ───────────────────────────────────────

    /// Stack a finished child block. The current line ends first; the next
    /// inline content starts a fresh line.
    pub fn add_block(&mut self, child: Block) {
        self.close_line();
        let child = BlockChild::Block(child);
        self.current_height += child.extent();
        self.block.add_child(child);
    }

    pub fn add_display_space(&mut self, size: i32) {
        if size != 0 {
            self.current_height += size;
            self.block.add_child(BlockChild::Space { size });
        }
    }

    // ── Finishing ───────────────────────────────────────────────

    fn finish(mut self) -> Block {
        self.block.bpd = self.current_height + self.edges.block();
        self.block
    }

    /// Commit what is left and return the block.
    pub fn end(mut self) -> Block {
        if let Some(mut line) = self.line.take() {
            line.drop_trailing_space();
            line.add_pending();
            self.add_line_area(line, self.align_last);
        }
        self.finish()
    }

    /// Close this page's fragment. The unfinished line (its pending
    /// content) is handed back for the continuation.
    pub fn split(mut self) -> (Block, Option<LineArea>) {
        let mut carried = self.line.take();
        if let Some(line) = carried.as_mut().filter(|l| !l.children().is_empty()) {
            let next = line.next_line(self.content_width, 0, 0);
            let full = std::mem::replace(line, next);
            self.add_line_area(full, self.align);
        }
        self.block.traits.insert(TraitKey::IsContinued, TraitValue::Flag(true));
        (self.finish(), carried)
    }
}

fn set_box_traits(block: &mut Block, style: &ResolvedStyle) {
    let traits = &mut block.traits;
    if let Some(color) = style.background_color {
        traits.insert(TraitKey::BackgroundColor, TraitValue::Color(color));
    }
    let borders = [
        (TraitKey::BorderBefore, style.border.before),
        (TraitKey::BorderAfter, style.border.after),
        (TraitKey::BorderStart, style.border.start),
        (TraitKey::BorderEnd, style.border.end),
    ];
    for (key, width) in borders {
        if width > 0 {
            traits.insert(
                key,
                TraitValue::Border {
                    width,
                    color: style.border_color,
                },
            );
        }
    }
    let padding = [
        (TraitKey::PaddingBefore, style.padding.before),
        (TraitKey::PaddingAfter, style.padding.after),
        (TraitKey::PaddingStart, style.padding.start),
        (TraitKey::PaddingEnd, style.padding.end),
    ];
    for (key, size) in padding {
        if size > 0 {
            traits.insert(key, TraitValue::Length(size));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Area, InlineArea};
    use crate::font::testing::grid;
    use crate::hyphenation::{HyphenationProps, PatternHyphenator};
    use crate::style::{Color, Decoration, VerticalAlign, WrapOption};

    /// Font size 1000, line height 1200: every line takes 1200.
    fn style() -> ResolvedStyle {
        let mut s = ResolvedStyle::root("Grid", "none");
        s.font_size = 1000;
        s.line_height = 1200;
        s
    }

    fn props() -> TextProps {
        TextProps {
            font: grid(1000),
            color: Color::BLACK,
            wrap: WrapOption::Wrap,
            collapse: true,
            vertical_align: VerticalAlign::Baseline,
            decoration: Decoration::default(),
            link: None,
            hyphenation: HyphenationProps::default(),
        }
    }

    fn block(style: &ResolvedStyle, width: i32, max_height: i32) -> BlockArea {
        let mut b = BlockArea::new(style, grid(1000), width, max_height, Arc::new(PatternHyphenator));
        b.start();
        b
    }

    fn feed(b: &mut BlockArea, text: &str) -> Option<usize> {
        let chars: Vec<char> = text.chars().collect();
        b.add_text(&props(), &chars, 0, chars.len())
    }

    #[test]
    fn lines_stack_with_half_leading() {
        let mut b = block(&style(), 1000, 100_000);
        assert_eq!(feed(&mut b, "aaaa bbbb cccc"), None);
        let out = b.end();
        assert_eq!(out.text_lines(), vec!["aaaa bbbb", "cccc"]);
        assert_eq!(out.bpd, 2 * 1200);
        assert_eq!(out.line_extents(), vec![1200, 1200]);
    }

    #[test]
    fn overflow_returns_resume_index() {
        let mut b = block(&style(), 500, 2400);
        let text = "aaaa bbbb cccc dddd";
        assert_eq!(feed(&mut b, text), Some(10));
        let (fragment, carried) = b.split();
        assert_eq!(fragment.text_lines(), vec!["aaaa", "bbbb"]);
        assert_eq!(fragment.trait_value(TraitKey::IsContinued), Some(&TraitValue::Flag(true)));

        let mut next = BlockArea::new(&style(), grid(1000), 500, 100_000, Arc::new(PatternHyphenator))
            .continuation()
            .with_line(carried);
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(next.add_text(&props(), &chars, 10, chars.len()), None);
        assert_eq!(next.end().text_lines(), vec!["cccc", "dddd"]);
    }

    #[test]
    fn block_too_short_for_one_line_takes_nothing() {
        let mut b = block(&style(), 1000, 1000);
        assert_eq!(feed(&mut b, "abc"), Some(0));
    }

    #[test]
    fn max_lines_cuts_early() {
        let mut b = block(&style(), 500, 100_000);
        b.set_max_lines(Some(1));
        assert_eq!(feed(&mut b, "aaaa bbbb cccc"), Some(5));
        assert_eq!(b.line_count(), 1);
    }

    #[test]
    fn text_indent_applies_to_first_line_only() {
        let mut s = style();
        s.text_indent = 200;
        let mut b = block(&s, 1000, 100_000);
        feed(&mut b, "aaaa bbbb cccc");
        let out = b.end();
        let lines = out.lines();
        assert_eq!(lines[0].start_indent, 200);
        assert_eq!(lines[1].start_indent, 0);
    }

    #[test]
    fn nested_block_ends_the_line() {
        let mut b = block(&style(), 1000, 100_000);
        feed(&mut b, "intro ");
        let mut child = block(&style(), 1000, 100_000);
        feed(&mut child, "inner");
        b.add_block(child.end());
        feed(&mut b, "outro");
        let out = b.end();
        assert_eq!(out.text_lines(), vec!["intro", "inner", "outro"]);
        assert_eq!(out.bpd, 3 * 1200);
    }

    #[test]
    fn padding_and_border_add_to_height() {
        let mut s = style();
        s.padding = BoxEdges {
            before: 100,
            after: 100,
            start: 50,
            end: 50,
        };
        s.border = BoxEdges {
            before: 10,
            after: 10,
            start: 10,
            end: 10,
        };
        let mut b = block(&s, 1000, 100_000);
        assert_eq!(b.content_width(), 880);
        feed(&mut b, "a");
        let out = b.end();
        assert_eq!(out.bpd, 1200 + 220);
        assert_eq!(out.trait_value(TraitKey::PaddingStart), Some(&TraitValue::Length(50)));
    }

    #[test]
    fn character_moves_to_next_line_when_full() {
        let mut b = block(&style(), 300, 100_000);
        for c in "abcd".chars() {
            assert!(b.add_character(&props(), c));
        }
        assert_eq!(b.end().text_lines(), vec!["abc", "d"]);
    }

    #[test]
    fn citation_wraps_when_it_cannot_fit() {
        let mut b = block(&style(), 500, 100_000);
        feed(&mut b, "aaa ");
        assert!(b.add_page_number_citation(&props(), "x"));
        let out = b.end();
        let lines = out.lines();
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[1].children[0], InlineArea::PageNumber(_)));
    }

    #[test]
    fn justified_paragraph_keeps_last_line_ragged() {
        let mut s = style();
        s.text_align = TextAlign::Justify;
        s.text_align_last = TextAlign::Start;
        let mut b = block(&s, 1000, 100_000);
        feed(&mut b, "aaa bbb ccc ddd");
        let out = b.end();
        let lines = out.lines();
        assert_eq!(lines[0].content_width(), 1000);
        assert_eq!(lines[1].content_width(), 700);
    }
}
