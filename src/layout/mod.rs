//! # Layout Driver
//!
//! Walks a document's page sequences and pours each flow into pages, one
//! node at a time, the way a typesetter fills a galley:
//!
//! 1. Open a page from the sequence's page master.
//! 2. Open a [`BlockArea`] for each block, nested inside its parent's.
//!    Inline content is fed to the innermost open block, which fills lines
//!    until the next line would not fit.
//! 3. When a block reports it is full, every open block is cut: the
//!    fragments go on this page (marked as continued), the flow moves to the
//!    next column or page, and the same blocks are reopened there as
//!    continuations. The unfinished line travels with them.
//! 4. When the page is done, static content is laid out for its side
//!    regions, citations that are still unknown are registered, and the page
//!    goes to the [`AreaTree`].
//!
//! Keep-together and orphan/widow control work by measuring a block on a
//! scratch cursor of unlimited height first, then deciding with
//! [`decide_break`] whether it stays, moves on, or splits after a given
//! line.

pub mod block;
pub mod flow;
pub mod line;
pub mod master;
pub mod page_break;

pub use block::BlockArea;
pub use line::{CharacterStatus, LineArea, TextProps};
pub use master::PageTemplate;
pub use page_break::{decide_break, BreakDecision};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use flow::{FlowCursor, FootnoteBody, Mode, OpenBlock};

use crate::area::page::retrieve_marker;
use crate::area::{
    AreaTree, AreaTreeModel, Block, ExtensionTiming, GraphicArea, InlineArea, LinkKind, Outline, PageViewport,
    TreeExtension,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::font::{FontRegistry, FontState};
use crate::hyphenation::{Hyphenator, PatternHyphenator};
use crate::model::{Document, Metadata, Node, NodeKind, PageSequence, RetrievePosition, StaticContent};
use crate::style::{mpt, BreakKind, ResolvedStyle};

/// Where finished pages go.
pub trait PageSink {
    fn add_page(&mut self, page: PageViewport) -> Result<()>;
    /// Number of the first finished page that defines `id`.
    fn page_number_of(&self, id: &str) -> Option<String>;
    /// Finished pages, oldest first.
    fn pages(&self) -> &[PageViewport];
}

impl<M: AreaTreeModel> PageSink for AreaTree<M> {
    fn add_page(&mut self, page: PageViewport) -> Result<()> {
        AreaTree::add_page(self, page).map(|_| ())
    }

    fn page_number_of(&self, id: &str) -> Option<String> {
        self.id_locations(id)?.first().map(|r| r.number.clone())
    }

    fn pages(&self) -> &[PageViewport] {
        self.store().pages()
    }
}

/// Per-sequence state shared by every layout call.
struct Sequence<'a> {
    template: PageTemplate,
    statics: &'a StaticContent,
    root: ResolvedStyle,
    fonts: &'a FontRegistry,
    /// Number the next new page gets.
    next_number: usize,
}

/// An open block cut at a page end, waiting to be reopened.
struct Reopen {
    style: ResolvedStyle,
    font: FontState,
    allocation_width: i32,
    markers: BTreeMap<String, Vec<Node>>,
    id: Option<String>,
    first_fragment: bool,
    carried: Option<LineArea>,
}

/// The main layout engine.
pub struct LayoutEngine {
    config: EngineConfig,
    fonts: FontRegistry,
    hyphenator: Arc<dyn Hyphenator>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            fonts: FontRegistry::with_fallback(&config.default_font_family),
            config,
            hyphenator: Arc::new(PatternHyphenator),
        }
    }

    pub fn with_fonts(mut self, fonts: FontRegistry) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_hyphenator(mut self, hyphenator: Arc<dyn Hyphenator>) -> Self {
        self.hyphenator = hyphenator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    /// Lay out `document` into `tree` and end the document.
    pub fn layout<M: AreaTreeModel>(&self, document: &Document, tree: &mut AreaTree<M>) -> Result<()> {
        let mut fonts = self.fonts.clone();
        for source in &document.fonts {
            fonts.register_source(source)?;
        }

        if document.metadata != Metadata::default() {
            tree.add_extension(
                TreeExtension::DocumentInfo(document.metadata.clone()),
                ExtensionTiming::Immediately,
            )?;
        }

        let mut next_number = 1;
        for (index, sequence) in document.page_sequences.iter().enumerate() {
            tree.start_page_sequence(sequence.title.as_deref())?;
            next_number = self.layout_sequence(sequence, index, next_number, &fonts, tree)?;
        }

        if !document.bookmarks.is_empty() {
            tree.add_extension(
                TreeExtension::Outline(Outline::from_bookmarks(&document.bookmarks)),
                ExtensionTiming::AfterPage,
            )?;
        }
        tree.end_document()
    }

    /// Returns the number the page after the sequence's last page would get.
    fn layout_sequence(
        &self,
        sequence: &PageSequence,
        index: usize,
        first_number: usize,
        fonts: &FontRegistry,
        sink: &mut dyn PageSink,
    ) -> Result<usize> {
        let root = ResolvedStyle::root(&self.config.default_font_family, &self.config.default_language);
        let root = sequence.style.resolve(&root);
        let template = PageTemplate::from_master(&sequence.master, index);
        let number = sequence.initial_page_number.unwrap_or(first_number);
        let pv = template.new_page(number);
        let mut cursor = FlowCursor::new(Mode::Body, pv, template.column_width(), template.column_height());
        let mut seq = Sequence {
            template,
            statics: &sequence.static_content,
            root: root.clone(),
            fonts,
            next_number: number + 1,
        };
        log::debug!("page sequence {} starts at page {}", index, number);

        for node in &sequence.flow {
            self.layout_child(node, &root, None, &mut cursor, &mut seq, sink)?;
        }
        while !cursor.deferred_footnotes.is_empty() {
            self.new_page(&mut cursor, &mut seq, sink)?;
        }
        let last = cursor.finish();
        self.finish_page(last, &mut seq, sink)?;
        Ok(seq.next_number)
    }

    // ── Pages ───────────────────────────────────────────────────

    fn new_page(&self, cursor: &mut FlowCursor, seq: &mut Sequence, sink: &mut dyn PageSink) -> Result<()> {
        let next = seq.template.new_page(seq.next_number);
        seq.next_number += 1;
        let finished = cursor.turn_page(next);
        self.finish_page(finished, seq, sink)
    }

    /// Static content, citation bookkeeping, then hand the page over.
    fn finish_page(&self, pv: PageViewport, seq: &mut Sequence, sink: &mut dyn PageSink) -> Result<()> {
        let mut pv = self.layout_statics(pv, seq, sink)?;

        let mut cited = BTreeSet::new();
        if let Some(page) = pv.page.as_mut() {
            page.for_each_inline_mut(&mut |area| {
                if let InlineArea::PageNumber(pn) = area {
                    if !pn.resolved {
                        cited.insert(pn.ref_id.clone());
                    }
                }
            });
        }
        for id in &cited {
            pv.add_unresolved_id(id);
        }

        log::debug!("page {} laid out ({} ids, {} citations waiting)", pv.page_number_string, pv.ids.len(), cited.len());
        sink.add_page(pv)
    }

    fn layout_statics(&self, mut pv: PageViewport, seq: &mut Sequence, sink: &mut dyn PageSink) -> Result<PageViewport> {
        let root = seq.root.clone();
        for (name, width, height, nodes) in seq.template.static_regions(seq.statics) {
            let mut cursor = FlowCursor::new(Mode::Static(name), pv, width, height);
            for node in nodes {
                self.layout_child(node, &root, None, &mut cursor, seq, sink)?;
            }
            let (blocks, back) = cursor.into_blocks();
            pv = back;
            if let Some(region) = pv
                .page
                .as_mut()
                .and_then(|p| p.region_mut(name))
                .and_then(|r| r.region.blocks_mut())
            {
                *region = blocks;
            }
        }
        Ok(pv)
    }

    /// Cut every open block, move to the next column (for a column break
    /// with columns left) or page, and reopen the blocks there. False when
    /// the cursor cannot break: static regions truncate, measuring never
    /// runs out of room.
    fn break_flow(
        &self,
        kind: BreakKind,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<bool> {
        match cursor.mode {
            Mode::Body => {}
            Mode::Static(name) => {
                if !cursor.truncated {
                    log::warn!("static content overflows the {:?} region on page {}, truncating", name, cursor.pv.page_number_string);
                }
                cursor.truncated = true;
                return Ok(false);
            }
            Mode::Measure => return Ok(false),
        }

        let mut reopen = Vec::new();
        let mut fragment: Option<Block> = None;
        while let Some(open) = cursor.stack.pop() {
            let OpenBlock {
                mut area,
                style,
                font,
                allocation_width,
                markers,
                id,
                first_fragment,
            } = open;
            if let Some(child) = fragment.take() {
                area.add_block(child);
            }
            let (block, carried) = area.split();
            let emitted = !block.is_empty();
            if emitted {
                cursor.pv.add_markers(&markers, false, false, false);
                fragment = Some(block);
            } else if let (true, Some(id)) = (first_fragment, &id) {
                cursor.pv.ids.retain(|i| i != id);
            }
            reopen.push(Reopen {
                style,
                font,
                allocation_width,
                markers,
                id,
                first_fragment: first_fragment && !emitted,
                carried,
            });
        }
        if let Some(block) = fragment {
            cursor.place(block);
        }

        let to_column = kind == BreakKind::Column && cursor.next_column(seq.template.column_count());
        if !to_column {
            self.new_page(cursor, seq, sink)?;
        }

        for level in reopen.into_iter().rev() {
            let max_height = cursor.child_max_height(level.style.edges().block());
            let mut area = BlockArea::new(
                &level.style,
                level.font.clone(),
                level.allocation_width,
                max_height,
                Arc::clone(&self.hyphenator),
            );
            if level.first_fragment {
                if let Some(id) = &level.id {
                    area.set_id(id);
                    cursor.pv.add_id(id);
                }
            } else {
                area = area.continuation();
            }
            let area = area.with_line(level.carried);
            cursor.pv.add_markers(&level.markers, true, level.first_fragment, false);
            cursor.stack.push(OpenBlock {
                area,
                style: level.style,
                font: level.font,
                allocation_width: level.allocation_width,
                markers: level.markers,
                id: level.id,
                first_fragment: level.first_fragment,
            });
        }
        Ok(true)
    }

    /// A forced break, skipped when it would leave an empty column or page.
    fn forced_break(
        &self,
        kind: BreakKind,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        let needed = match kind {
            BreakKind::Auto => false,
            BreakKind::Page => cursor.page_has_content(),
            BreakKind::Column => !cursor.is_fresh(),
        };
        if needed {
            self.break_flow(kind, cursor, seq, sink)?;
        }
        Ok(())
    }

    // ── Nodes ───────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn layout_child(
        &self,
        node: &Node,
        parent: &ResolvedStyle,
        link: Option<&(String, LinkKind)>,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        if cursor.truncated {
            return Ok(());
        }
        match &node.kind {
            NodeKind::Block => self.layout_block(node, parent, cursor, seq, sink),
            NodeKind::PageBreak => {
                cursor.break_pending = Some(BreakKind::Page);
                Ok(())
            }
            // Collected by the enclosing block.
            NodeKind::Marker { .. } => Ok(()),
            NodeKind::RetrieveMarker { class_name, position } => {
                self.layout_retrieved(class_name, *position, parent, cursor, seq, sink)
            }
            _ if cursor.stack.is_empty() => {
                log::debug!("wrapping inline content at flow level in a block");
                let wrapper = Node::block(vec![node.clone()]);
                self.layout_block(&wrapper, parent, cursor, seq, sink)
            }
            _ => self.layout_inline(node, parent, link, cursor, seq, sink),
        }
    }

    fn layout_block(
        &self,
        node: &Node,
        parent: &ResolvedStyle,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        let style = node.style.resolve(parent);
        if let Some(kind) = cursor.break_pending.take() {
            self.forced_break(kind, cursor, seq, sink)?;
        }
        self.forced_break(style.break_before, cursor, seq, sink)?;

        if let Some(open) = cursor.stack.last_mut() {
            open.area.close_line();
        }
        let top_level = cursor.stack.is_empty();
        let measuring = cursor.mode == Mode::Measure;
        let allocation_width = cursor.allocation_width();
        let edges = style.edges().block();
        let space_before = style.space_before.opt;

        let max_lines = match cursor.mode {
            Mode::Body => self.keep_decision(node, parent, &style, space_before, cursor, seq, sink)?,
            _ => None,
        };
        if cursor.mode == Mode::Body
            && cursor.child_max_height(edges) - space_before < style.line_height
            && !cursor.is_fresh()
        {
            self.break_flow(BreakKind::Column, cursor, seq, sink)?;
        }

        // Space before a block at the top of a column is discarded.
        if !(top_level && (measuring || cursor.is_fresh())) {
            add_space(cursor, space_before);
        }

        let font = font_state(&style, seq.fonts);
        let mut area = BlockArea::new(
            &style,
            font.clone(),
            allocation_width,
            cursor.child_max_height(edges),
            Arc::clone(&self.hyphenator),
        );
        area.set_max_lines(max_lines);
        if let Some(id) = &node.id {
            area.set_id(id);
            cursor.pv.add_id(id);
        }
        let markers = collect_markers(node);
        cursor.pv.add_markers(&markers, true, true, false);
        cursor.stack.push(OpenBlock {
            area,
            style: style.clone(),
            font,
            allocation_width,
            markers,
            id: node.id.clone(),
            first_fragment: true,
        });

        for child in &node.children {
            self.layout_child(child, &style, None, cursor, seq, sink)?;
        }

        let Some(open) = cursor.stack.pop() else {
            return Ok(());
        };
        let markers = open.markers;
        let block = open.area.end();
        cursor.pv.add_markers(&markers, false, false, true);
        match cursor.stack.last_mut() {
            Some(parent) => parent.area.add_block(block),
            None => cursor.place(block),
        }

        if !(top_level && measuring) {
            add_space(cursor, style.space_after.opt);
        }
        if style.break_after != BreakKind::Auto {
            cursor.break_pending = Some(style.break_after);
        }
        Ok(())
    }

    /// Apply keep-together and orphan/widow control before a block opens.
    /// Returns the number of lines the block may put on this page.
    #[allow(clippy::too_many_arguments)]
    fn keep_decision(
        &self,
        node: &Node,
        parent: &ResolvedStyle,
        style: &ResolvedStyle,
        space_before: i32,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<Option<usize>> {
        let paragraph = is_paragraph(node);
        if !style.keep_together && !paragraph {
            return Ok(None);
        }

        let width = cursor.allocation_width();
        let measured = self.measure(node, parent, width, cursor.pv.page_number, seq, sink)?;
        let (heights, room) = if style.keep_together {
            (vec![measured.bpd], cursor.available())
        } else {
            (measured.line_extents(), cursor.child_max_height(style.edges().block()))
        };
        let remaining = if cursor.is_fresh() { room } else { room - space_before };

        match decide_break(remaining, &heights, !style.keep_together, style.orphans, style.widows) {
            BreakDecision::Place => Ok(None),
            BreakDecision::MoveToNextPage => {
                if !cursor.is_fresh() {
                    self.break_flow(BreakKind::Column, cursor, seq, sink)?;
                }
                Ok(None)
            }
            BreakDecision::Split { items_on_current_page } => Ok(Some(items_on_current_page)),
        }
    }

    /// Lay a block out on a scratch cursor of unlimited height.
    fn measure(
        &self,
        node: &Node,
        parent: &ResolvedStyle,
        width: i32,
        page_number: usize,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<Block> {
        let scratch = seq.template.new_page(page_number);
        let mut cursor = FlowCursor::new(Mode::Measure, scratch, width, 0);
        self.layout_block(node, parent, &mut cursor, seq, sink)?;
        let (blocks, _) = cursor.into_blocks();
        Ok(blocks.into_iter().next().unwrap_or_default())
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_inline(
        &self,
        node: &Node,
        parent: &ResolvedStyle,
        link: Option<&(String, LinkKind)>,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        let style = node.style.resolve(parent);
        if let Some(id) = &node.id {
            cursor.pv.add_id(id);
        }
        let props = text_props(&style, seq.fonts, link);

        match &node.kind {
            NodeKind::Text { content } => self.feed_text(content, &props, cursor, seq, sink),
            NodeKind::Inline => {
                for child in &node.children {
                    self.layout_child(child, &style, link, cursor, seq, sink)?;
                }
                Ok(())
            }
            NodeKind::BasicLink {
                internal_destination,
                external_destination,
            } => {
                let target = match (internal_destination, external_destination) {
                    (Some(id), _) => Some((id.clone(), LinkKind::Internal)),
                    (None, Some(uri)) => Some((uri.clone(), LinkKind::External)),
                    (None, None) => None,
                };
                let link = target.as_ref().or(link);
                for child in &node.children {
                    self.layout_child(child, &style, link, cursor, seq, sink)?;
                }
                Ok(())
            }
            NodeKind::Leader => {
                self.with_room(cursor, seq, sink, |area| area.add_leader(&props, &style.leader))
            }
            NodeKind::PageNumber => {
                let number = cursor.pv.page_number_string.clone();
                self.feed_text(&number, &props, cursor, seq, sink)
            }
            NodeKind::PageNumberCitation { ref_id } => {
                let known = if cursor.pv.ids.iter().any(|i| i == ref_id) {
                    Some(cursor.pv.page_number_string.clone())
                } else {
                    sink.page_number_of(ref_id)
                };
                match known {
                    Some(number) => self.feed_text(&number, &props, cursor, seq, sink),
                    None => self.with_room(cursor, seq, sink, |area| area.add_page_number_citation(&props, ref_id)),
                }
            }
            NodeKind::Character { character } => {
                self.with_room(cursor, seq, sink, |area| area.add_character(&props, *character))
            }
            NodeKind::ExternalGraphic { src, width, height } => {
                let graphic = GraphicArea {
                    src: src.clone(),
                    width: mpt(*width),
                    height: mpt(*height),
                    y_offset: 0,
                    vertical_align: style.vertical_align,
                    link: None,
                };
                self.with_room(cursor, seq, sink, |area| area.add_inline_area(&props, graphic.clone()))
            }
            NodeKind::Footnote { body } => {
                for child in &node.children {
                    self.layout_child(child, &style, link, cursor, seq, sink)?;
                }
                self.layout_footnote(body, &style, cursor, seq, sink)
            }
            NodeKind::Block | NodeKind::PageBreak | NodeKind::Marker { .. } | NodeKind::RetrieveMarker { .. } => {
                self.layout_child(node, parent, link, cursor, seq, sink)
            }
        }
    }

    /// Feed a text run to the innermost open block, breaking the flow each
    /// time the block fills up.
    fn feed_text(
        &self,
        text: &str,
        props: &TextProps,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        let chars: Vec<char> = text.chars().collect();
        let mut position = 0;
        let mut restarted_at = None;
        loop {
            let Some(open) = cursor.stack.last_mut() else {
                return Ok(());
            };
            let Some(next) = open.area.add_text(props, &chars, position, chars.len()) else {
                return Ok(());
            };
            if restarted_at == Some(next) {
                log::warn!(
                    "content does not fit in an empty column on page {}, letting it overflow",
                    cursor.pv.page_number_string
                );
                force_one_line(&mut open.area);
                continue;
            }
            if !self.break_flow(BreakKind::Column, cursor, seq, sink)? {
                return Ok(());
            }
            position = next;
            restarted_at = Some(next);
        }
    }

    /// Add one inline item, breaking the flow once if the block is full.
    fn with_room(
        &self,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
        mut add: impl FnMut(&mut BlockArea) -> bool,
    ) -> Result<()> {
        let mut broke = false;
        loop {
            let Some(open) = cursor.stack.last_mut() else {
                return Ok(());
            };
            if add(&mut open.area) {
                return Ok(());
            }
            if broke {
                log::warn!("inline item does not fit in an empty column, letting it overflow");
                force_one_line(&mut open.area);
                continue;
            }
            if !self.break_flow(BreakKind::Column, cursor, seq, sink)? {
                return Ok(());
            }
            broke = true;
        }
    }

    fn layout_footnote(
        &self,
        body: &[Node],
        style: &ResolvedStyle,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        match cursor.mode {
            Mode::Body => {}
            Mode::Static(_) => {
                log::warn!("footnotes in static content are ignored");
                return Ok(());
            }
            Mode::Measure => return Ok(()),
        }
        let scratch = seq.template.new_page(cursor.pv.page_number);
        let mut measure = FlowCursor::new(Mode::Measure, scratch, seq.template.column_width(), 0);
        for node in body {
            self.layout_child(node, style, None, &mut measure, seq, sink)?;
        }
        let (blocks, pv) = measure.into_blocks();
        let note = FootnoteBody { blocks, ids: pv.ids };
        if !cursor.reserve_footnote(&note) {
            log::debug!("footnote deferred to the next page");
            cursor.deferred_footnotes.push(note);
        }
        Ok(())
    }

    fn layout_retrieved(
        &self,
        class: &str,
        position: RetrievePosition,
        parent: &ResolvedStyle,
        cursor: &mut FlowCursor,
        seq: &mut Sequence,
        sink: &mut dyn PageSink,
    ) -> Result<()> {
        if !matches!(cursor.mode, Mode::Static(_)) {
            log::warn!("retrieve-marker '{}' outside static content is ignored", class);
            return Ok(());
        }
        let sequence = cursor.pv.sequence;
        let earlier = sink.pages().iter().filter(|p| p.sequence == sequence);
        let Some(nodes) = retrieve_marker(earlier.chain(std::iter::once(&cursor.pv)), class, position).cloned() else {
            return Ok(());
        };
        for node in &nodes {
            self.layout_child(node, parent, None, cursor, seq, sink)?;
        }
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn font_state(style: &ResolvedStyle, fonts: &FontRegistry) -> FontState {
    fonts.font_state(&style.font_family, style.font_style, style.font_weight, style.font_size)
}

fn text_props(style: &ResolvedStyle, fonts: &FontRegistry, link: Option<&(String, LinkKind)>) -> TextProps {
    TextProps {
        font: font_state(style, fonts),
        color: style.color,
        wrap: style.wrap_option,
        collapse: style.white_space_collapse,
        vertical_align: style.vertical_align,
        decoration: style.decoration,
        link: link.cloned(),
        hyphenation: style.hyphenation.clone(),
    }
}

/// Space before or after a block: inside the parent, or between top-level
/// blocks of the column.
fn add_space(cursor: &mut FlowCursor, size: i32) {
    match cursor.stack.last_mut() {
        Some(parent) => parent.area.add_display_space(size),
        None => cursor.add_space(size),
    }
}

/// Let the block overflow its limit by one line.
fn force_one_line(area: &mut BlockArea) {
    area.set_max_height(i32::MAX / 2);
    area.set_max_lines(Some(area.line_count() + 1));
}

/// A block whose children are all inline.
fn is_paragraph(node: &Node) -> bool {
    !node.children.is_empty()
        && node
            .children
            .iter()
            .all(|c| !matches!(c.kind, NodeKind::Block | NodeKind::PageBreak))
}

fn collect_markers(node: &Node) -> BTreeMap<String, Vec<Node>> {
    node.children
        .iter()
        .filter_map(|c| match &c.kind {
            NodeKind::Marker { class_name } => Some((class_name.clone(), c.children.clone())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::StorePagesModel;
    use crate::model::PageMaster;
    use crate::style::Style;

    fn marker(class: &str, text: &str) -> Node {
        Node {
            children: vec![Node::text(text)],
            ..Node::new(NodeKind::Marker {
                class_name: class.to_string(),
            })
        }
    }

    fn document(flow: Vec<Node>) -> Document {
        Document {
            page_sequences: vec![PageSequence {
                master: PageMaster {
                    width: 100.0,
                    height: 50.0,
                    margin: crate::model::Edges::uniform(0.0),
                    ..PageMaster::default()
                },
                style: Style {
                    font_family: Some("Courier".to_string()),
                    font_size: Some(10.0),
                    ..Style::default()
                },
                flow,
                ..PageSequence::default()
            }],
            ..Document::default()
        }
    }

    #[test]
    fn paragraphs_hold_only_inline_content() {
        assert!(is_paragraph(&Node::block(vec![Node::text("a")])));
        assert!(!is_paragraph(&Node::block(vec![Node::text("a"), Node::block(vec![])])));
        assert!(!is_paragraph(&Node::block(vec![])));
    }

    #[test]
    fn markers_are_collected_by_class() {
        let node = Node::block(vec![marker("chapter", "One"), Node::text("body"), marker("section", "1.1")]);
        let markers = collect_markers(&node);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers["chapter"], vec![Node::text("One")]);
    }

    #[test]
    fn initial_page_number_restarts_numbering() {
        let mut doc = document(vec![Node::block(vec![Node::text("front")])]);
        let mut second = doc.page_sequences[0].clone();
        second.initial_page_number = Some(1);
        doc.page_sequences.push(second.clone());
        second.initial_page_number = None;
        doc.page_sequences.push(second);

        let mut tree = AreaTree::new(StorePagesModel::new());
        LayoutEngine::default().layout(&doc, &mut tree).unwrap();
        let numbers: Vec<&str> = tree.store().pages().iter().map(|p| p.page_number_string.as_str()).collect();
        assert_eq!(numbers, vec!["1", "1", "2"]);
        let sequences: Vec<usize> = tree.store().pages().iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn ids_land_on_the_page_that_shows_them() {
        let doc = document(vec![
            Node::block(vec![Node::text("one")]).with_id("first"),
            Node::new(NodeKind::PageBreak),
            Node::block(vec![Node::text("two")]).with_id("second"),
        ]);
        let mut tree = AreaTree::new(StorePagesModel::new());
        LayoutEngine::default().layout(&doc, &mut tree).unwrap();
        assert_eq!(tree.page_number_of("first").as_deref(), Some("1"));
        assert_eq!(tree.page_number_of("second").as_deref(), Some("2"));
        assert_eq!(tree.page_number_of("missing"), None);
    }
}
