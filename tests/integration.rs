//! Integration tests for the layout pipeline.
//!
//! These tests run whole documents through the engine and check the area
//! tree that comes out:
//! - Lines are filled, collapsed and justified against the line width
//! - Blocks split across pages and columns, honoring keeps, orphans and widows
//! - Footnotes, markers and static content land on the right pages
//! - Page-number citations resolve exactly once, in any render order
//! - The disk cache and the JSON renderer give back what went in

use std::sync::Arc;

use folayout::area::{
    AreaTree, Block, InlineArea, Line, PageCache, PageViewport, RegionContent, RegionName, RenderPagesModel,
    StorePagesModel, TraitKey, TraitValue, TreeExtension, UNRESOLVED_PAGE_TEXT,
};
use folayout::font::{FontMetric, FontRegistry};
use folayout::model::*;
use folayout::render::{CollectingRenderer, Renderer};
use folayout::style::*;
use folayout::{EngineConfig, ErrorPolicy, LayoutEngine, LayoutError};

// ─── Helpers ────────────────────────────────────────────────────

/// Every glyph 600 units wide, except `W` at 601. At 10pt a character is
/// 6pt, a line is 12pt, and the 60x36pt test page holds three lines of ten
/// characters.
#[derive(Debug)]
struct Mono;

impl FontMetric for Mono {
    fn font_name(&self) -> &str {
        "Mono"
    }

    fn glyph_width(&self, ch: char) -> Option<i32> {
        match ch {
            'W' => Some(601),
            _ => Some(600),
        }
    }

    fn ascender(&self) -> i32 {
        800
    }

    fn descender(&self) -> i32 {
        -200
    }

    fn cap_height(&self) -> i32 {
        700
    }

    fn x_height(&self) -> i32 {
        500
    }
}

fn engine() -> LayoutEngine {
    let mut fonts = FontRegistry::new();
    fonts.register("Mono", 400, false, Arc::new(Mono));
    fonts.register("Mono", 700, false, Arc::new(Mono));
    LayoutEngine::new(EngineConfig::default()).with_fonts(fonts)
}

fn make_master() -> PageMaster {
    PageMaster {
        width: 60.0,
        height: 36.0,
        margin: Edges::uniform(0.0),
        ..PageMaster::default()
    }
}

fn make_sequence(master: PageMaster, flow: Vec<Node>) -> PageSequence {
    PageSequence {
        master,
        style: Style {
            font_family: Some("Mono".to_string()),
            font_size: Some(10.0),
            ..Default::default()
        },
        flow,
        ..Default::default()
    }
}

fn make_document(flow: Vec<Node>) -> Document {
    Document {
        page_sequences: vec![make_sequence(make_master(), flow)],
        ..Default::default()
    }
}

fn make_para(text: &str) -> Node {
    Node::block(vec![Node::text(text)])
}

fn make_styled(style: Style, children: Vec<Node>) -> Node {
    Node::block(children).with_style(style)
}

fn make_citation(ref_id: &str) -> Node {
    Node::new(NodeKind::PageNumberCitation {
        ref_id: ref_id.to_string(),
    })
}

fn make_marker(class: &str, text: &str) -> Node {
    Node {
        children: vec![Node::text(text)],
        ..Node::new(NodeKind::Marker {
            class_name: class.to_string(),
        })
    }
}

fn lay_out(doc: &Document) -> AreaTree<StorePagesModel> {
    let mut tree = AreaTree::new(StorePagesModel::new());
    engine().layout(doc, &mut tree).expect("layout should succeed");
    tree
}

fn pages(tree: &AreaTree<StorePagesModel>) -> &[PageViewport] {
    tree.store().pages()
}

fn column_blocks(pv: &PageViewport, column: usize) -> &[Block] {
    let body = pv.page.as_ref().and_then(|p| p.body()).expect("page has a body");
    &body.main.spans[0].flows[column].blocks
}

fn column_lines(pv: &PageViewport, column: usize) -> Vec<String> {
    column_blocks(pv, column).iter().flat_map(|b| b.text_lines()).collect()
}

fn page_lines(pv: &PageViewport) -> Vec<String> {
    column_lines(pv, 0)
}

fn first_block_lines(pv: &PageViewport) -> Vec<Line> {
    column_blocks(pv, 0)[0].lines().into_iter().cloned().collect()
}

fn static_lines(pv: &PageViewport, name: RegionName) -> Vec<String> {
    match pv.page.as_ref().and_then(|p| p.region(name)).map(|r| &r.region.content) {
        Some(RegionContent::Static(blocks)) => blocks.iter().flat_map(|b| b.text_lines()).collect(),
        _ => Vec::new(),
    }
}

fn has_flag(block: &Block, key: TraitKey) -> bool {
    block.traits.get(&key) == Some(&TraitValue::Flag(true))
}

/// (ref id, text, resolved) of every citation in the page's body.
fn citations(pv: &PageViewport) -> Vec<(String, String, bool)> {
    column_blocks(pv, 0)
        .iter()
        .flat_map(|b| b.lines())
        .flat_map(|l| l.children.iter())
        .filter_map(|c| match c {
            InlineArea::PageNumber(pn) => Some((pn.ref_id.clone(), pn.text.clone(), pn.resolved)),
            _ => None,
        })
        .collect()
}

/// Five pages; page 2 cites an id defined on page 5.
fn forward_reference_document() -> Document {
    make_document(vec![
        make_para("one"),
        Node::new(NodeKind::PageBreak),
        Node::block(vec![Node::text("see "), make_citation("target")]),
        Node::new(NodeKind::PageBreak),
        make_para("three"),
        Node::new(NodeKind::PageBreak),
        make_para("four"),
        Node::new(NodeKind::PageBreak),
        make_para("five").with_id("target"),
    ])
}

fn space_sizes(line: &Line) -> Vec<i32> {
    line.children.iter().filter_map(|c| c.as_space()).map(|s| s.size).collect()
}

// ─── Line Filling ───────────────────────────────────────────────

#[test]
fn test_whitespace_collapses_to_single_spaces() {
    let tree = lay_out(&make_document(vec![make_para("  aa   bb\n cc  ")]));
    let page = &pages(&tree)[0];
    assert_eq!(page_lines(page), vec!["aa bb cc"]);
    let lines = first_block_lines(page);
    assert_eq!(lines[0].content_width(), 48_000);
}

#[test]
fn test_words_wrap_at_the_line_width() {
    let tree = lay_out(&make_document(vec![make_para("aaaa bbbb cccc")]));
    assert_eq!(page_lines(&pages(&tree)[0]), vec!["aaaa bbbb", "cccc"]);
}

#[test]
fn test_word_exactly_filling_the_line_stays() {
    let tree = lay_out(&make_document(vec![make_para("aaaa aaaaa")]));
    assert_eq!(page_lines(&pages(&tree)[0]), vec!["aaaa aaaaa"]);

    // One millipoint too wide.
    let tree = lay_out(&make_document(vec![make_para("aaaa aaaaW")]));
    assert_eq!(page_lines(&pages(&tree)[0]), vec!["aaaa", "aaaaW"]);
}

#[test]
fn test_justify_spreads_slack_except_on_last_line() {
    let style = Style {
        text_align: Some(TextAlign::Justify),
        ..Default::default()
    };
    let tree = lay_out(&make_document(vec![make_styled(style, vec![Node::text("aa bb cc dddd")])]));
    let lines = first_block_lines(&pages(&tree)[0]);
    assert_eq!(lines.len(), 2);
    assert_eq!(space_sizes(&lines[0]), vec![12_000, 12_000]);
    assert_eq!(lines[0].content_width(), 60_000);
    assert_eq!(lines[1].text(), "dddd");
    assert_eq!(lines[1].start_indent, 0, "last line keeps start alignment");
}

#[test]
fn test_inline_content_at_flow_level_gets_a_block() {
    let tree = lay_out(&make_document(vec![Node::text("loose")]));
    assert_eq!(page_lines(&pages(&tree)[0]), vec!["loose"]);
}

// ─── Page Breaking ──────────────────────────────────────────────

#[test]
fn test_paragraph_continues_on_next_page() {
    let text = "aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd eeeeeeeee";
    let tree = lay_out(&make_document(vec![make_para(text)]));
    let pages = pages(&tree);
    assert_eq!(pages.len(), 2, "Five lines on a three-line page should take two pages");
    assert_eq!(page_lines(&pages[0]), vec!["aaaaaaaaa", "bbbbbbbbb", "ccccccccc"]);
    assert_eq!(page_lines(&pages[1]), vec!["ddddddddd", "eeeeeeeee"]);

    let first = &column_blocks(&pages[0], 0)[0];
    let second = &column_blocks(&pages[1], 0)[0];
    assert!(has_flag(first, TraitKey::IsContinued));
    assert!(!has_flag(first, TraitKey::IsContinuation));
    assert!(has_flag(second, TraitKey::IsContinuation));
    assert!(!has_flag(second, TraitKey::IsContinued));
    assert_eq!(first.bpd, 36_000);
    assert_eq!(pages[1].page_number_string, "2");
}

#[test]
fn test_widow_control_pulls_a_line_back() {
    let text = "aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd";
    let tree = lay_out(&make_document(vec![make_para(text)]));
    let pages = pages(&tree);
    assert_eq!(pages.len(), 2);
    assert_eq!(page_lines(&pages[0]).len(), 2, "A single widow line is not allowed");
    assert_eq!(page_lines(&pages[1]).len(), 2);
}

#[test]
fn test_keep_together_moves_the_whole_block() {
    let keep = Style {
        keep_together: Some(true),
        ..Default::default()
    };
    let tree = lay_out(&make_document(vec![
        make_para("aaaaaaaaa bbbbbbbbb"),
        make_styled(keep, vec![Node::text("ccccccccc ddddddddd")]),
    ]));
    let pages = pages(&tree);
    assert_eq!(pages.len(), 2);
    assert_eq!(page_lines(&pages[0]), vec!["aaaaaaaaa", "bbbbbbbbb"]);
    assert_eq!(page_lines(&pages[1]), vec!["ccccccccc", "ddddddddd"]);
    assert!(!has_flag(&column_blocks(&pages[1], 0)[0], TraitKey::IsContinuation));
}

#[test]
fn test_break_before_starts_a_page_and_trailing_break_is_ignored() {
    let style = Style {
        break_before: Some(BreakKind::Page),
        ..Default::default()
    };
    let tree = lay_out(&make_document(vec![
        make_para("one"),
        make_styled(style, vec![Node::text("two")]),
        Node::new(NodeKind::PageBreak),
    ]));
    let pages = pages(&tree);
    assert_eq!(pages.len(), 2, "A break with nothing after it should not add a page");
    assert_eq!(page_lines(&pages[0]), vec!["one"]);
    assert_eq!(page_lines(&pages[1]), vec!["two"]);
}

#[test]
fn test_space_before_is_discarded_at_top_of_page() {
    let spaced = Style {
        space_before: Some(Space::Length(10.0)),
        ..Default::default()
    };
    let tree = lay_out(&make_document(vec![
        make_styled(spaced.clone(), vec![Node::text("one")]),
        make_styled(spaced, vec![Node::text("two")]),
    ]));
    let blocks = column_blocks(&pages(&tree)[0], 0);
    assert_eq!(blocks.len(), 3, "Only the second block should get its space");
    assert_eq!(blocks[0].text_lines(), vec!["one"]);
    assert_eq!(blocks[1].bpd, 10_000);
    assert_eq!(blocks[2].text_lines(), vec!["two"]);
}

#[test]
fn test_columns_fill_before_the_page_turns() {
    let master = PageMaster {
        width: 130.0,
        column_count: 2,
        column_gap: 10.0,
        ..make_master()
    };
    let text = "aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd";
    let doc = Document {
        page_sequences: vec![make_sequence(master, vec![make_para(text)])],
        ..Default::default()
    };
    let tree = lay_out(&doc);
    let pages = pages(&tree);
    assert_eq!(pages.len(), 1, "The second column should take the rest");
    assert_eq!(column_lines(&pages[0], 0), vec!["aaaaaaaaa", "bbbbbbbbb"]);
    assert_eq!(column_lines(&pages[0], 1), vec!["ccccccccc", "ddddddddd"]);
    assert!(has_flag(&column_blocks(&pages[0], 1)[0], TraitKey::IsContinuation));
}

// ─── Footnotes, Markers and Static Content ─────────────────────

#[test]
fn test_footnote_takes_room_from_its_page() {
    let loose = Style {
        orphans: Some(1),
        widows: Some(1),
        ..Default::default()
    };
    let footnote = Node {
        children: vec![Node::text("1")],
        ..Node::new(NodeKind::Footnote {
            body: vec![make_para("note")],
        })
    };
    let tree = lay_out(&make_document(vec![make_styled(
        loose,
        vec![
            Node::text("aaaa"),
            footnote,
            Node::text(" bbbbbbbbb ccccccccc ddddddddd"),
        ],
    )]));
    let pages = pages(&tree);
    assert_eq!(pages.len(), 2);
    assert_eq!(page_lines(&pages[0]).len(), 2, "The footnote line leaves room for two");
    assert_eq!(page_lines(&pages[1]).len(), 2);

    let notes = &pages[0].page.as_ref().and_then(|p| p.body()).expect("body").footnote;
    let note_lines: Vec<String> = notes.iter().flat_map(|b| b.text_lines()).collect();
    assert_eq!(note_lines, vec!["note"]);
    assert!(pages[1].page.as_ref().and_then(|p| p.body()).expect("body").footnote.is_empty());
}

#[test]
fn test_footnote_never_overfills_the_body() {
    let footnote = Node {
        children: vec![Node::text("1")],
        ..Node::new(NodeKind::Footnote {
            body: vec![make_para("note")],
        })
    };
    let tree = lay_out(&make_document(vec![Node::block(vec![
        Node::text("aaaaaaaaa bbbbbbbbb cc"),
        footnote,
    ])]));
    let pages = pages(&tree);
    for pv in pages {
        let body = pv.page.as_ref().and_then(|p| p.body()).expect("body");
        let span = &body.main.spans[0];
        let flow: i32 = span.flows[0].blocks.iter().map(|b| b.bpd).sum();
        let notes: i32 = body.footnote.iter().map(|b| b.bpd).sum();
        assert!(
            flow + notes <= span.bpd,
            "page {}: flow {} + footnotes {} in body {}",
            pv.page_number,
            flow,
            notes,
            span.bpd
        );
    }
    assert_eq!(page_lines(&pages[0]), vec!["aaaaaaaaa", "bbbbbbbbb", "cc1"]);
    let notes = &pages[1].page.as_ref().and_then(|p| p.body()).expect("body").footnote;
    let note_lines: Vec<String> = notes.iter().flat_map(|b| b.text_lines()).collect();
    assert_eq!(note_lines, vec!["note"], "The note moves to the page after its citation line");
}

#[test]
fn test_running_headers_come_from_markers() {
    let master = PageMaster {
        height: 48.0,
        body_margin: Edges {
            top: 12.0,
            ..Edges::default()
        },
        region_before_extent: 12.0,
        ..make_master()
    };
    let mut sequence = make_sequence(
        master,
        vec![
            Node::block(vec![make_marker("chapter", "One"), Node::text("first")]),
            Node::new(NodeKind::PageBreak),
            Node::block(vec![make_marker("chapter", "Two"), Node::text("second")]),
            Node::new(NodeKind::PageBreak),
            make_para("third"),
        ],
    );
    sequence.static_content.before = vec![Node::block(vec![Node::new(NodeKind::RetrieveMarker {
        class_name: "chapter".to_string(),
        position: RetrievePosition::FirstStartingWithinPage,
    })])];
    let doc = Document {
        page_sequences: vec![sequence],
        ..Default::default()
    };

    let tree = lay_out(&doc);
    let headers: Vec<Vec<String>> = pages(&tree).iter().map(|p| static_lines(p, RegionName::Before)).collect();
    assert_eq!(headers, vec![vec!["One"], vec!["Two"], vec!["Two"]]);
}

#[test]
fn test_static_content_overflow_is_truncated() {
    let master = PageMaster {
        height: 48.0,
        body_margin: Edges {
            bottom: 12.0,
            ..Edges::default()
        },
        region_after_extent: 12.0,
        ..make_master()
    };
    let mut sequence = make_sequence(master, vec![make_para("body")]);
    sequence.static_content.after = vec![
        Node::block(vec![Node::text("Page "), Node::new(NodeKind::PageNumber)]),
        make_para("lost"),
    ];
    let doc = Document {
        page_sequences: vec![sequence],
        ..Default::default()
    };

    let tree = lay_out(&doc);
    let pages = pages(&tree);
    assert_eq!(pages.len(), 1, "Static content never adds pages");
    assert_eq!(static_lines(&pages[0], RegionName::After), vec!["Page 1"]);
}

// ─── Forward References ─────────────────────────────────────────

#[test]
fn test_citation_waits_for_a_later_page_in_order() {
    let doc = forward_reference_document();
    let mut tree = AreaTree::new(RenderPagesModel::new(CollectingRenderer::in_order()));
    engine().layout(&doc, &mut tree).unwrap();
    assert_eq!(tree.pending_ids().count(), 0);

    let renderer = tree.into_model().into_renderer();
    assert_eq!(renderer.rendered_numbers(), vec!["1", "2", "3", "4", "5"]);
    assert!(renderer.prepared.is_empty(), "In-order renderers are never asked to prepare");
    assert_eq!(
        citations(&renderer.pages[1]),
        vec![("target".to_string(), "5".to_string(), true)]
    );
    assert!(renderer.stopped);
}

#[test]
fn test_out_of_order_renderer_gets_resolved_pages_first() {
    let doc = forward_reference_document();
    let mut tree = AreaTree::new(RenderPagesModel::new(CollectingRenderer::out_of_order()));
    engine().layout(&doc, &mut tree).unwrap();

    let renderer = tree.into_model().into_renderer();
    assert_eq!(renderer.rendered_numbers(), vec!["1", "3", "4", "5", "2"]);
    assert_eq!(renderer.prepared, vec![2]);
    let cited = renderer.pages.iter().find(|p| p.page_number == 2).expect("page 2");
    assert_eq!(citations(cited)[0].1, "5");
}

#[test]
fn test_citation_to_same_page_resolves_immediately() {
    let tree = lay_out(&make_document(vec![
        Node::block(vec![Node::text("at "), make_citation("here")]),
        make_para("x").with_id("here"),
        Node::block(vec![Node::text("at "), make_citation("here")]),
    ]));
    let page = &pages(&tree)[0];
    assert_eq!(page_lines(page), vec!["at 1", "x", "at 1"]);
    // Only the citation laid out before its target waited; the second was
    // known when it was reached and went in as plain text.
    assert_eq!(citations(page), vec![("here".to_string(), "1".to_string(), true)]);
}

#[test]
fn test_missing_id_keeps_the_placeholder() {
    let tree = lay_out(&make_document(vec![Node::block(vec![
        Node::text("see "),
        make_citation("nowhere"),
    ])]));
    assert_eq!(tree.pending_ids().count(), 0, "End of document forces every reference");
    assert_eq!(
        citations(&pages(&tree)[0]),
        vec![("nowhere".to_string(), UNRESOLVED_PAGE_TEXT.to_string(), true)]
    );
    assert!(tree.model().is_finished());
}

#[test]
fn test_outline_and_document_info_reach_the_renderer() {
    let mut doc = forward_reference_document();
    doc.metadata.title = Some("Forward".to_string());
    doc.bookmarks = vec![Bookmark {
        title: "Target".to_string(),
        ref_id: "target".to_string(),
        children: Vec::new(),
    }];
    let mut tree = AreaTree::new(RenderPagesModel::new(CollectingRenderer::in_order()));
    engine().layout(&doc, &mut tree).unwrap();

    let renderer = tree.into_model().into_renderer();
    let names: Vec<&str> = renderer.extensions.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["document-info", "outline"]);
    match &renderer.extensions[1] {
        TreeExtension::Outline(outline) => {
            let page = outline.items[0].page.as_ref().expect("bookmark target resolved");
            assert_eq!(page.number, "5");
        }
        other => panic!("expected an outline, got {:?}", other),
    }
}

// ─── Whole Pipeline ─────────────────────────────────────────────

#[test]
fn test_layout_is_repeatable() {
    let doc = forward_reference_document();
    let first = lay_out(&doc);
    let second = lay_out(&doc);
    assert_eq!(pages(&first), pages(&second));
}

/// Collects pages like [`CollectingRenderer`] but rejects one page number.
struct RejectingRenderer {
    reject: &'static str,
    inner: CollectingRenderer,
}

impl RejectingRenderer {
    fn new(reject: &'static str) -> Self {
        Self {
            reject,
            inner: CollectingRenderer::in_order(),
        }
    }
}

impl Renderer for RejectingRenderer {
    fn render_page(&mut self, page: &PageViewport) -> folayout::Result<()> {
        if page.page_number_string == self.reject {
            return Err(LayoutError::Render {
                page: page.page_number_string.clone(),
                message: "out of ink".to_string(),
            });
        }
        self.inner.render_page(page)
    }

    fn stop_renderer(&mut self) -> folayout::Result<()> {
        self.inner.stop_renderer()
    }
}

#[test]
fn test_render_failure_aborts_by_default() {
    let doc = forward_reference_document();
    let mut tree = AreaTree::new(RenderPagesModel::new(RejectingRenderer::new("3")));
    match engine().layout(&doc, &mut tree) {
        Err(LayoutError::Render { page, message }) => {
            assert_eq!(page, "3");
            assert_eq!(message, "out of ink");
        }
        other => panic!("expected a render error, got {:?}", other),
    }
    assert!(!tree.model().renderer().inner.stopped);
}

#[test]
fn test_render_failure_skips_the_page_when_asked() {
    let doc = forward_reference_document();
    let model = RenderPagesModel::new(RejectingRenderer::new("3")).with_error_policy(ErrorPolicy::SkipPage);
    let mut tree = AreaTree::new(model);
    engine().layout(&doc, &mut tree).expect("skipped pages do not fail the layout");
    assert_eq!(tree.model().failed_pages(), ["3".to_string()]);

    let renderer = tree.into_model().into_renderer();
    assert_eq!(renderer.inner.rendered_numbers(), vec!["1", "2", "4", "5"]);
    assert!(renderer.inner.stopped);
}

#[test]
fn test_cached_pages_render_the_same() {
    let doc = forward_reference_document();
    let dir = tempfile::tempdir().unwrap();

    let mut plain = AreaTree::new(RenderPagesModel::new(CollectingRenderer::in_order()));
    engine().layout(&doc, &mut plain).unwrap();
    let plain = plain.into_model().into_renderer();

    let cache = PageCache::new_in(dir.path()).unwrap();
    let mut cached = AreaTree::new(RenderPagesModel::cached(CollectingRenderer::in_order(), cache));
    engine().layout(&doc, &mut cached).unwrap();
    assert_eq!(
        cached.model().stash().saved_count(),
        3,
        "Only pages held back behind the citing page are stashed"
    );
    let cached = cached.into_model().into_renderer();

    assert_eq!(plain.rendered_numbers(), cached.rendered_numbers());
    for (a, b) in plain.pages.iter().zip(&cached.pages) {
        assert_eq!(a.page, b.page, "page {} differs after the cache", a.page_number_string);
    }
}

fn json_document() -> &'static str {
    r#"{
      "metadata": { "title": "Round trip" },
      "pageSequences": [{
        "title": "Main",
        "master": { "width": 200, "height": 100, "margin": { "top": 10, "right": 10, "bottom": 10, "left": 10 } },
        "style": { "fontFamily": "Courier", "fontSize": 10 },
        "flow": [
          { "kind": { "type": "Block" }, "children": [
            { "kind": { "type": "Text", "content": "See page " } },
            { "kind": { "type": "PageNumberCitation", "refId": "end" } }
          ]},
          { "kind": { "type": "PageBreak" } },
          { "kind": { "type": "Block" }, "id": "end", "children": [
            { "kind": { "type": "Text", "content": "The end." } }
          ]}
        ]
      }]
    }"#
}

fn records(bytes: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is one JSON record"))
        .collect()
}

fn find_citation_texts(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            if let (Some(_), Some(serde_json::Value::String(text))) = (map.get("refId"), map.get("text")) {
                out.push(text.clone());
            }
            map.values().for_each(|v| find_citation_texts(v, out));
        }
        serde_json::Value::Array(items) => items.iter().for_each(|v| find_citation_texts(v, out)),
        _ => {}
    }
}

#[test]
fn test_json_in_json_lines_out() {
    let bytes = folayout::render_json(json_document(), &EngineConfig::default()).unwrap();
    let records = records(&bytes);
    let kinds: Vec<&str> = records.iter().map(|r| r["record"].as_str().unwrap_or("")).collect();
    assert_eq!(kinds, vec!["extension", "pageSequence", "page", "page"]);
    assert_eq!(records[1]["title"], "Main");
    assert_eq!(records[2]["pageNumberString"], "1");

    let mut texts = Vec::new();
    find_citation_texts(&records[2], &mut texts);
    assert_eq!(texts, vec!["2"]);
}

#[test]
fn test_json_out_of_order_puts_waiting_page_last() {
    let config = EngineConfig {
        out_of_order: true,
        ..EngineConfig::default()
    };
    let bytes = folayout::render_json(json_document(), &config).unwrap();
    let numbers: Vec<String> = records(&bytes)
        .iter()
        .filter(|r| r["record"] == "page")
        .map(|r| r["pageNumberString"].as_str().unwrap_or("").to_string())
        .collect();
    assert_eq!(numbers, vec!["2", "1"]);
}

#[test]
fn test_cli_config_round_trips_through_json() {
    let config = EngineConfig::from_json(r#"{ "cachePages": true, "outOfOrder": true }"#).unwrap();
    assert!(config.cache_pages);
    assert!(config.out_of_order);
    assert_eq!(config.default_font_family, "Helvetica");

    let bytes = folayout::render_json(json_document(), &config).unwrap();
    assert_eq!(records(&bytes).iter().filter(|r| r["record"] == "page").count(), 2);
}

#[test]
fn test_malformed_json_is_an_error() {
    let result = folayout::render_json("{ \"pageSequences\": [", &EngineConfig::default());
    assert!(result.is_err());
}
