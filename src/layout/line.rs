//! # Line Filling
//!
//! A [`LineArea`] takes inline content one run at a time and commits as much
//! as fits in its content width. It never looks ahead: a word is known to
//! fit only once the white space after it arrives, so the tail of a run
//! (the unfinished word and the space before it) waits in a *pending* list.
//! When the line is full the pending content moves to the next line.
//!
//! Widths are tracked in three parts:
//!
//! ```text
//! final_width    committed children
//! space_width    white space seen since the last committed word
//! pending_width  pending areas (trailing word of a run, leaders, citations)
//! ```
//!
//! A run that does not fit returns the index of the first character that
//! should start the next line.

use std::sync::Arc;

use unicode_linebreak::{break_property, BreakClass};

use crate::area::{
    GraphicArea, InlineArea, InlineSpace, LeaderArea, Line, LinkKind, LinkSet, PageNumberArea, Rect, WordArea,
    UNRESOLVED_PAGE_TEXT,
};
use crate::font::FontState;
use crate::hyphenation::{Hyphenation, HyphenationProps, Hyphenator};
use crate::style::{Color, Decoration, LeaderAlignment, LeaderPattern, LeaderSpec, TextAlign, VerticalAlign, WrapOption};

const LEADER_DOT: char = '.';
const SIMPLE_LEADER_FALLBACK_WIDTH: i32 = 100;
const TAB_SPACES: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Nothing,
    Whitespace,
    Text,
}

/// Outcome of [`LineArea::add_character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterStatus {
    Ok,
    DoesNotFit,
}

/// Everything about a text run except its characters.
#[derive(Debug, Clone)]
pub struct TextProps {
    pub font: FontState,
    pub color: Color,
    pub wrap: WrapOption,
    pub collapse: bool,
    pub vertical_align: VerticalAlign,
    pub decoration: Decoration,
    pub link: Option<(String, LinkKind)>,
    pub hyphenation: HyphenationProps,
}

/// Breakable white space. No-break spaces are not in this set.
pub fn is_space(c: char) -> bool {
    c == ' ' || ('\u{2000}'..='\u{200B}').contains(&c)
}

pub fn is_nbsp(c: char) -> bool {
    matches!(c, '\u{00A0}' | '\u{202F}' | '\u{3000}' | '\u{FEFF}')
}

fn is_whitespace_class(c: char) -> bool {
    is_space(c) || matches!(c, '\n' | '\r' | '\t' | '\u{2028}')
}

/// Ideographs, kana and Hangul break between any two characters.
fn is_ideographic(c: char) -> bool {
    matches!(
        break_property(c as u32),
        BreakClass::Ideographic
            | BreakClass::ConditionalJapaneseStarter
            | BreakClass::HangulLvSyllable
            | BreakClass::HangulLvtSyllable
            | BreakClass::HangulLJamo
            | BreakClass::HangulVJamo
            | BreakClass::HangulTJamo
    )
}

/// The run of letters starting at `start`.
fn letter_run(chars: &[char], start: usize) -> String {
    chars
        .iter()
        .skip(start)
        .take_while(|c| c.is_alphabetic())
        .collect()
}

pub struct LineArea {
    start_indent: i32,
    end_indent: i32,
    content_width: i32,
    /// Baseline offset from the line top.
    placement_offset: i32,
    /// Glyph height of the nominal font, grown by taller inline areas.
    allocation_height: i32,
    nominal_font: FontState,

    font: FontState,
    color: Color,
    wrap: WrapOption,
    collapse: bool,
    vertical_align: VerticalAlign,
    hyphenation: HyphenationProps,
    hyphenator: Arc<dyn Hyphenator>,
    link: Option<usize>,
    link_targets: Vec<(String, LinkKind)>,

    children: Vec<InlineArea>,
    pending: Vec<InlineArea>,
    final_width: i32,
    space_width: i32,
    pending_width: i32,
    prev: CharClass,
    prev_decoration: Decoration,
    prev_link: Option<usize>,
    overrun: bool,
}

impl std::fmt::Debug for LineArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineArea")
            .field("content_width", &self.content_width)
            .field("final_width", &self.final_width)
            .field("pending_width", &self.pending_width)
            .field("text", &self.line_text())
            .finish()
    }
}

impl LineArea {
    pub fn new(
        font: FontState,
        allocation_width: i32,
        start_indent: i32,
        end_indent: i32,
        hyphenator: Arc<dyn Hyphenator>,
    ) -> Self {
        let placement_offset = font.ascender();
        let allocation_height = font.glyph_height();
        Self {
            start_indent,
            end_indent,
            content_width: allocation_width - start_indent - end_indent,
            placement_offset,
            allocation_height,
            nominal_font: font.clone(),
            font,
            color: Color::BLACK,
            wrap: WrapOption::Wrap,
            collapse: true,
            vertical_align: VerticalAlign::Baseline,
            hyphenation: HyphenationProps::default(),
            hyphenator,
            link: None,
            link_targets: Vec::new(),
            children: Vec::new(),
            pending: Vec::new(),
            final_width: 0,
            space_width: 0,
            pending_width: 0,
            prev: CharClass::Nothing,
            prev_decoration: Decoration::default(),
            prev_link: None,
            overrun: false,
        }
    }

    /// The line after this one: same context, this line's pending areas
    /// minus any eatable spaces at their front.
    pub fn next_line(&mut self, allocation_width: i32, start_indent: i32, end_indent: i32) -> LineArea {
        let mut next = LineArea::new(
            self.nominal_font.clone(),
            allocation_width,
            start_indent,
            end_indent,
            Arc::clone(&self.hyphenator),
        );
        next.font = self.font.clone();
        next.color = self.color;
        next.wrap = self.wrap;
        next.collapse = self.collapse;
        next.vertical_align = self.vertical_align;
        next.hyphenation = self.hyphenation.clone();
        next.link = self.link;
        next.link_targets = self.link_targets.clone();

        let mut eating = true;
        next.pending_width = self.pending_width;
        for area in std::mem::take(&mut self.pending) {
            if eating {
                if let InlineArea::Space(s) = &area {
                    if s.eatable {
                        next.pending_width -= s.size;
                        continue;
                    }
                }
                eating = false;
            }
            next.pending.push(area);
        }
        self.pending_width = 0;
        next
    }

    // ── Context ─────────────────────────────────────────────────

    pub fn change_font(&mut self, font: FontState) {
        self.font = font;
    }

    pub fn change_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn change_wrap_option(&mut self, wrap: WrapOption) {
        self.wrap = wrap;
    }

    pub fn change_white_space_collapse(&mut self, collapse: bool) {
        self.collapse = collapse;
    }

    pub fn change_vertical_align(&mut self, vertical_align: VerticalAlign) {
        self.vertical_align = vertical_align;
    }

    pub fn change_hyphenation(&mut self, hyphenation: HyphenationProps) {
        self.hyphenation = hyphenation;
    }

    /// Areas added from now on belong to this link.
    pub fn change_link(&mut self, link: Option<(&str, LinkKind)>) {
        self.link = link.map(|(destination, kind)| {
            match self.link_targets.iter().position(|(d, k)| d == destination && *k == kind) {
                Some(index) => index,
                None => {
                    self.link_targets.push((destination.to_string(), kind));
                    self.link_targets.len() - 1
                }
            }
        });
    }

    /// Set the whole context from a run's properties.
    pub fn apply(&mut self, props: &TextProps) {
        self.change_font(props.font.clone());
        self.change_color(props.color);
        self.change_wrap_option(props.wrap);
        self.change_white_space_collapse(props.collapse);
        self.change_vertical_align(props.vertical_align);
        self.change_hyphenation(props.hyphenation.clone());
        self.change_link(props.link.as_ref().map(|(d, k)| (d.as_str(), *k)));
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.pending.is_empty()
    }

    pub fn remaining_width(&self) -> i32 {
        self.content_width - (self.final_width + self.space_width + self.pending_width)
    }

    pub fn content_width(&self) -> i32 {
        self.content_width
    }

    pub fn final_width(&self) -> i32 {
        self.final_width
    }

    pub fn pending_width(&self) -> i32 {
        self.pending_width
    }

    pub fn start_indent(&self) -> i32 {
        self.start_indent
    }

    pub fn end_indent(&self) -> i32 {
        self.end_indent
    }

    pub fn height(&self) -> i32 {
        self.allocation_height
    }

    pub fn placement_offset(&self) -> i32 {
        self.placement_offset
    }

    /// True once a word wider than the whole line was emitted.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    pub fn children(&self) -> &[InlineArea] {
        &self.children
    }

    pub fn pending(&self) -> &[InlineArea] {
        &self.pending
    }

    /// Committed text, spaces shown as blanks.
    pub fn line_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                InlineArea::Space(_) => out.push(' '),
                InlineArea::Graphic(_) => out.push_str("<img>"),
                InlineArea::Leader(_) => out.push_str("<leader>"),
                other => out.push_str(other.text().unwrap_or_default()),
            }
        }
        out
    }

    // ── Text ────────────────────────────────────────────────────

    fn space_char_width(&self) -> i32 {
        self.font.char_width(' ')
    }

    /// Width of a character inside a word. Glyphs with no advance count as
    /// a space, except the zero-width ones.
    fn text_char_width(&self, c: char) -> i32 {
        let width = self.font.char_width(c);
        if width <= 0 && c != '\u{200B}' && c != '\u{FEFF}' {
            self.space_char_width()
        } else {
            width
        }
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.text_char_width(c)).sum()
    }

    /// A space between two words keeps a decoration only if both have it.
    fn space_decoration(&self, current: Decoration) -> Decoration {
        Decoration {
            underline: self.prev_decoration.underline && current.underline,
            overline: self.prev_decoration.overline && current.overline,
            line_through: self.prev_decoration.line_through && current.line_through,
        }
    }

    fn space_link(&self) -> Option<usize> {
        if self.prev_link == self.link {
            self.link
        } else {
            None
        }
    }

    fn word_area(&self, text: &str, width: i32, decoration: Decoration) -> InlineArea {
        InlineArea::Word(WordArea {
            text: text.to_string(),
            width,
            height: self.font.glyph_height(),
            font: self.font.font_ref(),
            color: self.color,
            decoration,
            vertical_align: self.vertical_align,
            y_offset: self.placement_offset,
            link: self.link,
        })
    }

    /// Commit the pending space, then every pending area.
    fn commit_space_and_pending(&mut self, decoration: Decoration) {
        if self.space_width > 0 {
            let mut space = InlineSpace::new(self.space_width);
            space.decoration = self.space_decoration(decoration);
            space.link = self.space_link();
            self.children.push(InlineArea::Space(space));
            self.final_width += self.space_width;
            self.space_width = 0;
        }
        self.children.append(&mut self.pending);
        self.final_width += self.pending_width;
        self.pending_width = 0;
    }

    /// Commit white space left open by the last text run. It sits before
    /// the next item.
    fn commit_space_before(&mut self, decoration: Decoration) {
        if self.prev == CharClass::Whitespace && self.space_width > 0 {
            self.commit_space_and_pending(decoration);
        }
    }

    /// Add a word that may contain no-break spaces: the word is split at
    /// them and each becomes a fixed space. Returns the total width.
    fn add_spaced_word(&mut self, word: &[char], to_pending: bool, decoration: Decoration) -> i32 {
        let mut total = 0;
        let mut part = String::new();
        for &c in word {
            if is_nbsp(c) {
                total += self.emit_word_part(&mut part, to_pending, decoration);
                let width = self.font.char_width(c);
                if width > 0 {
                    let mut space = InlineSpace::fixed(width);
                    space.decoration = self.space_decoration(decoration);
                    space.link = self.link;
                    self.emit(InlineArea::Space(space), to_pending);
                    total += width;
                }
            } else {
                part.push(c);
            }
        }
        total += self.emit_word_part(&mut part, to_pending, decoration);
        self.prev_decoration = decoration;
        self.prev_link = self.link;
        total
    }

    fn emit(&mut self, area: InlineArea, to_pending: bool) {
        if to_pending {
            self.pending_width += area.width();
            self.pending.push(area);
        } else {
            self.children.push(area);
        }
    }

    fn emit_word_part(&mut self, part: &mut String, to_pending: bool, decoration: Decoration) -> i32 {
        if part.is_empty() {
            return 0;
        }
        let width = self.text_width(part);
        let area = self.word_area(part, width, decoration);
        self.emit(area, to_pending);
        part.clear();
        width
    }

    /// Commit space, pending areas and `word` as one word area.
    fn add_word(&mut self, word: &str, decoration: Decoration) {
        self.commit_space_and_pending(decoration);
        let width = self.text_width(word);
        let area = self.word_area(word, width, decoration);
        self.children.push(area);
        self.final_width += width;
        self.prev_decoration = decoration;
        self.prev_link = self.link;
    }

    /// Fill the line from `chars[start..end]`.
    ///
    /// Returns `None` when the whole range was taken (the tail may be
    /// pending), or the index the next line should start at.
    pub fn add_text(&mut self, chars: &[char], start: usize, end: usize, decoration: Decoration) -> Option<usize> {
        let end = end.min(chars.len());
        let whitespace_width = self.space_char_width();
        let mut run_start = start;
        let mut word_start = start;
        let mut word_length = 0usize;
        let mut word_width = 0;

        for i in start..end {
            let c = chars[i];
            if !is_whitespace_class(c) {
                let char_width = self.text_char_width(c);

                match self.prev {
                    CharClass::Whitespace => {
                        if self.final_width + self.space_width + self.pending_width + char_width > self.content_width
                            && self.wrap == WrapOption::Wrap
                        {
                            return Some(i);
                        }
                        self.prev = CharClass::Text;
                        word_start = i;
                        word_length = 1;
                        word_width = char_width;
                    }
                    CharClass::Text => {
                        word_length += 1;
                        word_width += char_width;
                    }
                    CharClass::Nothing => {
                        self.prev = CharClass::Text;
                        word_start = i;
                        word_length = 1;
                        word_width = char_width;
                    }
                }

                if self.final_width + self.space_width + self.pending_width + word_width > self.content_width
                    && self.wrap == WrapOption::Wrap
                {
                    if let Some(next) = self.break_overflowing_word(chars, i, end, run_start, word_start, word_length, decoration) {
                        return Some(next);
                    }
                }
                continue;
            }

            let char_width = if matches!(c, '\n' | '\r' | '\t') {
                whitespace_width
            } else {
                self.font.char_width(c)
            };

            match self.prev {
                CharClass::Whitespace => {
                    if !self.collapse {
                        if is_space(c) {
                            self.space_width += char_width;
                        } else if c == '\n' || c == '\u{2028}' {
                            self.commit_space_and_pending(decoration);
                            return Some(i + 1);
                        } else if c == '\t' {
                            self.space_width += TAB_SPACES * whitespace_width;
                        }
                    } else if c == '\u{2028}' {
                        self.commit_space_and_pending(decoration);
                        return Some(i + 1);
                    }
                }
                CharClass::Text => {
                    // The word before this space made it.
                    self.commit_space_and_pending(decoration);
                    if word_length > 0 {
                        let word = &chars[word_start..word_start + word_length];
                        self.final_width += self.add_spaced_word(word, false, decoration);
                        word_width = 0;
                        word_length = 0;
                    }
                    self.prev = CharClass::Whitespace;
                    self.space_width = char_width;

                    if !self.collapse {
                        if c == '\n' || c == '\u{2028}' {
                            self.space_width = 0;
                            return Some(i + 1);
                        } else if c == '\t' {
                            self.space_width = TAB_SPACES * whitespace_width;
                        }
                    } else if c == '\u{2028}' {
                        self.space_width = 0;
                        return Some(i + 1);
                    }
                }
                CharClass::Nothing => {
                    if !self.collapse {
                        if is_space(c) {
                            self.prev = CharClass::Whitespace;
                            self.space_width = char_width;
                        } else if c == '\n' || c == '\u{2028}' {
                            // Keeps the empty line's height.
                            self.children.push(InlineArea::Space(InlineSpace::new(0)));
                            return Some(i + 1);
                        } else if c == '\t' {
                            self.prev = CharClass::Whitespace;
                            self.space_width = TAB_SPACES * whitespace_width;
                        }
                    } else if c == '\u{2028}' {
                        self.children.push(InlineArea::Space(InlineSpace::new(0)));
                        return Some(i + 1);
                    } else {
                        run_start = i + 1;
                        word_start = i + 1;
                    }
                }
            }
        }

        if self.prev == CharClass::Text {
            if self.space_width > 0 {
                let mut space = InlineSpace::new(self.space_width);
                space.eatable = true;
                space.decoration = self.space_decoration(decoration);
                space.link = self.space_link();
                self.pending.push(InlineArea::Space(space));
                self.pending_width += self.space_width;
                self.space_width = 0;
            }
            if word_length > 0 {
                let word = &chars[word_start..word_start + word_length];
                self.add_spaced_word(word, true, decoration);
            }
        }

        None
    }

    /// The word at `word_start` no longer fits after adding `chars[i]`.
    /// Returns where the next line starts, or `None` to keep going on this
    /// line (an overlong first word).
    #[allow(clippy::too_many_arguments)]
    fn break_overflowing_word(
        &mut self,
        chars: &[char],
        i: usize,
        end: usize,
        run_start: usize,
        word_start: usize,
        word_length: usize,
        decoration: Decoration,
    ) -> Option<usize> {
        let first_word = word_start == run_start;

        let mid_word = word_length > 1
            && (self.hyphenation.allows_mid_word_break() || is_ideographic(chars[i - 1]) || is_ideographic(chars[i]));
        if mid_word {
            self.commit_space_and_pending(decoration);
            let width = self.add_spaced_word(&chars[word_start..i], false, decoration);
            self.final_width += width;
            return Some(i);
        }

        if self.hyphenation.hyphenate {
            let remaining = self.content_width - (self.final_width + self.space_width + self.pending_width);
            let next = self.do_hyphenation(&chars[..end], word_start, remaining, decoration);
            if next == word_start && first_word && self.final_width == 0 {
                log::debug!("word wider than the line, breaking between characters");
                self.overrun = true;
                let stop = if word_length > 1 { i } else { i + 1 };
                self.commit_space_and_pending(decoration);
                let width = self.add_spaced_word(&chars[word_start..stop], false, decoration);
                self.final_width += width;
                return Some(stop);
            }
            return Some(next);
        }

        if first_word {
            if !self.overrun {
                log::debug!("word wider than the line: {}", self.line_text());
            }
            self.overrun = true;
            if self.final_width > 0 {
                return Some(word_start);
            }
            return None;
        }
        Some(word_start)
    }

    /// Try to hyphenate the word at `word_start` into `remaining`. Commits
    /// the fragment that fits and returns the index after it, or returns
    /// `word_start` when nothing fits.
    fn do_hyphenation(&mut self, chars: &[char], word_start: usize, remaining: i32, decoration: Decoration) -> usize {
        if self.hyphenation.language.eq_ignore_ascii_case("none") {
            log::warn!("hyphenate is on but no language is set, line: {}", self.line_text());
            return word_start;
        }
        let hyphen = self.hyphenation.hyphenation_char;
        let mut remaining = remaining - self.font.char_width(hyphen);

        let mut fragment = String::new();
        if matches!(chars.get(word_start), Some('"') | Some('\'')) {
            fragment.push(chars[word_start]);
        }
        let mut offset = word_start + fragment.chars().count();
        let mut word = letter_run(chars, offset);

        // A hard hyphen or slash inside the word is a break of its own.
        let mut prefix: Option<String> = None;
        if self.text_width(&word) < remaining {
            let after = offset + word.chars().count();
            if let Some(&punct) = chars.get(after) {
                if punct == '-' || punct == '/' {
                    let mut pre = word.clone();
                    pre.push(punct);
                    remaining -= self.text_width(&pre);
                    offset = after + 1;
                    word = letter_run(chars, offset);
                    prefix = Some(pre);
                }
            }
        }

        let hyphenation = self.hyphenator.hyphenate(
            &self.hyphenation.language,
            self.hyphenation.country.as_deref(),
            &word,
            self.hyphenation.remain_count,
            self.hyphenation.push_count,
        );
        let point = hyphenation
            .as_ref()
            .and_then(|h| self.final_hyphenation_point(h, remaining).map(|index| h.pre_hyphen_text(index)));

        match (point, prefix) {
            (Some(pre_text), prefix) => {
                if let Some(prefix) = prefix {
                    fragment.push_str(&prefix);
                }
                fragment.push_str(&pre_text);
                fragment.push(hyphen);
                self.add_word(&fragment, decoration);
                word_start + fragment.chars().count() - 1
            }
            (None, Some(prefix)) => {
                fragment.push_str(&prefix);
                self.add_word(&fragment, decoration);
                word_start + fragment.chars().count()
            }
            (None, None) => word_start,
        }
    }

    /// The last break point whose text before the hyphen fits.
    fn final_hyphenation_point(&self, hyphenation: &Hyphenation, remaining: i32) -> Option<usize> {
        let mut index = None;
        for i in 0..hyphenation.points().len() {
            if self.text_width(&hyphenation.pre_hyphen_text(i)) > remaining {
                break;
            }
            index = Some(i);
        }
        index
    }

    // ── Other inline content ────────────────────────────────────

    /// A page-number citation whose number is not known yet. Reserves the
    /// width of three figures.
    pub fn add_page_number_citation(&mut self, ref_id: &str, decoration: Decoration) {
        self.commit_space_before(decoration);
        let width = 3 * self.font.char_width('0');
        self.pending.push(InlineArea::PageNumber(PageNumberArea {
            ref_id: ref_id.to_string(),
            text: UNRESOLVED_PAGE_TEXT.to_string(),
            width,
            height: self.font.glyph_height(),
            font: self.font.font_ref(),
            color: self.color,
            decoration,
            y_offset: self.placement_offset,
            resolved: false,
            link: self.link,
        }));
        self.pending_width += width;
        self.prev = CharClass::Text;
    }

    pub fn add_character(&mut self, c: char, decoration: Decoration) -> CharacterStatus {
        let width = self.font.char_width(c);
        if width > self.remaining_width() {
            return CharacterStatus::DoesNotFit;
        }
        let space = is_space(c) || is_nbsp(c);
        if space && self.collapse {
            return CharacterStatus::Ok;
        }
        if space {
            let mut area = InlineSpace::fixed(width);
            area.decoration = decoration;
            area.link = self.link;
            self.pending.push(InlineArea::Space(area));
            self.prev = CharClass::Whitespace;
        } else {
            self.commit_space_before(decoration);
            let area = self.word_area(&c.to_string(), width, decoration);
            self.pending.push(area);
            self.prev = CharClass::Text;
        }
        self.pending_width += width;
        CharacterStatus::Ok
    }

    /// Commit pending content, then a fixed-size inline box.
    pub fn add_inline_area(&mut self, mut graphic: GraphicArea) {
        self.add_pending();
        graphic.link = self.link;
        graphic.y_offset = self.placement_offset;
        self.final_width += graphic.width;
        self.children.push(InlineArea::Graphic(graphic));
        self.prev = CharClass::Text;
    }

    pub fn add_leader(&mut self, leader: &LeaderSpec) {
        let remaining = self.remaining_width();
        let mut length = if remaining <= leader.length.opt || remaining <= leader.length.max {
            remaining
        } else {
            leader.length.max
        };
        if length <= 0 {
            return;
        }

        match leader.pattern {
            LeaderPattern::Space => {
                let mut space = InlineSpace::fixed(length);
                space.link = self.link;
                self.pending.push(InlineArea::Space(space));
            }
            LeaderPattern::Rule => {
                self.pending.push(InlineArea::Leader(LeaderArea {
                    length,
                    thickness: leader.rule_thickness,
                    rule_style: leader.rule_style,
                    color: self.color,
                    y_offset: self.placement_offset,
                    link: self.link,
                }));
            }
            LeaderPattern::Dots => {
                let dot_width = self.font.char_width(LEADER_DOT);
                let pattern_width = if leader.pattern_width < dot_width { 0 } else { leader.pattern_width };
                if pattern_width == 0 {
                    let area = self.build_simple_leader(LEADER_DOT, length);
                    self.pending.push(area);
                } else {
                    if leader.alignment == LeaderAlignment::ReferenceArea {
                        let before = self.leader_align_indent(pattern_width);
                        if before != 0 {
                            self.pending.push(InlineArea::Space(InlineSpace::fixed(before)));
                            self.pending_width += before;
                            length -= before;
                        }
                    }
                    let dots = length / pattern_width;
                    for _ in 0..dots {
                        let dot = self.word_area(&LEADER_DOT.to_string(), dot_width, Decoration::default());
                        self.pending.push(dot);
                        self.pending.push(InlineArea::Space(InlineSpace::fixed(pattern_width - dot_width)));
                    }
                    self.pending.push(InlineArea::Space(InlineSpace::fixed(length - dots * pattern_width)));
                }
            }
            LeaderPattern::UseContent => {
                log::warn!("leader-pattern use-content is not supported");
                return;
            }
        }
        self.pending_width += length;
        self.prev = CharClass::Text;
    }

    /// One word of `c` repeated to fill `length`.
    fn build_simple_leader(&self, c: char, length: i32) -> InlineArea {
        let mut width = self.font.char_width(c);
        if width == 0 {
            log::warn!("leader character '{}' has no width, using {}", c, SIMPLE_LEADER_FALLBACK_WIDTH);
            width = SIMPLE_LEADER_FALLBACK_WIDTH;
        }
        let count = (length / width).max(0) as usize;
        let text: String = std::iter::repeat(c).take(count).collect();
        self.word_area(&text, length, Decoration::default())
    }

    /// Space that puts the next dot on a multiple of the pattern width,
    /// measured from the reference area start.
    fn leader_align_indent(&self, pattern_width: i32) -> i32 {
        let position = self.final_width + self.space_width + self.start_indent + self.pending_width;
        let cycles = (position + pattern_width - 1).div_euclid(pattern_width);
        cycles * pattern_width - position
    }

    /// Forget the white space after the last word, when collapsing.
    pub fn drop_trailing_space(&mut self) {
        if self.collapse {
            self.space_width = 0;
        }
    }

    /// Commit the pending space and areas.
    pub fn add_pending(&mut self) {
        if self.space_width > 0 {
            self.children.push(InlineArea::Space(InlineSpace::new(self.space_width)));
            self.final_width += self.space_width;
            self.space_width = 0;
        }
        self.children.append(&mut self.pending);
        self.final_width += self.pending_width;
        self.pending_width = 0;
    }

    // ── Finishing ───────────────────────────────────────────────

    /// Distribute the slack. Negative slack is left alone.
    pub fn align(&mut self, align: TextAlign) {
        let slack = self.content_width - self.final_width;
        if slack <= 0 {
            return;
        }
        match align {
            TextAlign::Start => self.end_indent += slack,
            TextAlign::End => self.start_indent += slack,
            TextAlign::Center => {
                self.start_indent += slack / 2;
                self.end_indent += slack / 2;
            }
            TextAlign::Justify => {
                let count = self
                    .children
                    .iter()
                    .filter(|c| c.as_space().map(|s| s.resizeable).unwrap_or(false))
                    .count() as i32;
                if count == 0 {
                    return;
                }
                let share = slack / count;
                for child in &mut self.children {
                    if let InlineArea::Space(space) = child {
                        if space.resizeable {
                            space.size += share;
                        }
                    }
                }
                self.final_width += share * count;
            }
        }
    }

    /// Place every child on the baseline, raise or lower super- and
    /// subscripts, and grow the line to its tallest child.
    pub fn vertical_align(&mut self) {
        let tallest_graphic = self
            .children
            .iter()
            .filter(|c| matches!(c, InlineArea::Graphic(_)))
            .map(|c| c.height())
            .max()
            .unwrap_or(0);
        let baseline = self.placement_offset.max(tallest_graphic);
        let shift = baseline - self.placement_offset;
        let mut height = self.allocation_height;
        let raise = 2 * self.nominal_font.ascender() / 3;

        for child in &mut self.children {
            if !matches!(child, InlineArea::Graphic(_)) {
                height = height.max(child.height());
            }
            let offset = match child.vertical_align() {
                VerticalAlign::Super => baseline - raise,
                VerticalAlign::Sub => baseline + raise,
                VerticalAlign::Baseline => baseline,
            };
            child.set_y_offset(offset);
        }
        self.placement_offset = baseline;
        self.allocation_height = height + shift;
    }

    /// The finished line. Pending content is dropped; call
    /// [`add_pending`](Self::add_pending) first to keep it.
    pub fn into_line(self) -> Line {
        let mut sets: Vec<Option<LinkSet>> = vec![None; self.link_targets.len()];
        let mut x = self.start_indent;
        let mut children = self.children;
        for child in &children {
            if let Some(index) = child.link() {
                if let Some((destination, kind)) = self.link_targets.get(index) {
                    sets[index]
                        .get_or_insert_with(|| LinkSet::new(destination, *kind))
                        .add_rect(Rect::new(x, 0, child.width(), self.allocation_height));
                }
            }
            x += child.width();
        }

        let mut remap = vec![None; sets.len()];
        let mut links = Vec::new();
        for (old, set) in sets.into_iter().enumerate() {
            if let Some(mut set) = set {
                set.merge_links();
                remap[old] = Some(links.len());
                links.push(set);
            }
        }
        for child in &mut children {
            let new_index = child.link().and_then(|i| remap.get(i).copied().flatten());
            child.set_link(new_index);
        }

        Line {
            start_indent: self.start_indent,
            end_indent: self.end_indent,
            ipd: self.content_width,
            bpd: self.allocation_height,
            baseline: self.placement_offset,
            children,
            links,
        }
    }
}
