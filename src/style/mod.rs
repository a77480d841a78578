//! # Style System
//!
//! The typesetting properties a node can carry. Input values are in points
//! and every field is optional; [`Style::resolve`] fills unset inherited
//! properties from the parent, defaults the rest, and converts lengths to
//! millipoints for the layout engine.
//!
//! There is no cascade and no property grammar here. A node's style is
//! exactly what the document says, plus inheritance.

use serde::{Deserialize, Serialize};

use crate::font::FontStyle;
use crate::hyphenation::HyphenationProps;
use crate::min_opt_max::MinOptMax;
use crate::model::Edges;

/// Points to millipoints.
pub fn mpt(points: f64) -> i32 {
    (points * 1000.0).round() as i32
}

/// The complete set of style properties for a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Font ───────────────────────────────────────────────────
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    pub font_weight: Option<u32>,
    pub font_style: Option<FontStyle>,
    /// Line height as a multiple of the font size.
    pub line_height: Option<f64>,
    pub color: Option<Color>,

    // ── Paragraph ──────────────────────────────────────────────
    pub text_align: Option<TextAlign>,
    pub text_align_last: Option<TextAlign>,
    /// Indent from the start edge of the containing block.
    pub start_indent: Option<f64>,
    pub end_indent: Option<f64>,
    /// Extra indent of the first line.
    pub text_indent: Option<f64>,
    pub space_before: Option<Space>,
    pub space_after: Option<Space>,
    pub wrap_option: Option<WrapOption>,
    pub white_space_collapse: Option<bool>,
    pub text_decoration: Option<TextDecoration>,
    pub vertical_align: Option<VerticalAlign>,

    // ── Hyphenation ────────────────────────────────────────────
    pub hyphenate: Option<bool>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub hyphenation_character: Option<char>,
    pub hyphenation_remain_character_count: Option<usize>,
    pub hyphenation_push_character_count: Option<usize>,

    // ── Box ────────────────────────────────────────────────────
    pub padding: Option<Edges>,
    pub border_width: Option<Edges>,
    pub border_color: Option<Color>,
    pub background_color: Option<Color>,
    pub position: Option<Position>,
    pub top: Option<f64>,
    pub left: Option<f64>,

    // ── Pagination ─────────────────────────────────────────────
    pub break_before: Option<BreakKind>,
    pub break_after: Option<BreakKind>,
    pub keep_together: Option<bool>,
    pub orphans: Option<usize>,
    pub widows: Option<usize>,

    // ── Leaders ────────────────────────────────────────────────
    pub leader_pattern: Option<LeaderPattern>,
    pub leader_length: Option<Space>,
    /// Zero means "use the font metrics".
    pub leader_pattern_width: Option<f64>,
    pub leader_alignment: Option<LeaderAlignment>,
    pub rule_style: Option<RuleStyle>,
    pub rule_thickness: Option<f64>,
}

/// A space specifier: a plain length or a min/opt/max triple, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Space {
    Length(f64),
    Range {
        minimum: f64,
        optimum: f64,
        maximum: f64,
    },
}

impl Space {
    pub fn to_min_opt_max(&self) -> MinOptMax {
        match *self {
            Space::Length(v) => MinOptMax::fixed(mpt(v)),
            Space::Range {
                minimum,
                optimum,
                maximum,
            } => MinOptMax::new(mpt(minimum), mpt(optimum), mpt(maximum)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapOption {
    #[default]
    Wrap,
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Overline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Super,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BreakKind {
    #[default]
    Auto,
    Page,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaderPattern {
    #[default]
    Space,
    Rule,
    Dots,
    UseContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaderAlignment {
    #[default]
    None,
    ReferenceArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
    Double,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0) as f64 / 255.0;
        match hex.len() {
            3 => Self::rgb(
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => Self::rgb(channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => Color::BLACK,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Underline, overline and line-through flags of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

impl Decoration {
    pub fn is_none(&self) -> bool {
        !(self.underline || self.overline || self.line_through)
    }
}

impl From<TextDecoration> for Decoration {
    fn from(d: TextDecoration) -> Self {
        Decoration {
            underline: d == TextDecoration::Underline,
            overline: d == TextDecoration::Overline,
            line_through: d == TextDecoration::LineThrough,
        }
    }
}

/// Leader properties in millipoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderSpec {
    pub pattern: LeaderPattern,
    pub length: MinOptMax,
    pub pattern_width: i32,
    pub alignment: LeaderAlignment,
    pub rule_style: RuleStyle,
    pub rule_thickness: i32,
}

/// Edge lengths of a box side by side, in millipoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxEdges {
    pub before: i32,
    pub after: i32,
    pub start: i32,
    pub end: i32,
}

impl BoxEdges {
    pub fn from_edges(e: &Edges) -> Self {
        Self {
            before: mpt(e.top),
            after: mpt(e.bottom),
            start: mpt(e.left),
            end: mpt(e.right),
        }
    }

    pub fn inline(&self) -> i32 {
        self.start + self.end
    }

    pub fn block(&self) -> i32 {
        self.before + self.after
    }

    pub fn plus(&self, other: &BoxEdges) -> BoxEdges {
        BoxEdges {
            before: self.before + other.before,
            after: self.after + other.after,
            start: self.start + other.start,
            end: self.end + other.end,
        }
    }
}

/// Fully resolved style. Lengths are millipoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_family: String,
    pub font_size: i32,
    pub font_weight: u32,
    pub font_style: FontStyle,
    pub line_height: i32,
    line_height_factor: f64,
    pub color: Color,

    pub text_align: TextAlign,
    pub text_align_last: TextAlign,
    pub start_indent: i32,
    pub end_indent: i32,
    pub text_indent: i32,
    pub space_before: MinOptMax,
    pub space_after: MinOptMax,
    pub wrap_option: WrapOption,
    pub white_space_collapse: bool,
    pub decoration: Decoration,
    pub vertical_align: VerticalAlign,
    pub hyphenation: HyphenationProps,

    pub padding: BoxEdges,
    pub border: BoxEdges,
    pub border_color: Color,
    pub background_color: Option<Color>,
    pub position: Position,
    pub top: i32,
    pub left: i32,

    pub break_before: BreakKind,
    pub break_after: BreakKind,
    pub keep_together: bool,
    pub orphans: usize,
    pub widows: usize,

    pub leader: LeaderSpec,
}

impl ResolvedStyle {
    /// The style at the root of a page sequence.
    pub fn root(font_family: &str, language: &str) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size: 12000,
            font_weight: 400,
            font_style: FontStyle::Normal,
            line_height: 14400,
            line_height_factor: 1.2,
            color: Color::BLACK,
            text_align: TextAlign::Start,
            text_align_last: TextAlign::Start,
            start_indent: 0,
            end_indent: 0,
            text_indent: 0,
            space_before: MinOptMax::ZERO,
            space_after: MinOptMax::ZERO,
            wrap_option: WrapOption::Wrap,
            white_space_collapse: true,
            decoration: Decoration::default(),
            vertical_align: VerticalAlign::Baseline,
            hyphenation: HyphenationProps {
                language: language.to_string(),
                ..HyphenationProps::default()
            },
            padding: BoxEdges::default(),
            border: BoxEdges::default(),
            border_color: Color::BLACK,
            background_color: None,
            position: Position::Static,
            top: 0,
            left: 0,
            break_before: BreakKind::Auto,
            break_after: BreakKind::Auto,
            keep_together: false,
            orphans: 2,
            widows: 2,
            leader: LeaderSpec {
                pattern: LeaderPattern::Space,
                length: MinOptMax::new(0, 12000, i32::MAX / 2),
                pattern_width: 0,
                alignment: LeaderAlignment::None,
                rule_style: RuleStyle::Solid,
                rule_thickness: 1000,
            },
        }
    }

    /// Padding plus border.
    pub fn edges(&self) -> BoxEdges {
        self.padding.plus(&self.border)
    }
}

impl Style {
    /// Resolve against the parent's resolved style.
    ///
    /// Font, color, paragraph, hyphenation, orphan/widow and leader
    /// properties inherit. Indents, spaces, box and break properties do not.
    pub fn resolve(&self, parent: &ResolvedStyle) -> ResolvedStyle {
        let font_size = self.font_size.map(mpt).unwrap_or(parent.font_size);
        let line_height_factor = self.line_height.unwrap_or(parent.line_height_factor);
        let text_align = self.text_align.unwrap_or(parent.text_align);
        let text_align_last = self.text_align_last.unwrap_or(match (self.text_align, text_align) {
            (Some(_), TextAlign::Justify) => TextAlign::Start,
            (Some(_), other) => other,
            (None, _) => parent.text_align_last,
        });

        let parent_hyph = &parent.hyphenation;
        let hyphenation = HyphenationProps {
            hyphenate: self.hyphenate.unwrap_or(parent_hyph.hyphenate),
            language: self.language.clone().unwrap_or_else(|| parent_hyph.language.clone()),
            country: self.country.clone().or_else(|| parent_hyph.country.clone()),
            hyphenation_char: self.hyphenation_character.unwrap_or(parent_hyph.hyphenation_char),
            remain_count: self
                .hyphenation_remain_character_count
                .unwrap_or(parent_hyph.remain_count),
            push_count: self
                .hyphenation_push_character_count
                .unwrap_or(parent_hyph.push_count),
        };

        let leader = LeaderSpec {
            pattern: self.leader_pattern.unwrap_or(parent.leader.pattern),
            length: self
                .leader_length
                .map(|s| s.to_min_opt_max())
                .unwrap_or(parent.leader.length),
            pattern_width: self.leader_pattern_width.map(mpt).unwrap_or(parent.leader.pattern_width),
            alignment: self.leader_alignment.unwrap_or(parent.leader.alignment),
            rule_style: self.rule_style.unwrap_or(parent.leader.rule_style),
            rule_thickness: self.rule_thickness.map(mpt).unwrap_or(parent.leader.rule_thickness),
        };

        ResolvedStyle {
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| parent.font_family.clone()),
            font_size,
            font_weight: self.font_weight.unwrap_or(parent.font_weight),
            font_style: self.font_style.unwrap_or(parent.font_style),
            line_height: (font_size as f64 * line_height_factor).round() as i32,
            line_height_factor,
            color: self.color.unwrap_or(parent.color),

            text_align,
            text_align_last,
            start_indent: self.start_indent.map(mpt).unwrap_or(0),
            end_indent: self.end_indent.map(mpt).unwrap_or(0),
            text_indent: self.text_indent.map(mpt).unwrap_or(parent.text_indent),
            space_before: self.space_before.map(|s| s.to_min_opt_max()).unwrap_or_default(),
            space_after: self.space_after.map(|s| s.to_min_opt_max()).unwrap_or_default(),
            wrap_option: self.wrap_option.unwrap_or(parent.wrap_option),
            white_space_collapse: self.white_space_collapse.unwrap_or(parent.white_space_collapse),
            decoration: self.text_decoration.map(Decoration::from).unwrap_or(parent.decoration),
            vertical_align: self.vertical_align.unwrap_or_default(),
            hyphenation,

            padding: self.padding.as_ref().map(BoxEdges::from_edges).unwrap_or_default(),
            border: self.border_width.as_ref().map(BoxEdges::from_edges).unwrap_or_default(),
            border_color: self.border_color.unwrap_or(Color::BLACK),
            background_color: self.background_color,
            position: self.position.unwrap_or_default(),
            top: self.top.map(mpt).unwrap_or(0),
            left: self.left.map(mpt).unwrap_or(0),

            break_before: self.break_before.unwrap_or_default(),
            break_after: self.break_after.unwrap_or_default(),
            keep_together: self.keep_together.unwrap_or(false),
            orphans: self.orphans.unwrap_or(parent.orphans),
            widows: self.widows.unwrap_or(parent.widows),

            leader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ResolvedStyle {
        ResolvedStyle::root("Helvetica", "en")
    }

    #[test]
    fn font_properties_inherit() {
        let parent = Style {
            font_size: Some(10.0),
            font_family: Some("Times".to_string()),
            ..Default::default()
        }
        .resolve(&root());
        let child = Style::default().resolve(&parent);
        assert_eq!(child.font_size, 10000);
        assert_eq!(child.font_family, "Times");
        assert_eq!(child.line_height, 12000);
    }

    #[test]
    fn line_height_factor_follows_font_size() {
        let parent = Style {
            line_height: Some(1.5),
            ..Default::default()
        }
        .resolve(&root());
        let child = Style {
            font_size: Some(20.0),
            ..Default::default()
        }
        .resolve(&parent);
        assert_eq!(child.line_height, 30000);
    }

    #[test]
    fn indents_and_spaces_do_not_inherit() {
        let parent = Style {
            start_indent: Some(36.0),
            space_before: Some(Space::Length(6.0)),
            ..Default::default()
        }
        .resolve(&root());
        assert_eq!(parent.start_indent, 36000);
        assert_eq!(parent.space_before, MinOptMax::fixed(6000));
        let child = Style::default().resolve(&parent);
        assert_eq!(child.start_indent, 0);
        assert_eq!(child.space_before, MinOptMax::ZERO);
    }

    #[test]
    fn justify_defaults_last_line_to_start() {
        let s = Style {
            text_align: Some(TextAlign::Justify),
            ..Default::default()
        }
        .resolve(&root());
        assert_eq!(s.text_align_last, TextAlign::Start);
        let centered = Style {
            text_align: Some(TextAlign::Center),
            ..Default::default()
        }
        .resolve(&root());
        assert_eq!(centered.text_align_last, TextAlign::Center);
    }

    #[test]
    fn space_accepts_number_or_range() {
        let plain: Space = serde_json::from_str("4").unwrap();
        assert_eq!(plain.to_min_opt_max(), MinOptMax::fixed(4000));
        let range: Space =
            serde_json::from_str(r#"{"minimum": 1, "optimum": 2, "maximum": 3.5}"#).unwrap();
        assert_eq!(range.to_min_opt_max(), MinOptMax::new(1000, 2000, 3500));
    }

    #[test]
    fn hex_colors() {
        let c = Color::hex("#ff0000");
        assert!((c.r - 1.0).abs() < 1e-9 && c.g == 0.0);
        assert_eq!(Color::hex("#fff"), Color::rgb(1.0, 1.0, 1.0));
    }
}
