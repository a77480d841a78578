//! # Font Metrics
//!
//! The layout engine never touches glyph outlines. All it needs from a font
//! is how wide each character is and how tall the face is, so fonts are
//! consumed through the [`FontMetric`] capability.
//!
//! Two implementations ship with the crate: the standard Type 1 faces
//! (Helvetica, Times, Courier) with built-in AFM width tables, and embedded
//! TrueType faces read with ttf-parser. A [`FontState`] binds a metric to a
//! size and answers every question in millipoints.

pub mod standard;
#[cfg(test)]
pub(crate) mod testing;
pub mod truetype;

pub use standard::StandardFont;
pub use truetype::TrueTypeMetric;

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{LayoutError, Result};

/// Width and vertical metrics of one face, in thousandths of an em.
pub trait FontMetric: fmt::Debug + Send + Sync {
    fn font_name(&self) -> &str;
    /// Advance width, `None` when the face has no glyph for `ch`.
    fn glyph_width(&self, ch: char) -> Option<i32>;
    fn ascender(&self) -> i32;
    /// Negative below the baseline.
    fn descender(&self) -> i32;
    fn cap_height(&self) -> i32;
    fn x_height(&self) -> i32;

    fn has_char(&self, ch: char) -> bool {
        self.glyph_width(ch).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn is_italic(&self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

/// A face at a size. Every length it reports is in millipoints.
#[derive(Clone)]
pub struct FontState {
    pub family: String,
    pub style: FontStyle,
    pub weight: u32,
    /// Font size in millipoints.
    pub size: i32,
    metric: Arc<dyn FontMetric>,
}

impl fmt::Debug for FontState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontState")
            .field("name", &self.metric.font_name())
            .field("size", &self.size)
            .finish()
    }
}

impl FontState {
    pub fn new(family: &str, style: FontStyle, weight: u32, size: i32, metric: Arc<dyn FontMetric>) -> Self {
        Self {
            family: family.to_string(),
            style,
            weight,
            size,
            metric,
        }
    }

    fn scale(&self, units: i32) -> i32 {
        (units as i64 * self.size as i64 / 1000) as i32
    }

    /// Advance width of `ch`, zero when the face lacks the glyph.
    pub fn width(&self, ch: char) -> i32 {
        self.metric.glyph_width(ch).map(|w| self.scale(w)).unwrap_or(0)
    }

    pub fn word_width(&self, word: &str) -> i32 {
        word.chars().map(|c| self.width(c)).sum()
    }

    /// Advance width with control characters measured as a space and space
    /// characters the face lacks estimated from its `m` and `n`.
    pub fn char_width(&self, ch: char) -> i32 {
        if matches!(ch, '\n' | '\r' | '\t' | '\u{00A0}') {
            return self.char_width(' ');
        }
        let width = self.width(ch);
        if width > 0 {
            return width;
        }
        let em = match self.width('m') {
            w if w > 0 => w,
            _ => self.size / 2,
        };
        let en = match self.width('n') {
            w if w > 0 => w,
            _ => em - 10,
        };
        match ch {
            ' ' | '\u{2001}' => em,
            '\u{2000}' => en,
            '\u{2002}' => em / 2,
            '\u{2003}' => self.size,
            '\u{2004}' => em / 3,
            '\u{2005}' => em / 4,
            '\u{2006}' => em / 6,
            '\u{2007}' => self.char_width(' '),
            '\u{2008}' => self.width('.'),
            '\u{2009}' => em / 5,
            '\u{200A}' => 5,
            '\u{202F}' => self.char_width('\u{00A0}') / 2,
            '\u{3000}' => self.char_width(' ') * 2,
            _ => width,
        }
    }

    pub fn has_char(&self, ch: char) -> bool {
        self.metric.has_char(ch)
    }

    pub fn ascender(&self) -> i32 {
        self.scale(self.metric.ascender())
    }

    pub fn descender(&self) -> i32 {
        self.scale(self.metric.descender())
    }

    pub fn cap_height(&self) -> i32 {
        self.scale(self.metric.cap_height())
    }

    pub fn x_height(&self) -> i32 {
        self.scale(self.metric.x_height())
    }

    /// Height of the glyph box: ascender minus descender.
    pub fn glyph_height(&self) -> i32 {
        self.ascender() - self.descender()
    }

    pub fn font_ref(&self) -> FontRef {
        FontRef {
            name: self.metric.font_name().to_string(),
            size: self.size,
        }
    }
}

/// The part of a font state that areas carry for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRef {
    pub name: String,
    pub size: i32,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

/// An embedded face supplied with the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSource {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
    /// Base64-encoded TrueType/OpenType data.
    pub data: String,
}

fn default_weight() -> u32 {
    400
}

/// Maps family + weight + style to a metric.
#[derive(Clone)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, Arc<dyn FontMetric>>,
    fallback_family: String,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            fallback_family: "Helvetica".to_string(),
        }
    }

    pub fn with_fallback(family: &str) -> Self {
        Self {
            fonts: HashMap::new(),
            fallback_family: family.to_string(),
        }
    }

    pub fn register(&mut self, family: &str, weight: u32, italic: bool, metric: Arc<dyn FontMetric>) {
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            metric,
        );
    }

    pub fn register_truetype(&mut self, family: &str, weight: u32, italic: bool, data: &[u8]) -> Result<()> {
        let metric = TrueTypeMetric::parse(family, data)?;
        self.register(family, weight, italic, Arc::new(metric));
        Ok(())
    }

    pub fn register_source(&mut self, source: &FontSource) -> Result<()> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(source.data.trim())
            .map_err(|e| LayoutError::Font(format!("font '{}' is not valid base64: {}", source.family, e)))?;
        self.register_truetype(&source.family, source.weight, source.italic, &data)
    }

    /// Look up a face, snapping the weight to regular/bold and falling back
    /// to the standard faces, then to the fallback family.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> Arc<dyn FontMetric> {
        let snapped = if weight >= 600 { 700 } else { 400 };
        for w in [weight, snapped] {
            let key = FontKey {
                family: family.to_string(),
                weight: w,
                italic,
            };
            if let Some(metric) = self.fonts.get(&key) {
                return Arc::clone(metric);
            }
        }
        if let Some(face) = StandardFont::from_key(family, snapped == 700, italic) {
            return Arc::new(face);
        }
        log::debug!("font family '{}' not found, using {}", family, self.fallback_family);
        let face = StandardFont::from_key(&self.fallback_family, snapped == 700, italic)
            .unwrap_or(StandardFont::Helvetica);
        Arc::new(face)
    }

    pub fn font_state(&self, family: &str, style: FontStyle, weight: u32, size: i32) -> FontState {
        let metric = self.resolve(family, weight, style.is_italic());
        FontState::new(family, style, weight, size, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_scale_with_size() {
        let registry = FontRegistry::new();
        let fs = registry.font_state("Courier", FontStyle::Normal, 400, 12000);
        assert_eq!(fs.width('a'), 7200);
        assert_eq!(fs.word_width("abc"), 21600);
        assert_eq!(fs.ascender(), 629 * 12);
        assert_eq!(fs.descender(), -157 * 12);
    }

    #[test]
    fn missing_glyph_is_zero_width() {
        let registry = FontRegistry::new();
        let fs = registry.font_state("Helvetica", FontStyle::Normal, 400, 10000);
        assert_eq!(fs.width('\u{4E2D}'), 0);
        assert!(!fs.has_char('\u{4E2D}'));
    }

    #[test]
    fn missing_space_characters_are_estimated() {
        let registry = FontRegistry::new();
        let fs = registry.font_state("Helvetica", FontStyle::Normal, 400, 10000);
        assert_eq!(fs.char_width('\t'), fs.width(' '));
        assert_eq!(fs.char_width('\u{2003}'), 10000);
        assert_eq!(fs.char_width('\u{2002}'), fs.width('m') / 2);
        assert_eq!(fs.char_width('\u{3000}'), 2 * fs.width(' '));
        assert_eq!(fs.char_width('\u{4E2D}'), 0);
    }

    #[test]
    fn unknown_family_falls_back_to_helvetica() {
        let registry = FontRegistry::new();
        let metric = registry.resolve("NoSuchFamily", 700, false);
        assert_eq!(metric.font_name(), "Helvetica-Bold");
    }

    #[test]
    fn semibold_snaps_to_bold() {
        let registry = FontRegistry::new();
        assert_eq!(registry.resolve("Times", 600, true).font_name(), "Times-BoldItalic");
        assert_eq!(registry.resolve("Times", 300, false).font_name(), "Times-Roman");
    }

    #[test]
    fn bad_base64_is_reported() {
        let mut registry = FontRegistry::new();
        let source = FontSource {
            family: "Custom".to_string(),
            weight: 400,
            italic: false,
            data: "!!!".to_string(),
        };
        assert!(matches!(registry.register_source(&source), Err(LayoutError::Font(_))));
    }
}
