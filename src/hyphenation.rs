//! # Hyphenation
//!
//! Break-point search for single words. The line filler asks a
//! [`Hyphenator`] for candidates and keeps the last one whose prefix still
//! fits, so all this module promises is an ordered list of points.
//!
//! [`PatternHyphenator`] uses the Liang patterns bundled with `hypher`.

use serde::{Deserialize, Serialize};

/// Hyphenation points of one word, as char offsets in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyphenation {
    word: String,
    points: Vec<usize>,
}

impl Hyphenation {
    pub fn new(word: &str, points: Vec<usize>) -> Self {
        Self {
            word: word.to_string(),
            points,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// The text before the `index`-th break point.
    pub fn pre_hyphen_text(&self, index: usize) -> String {
        self.word.chars().take(self.points[index]).collect()
    }

    /// The text after the `index`-th break point.
    pub fn post_hyphen_text(&self, index: usize) -> String {
        self.word.chars().skip(self.points[index]).collect()
    }
}

/// A source of break points.
pub trait Hyphenator {
    /// Break points leaving at least `remain` chars before and `push` chars
    /// after the break. `None` when the word has none or the language is
    /// unknown.
    fn hyphenate(
        &self,
        language: &str,
        country: Option<&str>,
        word: &str,
        remain: usize,
        push: usize,
    ) -> Option<Hyphenation>;
}

/// Pattern-based hyphenation backed by `hypher`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternHyphenator;

impl Hyphenator for PatternHyphenator {
    fn hyphenate(
        &self,
        language: &str,
        _country: Option<&str>,
        word: &str,
        remain: usize,
        push: usize,
    ) -> Option<Hyphenation> {
        let lang = resolve_hypher_lang(language)?;
        let len = word.chars().count();
        if len < remain + push || len < 2 {
            return None;
        }
        // Patterns are lowercase; keep the original offsets when case
        // folding changes the length.
        let lower = word.to_lowercase();
        let query = if lower.chars().count() == len { lower.as_str() } else { word };

        let mut points = Vec::new();
        let mut offset = 0;
        for syllable in hypher::hyphenate(query, lang) {
            offset += syllable.chars().count();
            if offset >= len {
                break;
            }
            if offset >= remain && len - offset >= push {
                points.push(offset);
            }
        }
        if points.is_empty() {
            None
        } else {
            Some(Hyphenation::new(word, points))
        }
    }
}

/// Map an ISO 639 language code (or a BCP 47 tag) to a `hypher::Lang`.
fn resolve_hypher_lang(language: &str) -> Option<hypher::Lang> {
    let primary = language.split(['-', '_']).next().unwrap_or(language).to_lowercase();
    match primary.as_str() {
        "af" => Some(hypher::Lang::Afrikaans),
        "sq" => Some(hypher::Lang::Albanian),
        "be" => Some(hypher::Lang::Belarusian),
        "bg" => Some(hypher::Lang::Bulgarian),
        "ca" => Some(hypher::Lang::Catalan),
        "hr" => Some(hypher::Lang::Croatian),
        "cs" => Some(hypher::Lang::Czech),
        "da" => Some(hypher::Lang::Danish),
        "nl" => Some(hypher::Lang::Dutch),
        "en" => Some(hypher::Lang::English),
        "et" => Some(hypher::Lang::Estonian),
        "fi" => Some(hypher::Lang::Finnish),
        "fr" => Some(hypher::Lang::French),
        "ka" => Some(hypher::Lang::Georgian),
        "de" => Some(hypher::Lang::German),
        "el" => Some(hypher::Lang::Greek),
        "hu" => Some(hypher::Lang::Hungarian),
        "is" => Some(hypher::Lang::Icelandic),
        "it" => Some(hypher::Lang::Italian),
        "ku" => Some(hypher::Lang::Kurmanji),
        "la" => Some(hypher::Lang::Latin),
        "lt" => Some(hypher::Lang::Lithuanian),
        "mn" => Some(hypher::Lang::Mongolian),
        "nb" | "nn" | "no" => Some(hypher::Lang::Norwegian),
        "pl" => Some(hypher::Lang::Polish),
        "pt" => Some(hypher::Lang::Portuguese),
        "ru" => Some(hypher::Lang::Russian),
        "sr" => Some(hypher::Lang::Serbian),
        "sk" => Some(hypher::Lang::Slovak),
        "sl" => Some(hypher::Lang::Slovenian),
        "es" => Some(hypher::Lang::Spanish),
        "sv" => Some(hypher::Lang::Swedish),
        "tr" => Some(hypher::Lang::Turkish),
        "tk" => Some(hypher::Lang::Turkmen),
        "uk" => Some(hypher::Lang::Ukrainian),
        _ => None,
    }
}

/// Resolved hyphenation properties of a text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyphenationProps {
    pub hyphenate: bool,
    /// ISO 639 code, or `none`.
    pub language: String,
    pub country: Option<String>,
    pub hyphenation_char: char,
    /// Minimum characters left before the hyphen.
    pub remain_count: usize,
    /// Minimum characters pushed to the next line.
    pub push_count: usize,
}

impl Default for HyphenationProps {
    fn default() -> Self {
        Self {
            hyphenate: false,
            language: "none".to_string(),
            country: None,
            hyphenation_char: '-',
            remain_count: 2,
            push_count: 2,
        }
    }
}

impl HyphenationProps {
    /// Languages whose words may break between any two characters.
    pub fn allows_mid_word_break(&self) -> bool {
        let primary = self.language.split(['-', '_']).next().unwrap_or(&self.language);
        matches!(primary.to_lowercase().as_str(), "zh" | "ja" | "ko" | "vi")
    }
}
