//! Built-in metrics for the standard Type 1 faces.
//!
//! Widths are the AFM advance widths in thousandths of an em for the
//! printable ASCII range. Oblique and italic faces share the widths of their
//! upright counterparts. Times bold faces use the Times-Roman table.

use super::FontMetric;

/// The standard faces with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PostScript name of this face.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn from_key(family: &str, bold: bool, italic: bool) -> Option<StandardFont> {
        let face = match (family.to_ascii_lowercase().as_str(), bold, italic) {
            ("helvetica" | "sans-serif" | "arial", false, false) => Self::Helvetica,
            ("helvetica" | "sans-serif" | "arial", true, false) => Self::HelveticaBold,
            ("helvetica" | "sans-serif" | "arial", false, true) => Self::HelveticaOblique,
            ("helvetica" | "sans-serif" | "arial", true, true) => Self::HelveticaBoldOblique,
            ("times" | "times-roman" | "serif", false, false) => Self::TimesRoman,
            ("times" | "times-roman" | "serif", true, false) => Self::TimesBold,
            ("times" | "times-roman" | "serif", false, true) => Self::TimesItalic,
            ("times" | "times-roman" | "serif", true, true) => Self::TimesBoldItalic,
            ("courier" | "monospace", false, false) => Self::Courier,
            ("courier" | "monospace", true, false) => Self::CourierBold,
            ("courier" | "monospace", false, true) => Self::CourierOblique,
            ("courier" | "monospace", true, true) => Self::CourierBoldOblique,
            _ => return None,
        };
        Some(face)
    }

    fn table(&self) -> Option<&'static [u16; 95]> {
        match self {
            Self::Helvetica | Self::HelveticaOblique => Some(&HELVETICA_WIDTHS),
            Self::HelveticaBold | Self::HelveticaBoldOblique => Some(&HELVETICA_BOLD_WIDTHS),
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => {
                Some(&TIMES_ROMAN_WIDTHS)
            }
            _ => None,
        }
    }

    fn is_courier(&self) -> bool {
        matches!(
            self,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique
        )
    }
}

impl FontMetric for StandardFont {
    fn font_name(&self) -> &str {
        self.name()
    }

    fn glyph_width(&self, ch: char) -> Option<i32> {
        let code = ch as u32;
        if self.is_courier() {
            return if (0x20..0x7F).contains(&code) || latin_extra(ch).is_some() {
                Some(600)
            } else {
                None
            };
        }
        let table = self.table()?;
        if (0x20..0x7F).contains(&code) {
            return Some(table[(code - 0x20) as usize] as i32);
        }
        match latin_extra(ch)? {
            Extra::Same(base) => Some(table[(base as u32 - 0x20) as usize] as i32),
            Extra::Width(w) => Some(w),
        }
    }

    fn ascender(&self) -> i32 {
        match self {
            s if s.is_courier() => 629,
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => 683,
            _ => 718,
        }
    }

    fn descender(&self) -> i32 {
        match self {
            s if s.is_courier() => -157,
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => -217,
            _ => -207,
        }
    }

    fn cap_height(&self) -> i32 {
        match self {
            s if s.is_courier() => 562,
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => 662,
            _ => 718,
        }
    }

    fn x_height(&self) -> i32 {
        match self {
            s if s.is_courier() => 426,
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => 450,
            Self::HelveticaBold | Self::HelveticaBoldOblique => 532,
            _ => 523,
        }
    }
}

enum Extra {
    /// Same advance as an ASCII glyph.
    Same(char),
    Width(i32),
}

/// The handful of non-ASCII glyphs the layout itself produces or commonly meets.
fn latin_extra(ch: char) -> Option<Extra> {
    let extra = match ch {
        '\u{00A0}' => Extra::Same(' '),
        '\u{00AD}' | '\u{2010}' | '\u{2011}' => Extra::Same('-'),
        '\u{2013}' => Extra::Same('0'),
        '\u{2014}' => Extra::Width(1000),
        '\u{2018}' | '\u{2019}' => Extra::Same(','),
        '\u{201C}' | '\u{201D}' => Extra::Same('"'),
        '\u{2022}' => Extra::Width(350),
        '\u{2026}' => Extra::Width(1000),
        _ => return None,
    };
    Some(extra)
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_is_monospaced() {
        let f = StandardFont::Courier;
        assert_eq!(f.glyph_width('i'), Some(600));
        assert_eq!(f.glyph_width('W'), Some(600));
        assert_eq!(f.glyph_width('\u{4E00}'), None);
    }

    #[test]
    fn helvetica_table_lines_up_with_ascii() {
        let f = StandardFont::Helvetica;
        assert_eq!(f.glyph_width(' '), Some(278));
        assert_eq!(f.glyph_width('@'), Some(1015));
        assert_eq!(f.glyph_width('m'), Some(833));
        assert_eq!(f.glyph_width('~'), Some(584));
        assert_eq!(f.glyph_width('\u{00A0}'), Some(278));
    }

    #[test]
    fn family_aliases_resolve() {
        assert_eq!(StandardFont::from_key("serif", true, false), Some(StandardFont::TimesBold));
        assert_eq!(StandardFont::from_key("Courier", false, true), Some(StandardFont::CourierOblique));
        assert_eq!(StandardFont::from_key("Comic Sans", false, false), None);
    }
}
