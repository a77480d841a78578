//! TrueType/OpenType metrics read with ttf-parser.

use std::collections::HashMap;

use super::FontMetric;
use crate::error::{LayoutError, Result};

/// Metrics of an embedded TrueType face, normalized to thousandths of an em.
#[derive(Debug, Clone)]
pub struct TrueTypeMetric {
    name: String,
    widths: HashMap<char, i32>,
    ascender: i32,
    descender: i32,
    cap_height: i32,
    x_height: i32,
}

impl TrueTypeMetric {
    pub fn parse(name: &str, data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| LayoutError::Font(format!("cannot parse font '{}': {}", name, e)))?;
        let units_per_em = face.units_per_em() as i32;
        if units_per_em == 0 {
            return Err(LayoutError::Font(format!("font '{}' has zero units per em", name)));
        }
        let scale = |v: i32| v * 1000 / units_per_em;

        let mut widths = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    if let Some(ch) = char::from_u32(code) {
                        if let Some(glyph) = subtable.glyph_index(code) {
                            let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as i32;
                            widths.entry(ch).or_insert_with(|| scale(advance));
                        }
                    }
                });
            }
        }

        let ascender = scale(face.ascender() as i32);
        let descender = scale(face.descender() as i32);
        Ok(Self {
            name: name.to_string(),
            widths,
            ascender,
            descender,
            cap_height: face.capital_height().map(|v| scale(v as i32)).unwrap_or(ascender),
            x_height: face.x_height().map(|v| scale(v as i32)).unwrap_or(ascender / 2),
        })
    }
}

impl FontMetric for TrueTypeMetric {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn glyph_width(&self, ch: char) -> Option<i32> {
        self.widths.get(&ch).copied()
    }

    fn ascender(&self) -> i32 {
        self.ascender
    }

    fn descender(&self) -> i32 {
        self.descender
    }

    fn cap_height(&self) -> i32 {
        self.cap_height
    }

    fn x_height(&self) -> i32 {
        self.x_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_a_font_error() {
        let result = TrueTypeMetric::parse("Broken", b"not a font at all");
        assert!(matches!(result, Err(LayoutError::Font(_))));
    }
}
