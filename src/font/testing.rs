//! Metrics for unit tests.

use std::sync::Arc;

use super::{FontMetric, FontState, FontStyle};

/// Every glyph 100 units wide, except `W` at 101 and `i` at 0. Covers
/// Latin and the CJK unified ideographs.
#[derive(Debug)]
pub struct GridFont;

impl FontMetric for GridFont {
    fn font_name(&self) -> &str {
        "Grid"
    }

    fn glyph_width(&self, ch: char) -> Option<i32> {
        match ch {
            'W' => Some(101),
            'i' => Some(0),
            '\u{4E00}'..='\u{9FFF}' => Some(100),
            c if (c as u32) < 0x3000 => Some(100),
            _ => None,
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

/// The grid font at `size` millipoints.
pub fn grid(size: i32) -> FontState {
    FontState::new("Grid", FontStyle::Normal, 400, size, Arc::new(GridFont))
}
