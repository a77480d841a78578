//! # Coordinate Transformation Matrix
//!
//! Maps the writing-mode-relative coordinates of a reference area's content
//! onto absolute page coordinates. The matrix is the usual 2D affine
//! `[a b c d e f]`:
//!
//! ```text
//! x' = a*x + c*y + e
//! y' = b*x + d*y + f
//! ```
//!
//! Rotation by a multiple of 90 degrees is exact, so transformed rectangles
//! land on whole millipoints.

use serde::{Deserialize, Serialize};

use super::Rect;
use crate::model::WritingMode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Ctm::IDENTITY
    }
}

impl Ctm {
    pub const IDENTITY: Ctm = Ctm::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    const LR_TB: Ctm = Ctm::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    const RL_TB: Ctm = Ctm::new(-1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    const TB_RL: Ctm = Ctm::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Ctm::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// The writing-mode transform for a reference area of the given size.
    pub fn for_writing_mode(mode: WritingMode, ipd: i32, bpd: i32) -> Ctm {
        match mode {
            WritingMode::LrTb => Ctm::LR_TB,
            WritingMode::RlTb => Ctm { e: ipd as f64, ..Ctm::RL_TB },
            WritingMode::TbRl => Ctm { e: bpd as f64, ..Ctm::TB_RL },
        }
    }

    /// `premult` applied first, then `self`.
    pub fn multiply(&self, premult: &Ctm) -> Ctm {
        Ctm::new(
            premult.a * self.a + premult.b * self.c,
            premult.a * self.b + premult.b * self.d,
            premult.c * self.a + premult.d * self.c,
            premult.c * self.b + premult.d * self.d,
            premult.e * self.a + premult.f * self.c + self.e,
            premult.e * self.b + premult.f * self.d + self.f,
        )
    }

    /// Counter-clockwise rotation in degrees.
    pub fn rotate(&self, angle: f64) -> Ctm {
        let (cos, sin) = if angle == 90.0 {
            (0.0, 1.0)
        } else if angle == 270.0 {
            (0.0, -1.0)
        } else if angle == 180.0 {
            (-1.0, 0.0)
        } else {
            let rad = angle.to_radians();
            (rad.cos(), rad.sin())
        };
        self.multiply(&Ctm::new(cos, -sin, sin, cos, 0.0, 0.0))
    }

    pub fn translate(&self, x: f64, y: f64) -> Ctm {
        self.multiply(&Ctm::translation(x, y))
    }

    pub fn scale(&self, x: f64, y: f64) -> Ctm {
        self.multiply(&Ctm::new(x, 0.0, 0.0, y, 0.0, 0.0))
    }

    /// Transform a rectangle, normalized so width and height are non-negative.
    pub fn transform(&self, r: &Rect) -> Rect {
        let (x, y) = (r.x as f64, r.y as f64);
        let (x2, y2) = ((r.x + r.width) as f64, (r.y + r.height) as f64);
        let mut x1t = (x * self.a + y * self.c + self.e) as i32;
        let mut y1t = (x * self.b + y * self.d + self.f) as i32;
        let mut x2t = (x2 * self.a + y2 * self.c + self.e) as i32;
        let mut y2t = (x2 * self.b + y2 * self.d + self.f) as i32;
        if x1t > x2t {
            std::mem::swap(&mut x1t, &mut x2t);
        }
        if y1t > y2t {
            std::mem::swap(&mut y1t, &mut y2t);
        }
        Rect::new(x1t, y1t, x2t - x1t, y2t - y1t)
    }

    /// The content CTM of a reference area placed in `viewport`, and its
    /// writing-mode relative (ipd, bpd).
    ///
    /// `reference_orientation` must be a multiple of 90 in -270..=270;
    /// anything else is treated as 0.
    pub fn for_region(reference_orientation: i32, mode: WritingMode, viewport: &Rect) -> (Ctm, i32, i32) {
        let (width, height) = if reference_orientation % 180 == 0 {
            (viewport.width, viewport.height)
        } else {
            (viewport.height, viewport.width)
        };

        let mut ctm = Ctm::translation(viewport.x as f64, viewport.y as f64);
        let rotated = match reference_orientation {
            90 | -270 => Some(ctm.translate(0.0, width as f64)),
            180 | -180 => Some(ctm.translate(width as f64, height as f64)),
            270 | -90 => Some(ctm.translate(height as f64, 0.0)),
            0 => None,
            other => {
                log::warn!("reference-orientation {} is not a multiple of 90, ignoring it", other);
                None
            }
        };
        if let Some(translated) = rotated {
            ctm = translated.rotate(reference_orientation as f64);
        }

        let (ipd, bpd) = match mode {
            WritingMode::LrTb | WritingMode::RlTb => (width, height),
            WritingMode::TbRl => (height, width),
        };
        (ctm.multiply(&Ctm::for_writing_mode(mode, ipd, bpd)), ipd, bpd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_rects_alone() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(Ctm::IDENTITY.transform(&r), r);
    }

    #[test]
    fn translate_moves_origin() {
        let r = Ctm::IDENTITY.translate(5.0, 7.0).transform(&Rect::new(0, 0, 10, 10));
        assert_eq!(r, Rect::new(5, 7, 10, 10));
    }

    #[test]
    fn quarter_turns_are_exact() {
        let ctm = Ctm::IDENTITY.rotate(90.0);
        assert_eq!((ctm.a, ctm.b, ctm.c, ctm.d), (0.0, -1.0, 1.0, 0.0));
        let r = ctm.transform(&Rect::new(0, 0, 100, 50));
        assert_eq!((r.width, r.height), (50, 100));
    }

    #[test]
    fn plain_region_is_a_translation() {
        let vp = Rect::new(72000, 72000, 400000, 600000);
        let (ctm, ipd, bpd) = Ctm::for_region(0, WritingMode::LrTb, &vp);
        assert_eq!((ipd, bpd), (400000, 600000));
        assert_eq!(ctm, Ctm::translation(72000.0, 72000.0));
        assert_eq!(ctm.transform(&Rect::new(0, 0, ipd, bpd)), vp);
    }

    #[test]
    fn rotated_region_swaps_dimensions_and_stays_in_viewport() {
        let vp = Rect::new(0, 0, 400000, 600000);
        let (ctm, ipd, bpd) = Ctm::for_region(90, WritingMode::LrTb, &vp);
        assert_eq!((ipd, bpd), (600000, 400000));
        assert_eq!(ctm.transform(&Rect::new(0, 0, ipd, bpd)), vp);
    }

    #[test]
    fn right_to_left_mirrors_inline_axis() {
        let vp = Rect::new(0, 0, 1000, 2000);
        let (ctm, ipd, _) = Ctm::for_region(0, WritingMode::RlTb, &vp);
        assert_eq!(ipd, 1000);
        let r = ctm.transform(&Rect::new(0, 0, 100, 10));
        assert_eq!(r, Rect::new(900, 0, 100, 10));
    }

    #[test]
    fn top_to_bottom_swaps_ipd_and_bpd() {
        let vp = Rect::new(0, 0, 1000, 2000);
        let (_, ipd, bpd) = Ctm::for_region(0, WritingMode::TbRl, &vp);
        assert_eq!((ipd, bpd), (2000, 1000));
    }
}
