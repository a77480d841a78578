//! # Page Masters
//!
//! Turns a [`PageMaster`] (points, page-relative margins and extents) into
//! a template [`Page`]: region viewports at absolute positions, each with a
//! reference area and its CTM. Every page of a sequence is a
//! [`Page::copy_template`] of the same template.

use crate::area::{BodyRegion, Ctm, Page, PageKey, PageViewport, Rect, RegionContent, RegionName, RegionReference, RegionViewport};
use crate::model::{Node, PageMaster, StaticContent};
use crate::style::{mpt, BoxEdges};

pub struct PageTemplate {
    view_area: Rect,
    page: Page,
    sequence: usize,
}

impl PageTemplate {
    /// Side regions get a viewport only when their extent is positive.
    pub fn from_master(master: &PageMaster, sequence: usize) -> Self {
        let view_area = Rect::new(0, 0, mpt(master.width), mpt(master.height));
        let content = view_area.inset(&BoxEdges::from_edges(&master.margin));

        let before = mpt(master.region_before_extent);
        let after = mpt(master.region_after_extent);
        let start = mpt(master.region_start_extent);
        let end = mpt(master.region_end_extent);
        let middle = (content.height - before - after).max(0);

        let mut page = Page::new();
        let sides = [
            (RegionName::Before, before, Rect::new(content.x, content.y, content.width, before)),
            (RegionName::After, after, Rect::new(content.x, content.bottom() - after, content.width, after)),
            (RegionName::Start, start, Rect::new(content.x, content.y + before, start, middle)),
            (RegionName::End, end, Rect::new(content.right() - end, content.y + before, end, middle)),
        ];
        for (name, extent, rect) in sides {
            if extent > 0 {
                let (ctm, ipd, bpd) = Ctm::for_region(0, master.writing_mode, &rect);
                page.set_region(RegionViewport {
                    name,
                    view_area: rect,
                    clip: false,
                    region: RegionReference {
                        ctm,
                        ipd,
                        bpd,
                        content: RegionContent::Static(Vec::new()),
                    },
                });
            }
        }

        let body = content.inset(&BoxEdges::from_edges(&master.body_margin));
        let (ctm, ipd, bpd) = Ctm::for_region(master.reference_orientation, master.writing_mode, &body);
        if ipd <= 0 || bpd <= 0 {
            log::warn!("page master leaves no room for the body ({}x{} mpt)", ipd, bpd);
        }
        page.set_region(RegionViewport {
            name: RegionName::Body,
            view_area: body,
            clip: false,
            region: RegionReference {
                ctm,
                ipd,
                bpd,
                content: RegionContent::Body(BodyRegion::new(ipd, bpd, master.column_count, mpt(master.column_gap))),
            },
        });

        Self {
            view_area,
            page,
            sequence,
        }
    }

    /// A fresh, empty page numbered `number`.
    pub fn new_page(&self, number: usize) -> PageViewport {
        PageViewport::new(
            PageKey(0),
            self.view_area,
            number,
            number.to_string(),
            self.sequence,
            self.page.copy_template(),
        )
    }

    fn body(&self) -> Option<&BodyRegion> {
        self.page.body()
    }

    pub fn column_count(&self) -> usize {
        self.body().map(|b| b.column_count).unwrap_or(1)
    }

    /// Width of one column.
    pub fn column_width(&self) -> i32 {
        self.body()
            .and_then(|b| b.main.spans.first())
            .and_then(|s| s.flows.first())
            .map(|f| f.ipd)
            .unwrap_or(0)
    }

    pub fn column_height(&self) -> i32 {
        self.body()
            .and_then(|b| b.main.spans.first())
            .map(|s| s.bpd)
            .unwrap_or(0)
    }

    /// Regions that exist on the page and have static content to fill.
    pub fn static_regions<'a>(&self, statics: &'a StaticContent) -> Vec<(RegionName, i32, i32, &'a [Node])> {
        [
            (RegionName::Before, &statics.before),
            (RegionName::After, &statics.after),
            (RegionName::Start, &statics.start),
            (RegionName::End, &statics.end),
        ]
        .into_iter()
        .filter(|(_, nodes)| !nodes.is_empty())
        .filter_map(|(name, nodes)| match self.page.region(name) {
            Some(region) => Some((name, region.region.ipd, region.region.bpd, nodes.as_slice())),
            None => {
                log::warn!("static content for {:?} has no region on the page master", name);
                None
            }
        })
        .collect()
    }
}
