//! # Pages
//!
//! A [`PageViewport`] lives for the whole document. Its [`Page`] (the
//! region content) can be detached: written to a cache while the page waits
//! for forward references, or dropped once rendered. Resolutions that arrive
//! while the content is detached are kept on the viewport and applied when
//! it is loaded again.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{BodyRegion, InlineArea, PageRef, Rect, RegionContent, RegionName, RegionViewport, Resolvable};
use crate::model::{Node, RetrievePosition};

/// Index of a page in the document's page arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageKey(pub usize);

/// The region content of one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// Indexed by [`RegionName::index`].
    pub regions: [Option<RegionViewport>; 5],
    /// Ids this page still waits on. Only filled while the page is cached.
    #[serde(default)]
    pub unresolved: BTreeSet<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_region(&mut self, viewport: RegionViewport) {
        let index = viewport.name.index();
        self.regions[index] = Some(viewport);
    }

    pub fn region(&self, name: RegionName) -> Option<&RegionViewport> {
        self.regions[name.index()].as_ref()
    }

    pub fn region_mut(&mut self, name: RegionName) -> Option<&mut RegionViewport> {
        self.regions[name.index()].as_mut()
    }

    pub fn body(&self) -> Option<&BodyRegion> {
        match self.region(RegionName::Body).map(|r| &r.region.content) {
            Some(RegionContent::Body(body)) => Some(body),
            _ => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut BodyRegion> {
        match self.region_mut(RegionName::Body).map(|r| &mut r.region.content) {
            Some(RegionContent::Body(body)) => Some(body),
            _ => None,
        }
    }

    /// A page with the same region geometry and no content.
    ///
    /// This is how a page master is instantiated: every region, span and
    /// column is copied, but blocks, footnotes and the unresolved set are
    /// not.
    pub fn copy_template(&self) -> Page {
        let mut copy = Page::new();
        for (slot, region) in copy.regions.iter_mut().zip(&self.regions) {
            *slot = region.as_ref().map(RegionViewport::copy_template);
        }
        copy
    }

    /// Visit every inline area on the page.
    pub fn for_each_inline_mut(&mut self, f: &mut dyn FnMut(&mut InlineArea)) {
        for region in self.regions.iter_mut().flatten() {
            match &mut region.region.content {
                RegionContent::Static(blocks) => {
                    blocks.iter_mut().for_each(|b| b.for_each_inline_mut(f));
                }
                RegionContent::Body(body) => {
                    body.before_float.iter_mut().for_each(|b| b.for_each_inline_mut(f));
                    for span in &mut body.main.spans {
                        for flow in &mut span.flows {
                            flow.blocks.iter_mut().for_each(|b| b.for_each_inline_mut(f));
                        }
                    }
                    body.footnote.iter_mut().for_each(|b| b.for_each_inline_mut(f));
                }
            }
        }
    }

    /// Whether any block on the page has content.
    pub fn has_content(&self) -> bool {
        self.regions.iter().flatten().any(|r| match &r.region.content {
            RegionContent::Static(blocks) => blocks.iter().any(|b| !b.is_empty()),
            RegionContent::Body(body) => {
                !body.footnote.is_empty()
                    || body
                        .main
                        .spans
                        .iter()
                        .any(|s| s.flows.iter().any(|f| f.blocks.iter().any(|b| !b.children.is_empty())))
            }
        })
    }
}

type MarkerMap = BTreeMap<String, Vec<Node>>;

/// Markers recorded on a page, by retrieve position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Markers {
    first_start: MarkerMap,
    first_any: MarkerMap,
    last_start: MarkerMap,
    last_end: MarkerMap,
    last_any: MarkerMap,
}

impl Markers {
    /// Record the markers of an area.
    ///
    /// `starting` is true when the area begins on this page and false when
    /// it ends (or is cut) here. `is_first` and `is_last` tell whether this
    /// is the first or last area generated by the flow object.
    pub fn add(&mut self, marks: &MarkerMap, starting: bool, is_first: bool, is_last: bool) {
        if marks.is_empty() {
            return;
        }
        if starting {
            if is_first {
                for (class, content) in marks {
                    self.first_start.entry(class.clone()).or_insert_with(|| content.clone());
                    self.first_any.entry(class.clone()).or_insert_with(|| content.clone());
                }
                self.last_start.extend(marks.iter().map(|(k, v)| (k.clone(), v.clone())));
            } else {
                for (class, content) in marks {
                    self.first_any.entry(class.clone()).or_insert_with(|| content.clone());
                }
            }
        } else {
            if is_last {
                self.last_end.extend(marks.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            self.last_any.extend(marks.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    pub fn get(&self, class: &str, position: RetrievePosition) -> Option<&Vec<Node>> {
        match position {
            RetrievePosition::FirstStartingWithinPage => {
                self.first_start.get(class).or_else(|| self.first_any.get(class))
            }
            RetrievePosition::FirstIncludingCarryover => self.first_any.get(class),
            RetrievePosition::LastStartingWithinPage => {
                self.last_start.get(class).or_else(|| self.last_any.get(class))
            }
            RetrievePosition::LastEndingWithinPage => {
                self.last_end.get(class).or_else(|| self.last_any.get(class))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_any.is_empty() && self.last_any.is_empty()
    }
}

/// A page's place in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewport {
    pub key: PageKey,
    pub view_area: Rect,
    pub page_number: usize,
    pub page_number_string: String,
    /// Index of the page sequence this page belongs to.
    pub sequence: usize,
    /// Ids defined on this page, in document order.
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
    #[serde(skip)]
    unresolved: BTreeSet<String>,
    #[serde(skip)]
    pending_resolved: BTreeMap<String, Option<Vec<PageRef>>>,
    #[serde(skip)]
    pub markers: Markers,
}

impl PageViewport {
    pub fn new(key: PageKey, view_area: Rect, page_number: usize, page_number_string: String, sequence: usize, page: Page) -> Self {
        Self {
            key,
            view_area,
            page_number,
            page_number_string,
            sequence,
            ids: Vec::new(),
            page: Some(page),
            unresolved: BTreeSet::new(),
            pending_resolved: BTreeMap::new(),
            markers: Markers::default(),
        }
    }

    pub fn page_ref(&self) -> PageRef {
        PageRef::new(self.key, &self.page_number_string)
    }

    pub fn add_id(&mut self, id: &str) {
        if !self.ids.iter().any(|i| i == id) {
            self.ids.push(id.to_string());
        }
    }

    /// Note that content on this page cites `id`.
    pub fn add_unresolved_id(&mut self, id: &str) {
        self.unresolved.insert(id.to_string());
    }

    pub fn unresolved_ids(&self) -> impl Iterator<Item = &str> {
        self.unresolved.iter().map(String::as_str)
    }

    pub fn is_loaded(&self) -> bool {
        self.page.is_some()
    }

    /// Drop the content once the page has been rendered.
    pub fn clear(&mut self) {
        self.page = None;
    }

    /// Detach the content for caching. A copy of the unresolved set travels
    /// with it.
    pub fn save_page(&mut self) -> Option<Page> {
        let mut page = self.page.take()?;
        page.unresolved = self.unresolved.clone();
        Some(page)
    }

    /// Reattach cached content and apply resolutions that arrived meanwhile.
    pub fn load_page(&mut self, mut page: Page) {
        self.unresolved = std::mem::take(&mut page.unresolved);
        self.page = Some(page);
        let pending = std::mem::take(&mut self.pending_resolved);
        for (id, pages) in pending {
            self.resolve_id_ref(&id, pages.as_deref());
        }
    }

    pub fn add_markers(&mut self, marks: &BTreeMap<String, Vec<Node>>, starting: bool, is_first: bool, is_last: bool) {
        self.markers.add(marks, starting, is_first, is_last);
    }

    pub fn get_marker(&self, class: &str, position: RetrievePosition) -> Option<&Vec<Node>> {
        self.markers.get(class, position)
    }
}

impl Resolvable for PageViewport {
    fn is_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    fn id_refs(&self) -> Vec<String> {
        self.unresolved.iter().cloned().collect()
    }

    fn resolve_id_ref(&mut self, id: &str, pages: Option<&[PageRef]>) {
        match &mut self.page {
            None => {
                self.pending_resolved.insert(id.to_string(), pages.map(<[PageRef]>::to_vec));
            }
            Some(page) => page.for_each_inline_mut(&mut |area| {
                if let InlineArea::PageNumber(pn) = area {
                    if pn.ref_id == id {
                        pn.resolve(pages);
                    }
                }
            }),
        }
        self.unresolved.remove(id);
    }
}

/// Retrieve markers by walking back through earlier pages when the current
/// page has none of the class.
pub fn retrieve_marker<'a>(
    pages: impl DoubleEndedIterator<Item = &'a PageViewport>,
    class: &str,
    position: RetrievePosition,
) -> Option<&'a Vec<Node>> {
    let mut pages = pages.rev();
    let current = pages.next()?;
    if let Some(found) = current.get_marker(class, position) {
        return Some(found);
    }
    pages.find_map(|pv| pv.get_marker(class, RetrievePosition::LastEndingWithinPage))
}
