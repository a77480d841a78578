//! # Area Tree Models
//!
//! What happens to a page once the area tree has it. [`RenderPagesModel`]
//! streams pages to a [`Renderer`] as soon as their references allow;
//! [`StorePagesModel`] keeps them all for later inspection.

use std::collections::VecDeque;

use super::cache::{PageCache, PageStash, ResidentPages};
use super::extension::ExtensionTiming;
use super::tree::AreaStore;
use super::{PageKey, Resolvable};
use crate::config::ErrorPolicy;
use crate::error::{LayoutError, Result};
use crate::render::Renderer;

/// Receives pages and extensions from the area tree.
pub trait AreaTreeModel {
    fn start_page_sequence(&mut self, store: &mut AreaStore, title: Option<&str>) -> Result<()>;

    /// The page has been stored and its ids registered.
    fn add_page(&mut self, store: &mut AreaStore, key: PageKey) -> Result<()>;

    /// Timing is already adjusted: an extension still waiting on ids comes
    /// in as [`ExtensionTiming::EndOfDoc`].
    fn add_extension(&mut self, store: &mut AreaStore, index: usize, timing: ExtensionTiming) -> Result<()>;

    /// Every pending reference has been forced by now.
    fn end_document(&mut self, store: &mut AreaStore) -> Result<()>;
}

/// Renders pages in the order the renderer can take them.
///
/// Pages that are resolved go to an out-of-order renderer at once and are
/// cleared. Everything else waits in `prepared` until the references it
/// cites turn up; an in-order renderer then gets the queue front to back,
/// stopping at the first page that still waits.
pub struct RenderPagesModel<R: Renderer, S: PageStash = ResidentPages> {
    renderer: R,
    stash: S,
    prepared: VecDeque<PageKey>,
    pending_extensions: Vec<usize>,
    end_of_doc_extensions: Vec<usize>,
    policy: ErrorPolicy,
    failed: Vec<String>,
    rendered: usize,
}

/// A render model that keeps waiting pages on disk.
pub type CachedRenderPagesModel<R> = RenderPagesModel<R, PageCache>;

impl<R: Renderer> RenderPagesModel<R, ResidentPages> {
    pub fn new(renderer: R) -> Self {
        Self::with_stash(renderer, ResidentPages)
    }
}

impl<R: Renderer> RenderPagesModel<R, PageCache> {
    pub fn cached(renderer: R, cache: PageCache) -> Self {
        Self::with_stash(renderer, cache)
    }
}

impl<R: Renderer, S: PageStash> RenderPagesModel<R, S> {
    pub fn with_stash(renderer: R, stash: S) -> Self {
        Self {
            renderer,
            stash,
            prepared: VecDeque::new(),
            pending_extensions: Vec::new(),
            end_of_doc_extensions: Vec::new(),
            policy: ErrorPolicy::default(),
            failed: Vec::new(),
            rendered: 0,
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn stash(&self) -> &S {
        &self.stash
    }

    /// Pages accepted but not rendered yet.
    pub fn prepared_count(&self) -> usize {
        self.prepared.len()
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered
    }

    /// Page numbers the renderer rejected under [`ErrorPolicy::SkipPage`].
    pub fn failed_pages(&self) -> &[String] {
        &self.failed
    }

    fn render_page(&mut self, store: &mut AreaStore, key: PageKey) -> Result<()> {
        let Some(page) = store.page_mut(key) else {
            return Err(LayoutError::Render {
                page: key.0.to_string(),
                message: "page is not in the area tree".to_string(),
            });
        };
        self.stash.load(page)?;
        let result = self.renderer.render_page(page);
        page.clear();
        match result {
            Ok(()) => {
                self.rendered += 1;
                Ok(())
            }
            Err(e) if self.policy == ErrorPolicy::SkipPage => {
                log::error!("skipping page {}: {}", page.page_number_string, e);
                self.failed.push(page.page_number_string.clone());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Render what the queue allows. Returns true when every accepted page
    /// has gone to the renderer, or the renderer takes pages in any order.
    fn check_prepared_pages(&mut self, store: &mut AreaStore, render_unresolved: bool) -> Result<bool> {
        let out_of_order = self.renderer.supports_out_of_order();
        let mut waiting = VecDeque::new();
        while let Some(key) = self.prepared.pop_front() {
            let resolved = store.page(key).map(|p| p.is_resolved()).unwrap_or(true);
            if resolved || render_unresolved {
                if !resolved {
                    log::warn!("rendering page {} with unresolved references", key.0);
                }
                self.render_page(store, key)?;
            } else {
                waiting.push_back(key);
                if !out_of_order {
                    break;
                }
            }
        }
        waiting.extend(self.prepared.drain(..));
        self.prepared = waiting;
        Ok(out_of_order || self.prepared.is_empty())
    }

    fn render_extensions(&mut self, store: &AreaStore, indices: Vec<usize>) -> Result<()> {
        for index in indices {
            if let Some(ext) = store.extension(index) {
                self.renderer.render_extension(ext)?;
            }
        }
        Ok(())
    }
}

impl<R: Renderer, S: PageStash> AreaTreeModel for RenderPagesModel<R, S> {
    fn start_page_sequence(&mut self, _store: &mut AreaStore, title: Option<&str>) -> Result<()> {
        self.renderer.start_page_sequence(title)
    }

    fn add_page(&mut self, store: &mut AreaStore, key: PageKey) -> Result<()> {
        let out_of_order = self.renderer.supports_out_of_order();
        let ready = out_of_order && store.page(key).map(|p| p.is_resolved()).unwrap_or(false);
        if ready {
            self.render_page(store, key)?;
        } else {
            if out_of_order {
                if let Some(page) = store.page(key) {
                    self.renderer.prepare_page(page)?;
                }
            }
            self.prepared.push_back(key);
        }

        let done = self.check_prepared_pages(store, false)?;
        // Only a page the sweep left waiting goes to the stash.
        if self.prepared.contains(&key) {
            if let Some(page) = store.page_mut(key) {
                self.stash.save(page)?;
            }
        }
        if done {
            let pending = std::mem::take(&mut self.pending_extensions);
            self.render_extensions(store, pending)?;
        }
        Ok(())
    }

    fn add_extension(&mut self, store: &mut AreaStore, index: usize, timing: ExtensionTiming) -> Result<()> {
        match timing {
            ExtensionTiming::Immediately => self.render_extensions(store, vec![index]),
            ExtensionTiming::AfterPage => {
                self.pending_extensions.push(index);
                Ok(())
            }
            ExtensionTiming::EndOfDoc => {
                self.end_of_doc_extensions.push(index);
                Ok(())
            }
        }
    }

    fn end_document(&mut self, store: &mut AreaStore) -> Result<()> {
        self.check_prepared_pages(store, true)?;
        let pending = std::mem::take(&mut self.pending_extensions);
        self.render_extensions(store, pending)?;
        let end_of_doc = std::mem::take(&mut self.end_of_doc_extensions);
        self.render_extensions(store, end_of_doc)?;
        self.renderer.stop_renderer()
    }
}

/// Keeps every page, grouped by page sequence. Never renders.
#[derive(Debug, Default)]
pub struct StorePagesModel {
    sequences: Vec<(Option<String>, Vec<PageKey>)>,
    extensions: Vec<usize>,
    finished: bool,
}

impl StorePagesModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequence_title(&self, sequence: usize) -> Option<&str> {
        self.sequences.get(sequence).and_then(|(t, _)| t.as_deref())
    }

    pub fn page_count(&self, sequence: usize) -> usize {
        self.sequences.get(sequence).map(|(_, p)| p.len()).unwrap_or(0)
    }

    /// The `index`th page of a sequence.
    pub fn page(&self, sequence: usize, index: usize) -> Option<PageKey> {
        self.sequences.get(sequence).and_then(|(_, p)| p.get(index)).copied()
    }

    pub fn extensions(&self) -> &[usize] {
        &self.extensions
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl AreaTreeModel for StorePagesModel {
    fn start_page_sequence(&mut self, _store: &mut AreaStore, title: Option<&str>) -> Result<()> {
        self.sequences.push((title.map(str::to_string), Vec::new()));
        Ok(())
    }

    fn add_page(&mut self, _store: &mut AreaStore, key: PageKey) -> Result<()> {
        if self.sequences.is_empty() {
            self.sequences.push((None, Vec::new()));
        }
        if let Some((_, pages)) = self.sequences.last_mut() {
            pages.push(key);
        }
        Ok(())
    }

    fn add_extension(&mut self, _store: &mut AreaStore, index: usize, _timing: ExtensionTiming) -> Result<()> {
        self.extensions.push(index);
        Ok(())
    }

    fn end_document(&mut self, _store: &mut AreaStore) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
