//! # Area Tree
//!
//! Collects pages as layout finishes them and tracks forward references
//! across the whole document.
//!
//! Two maps do the bookkeeping: where each id has been placed, and who is
//! still waiting for which id. The moment an id is placed, everyone waiting
//! for it is resolved (once) and dropped from the waiting map. Whatever is
//! still waiting when the document ends is resolved with no pages, which
//! leaves citations showing their placeholder.

use std::collections::BTreeMap;

use super::extension::{ExtensionTiming, TreeExtension};
use super::model::AreaTreeModel;
use super::{PageKey, PageRef, PageViewport, Resolvable};
use crate::error::Result;

/// Pages and extensions, addressed by key and index.
#[derive(Debug, Default)]
pub struct AreaStore {
    pages: Vec<PageViewport>,
    extensions: Vec<TreeExtension>,
}

impl AreaStore {
    pub fn page(&self, key: PageKey) -> Option<&PageViewport> {
        self.pages.get(key.0)
    }

    pub fn page_mut(&mut self, key: PageKey) -> Option<&mut PageViewport> {
        self.pages.get_mut(key.0)
    }

    pub fn pages(&self) -> &[PageViewport] {
        &self.pages
    }

    pub fn extension(&self, index: usize) -> Option<&TreeExtension> {
        self.extensions.get(index)
    }

    pub fn extensions(&self) -> &[TreeExtension] {
        &self.extensions
    }
}

/// Something waiting for an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumer {
    Page(PageKey),
    /// A registered [`Resolvable`], by handle.
    Resolvable(usize),
    Extension(usize),
}

pub struct AreaTree<M: AreaTreeModel> {
    model: M,
    store: AreaStore,
    id_locations: BTreeMap<String, Vec<PageKey>>,
    pending: BTreeMap<String, Vec<Consumer>>,
    resolvables: Vec<Box<dyn Resolvable>>,
    sequence: usize,
    ended: bool,
}

impl<M: AreaTreeModel> AreaTree<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            store: AreaStore::default(),
            id_locations: BTreeMap::new(),
            pending: BTreeMap::new(),
            resolvables: Vec::new(),
            sequence: 0,
            ended: false,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn store(&self) -> &AreaStore {
        &self.store
    }

    pub fn page(&self, key: PageKey) -> Option<&PageViewport> {
        self.store.page(key)
    }

    pub fn page_count(&self) -> usize {
        self.store.pages.len()
    }

    /// The key the next added page will get.
    pub fn next_page_key(&self) -> PageKey {
        PageKey(self.store.pages.len())
    }

    /// Index of the current page sequence; pages carry it.
    pub fn current_sequence(&self) -> usize {
        self.sequence.saturating_sub(1)
    }

    /// Pages that define `id`, in the order they were added.
    pub fn id_locations(&self, id: &str) -> Option<Vec<PageRef>> {
        self.id_locations.get(id).map(|keys| self.page_refs(keys))
    }

    /// Ids somebody is still waiting for.
    pub fn pending_ids(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    pub fn resolvable(&self, handle: usize) -> Option<&dyn Resolvable> {
        self.resolvables.get(handle).map(|r| r.as_ref())
    }

    pub fn start_page_sequence(&mut self, title: Option<&str>) -> Result<()> {
        self.sequence += 1;
        self.model.start_page_sequence(&mut self.store, title)
    }

    /// Take a finished page. Ids it defines resolve whoever waits for them;
    /// citations it holds resolve now if their id is already placed, and
    /// wait otherwise. Then the model gets the page.
    pub fn add_page(&mut self, mut page: PageViewport) -> Result<PageKey> {
        let key = self.next_page_key();
        page.key = key;
        let ids = page.ids.clone();
        let unresolved: Vec<String> = page.unresolved_ids().map(str::to_string).collect();
        self.store.pages.push(page);

        for id in &ids {
            self.add_id_ref(id, key);
        }
        for id in unresolved {
            self.add_unresolved_id(&id, Consumer::Page(key));
        }
        log::debug!("area tree: page {} added", key.0);
        self.model.add_page(&mut self.store, key)?;
        Ok(key)
    }

    /// Record that `id` is placed on `page`, and resolve everyone waiting
    /// for it.
    pub fn add_id_ref(&mut self, id: &str, page: PageKey) {
        let locations = self.id_locations.entry(id.to_string()).or_default();
        if !locations.contains(&page) {
            locations.push(page);
        }
        if let Some(consumers) = self.pending.remove(id) {
            let refs = self.id_locations(id).unwrap_or_default();
            for consumer in consumers {
                self.resolve(consumer, id, Some(&refs));
            }
        }
    }

    /// `consumer` waits for `id`. Resolved at once if the id is placed.
    pub fn add_unresolved_id(&mut self, id: &str, consumer: Consumer) {
        if let Some(refs) = self.id_locations(id) {
            self.resolve(consumer, id, Some(&refs));
        } else {
            let waiting = self.pending.entry(id.to_string()).or_default();
            if !waiting.contains(&consumer) {
                waiting.push(consumer);
            }
        }
    }

    /// Hand a resolvable to the tree. Returns its handle.
    pub fn register_resolvable(&mut self, resolvable: Box<dyn Resolvable>) -> usize {
        let handle = self.resolvables.len();
        let ids = resolvable.id_refs();
        self.resolvables.push(resolvable);
        for id in ids {
            self.add_unresolved_id(&id, Consumer::Resolvable(handle));
        }
        handle
    }

    /// Register a document-level extension. One that still waits on ids is
    /// deferred to the end of the document whatever timing was asked for.
    pub fn add_extension(&mut self, extension: TreeExtension, timing: ExtensionTiming) -> Result<()> {
        let index = self.store.extensions.len();
        let ids = extension.id_refs();
        self.store.extensions.push(extension);
        for id in ids {
            self.add_unresolved_id(&id, Consumer::Extension(index));
        }
        let resolved = self.store.extensions[index].is_resolved();
        let timing = if resolved { timing } else { ExtensionTiming::EndOfDoc };
        self.model.add_extension(&mut self.store, index, timing)
    }

    /// Force every pending reference to resolve with no pages, then let the
    /// model finish. Calling it twice does nothing the second time.
    pub fn end_document(&mut self) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        let pending = std::mem::take(&mut self.pending);
        for (id, consumers) in pending {
            log::warn!("unresolved id reference '{}' ({} consumers)", id, consumers.len());
            for consumer in consumers {
                self.resolve(consumer, &id, None);
            }
        }
        self.model.end_document(&mut self.store)
    }

    fn page_refs(&self, keys: &[PageKey]) -> Vec<PageRef> {
        keys.iter()
            .filter_map(|k| self.store.page(*k))
            .map(PageViewport::page_ref)
            .collect()
    }

    fn resolve(&mut self, consumer: Consumer, id: &str, pages: Option<&[PageRef]>) {
        match consumer {
            Consumer::Page(key) => {
                if let Some(page) = self.store.page_mut(key) {
                    page.resolve_id_ref(id, pages);
                }
            }
            Consumer::Resolvable(handle) => {
                if let Some(r) = self.resolvables.get_mut(handle) {
                    r.resolve_id_ref(id, pages);
                }
            }
            Consumer::Extension(index) => {
                if let Some(ext) = self.store.extensions.get_mut(index) {
                    ext.resolve_id_ref(id, pages);
                }
            }
        }
    }
}
