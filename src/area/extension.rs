//! Document-level items that ride along with the pages: the outline and
//! the document info.

use serde::{Deserialize, Serialize};

use super::{PageRef, Resolvable};
use crate::model::{Bookmark, Metadata};

/// When an extension is handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionTiming {
    /// As soon as it is registered.
    Immediately,
    /// Once every page accepted so far has gone to the renderer.
    AfterPage,
    /// After the last page.
    EndOfDoc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TreeExtension {
    Outline(Outline),
    DocumentInfo(Metadata),
}

impl TreeExtension {
    pub fn name(&self) -> &'static str {
        match self {
            TreeExtension::Outline(_) => "outline",
            TreeExtension::DocumentInfo(_) => "document-info",
        }
    }
}

impl Resolvable for TreeExtension {
    fn is_resolved(&self) -> bool {
        match self {
            TreeExtension::Outline(o) => o.is_resolved(),
            TreeExtension::DocumentInfo(_) => true,
        }
    }

    fn id_refs(&self) -> Vec<String> {
        match self {
            TreeExtension::Outline(o) => o.id_refs(),
            TreeExtension::DocumentInfo(_) => Vec::new(),
        }
    }

    fn resolve_id_ref(&mut self, id: &str, pages: Option<&[PageRef]>) {
        if let TreeExtension::Outline(o) = self {
            o.resolve_id_ref(id, pages);
        }
    }
}

/// The bookmark tree with each entry's target page once known.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    pub items: Vec<OutlineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    pub title: String,
    pub ref_id: String,
    /// `None` until resolved, and after resolution if the id was never
    /// placed.
    pub page: Option<PageRef>,
    pub resolved: bool,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    fn from_bookmark(b: &Bookmark) -> Self {
        Self {
            title: b.title.clone(),
            ref_id: b.ref_id.clone(),
            page: None,
            resolved: false,
            children: b.children.iter().map(OutlineItem::from_bookmark).collect(),
        }
    }

    fn collect_unresolved(&self, out: &mut Vec<String>) {
        if !self.resolved && !out.contains(&self.ref_id) {
            out.push(self.ref_id.clone());
        }
        self.children.iter().for_each(|c| c.collect_unresolved(out));
    }

    fn resolve(&mut self, id: &str, pages: Option<&[PageRef]>) {
        if self.ref_id == id {
            self.page = pages.and_then(|p| p.first()).cloned();
            self.resolved = true;
            if self.page.is_none() {
                log::warn!("bookmark '{}': id '{}' was never placed", self.title, id);
            }
        }
        self.children.iter_mut().for_each(|c| c.resolve(id, pages));
    }
}

impl Outline {
    pub fn from_bookmarks(bookmarks: &[Bookmark]) -> Self {
        Self {
            items: bookmarks.iter().map(OutlineItem::from_bookmark).collect(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id_refs().is_empty()
    }

    pub fn id_refs(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.items.iter().for_each(|i| i.collect_unresolved(&mut out));
        out
    }

    pub fn resolve_id_ref(&mut self, id: &str, pages: Option<&[PageRef]>) {
        self.items.iter_mut().for_each(|i| i.resolve(id, pages));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::PageKey;

    fn bookmarks() -> Vec<Bookmark> {
        vec![Bookmark {
            title: "Intro".into(),
            ref_id: "intro".into(),
            children: vec![Bookmark {
                title: "Scope".into(),
                ref_id: "scope".into(),
                children: vec![],
            }],
        }]
    }

    #[test]
    fn outline_waits_on_every_target() {
        let mut ext = TreeExtension::Outline(Outline::from_bookmarks(&bookmarks()));
        assert_eq!(ext.id_refs(), vec!["intro".to_string(), "scope".to_string()]);
        ext.resolve_id_ref("scope", Some(&[PageRef::new(PageKey(1), "2")]));
        assert!(!ext.is_resolved());
        ext.resolve_id_ref("intro", None);
        assert!(ext.is_resolved());
        let TreeExtension::Outline(o) = ext else { unreachable!() };
        assert_eq!(o.items[0].page, None);
        assert_eq!(o.items[0].children[0].page.as_ref().map(|p| p.number.as_str()), Some("2"));
    }

    #[test]
    fn document_info_needs_nothing() {
        let ext = TreeExtension::DocumentInfo(Metadata::default());
        assert!(ext.is_resolved());
        assert_eq!(ext.name(), "document-info");
    }
}
