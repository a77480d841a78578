//! # Page Cache
//!
//! Where a page's content waits between being laid out and being rendered.
//! [`ResidentPages`] leaves it in memory. [`PageCache`] writes it to a
//! private temp directory as deflated JSON and reads it back (deleting the
//! file) right before the page is rendered, so a long run of pages held back
//! by a forward reference does not pile up in memory.

use std::fs;
use std::path::{Path, PathBuf};

use miniz_oxide::deflate::compress_to_vec;
use miniz_oxide::inflate::decompress_to_vec;
use tempfile::TempDir;

use super::{Page, PageViewport};
use crate::error::{LayoutError, Result};

const COMPRESSION_LEVEL: u8 = 6;

/// Save/load contract for prepared pages.
pub trait PageStash {
    /// Detach the page's content, if the stash keeps pages elsewhere.
    fn save(&mut self, page: &mut PageViewport) -> Result<()>;

    /// Make sure the page's content is attached again.
    fn load(&mut self, page: &mut PageViewport) -> Result<()>;
}

/// Keeps every page in memory.
#[derive(Debug, Default)]
pub struct ResidentPages;

impl PageStash for ResidentPages {
    fn save(&mut self, _page: &mut PageViewport) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _page: &mut PageViewport) -> Result<()> {
        Ok(())
    }
}

/// Pages on disk, one file per page.
#[derive(Debug)]
pub struct PageCache {
    dir: TempDir,
    saved: usize,
}

impl PageCache {
    /// A cache in a fresh directory under the system temp dir.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("folayout-pages").tempdir()?,
            saved: 0,
        })
    }

    /// A cache in a fresh directory under `parent`.
    pub fn new_in(parent: &Path) -> Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("folayout-pages").tempdir_in(parent)?,
            saved: 0,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Number of pages written so far.
    pub fn saved_count(&self) -> usize {
        self.saved
    }

    fn file_for(&self, page: &PageViewport) -> PathBuf {
        self.dir.path().join(format!("page-{}.json.z", page.key.0))
    }

    fn encode(page: &Page) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(page).map_err(|e| LayoutError::CacheFormat(e.to_string()))?;
        Ok(compress_to_vec(&json, COMPRESSION_LEVEL))
    }

    fn decode(bytes: &[u8]) -> Result<Page> {
        let json = decompress_to_vec(bytes).map_err(|e| LayoutError::CacheFormat(format!("{:?}", e)))?;
        serde_json::from_slice(&json).map_err(|e| LayoutError::CacheFormat(e.to_string()))
    }
}

impl PageStash for PageCache {
    fn save(&mut self, page: &mut PageViewport) -> Result<()> {
        let file = self.file_for(page);
        let Some(content) = page.save_page() else {
            return Ok(());
        };
        let bytes = match Self::encode(&content) {
            Ok(bytes) => bytes,
            Err(e) => {
                page.load_page(content);
                return Err(e);
            }
        };
        if let Err(e) = fs::write(&file, bytes) {
            page.load_page(content);
            return Err(e.into());
        }
        self.saved += 1;
        log::debug!("cached page {} in {}", page.page_number_string, file.display());
        Ok(())
    }

    fn load(&mut self, page: &mut PageViewport) -> Result<()> {
        if page.is_loaded() {
            return Ok(());
        }
        let file = self.file_for(page);
        let bytes = fs::read(&file)?;
        fs::remove_file(&file)?;
        page.load_page(Self::decode(&bytes)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{PageKey, Rect, Resolvable};

    fn viewport() -> PageViewport {
        let mut pv = PageViewport::new(PageKey(2), Rect::new(0, 0, 100, 100), 3, "3".into(), 0, Page::new());
        pv.add_unresolved_id("later");
        pv
    }

    #[test]
    fn save_then_load_round_trips_and_removes_the_file() {
        let mut cache = PageCache::new().unwrap();
        let mut pv = viewport();
        let before = pv.page.clone();
        cache.save(&mut pv).unwrap();
        assert!(!pv.is_loaded());
        let file = cache.path().join("page-2.json.z");
        assert!(file.exists());

        cache.load(&mut pv).unwrap();
        assert!(!file.exists());
        assert_eq!(pv.id_refs(), vec!["later".to_string()]);
        assert_eq!(pv.page, before);
    }

    #[test]
    fn corrupt_file_is_a_format_error() {
        let mut cache = PageCache::new().unwrap();
        let mut pv = viewport();
        cache.save(&mut pv).unwrap();
        fs::write(cache.path().join("page-2.json.z"), b"not deflate").unwrap();
        let err = cache.load(&mut pv).unwrap_err();
        assert!(matches!(err, LayoutError::CacheFormat(_)), "got {}", err);
    }

    #[test]
    fn cache_directory_is_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let cache = PageCache::new_in(parent.path()).unwrap();
        let path = cache.path().to_path_buf();
        assert!(path.starts_with(parent.path()));
        drop(cache);
        assert!(!path.exists());
    }
}
