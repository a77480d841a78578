//! # Folayout
//!
//! A formatting-objects layout engine.
//!
//! Input is a tree of formatting objects (blocks, text runs, leaders,
//! page-number citations, footnotes, markers) grouped into page sequences.
//! Output is an area tree: pages of regions, regions of blocks, blocks of
//! lines, lines of positioned words and spaces. Lengths are integer
//! millipoints throughout.
//!
//! The page is the unit of layout. Lines are filled greedily against the
//! width they have, blocks stop at the height the page has left, and a
//! block that runs out of room is cut and continued on the next page. A
//! page that cites a page number not yet known stays in the area tree
//! until the target turns up, then goes to the renderer.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Document tree: page sequences, nodes, styles
//!       ↓
//!   [style]    Inheritance and defaults, in millipoints
//!       ↓
//!   [layout]   Line filling, block stacking, page breaking
//!       ↓
//!   [area]     Area tree, forward references, page cache
//!       ↓
//!   [render]   Pages out, in order or as soon as resolved
//! ```

pub mod area;
pub mod config;
pub mod error;
pub mod font;
pub mod hyphenation;
pub mod layout;
pub mod min_opt_max;
pub mod model;
pub mod render;
pub mod style;

pub use config::{EngineConfig, ErrorPolicy};
pub use error::{LayoutError, Result};
pub use layout::LayoutEngine;
pub use min_opt_max::MinOptMax;
pub use model::Document;

use area::{AreaTree, PageCache, RenderPagesModel, StorePagesModel};
use render::{JsonRenderer, Renderer};

/// Parse a document from JSON.
pub fn parse_document(json: &str) -> Result<Document> {
    Ok(serde_json::from_str(json)?)
}

/// Lay out a document and keep every page in memory.
pub fn layout(document: &Document, config: &EngineConfig) -> Result<AreaTree<StorePagesModel>> {
    config.validate()?;
    let engine = LayoutEngine::new(config.clone());
    let mut tree = AreaTree::new(StorePagesModel::new());
    engine.layout(document, &mut tree)?;
    Ok(tree)
}

/// Lay out a document, streaming pages to `renderer` as they resolve.
/// Waiting pages go to a disk cache when the configuration asks for one.
pub fn render<R: Renderer>(document: &Document, config: &EngineConfig, renderer: R) -> Result<R> {
    config.validate()?;
    let engine = LayoutEngine::new(config.clone());
    if config.cache_pages {
        let cache = match &config.cache_dir {
            Some(dir) => PageCache::new_in(dir)?,
            None => PageCache::new()?,
        };
        let model = RenderPagesModel::cached(renderer, cache).with_error_policy(config.error_policy);
        let mut tree = AreaTree::new(model);
        engine.layout(document, &mut tree)?;
        Ok(tree.into_model().into_renderer())
    } else {
        let model = RenderPagesModel::new(renderer).with_error_policy(config.error_policy);
        let mut tree = AreaTree::new(model);
        engine.layout(document, &mut tree)?;
        Ok(tree.into_model().into_renderer())
    }
}

/// Lay out a JSON document and return its area tree as JSON lines.
pub fn render_json(json: &str, config: &EngineConfig) -> Result<Vec<u8>> {
    let document = parse_document(json)?;
    let renderer = JsonRenderer::new(Vec::new()).with_out_of_order(config.out_of_order);
    Ok(render(&document, config, renderer)?.into_inner())
}
