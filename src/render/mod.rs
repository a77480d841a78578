//! # Renderers
//!
//! A renderer receives finished pages from the area tree. Painting formats
//! live outside this crate; what ships here is an in-memory collector for
//! tests and tools, and a JSON dump of the area tree.

pub mod json;

pub use json::JsonRenderer;

use crate::area::extension::TreeExtension;
use crate::area::PageViewport;
use crate::error::Result;

pub trait Renderer {
    /// Whether pages may be handed over before earlier pages are complete.
    fn supports_out_of_order(&self) -> bool {
        false
    }

    fn start_page_sequence(&mut self, _title: Option<&str>) -> Result<()> {
        Ok(())
    }

    /// Called for pages that wait on forward references, so an out-of-order
    /// renderer can reserve their place in the output.
    fn prepare_page(&mut self, _page: &PageViewport) -> Result<()> {
        Ok(())
    }

    fn render_page(&mut self, page: &PageViewport) -> Result<()>;

    fn render_extension(&mut self, _extension: &TreeExtension) -> Result<()> {
        Ok(())
    }

    fn stop_renderer(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps a copy of everything it is given, in the order given.
#[derive(Debug, Default)]
pub struct CollectingRenderer {
    out_of_order: bool,
    pub sequences: Vec<Option<String>>,
    pub prepared: Vec<usize>,
    pub pages: Vec<PageViewport>,
    pub extensions: Vec<TreeExtension>,
    pub stopped: bool,
}

impl CollectingRenderer {
    pub fn in_order() -> Self {
        Self::default()
    }

    pub fn out_of_order() -> Self {
        Self {
            out_of_order: true,
            ..Self::default()
        }
    }

    /// Page numbers in the order the pages were rendered.
    pub fn rendered_numbers(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.page_number_string.clone()).collect()
    }
}

impl Renderer for CollectingRenderer {
    fn supports_out_of_order(&self) -> bool {
        self.out_of_order
    }

    fn start_page_sequence(&mut self, title: Option<&str>) -> Result<()> {
        self.sequences.push(title.map(str::to_string));
        Ok(())
    }

    fn prepare_page(&mut self, page: &PageViewport) -> Result<()> {
        self.prepared.push(page.page_number);
        Ok(())
    }

    fn render_page(&mut self, page: &PageViewport) -> Result<()> {
        self.pages.push(page.clone());
        Ok(())
    }

    fn render_extension(&mut self, extension: &TreeExtension) -> Result<()> {
        self.extensions.push(extension.clone());
        Ok(())
    }

    fn stop_renderer(&mut self) -> Result<()> {
        self.stopped = true;
        Ok(())
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn supports_out_of_order(&self) -> bool {
        (**self).supports_out_of_order()
    }

    fn start_page_sequence(&mut self, title: Option<&str>) -> Result<()> {
        (**self).start_page_sequence(title)
    }

    fn prepare_page(&mut self, page: &PageViewport) -> Result<()> {
        (**self).prepare_page(page)
    }

    fn render_page(&mut self, page: &PageViewport) -> Result<()> {
        (**self).render_page(page)
    }

    fn render_extension(&mut self, extension: &TreeExtension) -> Result<()> {
        (**self).render_extension(extension)
    }

    fn stop_renderer(&mut self) -> Result<()> {
        (**self).stop_renderer()
    }
}
