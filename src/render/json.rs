//! Area tree dump: one JSON object per line.

use std::io::Write;

use serde::Serialize;

use super::Renderer;
use crate::area::extension::TreeExtension;
use crate::area::PageViewport;
use crate::error::{LayoutError, Result};

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "camelCase")]
enum Record<'a> {
    PageSequence { title: Option<&'a str> },
    Page(&'a PageViewport),
    Extension(&'a TreeExtension),
}

/// Writes the area tree as JSON lines.
///
/// With `out_of_order` set the renderer accepts resolved pages before
/// earlier pages that still wait on references, so lines may not be in
/// page order; each page record carries its number.
pub struct JsonRenderer<W: Write> {
    out: W,
    out_of_order: bool,
    pretty: bool,
    pages_written: usize,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            out_of_order: false,
            pretty: false,
            pages_written: 0,
        }
    }

    pub fn with_out_of_order(mut self, out_of_order: bool) -> Self {
        self.out_of_order = out_of_order;
        self
    }

    /// Indent each record. The output is then no longer line-delimited.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &Record, page: &str) -> Result<()> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, record)
        } else {
            serde_json::to_writer(&mut self.out, record)
        };
        written
            .map_err(|e| e.to_string())
            .and_then(|_| self.out.write_all(b"\n").map_err(|e| e.to_string()))
            .map_err(|message| LayoutError::Render {
                page: page.to_string(),
                message,
            })
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn supports_out_of_order(&self) -> bool {
        self.out_of_order
    }

    fn start_page_sequence(&mut self, title: Option<&str>) -> Result<()> {
        self.write_record(&Record::PageSequence { title }, "-")
    }

    fn render_page(&mut self, page: &PageViewport) -> Result<()> {
        self.write_record(&Record::Page(page), &page.page_number_string)?;
        self.pages_written += 1;
        Ok(())
    }

    fn render_extension(&mut self, extension: &TreeExtension) -> Result<()> {
        self.write_record(&Record::Extension(extension), "-")
    }

    fn stop_renderer(&mut self) -> Result<()> {
        self.out.flush().map_err(|e| LayoutError::Render {
            page: "-".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Page, PageKey, Rect};

    #[test]
    fn one_line_per_record() {
        let mut r = JsonRenderer::new(Vec::new());
        r.start_page_sequence(Some("Main")).unwrap();
        let pv = PageViewport::new(PageKey(0), Rect::new(0, 0, 10, 10), 1, "1".into(), 0, Page::new());
        r.render_page(&pv).unwrap();
        r.stop_renderer().unwrap();
        assert_eq!(r.pages_written(), 1);
        let text = String::from_utf8(r.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"record\":\"pageSequence\""), "got {}", lines[0]);
        let page: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(page["pageNumberString"], "1");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_names_the_page() {
        let mut r = JsonRenderer::new(Broken);
        let pv = PageViewport::new(PageKey(0), Rect::default(), 7, "vii".into(), 0, Page::new());
        let err = r.render_page(&pv).unwrap_err();
        assert!(err.to_string().contains("page vii"), "got {}", err);
    }
}
