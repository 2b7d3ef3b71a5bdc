use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig};
use clap::ValueEnum;
use futures_util::StreamExt;
use tracing::{debug, error, info};

use crate::error::{ConvertError, Result};

/// Paper sizes, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::A5 => (5.83, 8.27),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub paper: PaperSize,
    pub landscape: bool,
    pub scale: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub print_background: bool,
    /// Let `@page` rules in the book CSS override the paper size.
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            landscape: false,
            scale: 1.0,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            print_background: true,
            prefer_css_page_size: false,
        }
    }
}

impl PdfOptions {
    pub fn with_margin(mut self, inches: f64) -> Self {
        self.margin_top = inches;
        self.margin_right = inches;
        self.margin_bottom = inches;
        self.margin_left = inches;
        self
    }

    fn to_params(&self) -> PrintToPdfParams {
        let (width, height) = self.paper.dimensions();
        PrintToPdfParams {
            landscape: Some(self.landscape),
            print_background: Some(self.print_background),
            scale: Some(self.scale),
            paper_width: Some(width),
            paper_height: Some(height),
            margin_top: Some(self.margin_top),
            margin_right: Some(self.margin_right),
            margin_bottom: Some(self.margin_bottom),
            margin_left: Some(self.margin_left),
            prefer_css_page_size: Some(self.prefer_css_page_size),
            ..Default::default()
        }
    }
}

/// Renders HTML to PDF through a headless Chromium instance.
pub struct Renderer {
    timeout: Duration,
    pdf_options: PdfOptions,
}

impl Renderer {
    pub fn new(pdf_options: PdfOptions, timeout_seconds: f64) -> Self {
        Self {
            timeout: Duration::try_from_secs_f64(timeout_seconds).unwrap_or(Duration::MAX),
            pdf_options,
        }
    }

    pub async fn render(&self, html: &str) -> Result<Vec<u8>> {
        info!("Launching browser for PDF rendering");

        let config = BrowserConfig::builder()
            .build()
            .map_err(|e| ConvertError::Render(format!("Failed to create browser config: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ConvertError::Render(format!("Failed to launch browser: {}", e)))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(err) = h {
                    let err_str = err.to_string();
                    if !err_str.contains("data did not match any variant")
                        && !err_str.contains("untagged enum Message")
                    {
                        error!("Browser handler error: {}", err);
                    } else {
                        debug!("Chrome protocol message ignored: {}", err);
                    }
                }
            }
        });

        let result = match tokio::time::timeout(self.timeout, self.render_internal(&browser, html)).await {
            Ok(result) => result,
            Err(_) => Err(ConvertError::Timeout(self.timeout)),
        };

        browser.close().await.ok();
        handle.abort();

        result
    }

    async fn render_internal(&self, browser: &Browser, html: &str) -> Result<Vec<u8>> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ConvertError::Render(format!("Failed to create new page: {}", e)))?;

        debug!("Loading {} bytes of HTML", html.len());
        page.set_content(html)
            .await
            .map_err(|e| ConvertError::Render(format!("Failed to set page content: {}", e)))?;

        let pdf_data = page
            .pdf(self.pdf_options.to_params())
            .await
            .map_err(|e| ConvertError::Render(format!("Failed to generate PDF: {}", e)))?;

        debug!("Browser produced {} bytes of PDF", pdf_data.len());
        Ok(pdf_data)
    }
}
