//! Browser lifecycle over the Chrome DevTools Protocol

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport as CdpViewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::page::Page;
use crate::profile::{DevicePreset, Profile, Viewport};

/// Options for launching one browser context.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub viewport: Viewport,
    pub device: Option<DevicePreset>,
}

impl BrowserOptions {
    /// Derive launch options from an execution profile.
    pub fn for_profile(profile: &Profile, headless: bool) -> HarnessResult<Self> {
        let device = profile.resolved_device()?;
        let viewport = device
            .as_ref()
            .map(|d| d.viewport)
            .or(profile.viewport)
            .unwrap_or(Viewport { width: 1280, height: 720 });

        Ok(Self { headless, viewport, device })
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport { width: 1280, height: 720 },
            device: None,
        }
    }
}

/// A running browser plus the task driving its CDP event loop.
///
/// Each test case owns its own handle; contexts are never shared.
pub struct BrowserHandle {
    browser: Browser,
    event_loop: JoinHandle<()>,
    user_agent: Option<String>,
}

impl BrowserHandle {
    /// Launch a headless browser with the configured viewport and device
    /// emulation.
    pub async fn launch(options: &BrowserOptions) -> HarnessResult<Self> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }

        let (scale, mobile) = options
            .device
            .as_ref()
            .map_or((1.0, false), |d| (d.device_scale_factor, d.is_mobile));

        builder = builder.viewport(CdpViewport {
            width: options.viewport.width,
            height: options.viewport.height,
            device_scale_factor: Some(scale),
            emulating_mobile: mobile,
            is_landscape: false,
            has_touch: mobile,
        });

        let config = builder.build().map_err(HarnessError::Browser)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        debug!("browser launched (headless: {})", options.headless);

        // The handler stream must be polled for the browser to make
        // progress; it ends when the browser process goes away.
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            event_loop,
            user_agent: options.device.as_ref().map(|d| d.user_agent.to_string()),
        })
    }

    /// Open a new page at the given URL.
    pub async fn new_page(&self, url: &str) -> HarnessResult<Page> {
        let page = self.browser.new_page(url).await?;
        if let Some(ua) = &self.user_agent {
            page.set_user_agent(ua.as_str()).await?;
        }
        Ok(Page::new(page))
    }

    /// Shut the browser down and stop the event loop.
    pub async fn close(&mut self) -> HarnessResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        let _ = self.browser.wait().await;
        self.event_loop.abort();
        Ok(())
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}
