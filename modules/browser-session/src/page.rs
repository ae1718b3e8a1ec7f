use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chromiumoxide::Page;
use tracing::{debug, warn};

use crate::error::Result;

/// RAII wrapper over a chromiumoxide `Page`.
///
/// chromiumoxide pages have no Drop implementation and need an explicit
/// async `close()` to release their CDP target. The guard provides two
/// release paths: the explicit `close()` (preferred, awaitable, error
/// reporting) and a Drop fallback that spawns a background close so the
/// page is released even when the caller bails out early with `?`.
pub struct PageGuard {
    page: Option<Page>,
    open_pages: Arc<AtomicUsize>,
    runtime: tokio::runtime::Handle,
}

impl PageGuard {
    pub(crate) fn new(page: Page, open_pages: Arc<AtomicUsize>) -> Self {
        open_pages.fetch_add(1, Ordering::SeqCst);
        Self {
            page: Some(page),
            open_pages,
            runtime: tokio::runtime::Handle::current(),
        }
    }

    /// Explicitly close the page, consuming the guard.
    pub async fn close(mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            self.open_pages.fetch_sub(1, Ordering::SeqCst);
            page.close().await?;
            debug!("Page context closed");
        }
        Ok(())
    }

    pub fn page(&self) -> &Page {
        self.page
            .as_ref()
            .expect("PageGuard: page already consumed")
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Self::Target {
        self.page()
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            self.open_pages.fetch_sub(1, Ordering::SeqCst);
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    warn!(error = %e, "Background page close failed");
                }
            });
        }
    }
}
