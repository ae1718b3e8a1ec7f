pub mod error;
pub mod page;

pub use error::{Result, SessionError};
pub use page::PageGuard;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Launch settings for one headless Chromium process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Override for the browser binary. None lets chromiumoxide find one.
    pub executable: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            executable: None,
            window_width: 1366,
            window_height: 768,
        }
    }
}

/// One running headless browser process plus its CDP event pump.
///
/// Pages opened from the session are independent targets; the session is
/// the only shared resource, owned by exactly one orchestrator for the
/// lifetime of one batch.
pub struct AutomationSession {
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
    open_pages: Arc<AtomicUsize>,
    created_at: DateTime<Utc>,
}

impl AutomationSession {
    /// Start a browser process. Fatal for the batch on failure: there is
    /// no partial session.
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .args(vec![
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--no-first-run",
                "--no-default-browser-check",
                "--mute-audio",
            ]);
        if let Some(ref path) = config.executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(SessionError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        // The handler is the CDP message pump; it must be polled for the
        // lifetime of the browser.
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("Browser session started");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler_task,
            open_pages: Arc::new(AtomicUsize::new(0)),
            created_at: Utc::now(),
        })
    }

    /// Open an isolated page context. The returned guard releases the
    /// page on every exit path.
    pub async fn open_page(&self) -> Result<PageGuard> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or(SessionError::Closed)?;
        let page = browser.new_page("about:blank").await?;
        Ok(PageGuard::new(page, Arc::clone(&self.open_pages)))
    }

    pub fn open_page_count(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Terminate the browser process. Safe to call more than once; only
    /// the first call tears anything down.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "Browser close request failed, process may linger");
            }
            if let Err(e) = browser.wait().await {
                warn!(error = %e, "Waiting for browser exit failed");
            }
            self.handler_task.abort();
            info!("Browser session closed");
        }
        Ok(())
    }

    pub async fn is_open(&self) -> bool {
        self.browser.lock().await.is_some()
    }
}

/// Owns at most one live `AutomationSession` and hands it out lazily.
///
/// `acquire` is idempotent: it returns the existing live session or
/// launches a new one. Single-orchestrator ownership is assumed; two
/// orchestrators must each hold their own manager.
pub struct SessionManager {
    config: SessionConfig,
    session: Mutex<Option<Arc<AutomationSession>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Return the live session, launching one on first use.
    pub async fn acquire(&self) -> Result<Arc<AutomationSession>> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            if session.is_open().await {
                return Ok(Arc::clone(session));
            }
        }
        let session = Arc::new(AutomationSession::launch(&self.config).await?);
        *guard = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Terminate the session if one is live and forget the handle.
    pub async fn release(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            session.close().await?;
        }
        Ok(())
    }

    pub async fn is_live(&self) -> bool {
        match self.session.lock().await.as_ref() {
            Some(session) => session.is_open().await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert!(config.executable.is_none());
        assert_eq!(config.window_width, 1366);
        assert_eq!(config.window_height, 768);
    }
}
