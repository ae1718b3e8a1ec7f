use std::time::Duration;

use chromiumoxide::Page;
use localedge_common::EngineError;

/// Post-navigation settle window. CDP exposes no reliable network-idle
/// signal through this path, so late XHR-driven content gets a fixed
/// grace period instead.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Navigate a page with a bounded timeout and wait for the load to settle.
/// Sets the client identity string first so the initial request already
/// carries it.
pub(crate) async fn navigate_settled(
    page: &Page,
    url: &str,
    user_agent: &str,
    timeout_secs: u64,
) -> Result<(), EngineError> {
    page.set_user_agent(user_agent)
        .await
        .map_err(|e| EngineError::NavigationFailed {
            url: url.to_string(),
            cause: e.to_string(),
        })?;

    let nav = tokio::time::timeout(Duration::from_secs(timeout_secs), async {
        page.goto(url).await?;
        page.wait_for_navigation().await?;
        Ok::<_, chromiumoxide::error::CdpError>(())
    })
    .await;

    match nav {
        Err(_) => Err(EngineError::NavigationTimeout {
            url: url.to_string(),
            timeout_secs,
        }),
        Ok(Err(e)) => Err(EngineError::NavigationFailed {
            url: url.to_string(),
            cause: e.to_string(),
        }),
        Ok(Ok(())) => {
            tokio::time::sleep(SETTLE_DELAY).await;
            Ok(())
        }
    }
}
