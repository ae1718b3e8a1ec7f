use std::collections::BTreeMap;

use browser_session::AutomationSession;
use chromiumoxide::Page;
use localedge_common::{
    CompetitorTarget, Config, EngineError, ExtractionPayload, ExtractionResult,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::nav::navigate_settled;

/// One consolidated in-page query. Running a single evaluate call keeps
/// the page round-trips down and gives the Rust side one JSON bag to
/// post-process with pure, testable functions.
const PAGE_QUERY_JS: &str = r#"
(() => {
  const meta = (name) => {
    const el = document.querySelector(`meta[name="${name}"]`);
    return (el && el.content) || '';
  };
  const og = {};
  for (const el of document.querySelectorAll('meta[property^="og:"], meta[property^="twitter:"]')) {
    const key = el.getAttribute('property');
    if (key) og[key] = el.content || '';
  }
  const headings = Array.from(document.querySelectorAll('h1, h2, h3'))
    .map((h) => h.innerText.trim())
    .filter((t) => t.length > 0)
    .slice(0, 60);
  const links = Array.from(document.querySelectorAll('a[href]'))
    .map((a) => a.href)
    .slice(0, 500);
  const text = document.body ? document.body.innerText.slice(0, 20000) : '';
  return {
    title: document.title || '',
    meta_description: meta('description'),
    meta_keywords: meta('keywords'),
    social_tags: og,
    headings,
    links,
    text,
  };
})()
"#;

/// Raw output of `PAGE_QUERY_JS`, before Rust-side post-processing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageSnapshot {
    title: String,
    meta_description: String,
    meta_keywords: String,
    social_tags: BTreeMap<String, String>,
    headings: Vec<String>,
    links: Vec<String>,
    text: String,
}

/// Extract structured signals from one competitor page.
///
/// Never returns an error: every navigation/DOM fault is classified and
/// returned as a `Failed` tagged result, so the orchestrator only ever
/// sees a tagged outcome. No retries here; retry policy belongs to the
/// caller.
pub async fn extract(
    session: &AutomationSession,
    target: &CompetitorTarget,
    config: &Config,
) -> ExtractionResult {
    info!(url = target.url.as_str(), "Extracting competitor signals");
    match extract_inner(session, target, config).await {
        Ok(payload) => {
            info!(
                url = target.url.as_str(),
                headings = payload.headings.len(),
                social_links = payload.social_links.len(),
                "Extraction complete"
            );
            ExtractionResult::Ok { payload }
        }
        Err(e) => {
            warn!(url = target.url.as_str(), reason = %e.reason(), error = %e, "Extraction failed");
            ExtractionResult::Failed {
                reason: e.reason(),
                detail: e.to_string(),
            }
        }
    }
}

async fn extract_inner(
    session: &AutomationSession,
    target: &CompetitorTarget,
    config: &Config,
) -> Result<ExtractionPayload, EngineError> {
    let page = session
        .open_page()
        .await
        .map_err(|e| EngineError::NavigationFailed {
            url: target.url.clone(),
            cause: e.to_string(),
        })?;

    // Run the page work, then release the context before surfacing the
    // outcome. The guard's Drop covers the path where close itself fails.
    let outcome = snapshot_page(page.page(), &target.url, config).await;
    if let Err(e) = page.close().await {
        warn!(url = target.url.as_str(), error = %e, "Page close failed after extraction");
    }

    Ok(build_payload(outcome?))
}

async fn snapshot_page(
    page: &Page,
    url: &str,
    config: &Config,
) -> Result<PageSnapshot, EngineError> {
    navigate_settled(page, url, &config.user_agent, config.nav_timeout_secs).await?;

    let evaluated =
        page.evaluate(PAGE_QUERY_JS)
            .await
            .map_err(|e| EngineError::ExtractionQueryFailed {
                query: "page_snapshot".into(),
                cause: e.to_string(),
            })?;

    evaluated
        .into_value::<PageSnapshot>()
        .map_err(|e| EngineError::ExtractionQueryFailed {
            query: "page_snapshot".into(),
            cause: e.to_string(),
        })
}

// --- Pure post-processing ---

const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
];

/// Heading keywords mapped to canonical service categories. Pages that
/// match nothing get `["General"]` so the category list is never empty.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("residential", "Residential"),
    ("home", "Residential"),
    ("commercial", "Commercial"),
    ("business", "Commercial"),
    ("emergency", "Emergency"),
    ("24/7", "Emergency"),
    ("install", "Installation"),
    ("repair", "Repair"),
    ("fix", "Repair"),
    ("maintenance", "Maintenance"),
    ("tune-up", "Maintenance"),
    ("inspect", "Inspection"),
    ("consult", "Consultation"),
    ("estimate", "Consultation"),
];

fn build_payload(snapshot: PageSnapshot) -> ExtractionPayload {
    let social_links = social_links(&snapshot.links);
    let blog_topics = blog_topics(&snapshot.headings);
    let content_categories = content_categories(&snapshot.headings, &snapshot.meta_keywords);
    let post_count = blog_post_count(&snapshot.links);

    ExtractionPayload {
        title: snapshot.title,
        meta_description: snapshot.meta_description,
        meta_keywords: snapshot.meta_keywords,
        social_tags: snapshot.social_tags,
        headings: snapshot.headings,
        social_links,
        pricing_signals: pricing_tokens(&snapshot.text),
        contact_phones: phone_tokens(&snapshot.text),
        contact_emails: email_tokens(&snapshot.text),
        blog_topics,
        content_categories,
        post_count,
        // Traffic/ad/backlink estimates come from the auxiliary metrics
        // providers, not from the page itself.
        estimated_monthly_traffic: 0,
        estimated_ad_spend: 0,
        backlink_estimate: 0,
    }
}

/// Outbound links pointing at known social platforms, deduplicated and
/// capped at 20.
pub fn social_links(links: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for link in links {
        let lower = link.to_lowercase();
        if SOCIAL_DOMAINS.iter().any(|d| lower.contains(d)) && seen.insert(lower) {
            out.push(link.clone());
            if out.len() >= 20 {
                break;
            }
        }
    }
    out
}

/// Visible currency-denominated tokens, e.g. "$99", "$1,200.50", "€75".
pub fn pricing_tokens(text: &str) -> Vec<String> {
    let price_re = regex::Regex::new(r"[$€£]\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?").expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for m in price_re.find_iter(text) {
        let token = m.as_str().trim().to_string();
        if seen.insert(token.clone()) {
            out.push(token);
            if out.len() >= 20 {
                break;
            }
        }
    }
    out
}

/// North-American phone tokens in the visible text.
pub fn phone_tokens(text: &str) -> Vec<String> {
    let phone_re = regex::Regex::new(r"(?:\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}")
        .expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for m in phone_re.find_iter(text) {
        let token = m.as_str().trim().to_string();
        if seen.insert(token.clone()) {
            out.push(token);
            if out.len() >= 10 {
                break;
            }
        }
    }
    out
}

/// E-mail tokens in the visible text.
pub fn email_tokens(text: &str) -> Vec<String> {
    let email_re = regex::Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("valid regex");
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for m in email_re.find_iter(text) {
        let token = m.as_str().to_lowercase();
        if seen.insert(token.clone()) {
            out.push(token);
            if out.len() >= 10 {
                break;
            }
        }
    }
    out
}

/// Blog-ish headings, used as topic signals.
pub fn blog_topics(headings: &[String]) -> Vec<String> {
    headings
        .iter()
        .filter(|h| h.split_whitespace().count() >= 3)
        .take(10)
        .cloned()
        .collect()
}

/// Count of links that look like individual posts or articles.
pub fn blog_post_count(links: &[String]) -> u32 {
    links
        .iter()
        .filter(|l| {
            let lower = l.to_lowercase();
            lower.contains("/blog/")
                || lower.contains("/post/")
                || lower.contains("/article")
                || lower.contains("/news/")
        })
        .count() as u32
}

/// Map headings and meta keywords onto canonical service categories.
pub fn content_categories(headings: &[String], meta_keywords: &str) -> Vec<String> {
    let haystack: String = headings
        .iter()
        .map(|h| h.to_lowercase())
        .chain(std::iter::once(meta_keywords.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out: Vec<String> = Vec::new();
    for (keyword, category) in CATEGORY_KEYWORDS {
        if haystack.contains(keyword) && !out.iter().any(|c| c == category) {
            out.push((*category).to_string());
        }
    }
    if out.is_empty() {
        out.push("General".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_links_filters_and_dedupes() {
        let links = vec![
            "https://www.facebook.com/acmeplumbing".to_string(),
            "https://example.com/about".to_string(),
            "https://www.FACEBOOK.com/acmeplumbing".to_string(),
            "https://www.instagram.com/acmeplumbing".to_string(),
        ];
        let social = social_links(&links);
        assert_eq!(social.len(), 2);
        assert!(social[0].contains("facebook.com"));
        assert!(social[1].contains("instagram.com"));
    }

    #[test]
    fn pricing_tokens_match_currency_symbols() {
        let text = "Drain cleaning from $99. Premium plan $1,299.00 per year. Call now! \
                    Unrelated numbers: 2024, 555-1234. Euro price €75 available.";
        let tokens = pricing_tokens(text);
        assert_eq!(tokens, vec!["$99", "$1,299.00", "€75"]);
    }

    #[test]
    fn contact_tokens_found_in_text() {
        let text = "Call (612) 555-0137 or email service@acmeplumbing.com today. \
                    Also reachable at 612-555-0137.";
        let phones = phone_tokens(text);
        let emails = email_tokens(text);
        assert_eq!(phones.len(), 2);
        assert_eq!(emails, vec!["service@acmeplumbing.com"]);
    }

    #[test]
    fn content_categories_default_to_general() {
        let headings = vec!["Welcome".to_string()];
        assert_eq!(content_categories(&headings, ""), vec!["General"]);

        let headings = vec![
            "Emergency Plumbing".to_string(),
            "Water Heater Installation".to_string(),
        ];
        let categories = content_categories(&headings, "");
        assert!(categories.contains(&"Emergency".to_string()));
        assert!(categories.contains(&"Installation".to_string()));
    }

    #[test]
    fn blog_post_count_matches_post_like_paths() {
        let links = vec![
            "https://example.com/blog/winter-pipes".to_string(),
            "https://example.com/blog/frozen-drains".to_string(),
            "https://example.com/services".to_string(),
            "https://example.com/news/opening".to_string(),
        ];
        assert_eq!(blog_post_count(&links), 3);
    }
}
