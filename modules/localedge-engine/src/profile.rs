use localedge_common::{
    CompetitorProfile, CompetitorTarget, ContentTier, ExtractionPayload, ExtractionResult,
    KeywordRank, Provenance,
};

use crate::fallback::FallbackProvider;

/// Every extraction starts from this; field increments build on top.
pub const SEO_BASE_SCORE: u32 = 50;

/// SEO completeness: base plus a fixed increment per present field,
/// capped at 100. Total over any payload, including the all-default one.
pub fn seo_completeness_score(payload: &ExtractionPayload) -> u32 {
    let mut score = SEO_BASE_SCORE;
    if !payload.title.is_empty() {
        score += 10;
    }
    if !payload.meta_description.is_empty() {
        score += 10;
    }
    if !payload.meta_keywords.is_empty() {
        score += 5;
    }
    score += payload.social_tags.len() as u32 * 5;
    if !payload.headings.is_empty() {
        score += 10;
    }
    score.min(100)
}

/// Posting-volume tier from the observed post count.
pub fn content_tier(post_count: u32) -> ContentTier {
    if post_count > 100 {
        ContentTier::High
    } else if post_count > 50 {
        ContentTier::Medium
    } else if post_count > 20 {
        ContentTier::Low
    } else {
        ContentTier::VeryLow
    }
}

/// Composite rank score: linear decay `max(0, 100 - (rank-1)*10)` averaged
/// over keywords with a positive rank. A competitor ranked for nothing
/// scores 0.
pub fn composite_rank_score(ranks: &[KeywordRank]) -> f64 {
    let ranked: Vec<&KeywordRank> = ranks.iter().filter(|r| r.rank > 0).collect();
    if ranked.is_empty() {
        return 0.0;
    }
    let sum: f64 = ranked
        .iter()
        .map(|r| (100.0 - (r.rank as f64 - 1.0) * 10.0).max(0.0))
        .sum();
    sum / ranked.len() as f64
}

/// Brand strength: presence-weighted sum over identity signals, capped
/// at 100.
pub fn brand_strength(payload: &ExtractionPayload) -> u32 {
    let mut score = 20u32;
    score += (distinct_social_platforms(payload).len() as u32).min(5) * 10;
    if !payload.social_tags.is_empty() {
        score += 10;
    }
    if !payload.contact_phones.is_empty() || !payload.contact_emails.is_empty() {
        score += 10;
    }
    if !payload.title.is_empty() {
        score += 10;
    }
    score.min(100)
}

/// Innovation score: content activity and transparency signals, capped
/// at 100.
pub fn innovation_score(payload: &ExtractionPayload) -> u32 {
    let mut score = 25u32;
    score += (payload.blog_topics.len() as u32).min(5) * 5;
    if !payload.pricing_signals.is_empty() {
        score += 15;
    }
    score += (payload.content_categories.len() as u32).min(4) * 5;
    if payload.post_count > 50 {
        score += 15;
    }
    score.min(100)
}

/// Platform names present in the payload's social links.
pub fn distinct_social_platforms(payload: &ExtractionPayload) -> Vec<String> {
    const PLATFORMS: &[(&str, &str)] = &[
        ("facebook.com", "Facebook"),
        ("instagram.com", "Instagram"),
        ("twitter.com", "Twitter/X"),
        ("x.com", "Twitter/X"),
        ("linkedin.com", "LinkedIn"),
        ("youtube.com", "YouTube"),
        ("tiktok.com", "TikTok"),
        ("pinterest.com", "Pinterest"),
    ];
    let mut out: Vec<String> = Vec::new();
    for link in &payload.social_links {
        let lower = link.to_lowercase();
        for (domain, name) in PLATFORMS {
            if lower.contains(domain) && !out.iter().any(|p| p == name) {
                out.push((*name).to_string());
            }
        }
    }
    out
}

/// Display name for a competitor: the registrable host, stripped of
/// "www.", or "Unknown" when the URL does not parse.
pub fn display_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Build one profile from a tagged extraction plus auxiliary ranks.
///
/// Failed extractions score against the neutral fallback payload, so the
/// profile is structurally complete either way and the batch's profile
/// list always lines up positionally with its target list.
pub fn build_profile(
    target: &CompetitorTarget,
    result: &ExtractionResult,
    ranks: &[KeywordRank],
) -> CompetitorProfile {
    let neutral;
    let (payload, provenance) = match result {
        ExtractionResult::Ok { payload } => (payload, Provenance::Live),
        ExtractionResult::Fallback { payload } => (payload, Provenance::Fallback),
        ExtractionResult::Failed { .. } => {
            neutral = FallbackProvider::neutral_payload();
            (&neutral, Provenance::Fallback)
        }
    };

    let tier = content_tier(payload.post_count);
    let mut content_categories = payload.content_categories.clone();
    if content_categories.is_empty() {
        content_categories.push("General".to_string());
    }

    CompetitorProfile {
        name: display_name(&target.url),
        url: target.url.clone(),
        provenance,
        seo_score: seo_completeness_score(payload),
        content_tier: tier,
        posting_cadence: tier.cadence().to_string(),
        brand_strength: brand_strength(payload),
        innovation_score: innovation_score(payload),
        composite_rank_score: composite_rank_score(ranks),
        content_categories,
        social_presence: distinct_social_platforms(payload),
        pricing_signals: payload.pricing_signals.clone(),
    }
}

/// Build the full profile list for a batch, zipped positionally.
/// `ranks_by_target` may be shorter than the target list; missing rows
/// count as unranked.
pub fn build_profiles(
    targets: &[CompetitorTarget],
    results: &[ExtractionResult],
    ranks_by_target: &[Vec<KeywordRank>],
) -> Vec<CompetitorProfile> {
    targets
        .iter()
        .zip(results.iter())
        .enumerate()
        .map(|(index, (target, result))| {
            let ranks = ranks_by_target.get(index).map(Vec::as_slice).unwrap_or(&[]);
            build_profile(target, result, ranks)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use localedge_common::FailureReason;

    fn target(url: &str) -> CompetitorTarget {
        CompetitorTarget {
            url: url.to_string(),
            industry: "plumbing".to_string(),
        }
    }

    fn rich_payload() -> ExtractionPayload {
        let mut payload = ExtractionPayload {
            title: "Acme Plumbing | Minneapolis".into(),
            meta_description: "Full-service plumbing".into(),
            meta_keywords: "plumber, drains".into(),
            headings: vec!["Emergency Service".into(), "Water Heater Repair".into()],
            social_links: vec![
                "https://facebook.com/acme".into(),
                "https://instagram.com/acme".into(),
            ],
            pricing_signals: vec!["$99".into()],
            contact_phones: vec!["(612) 555-0137".into()],
            content_categories: vec!["Emergency".into(), "Repair".into()],
            post_count: 60,
            ..Default::default()
        };
        payload
            .social_tags
            .insert("og:title".into(), "Acme Plumbing".into());
        payload
            .social_tags
            .insert("og:image".into(), "https://acme.example/logo.png".into());
        payload
    }

    #[test]
    fn seo_score_stays_within_bounds() {
        assert_eq!(seo_completeness_score(&ExtractionPayload::default()), 50);

        // title 10 + description 10 + keywords 5 + 2 social tags 10 + headings 10
        assert_eq!(seo_completeness_score(&rich_payload()), 95);

        // Many social tags cannot push past the cap.
        let mut crowded = rich_payload();
        for i in 0..20 {
            crowded
                .social_tags
                .insert(format!("og:extra{i}"), "x".into());
        }
        assert_eq!(seo_completeness_score(&crowded), 100);
    }

    #[test]
    fn content_tier_thresholds() {
        assert_eq!(content_tier(150), ContentTier::High);
        assert_eq!(content_tier(101), ContentTier::High);
        assert_eq!(content_tier(100), ContentTier::Medium);
        assert_eq!(content_tier(51), ContentTier::Medium);
        assert_eq!(content_tier(21), ContentTier::Low);
        assert_eq!(content_tier(20), ContentTier::VeryLow);
        assert_eq!(content_tier(0), ContentTier::VeryLow);
    }

    #[test]
    fn composite_rank_score_averages_ranked_keywords_only() {
        let ranks = vec![
            KeywordRank { keyword: "a".into(), rank: 1 },  // 100
            KeywordRank { keyword: "b".into(), rank: 3 },  // 80
            KeywordRank { keyword: "c".into(), rank: 0 },  // unranked, excluded
            KeywordRank { keyword: "d".into(), rank: 25 }, // decays past 0 -> 0
        ];
        let score = composite_rank_score(&ranks);
        assert!((score - 60.0).abs() < f64::EPSILON);

        assert_eq!(composite_rank_score(&[]), 0.0);
        assert_eq!(
            composite_rank_score(&[KeywordRank { keyword: "x".into(), rank: 0 }]),
            0.0
        );
    }

    #[test]
    fn failed_extraction_builds_fallback_profile() {
        let result = ExtractionResult::Failed {
            reason: FailureReason::NavigationTimeout,
            detail: "30s elapsed".into(),
        };
        let profile = build_profile(&target("https://www.slowsite.com"), &result, &[]);

        assert_eq!(profile.name, "slowsite.com");
        assert_eq!(profile.provenance, Provenance::Fallback);
        assert_eq!(profile.seo_score, SEO_BASE_SCORE);
        assert_eq!(profile.content_categories, vec!["General"]);
        assert_eq!(profile.composite_rank_score, 0.0);
        assert_eq!(profile.content_tier, ContentTier::VeryLow);
    }

    #[test]
    fn scores_are_deterministic_for_identical_payloads() {
        let result = ExtractionResult::Ok {
            payload: rich_payload(),
        };
        let ranks = vec![KeywordRank { keyword: "plumber".into(), rank: 2 }];
        let first = build_profile(&target("https://acme.example"), &result, &ranks);
        let second = build_profile(&target("https://acme.example"), &result, &ranks);

        assert_eq!(first.seo_score, second.seo_score);
        assert_eq!(first.brand_strength, second.brand_strength);
        assert_eq!(first.innovation_score, second.innovation_score);
        assert_eq!(first.composite_rank_score, second.composite_rank_score);
    }

    #[test]
    fn display_name_handles_bad_urls() {
        assert_eq!(display_name("https://www.acme.example/about"), "acme.example");
        assert_eq!(display_name("not a url"), "Unknown");
    }
}
