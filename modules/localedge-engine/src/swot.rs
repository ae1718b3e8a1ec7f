use chrono::Utc;
use localedge_common::{
    AnalysisContext, CompetitorProfile, ContentTier, EffortLevel, ImpactLevel, PriorityTier,
    Recommendation, SynthesizedReport,
};
use uuid::Uuid;

/// The service categories checked for market gaps. A category is a gap
/// when no competitor's extracted content mentions it.
pub const CANONICAL_SERVICE_CATEGORIES: &[&str] = &[
    "Residential",
    "Commercial",
    "Emergency",
    "Installation",
    "Repair",
    "Maintenance",
    "Inspection",
    "Consultation",
];

/// Competitors at or above this SEO score read as a competitive threat.
const THREAT_SEO_SCORE: u32 = 85;
/// Composite rank score at or above this reads as a search-visibility threat.
const THREAT_RANK_SCORE: f64 = 70.0;

/// Categories no competitor covers, by case-insensitive substring match
/// over each profile's content categories.
pub fn market_gaps(profiles: &[CompetitorProfile]) -> Vec<String> {
    CANONICAL_SERVICE_CATEGORIES
        .iter()
        .filter(|category| {
            let needle = category.to_lowercase();
            !profiles.iter().any(|p| {
                p.content_categories
                    .iter()
                    .any(|c| c.to_lowercase().contains(&needle))
            })
        })
        .map(|s| (*s).to_string())
        .collect()
}

/// Synthesize a SWOT-style report from competitor profiles and caller
/// context. Pure and total: sparse or empty input produces a
/// structurally complete report with explanatory placeholder lines, and
/// identical input always produces identical output.
pub fn synthesize(profiles: &[CompetitorProfile], context: &AnalysisContext) -> SynthesizedReport {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut opportunities = Vec::new();
    let mut threats = Vec::new();

    let gaps = market_gaps(profiles);

    if profiles.is_empty() {
        strengths.push("No competitor data collected; differentiation analysis unavailable".to_string());
        weaknesses.push("No competitor data collected".to_string());
        opportunities.push(format!(
            "Competitive field in {} is unmapped; early structured data collection is an advantage",
            context.industry
        ));
        threats.push("Unknown competitive pressure; rerun once targets are reachable".to_string());
    } else {
        let avg_seo = profiles.iter().map(|p| p.seo_score).sum::<u32>() / profiles.len() as u32;
        let with_social = profiles.iter().filter(|p| !p.social_presence.is_empty()).count();
        let with_pricing = profiles.iter().filter(|p| !p.pricing_signals.is_empty()).count();

        // Strengths: openings the competitor set leaves uncontested.
        if avg_seo < 65 {
            strengths.push(format!(
                "Average competitor SEO completeness is only {avg_seo}/100; strong on-page fundamentals would stand out in {}",
                context.industry
            ));
        }
        if with_social * 2 < profiles.len() {
            strengths.push(
                "Fewer than half the competitors maintain a visible social presence".to_string(),
            );
        }
        if with_pricing == 0 {
            strengths.push(
                "No competitor publishes pricing; transparent pricing is an immediate differentiator"
                    .to_string(),
            );
        }
        if strengths.is_empty() {
            strengths.push(format!(
                "Competitors in {} are strong across tracked signals; differentiation must come from service quality",
                context.industry
            ));
        }

        // Weaknesses: areas where the field is ahead.
        for profile in profiles {
            if profile.seo_score >= 80 {
                weaknesses.push(format!(
                    "{} has near-complete on-page SEO ({}/100)",
                    profile.name, profile.seo_score
                ));
            }
            if matches!(profile.content_tier, ContentTier::High | ContentTier::Medium) {
                weaknesses.push(format!(
                    "{} publishes {} content; matching that cadence takes sustained effort",
                    profile.name,
                    profile.posting_cadence.to_lowercase()
                ));
            }
        }
        if weaknesses.is_empty() {
            weaknesses.push("No tracked competitor shows a clear structural advantage".to_string());
        }

        // Opportunities: uncovered categories and unclaimed rankings.
        for gap in &gaps {
            opportunities.push(format!(
                "No competitor content covers the {gap} category"
            ));
        }
        if profiles.iter().all(|p| p.composite_rank_score == 0.0) {
            opportunities.push(
                "No competitor ranks for the tracked keywords; first-mover search visibility is available"
                    .to_string(),
            );
        }
        if opportunities.is_empty() {
            opportunities.push(format!(
                "Focus area '{}' shows no uncontested openings; compete on depth within covered categories",
                context.focus
            ));
        }

        // Threats: the strongest profiles.
        for profile in profiles {
            if profile.seo_score >= THREAT_SEO_SCORE
                || profile.composite_rank_score >= THREAT_RANK_SCORE
            {
                threats.push(format!(
                    "{} is highly visible (SEO {}/100, rank score {:.0})",
                    profile.name, profile.seo_score, profile.composite_rank_score
                ));
            }
        }
        if threats.is_empty() {
            threats.push("No single competitor dominates the tracked signals".to_string());
        }
    }

    let recommendations = recommendations(profiles, &gaps, context);

    SynthesizedReport {
        id: Uuid::new_v4(),
        industry: context.industry.clone(),
        focus: context.focus.clone(),
        generated_at: Utc::now(),
        strengths,
        weaknesses,
        opportunities,
        threats,
        market_gaps: gaps,
        recommendations,
    }
}

/// Deterministic recommendation list, capped at 7, ordered gap coverage
/// first.
fn recommendations(
    profiles: &[CompetitorProfile],
    gaps: &[String],
    context: &AnalysisContext,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for gap in gaps {
        out.push(Recommendation {
            title: format!("Cover the {gap} service category"),
            rationale: format!(
                "No tracked competitor in {} publishes content for {gap}",
                context.industry
            ),
            priority: PriorityTier::High,
            impact: ImpactLevel::High,
            effort: EffortLevel::Medium,
            timeline: "30-60 days".to_string(),
        });
    }

    if !profiles.is_empty() {
        let avg_seo = profiles.iter().map(|p| p.seo_score).sum::<u32>() / profiles.len() as u32;
        if avg_seo < 65 {
            out.push(Recommendation {
                title: "Complete on-page SEO basics".to_string(),
                rationale: format!(
                    "Average competitor SEO completeness is {avg_seo}/100; titles, descriptions and social tags close the gap quickly"
                ),
                priority: PriorityTier::High,
                impact: ImpactLevel::High,
                effort: EffortLevel::Low,
                timeline: "14 days".to_string(),
            });
        }
        if profiles
            .iter()
            .any(|p| matches!(p.content_tier, ContentTier::High | ContentTier::Medium))
        {
            out.push(Recommendation {
                title: "Establish a sustainable content cadence".to_string(),
                rationale: "At least one competitor publishes weekly or better".to_string(),
                priority: PriorityTier::Medium,
                impact: ImpactLevel::Medium,
                effort: EffortLevel::High,
                timeline: "90 days".to_string(),
            });
        }
        if profiles.iter().all(|p| p.pricing_signals.is_empty()) {
            out.push(Recommendation {
                title: "Publish transparent pricing".to_string(),
                rationale: "No competitor shows pricing on-page".to_string(),
                priority: PriorityTier::Medium,
                impact: ImpactLevel::Medium,
                effort: EffortLevel::Low,
                timeline: "14 days".to_string(),
            });
        }
    } else {
        out.push(Recommendation {
            title: "Re-run competitor collection".to_string(),
            rationale: "No competitor data was collected; the analysis above is placeholder-only"
                .to_string(),
            priority: PriorityTier::High,
            impact: ImpactLevel::High,
            effort: EffortLevel::Low,
            timeline: "7 days".to_string(),
        });
    }

    out.truncate(7);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use localedge_common::Provenance;

    fn profile(name: &str, seo: u32, categories: &[&str]) -> CompetitorProfile {
        CompetitorProfile {
            name: name.to_string(),
            url: format!("https://{name}"),
            provenance: Provenance::Live,
            seo_score: seo,
            content_tier: ContentTier::VeryLow,
            posting_cadence: "Quarterly".to_string(),
            brand_strength: 40,
            innovation_score: 40,
            composite_rank_score: 0.0,
            content_categories: categories.iter().map(|s| s.to_string()).collect(),
            social_presence: vec![],
            pricing_signals: vec![],
        }
    }

    fn context() -> AnalysisContext {
        AnalysisContext::builder().industry("plumbing").build()
    }

    #[test]
    fn gaps_flag_categories_nobody_covers() {
        let profiles = vec![
            profile("a.example", 60, &["Emergency", "Repair"]),
            profile("b.example", 55, &["Residential"]),
        ];
        let gaps = market_gaps(&profiles);
        assert!(gaps.contains(&"Commercial".to_string()));
        assert!(gaps.contains(&"Installation".to_string()));
        assert!(!gaps.contains(&"Emergency".to_string()));
        assert!(!gaps.contains(&"Residential".to_string()));
    }

    #[test]
    fn gap_matching_is_case_insensitive_substring() {
        let profiles = vec![profile("a.example", 60, &["emergency plumbing services"])];
        let gaps = market_gaps(&profiles);
        assert!(!gaps.contains(&"Emergency".to_string()));
    }

    #[test]
    fn empty_input_still_yields_a_complete_report() {
        let report = synthesize(&[], &context());
        assert!(!report.strengths.is_empty());
        assert!(!report.weaknesses.is_empty());
        assert!(!report.opportunities.is_empty());
        assert!(!report.threats.is_empty());
        assert!(!report.recommendations.is_empty());
        // Every category is a gap when nothing is covered.
        assert_eq!(report.market_gaps.len(), CANONICAL_SERVICE_CATEGORIES.len());
    }

    #[test]
    fn strong_competitors_become_threats_and_weaknesses() {
        let profiles = vec![profile("strong.example", 90, &["Repair"])];
        let report = synthesize(&profiles, &context());
        assert!(report
            .threats
            .iter()
            .any(|t| t.contains("strong.example")));
        assert!(report
            .weaknesses
            .iter()
            .any(|w| w.contains("strong.example")));
    }

    #[test]
    fn synthesis_content_is_deterministic() {
        let profiles = vec![
            profile("a.example", 60, &["Repair"]),
            profile("b.example", 70, &["Emergency"]),
        ];
        let first = synthesize(&profiles, &context());
        let second = synthesize(&profiles, &context());
        assert_eq!(first.strengths, second.strengths);
        assert_eq!(first.weaknesses, second.weaknesses);
        assert_eq!(first.opportunities, second.opportunities);
        assert_eq!(first.threats, second.threats);
        assert_eq!(first.market_gaps, second.market_gaps);
        assert_eq!(first.recommendations.len(), second.recommendations.len());
    }
}
