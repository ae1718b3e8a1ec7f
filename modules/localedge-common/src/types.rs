use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

// --- Targets ---

/// One unit of batch work: a competitor site to extract from, or a
/// directory to submit a citation to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Competitor(CompetitorTarget),
    Directory(DirectoryDescriptor),
}

impl Target {
    /// Human-readable label used in logs and tagged results.
    pub fn label(&self) -> &str {
        match self {
            Target::Competitor(c) => &c.url,
            Target::Directory(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorTarget {
    pub url: String,
    pub industry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryDescriptor {
    pub name: String,
    pub submission_url: String,
    pub directory_type: DirectoryType,
    pub tier: PriorityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryType {
    GoogleBusinessProfile,
    Yelp,
    Facebook,
    YellowPages,
    Angi,
    Bbb,
    Other,
}

impl std::fmt::Display for DirectoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryType::GoogleBusinessProfile => write!(f, "google_business_profile"),
            DirectoryType::Yelp => write!(f, "yelp"),
            DirectoryType::Facebook => write!(f, "facebook"),
            DirectoryType::YellowPages => write!(f, "yellow_pages"),
            DirectoryType::Angi => write!(f, "angi"),
            DirectoryType::Bbb => write!(f, "bbb"),
            DirectoryType::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityTier::Critical => write!(f, "critical"),
            PriorityTier::High => write!(f, "high"),
            PriorityTier::Medium => write!(f, "medium"),
            PriorityTier::Low => write!(f, "low"),
        }
    }
}

/// NAP + web presence fields pushed into directory submission forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessListing {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub website: String,
    pub email: String,
    pub category: String,
    pub description: String,
}

/// Caller-supplied context for report synthesis.
#[derive(Debug, Clone, TypedBuilder)]
pub struct AnalysisContext {
    #[builder(setter(into))]
    pub industry: String,
    #[builder(setter(into), default = String::from("general"))]
    pub focus: String,
    #[builder(setter(into), default)]
    pub business_name: String,
}

// --- Extraction ---

/// Structured field bag pulled from one rendered competitor page.
/// Every field has a defined default so downstream aggregation never
/// branches on "missing field".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPayload {
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    /// Open Graph / social meta tags, keyed by property name.
    pub social_tags: BTreeMap<String, String>,
    pub headings: Vec<String>,
    pub social_links: Vec<String>,
    pub pricing_signals: Vec<String>,
    pub contact_phones: Vec<String>,
    pub contact_emails: Vec<String>,
    pub blog_topics: Vec<String>,
    pub content_categories: Vec<String>,
    pub post_count: u32,
    pub estimated_monthly_traffic: u64,
    pub estimated_ad_spend: u64,
    pub backlink_estimate: u64,
}

/// Outcome classification for a per-target failure. Per-target errors are
/// converted to one of these at the extractor/dispatcher boundary; they
/// never propagate to the orchestrator as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NavigationTimeout,
    NavigationFailed,
    ExtractionQueryFailed,
    SessionStartFailed,
    SubmissionFieldNotFound,
    SubmissionSubmitNotFound,
    Cancelled,
    Internal,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NavigationTimeout => write!(f, "navigation_timeout"),
            FailureReason::NavigationFailed => write!(f, "navigation_failed"),
            FailureReason::ExtractionQueryFailed => write!(f, "extraction_query_failed"),
            FailureReason::SessionStartFailed => write!(f, "session_start_failed"),
            FailureReason::SubmissionFieldNotFound => write!(f, "submission_field_not_found"),
            FailureReason::SubmissionSubmitNotFound => write!(f, "submission_submit_not_found"),
            FailureReason::Cancelled => write!(f, "cancelled"),
            FailureReason::Internal => write!(f, "internal"),
        }
    }
}

/// Tagged result of one extraction attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionResult {
    Ok { payload: ExtractionPayload },
    Fallback { payload: ExtractionPayload },
    Failed { reason: FailureReason, detail: String },
}

impl ExtractionResult {
    pub fn payload(&self) -> Option<&ExtractionPayload> {
        match self {
            ExtractionResult::Ok { payload } | ExtractionResult::Fallback { payload } => {
                Some(payload)
            }
            ExtractionResult::Failed { .. } => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ExtractionResult::Ok { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionResult::Failed { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            ExtractionResult::Failed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Whether a payload came from a live page or the fallback provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Fallback,
}

// --- Citation submission ---

/// Tagged result of one directory submission attempt. A run that filled
/// zero fields is reported as low-confidence rather than as a plain
/// success, so the summary never overstates coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionResult {
    Submitted {
        directory: String,
        fields_filled: u32,
    },
    SubmittedLowConfidence {
        directory: String,
    },
    Failed {
        directory: String,
        reason: FailureReason,
        detail: String,
    },
}

impl SubmissionResult {
    pub fn directory(&self) -> &str {
        match self {
            SubmissionResult::Submitted { directory, .. }
            | SubmissionResult::SubmittedLowConfidence { directory }
            | SubmissionResult::Failed { directory, .. } => directory,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionResult::Submitted { .. })
    }
}

/// Counts for a full citation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationRunSummary {
    pub total_directories: u32,
    pub submitted: u32,
    pub low_confidence: u32,
    pub failed: u32,
}

impl CitationRunSummary {
    pub fn from_results(results: &[SubmissionResult]) -> Self {
        let mut summary = CitationRunSummary {
            total_directories: results.len() as u32,
            ..Default::default()
        };
        for result in results {
            match result {
                SubmissionResult::Submitted { .. } => summary.submitted += 1,
                SubmissionResult::SubmittedLowConfidence { .. } => summary.low_confidence += 1,
                SubmissionResult::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

// --- Batch reporting ---

/// Results of one orchestrated batch, in submission order: `results[i]`
/// corresponds to `targets[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport<T> {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<T>,
}

// --- Aggregates ---

/// Posting-volume tier derived from observed content volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTier {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ContentTier {
    /// Label for the posting cadence the tier implies.
    pub fn cadence(&self) -> &'static str {
        match self {
            ContentTier::High => "Daily",
            ContentTier::Medium => "Weekly",
            ContentTier::Low => "Monthly",
            ContentTier::VeryLow => "Quarterly",
        }
    }
}

impl std::fmt::Display for ContentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentTier::High => write!(f, "high"),
            ContentTier::Medium => write!(f, "medium"),
            ContentTier::Low => write!(f, "low"),
            ContentTier::VeryLow => write!(f, "very_low"),
        }
    }
}

/// Per-keyword organic rank. Rank 0 means unranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRank {
    pub keyword: String,
    pub rank: u32,
}

/// Aggregate built from one competitor's extraction plus auxiliary rank
/// lookups. Every score is always set; fallback inputs produce neutral
/// defaults instead of gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    pub url: String,
    pub provenance: Provenance,
    pub seo_score: u32,
    pub content_tier: ContentTier,
    pub posting_cadence: String,
    pub brand_strength: u32,
    pub innovation_score: u32,
    pub composite_rank_score: f64,
    pub content_categories: Vec<String>,
    pub social_presence: Vec<String>,
    pub pricing_signals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub rationale: String,
    pub priority: PriorityTier,
    pub impact: ImpactLevel,
    pub effort: EffortLevel,
    pub timeline: String,
}

/// SWOT-style synthesis over a batch of competitor profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedReport {
    pub id: Uuid,
    pub industry: String,
    pub focus: String,
    pub generated_at: DateTime<Utc>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub market_gaps: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

// --- Citation gap reporting ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationStatus {
    Listed,
    LowConfidence,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationEntry {
    pub directory: String,
    pub tier: PriorityTier,
    pub status: CitationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationGap {
    pub directory: String,
    pub tier: PriorityTier,
    pub submission_url: String,
}

/// Where a business is and is not listed, with the missing directories
/// ordered by priority tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationGapReport {
    pub business_name: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<CitationEntry>,
    pub coverage_percent: f64,
    pub gaps: Vec<CitationGap>,
}
