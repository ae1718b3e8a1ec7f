use chrono::Utc;
use localedge_common::{
    BusinessListing, CitationEntry, CitationGap, CitationGapReport, CitationStatus,
    DirectoryDescriptor, DirectoryType, PriorityTier, SubmissionResult,
};

/// The canonical directory set a local business is expected to be listed
/// on, ordered by citation value.
pub fn default_directories() -> Vec<DirectoryDescriptor> {
    vec![
        DirectoryDescriptor {
            name: "Google Business Profile".into(),
            submission_url: "https://business.google.com/create".into(),
            directory_type: DirectoryType::GoogleBusinessProfile,
            tier: PriorityTier::Critical,
        },
        DirectoryDescriptor {
            name: "Yelp".into(),
            submission_url: "https://biz.yelp.com/signup".into(),
            directory_type: DirectoryType::Yelp,
            tier: PriorityTier::Critical,
        },
        DirectoryDescriptor {
            name: "Facebook".into(),
            submission_url: "https://www.facebook.com/pages/create".into(),
            directory_type: DirectoryType::Facebook,
            tier: PriorityTier::High,
        },
        DirectoryDescriptor {
            name: "Yellow Pages".into(),
            submission_url: "https://accounts.yellowpages.com/register".into(),
            directory_type: DirectoryType::YellowPages,
            tier: PriorityTier::High,
        },
        DirectoryDescriptor {
            name: "Angi".into(),
            submission_url: "https://office.angi.com/app/registration".into(),
            directory_type: DirectoryType::Angi,
            tier: PriorityTier::Medium,
        },
        DirectoryDescriptor {
            name: "Better Business Bureau".into(),
            submission_url: "https://www.bbb.org/get-listed".into(),
            directory_type: DirectoryType::Bbb,
            tier: PriorityTier::Medium,
        },
    ]
}

/// Build the citation gap report from a citation run. Positional zip:
/// `results[i]` is the outcome for `directories[i]`. Directories the run
/// failed on count as missing and land in the gap list, highest tier
/// first.
pub fn gap_report(
    directories: &[DirectoryDescriptor],
    results: &[SubmissionResult],
    listing: &BusinessListing,
) -> CitationGapReport {
    let entries: Vec<CitationEntry> = directories
        .iter()
        .zip(results.iter())
        .map(|(directory, result)| {
            let status = match result {
                SubmissionResult::Submitted { .. } => CitationStatus::Listed,
                SubmissionResult::SubmittedLowConfidence { .. } => CitationStatus::LowConfidence,
                SubmissionResult::Failed { .. } => CitationStatus::Missing,
            };
            CitationEntry {
                directory: directory.name.clone(),
                tier: directory.tier,
                status,
            }
        })
        .collect();

    let listed = entries
        .iter()
        .filter(|e| e.status == CitationStatus::Listed)
        .count();
    let coverage_percent = if entries.is_empty() {
        0.0
    } else {
        listed as f64 / entries.len() as f64 * 100.0
    };

    let mut gaps: Vec<CitationGap> = directories
        .iter()
        .zip(entries.iter())
        .filter(|(_, entry)| entry.status == CitationStatus::Missing)
        .map(|(directory, _)| CitationGap {
            directory: directory.name.clone(),
            tier: directory.tier,
            submission_url: directory.submission_url.clone(),
        })
        .collect();
    gaps.sort_by_key(|gap| gap.tier);

    CitationGapReport {
        business_name: listing.name.clone(),
        generated_at: Utc::now(),
        entries,
        coverage_percent,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localedge_common::FailureReason;

    fn listing() -> BusinessListing {
        BusinessListing {
            name: "Acme Plumbing".into(),
            ..Default::default()
        }
    }

    #[test]
    fn gap_report_orders_gaps_by_tier() {
        let directories = default_directories();
        let results: Vec<SubmissionResult> = directories
            .iter()
            .enumerate()
            .map(|(i, d)| {
                if i % 2 == 0 {
                    SubmissionResult::Failed {
                        directory: d.name.clone(),
                        reason: FailureReason::NavigationFailed,
                        detail: "connection refused".into(),
                    }
                } else {
                    SubmissionResult::Submitted {
                        directory: d.name.clone(),
                        fields_filled: 5,
                    }
                }
            })
            .collect();

        let report = gap_report(&directories, &results, &listing());
        assert_eq!(report.entries.len(), directories.len());
        assert_eq!(report.gaps.len(), 3);
        // Critical-tier gaps come first.
        assert_eq!(report.gaps[0].tier, PriorityTier::Critical);
        assert!((report.coverage_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn low_confidence_submissions_do_not_count_as_coverage() {
        let directories = default_directories();
        let results: Vec<SubmissionResult> = directories
            .iter()
            .map(|d| SubmissionResult::SubmittedLowConfidence {
                directory: d.name.clone(),
            })
            .collect();

        let report = gap_report(&directories, &results, &listing());
        assert_eq!(report.coverage_percent, 0.0);
        // Low-confidence is not a gap either; the listing may exist.
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn empty_run_yields_an_empty_but_valid_report() {
        let report = gap_report(&[], &[], &listing());
        assert_eq!(report.coverage_percent, 0.0);
        assert!(report.entries.is_empty());
        assert!(report.gaps.is_empty());
    }
}
