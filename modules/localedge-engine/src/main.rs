use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use localedge_common::{AnalysisContext, BusinessListing, CompetitorTarget, Config};
use localedge_engine::batch::BatchOrchestrator;
use localedge_engine::rankings::{self, FallbackRankProvider, HttpRankProvider, RankProvider};
use localedge_engine::{citations, profile, swot};

#[derive(Parser)]
#[command(
    name = "localedge-engine",
    about = "Competitive and local-citation intelligence engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract signals from competitor sites and synthesize a SWOT report.
    Analyze {
        #[arg(long)]
        industry: String,
        #[arg(long, default_value = "general")]
        focus: String,
        /// Keywords for rank lookups; repeatable.
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Skip browser automation and serve labeled fallback data.
        #[arg(long)]
        offline: bool,
        /// Competitor URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Submit citations to the default directory set and report gaps.
    Citations {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        zip: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        website: String,
        /// Skip browser automation; every directory reports as failed.
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("localedge_engine=info".parse()?),
        )
        .init();

    info!("LocalEdge engine starting...");

    let config = Config::from_env();
    config.log_redacted();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            industry,
            focus,
            keywords,
            offline,
            urls,
        } => {
            let targets: Vec<CompetitorTarget> = urls
                .iter()
                .map(|url| CompetitorTarget {
                    url: url.clone(),
                    industry: industry.clone(),
                })
                .collect();

            let orchestrator = if offline {
                BatchOrchestrator::offline(config.clone())
            } else {
                BatchOrchestrator::new(config.clone())
            };
            let report = orchestrator.run_extraction_batch(&targets).await?;

            let live = match (&config.rank_api_url, &config.rank_api_key) {
                (Some(url), Some(key)) => Some(HttpRankProvider::new(url, key)),
                _ => None,
            };
            let fallback = FallbackRankProvider::new(config.fallback_seed);

            let mut ranks_by_target = Vec::with_capacity(targets.len());
            for target in &targets {
                let domain = profile::display_name(&target.url);
                let ranks = rankings::ranks_with_fallback(
                    live.as_ref().map(|p| p as &dyn RankProvider),
                    &fallback,
                    &domain,
                    &keywords,
                )
                .await;
                ranks_by_target.push(ranks);
            }

            let profiles = profile::build_profiles(&targets, &report.results, &ranks_by_target);
            let context = AnalysisContext::builder()
                .industry(industry)
                .focus(focus)
                .build();
            let analysis = swot::synthesize(&profiles, &context);

            let out = serde_json::json!({
                "batch": report,
                "profiles": profiles,
                "analysis": analysis,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Citations {
            name,
            address,
            city,
            state,
            zip,
            phone,
            website,
            offline,
        } => {
            let listing = BusinessListing {
                name,
                address,
                city,
                state,
                zip,
                phone,
                website,
                ..Default::default()
            };
            let directories = citations::default_directories();

            let orchestrator = if offline {
                BatchOrchestrator::offline(config.clone())
            } else {
                BatchOrchestrator::new(config.clone())
            };
            let (report, summary) = orchestrator
                .run_citation_batch(&directories, &listing)
                .await?;
            let gaps = citations::gap_report(&directories, &report.results, &listing);

            let out = serde_json::json!({
                "batch": report,
                "summary": summary,
                "gap_report": gaps,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
