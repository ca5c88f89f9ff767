//! `jobpacker search`: merge CLI overrides with saved defaults, harvest, show
//! the results, and remember them for a later export.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::Args;
use jobpacker_core::preferences::parse_board_list;
use jobpacker_core::{AppConfig, JobType, LastRun, Preferences, SearchQuery, SessionStore};
use jobpacker_export::{default_filename, write_export};
use jobpacker_harvest::{registry_from_config, HarvestError, HarvestOptions, Harvester};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::render;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search keywords (defaults to the saved `default_search`)
    #[arg(long, short)]
    pub keywords: Option<String>,
    /// Location (defaults to the saved `default_location`)
    #[arg(long, short)]
    pub location: Option<String>,
    /// Comma-separated boards, or `all`
    #[arg(long)]
    pub sources: Option<String>,
    /// Results requested from each board (1-100)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Only remote listings
    #[arg(long)]
    pub remote: bool,
    /// fulltime, parttime, contract, internship, or any
    #[arg(long)]
    pub job_type: Option<String>,
    /// Also export the results; takes an optional output path
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pub export: Option<Option<PathBuf>>,
}

/// Saved defaults with every flag the user passed applied on top.
pub(crate) fn build_query(prefs: &Preferences, args: &SearchArgs) -> anyhow::Result<SearchQuery> {
    let mut query = prefs.to_query();
    if let Some(keywords) = &args.keywords {
        query.keywords = keywords.trim().to_string();
    }
    if let Some(location) = &args.location {
        query.location = location.trim().to_string();
    }
    if let Some(sources) = &args.sources {
        query = query.with_sources(parse_board_list(sources)?);
    }
    if let Some(limit) = args.limit {
        query = query.with_results_per_source(limit);
    }
    if args.remote {
        query = query.with_remote_only(true);
    }
    if let Some(job_type) = &args.job_type {
        query = query.with_job_type(JobType::parse_filter(job_type)?);
    }
    Ok(query)
}

/// Run one harvest. Board failures are shown in the outcome table and never
/// turn into an error exit.
///
/// # Errors
///
/// Returns an error if the query is invalid, the last run cannot be saved,
/// or a requested export cannot be written.
pub(crate) async fn run_search(
    config: &AppConfig,
    store: &SessionStore,
    args: &SearchArgs,
) -> anyhow::Result<()> {
    let prefs = store.load_preferences();
    let query = build_query(&prefs, args)?;
    tracing::debug!(?query, "built search query");

    let registry = registry_from_config(config);
    if registry.is_empty() {
        eprintln!(
            "warning: no board endpoints configured; set JOBPACKER_<BOARD>_ENDPOINT (see `jobpacker boards`)"
        );
    }
    let harvester = Harvester::new(registry);
    let options = HarvestOptions::from_config(config);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    println!(
        "searching {} board(s) for \"{}\" in \"{}\"...",
        query.sources().len(),
        query.keywords,
        query.location
    );
    let outcome = harvester.harvest(&query, &options, &cancel).await;
    watcher.abort();

    let result = match outcome {
        Ok(result) => result,
        Err(HarvestError::Cancelled) => {
            println!("search cancelled");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    render::print_postings(&result.postings);
    render::print_outcomes(&result.outcomes);

    let postings = result.postings.clone();
    store
        .save_last_run(&LastRun {
            run_id: Uuid::new_v4(),
            harvested_at: Utc::now(),
            keywords: query.keywords.clone(),
            location: query.location.clone(),
            result,
        })
        .context("failed to save last run")?;

    if let Some(output) = &args.export {
        if postings.is_empty() {
            println!("no jobs to export");
            return Ok(());
        }
        let path = output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_filename(&query.keywords, &Local::now())));
        let written = write_export(&path, &postings)?;
        println!("exported {} jobs to {}", postings.len(), written.display());
    }

    Ok(())
}
