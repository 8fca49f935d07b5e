//! Backfill runner
//!
//! One strictly sequential pass: count, conditionally update, re-count,
//! sample. The only write is a single set-based update, so a failure before
//! it leaves the collection untouched and a failure after it leaves the
//! backfill fully applied.

use opo_common::Result;
use opo_mongodb::{TopicRecord, TopicStore, TopicType, UpdateSummary};
use std::future::Future;
use std::io::Write;
use tracing::{info, warn};

use crate::config::{ConfigSources, Settings};
use crate::report::{Report, TypeStats};

/// Classification given to records that have none
pub const BACKFILL_TYPE: TopicType = TopicType::Topic;

/// Records shown after the update
pub const SAMPLE_LIMIT: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum BackfillOutcome {
    /// Every record already had a classification; nothing was written
    AlreadyMigrated,
    Backfilled {
        update: UpdateSummary,
        stats: TypeStats,
        samples: Vec<TopicRecord>,
    },
}

impl BackfillOutcome {
    /// Number of records the run modified
    pub fn modified_count(&self) -> u64 {
        match self {
            BackfillOutcome::AlreadyMigrated => 0,
            BackfillOutcome::Backfilled { update, .. } => update.modified_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackfillRunner {
    sample_limit: i64,
}

impl Default for BackfillRunner {
    fn default() -> Self {
        Self {
            sample_limit: SAMPLE_LIMIT,
        }
    }
}

impl BackfillRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the backfill against an open store. Does not close it.
    pub async fn run<S, W>(&self, store: &S, report: &mut Report<W>) -> Result<BackfillOutcome>
    where
        S: TopicStore + ?Sized,
        W: Write,
    {
        let missing = store.count_missing_type().await?;
        info!(missing, "Counted topics without a type");
        report.missing_count(missing)?;

        if missing == 0 {
            report.already_migrated()?;
            return Ok(BackfillOutcome::AlreadyMigrated);
        }

        let update = store.backfill_missing_type(BACKFILL_TYPE).await?;
        info!(
            matched = update.matched_count,
            modified = update.modified_count,
            "Backfilled topic type"
        );
        if update.matched_count != missing {
            // Concurrent writers changed the collection between count and update
            warn!(
                counted = missing,
                matched = update.matched_count,
                "Matched count differs from the initial count"
            );
        }
        report.update_summary(&update)?;

        let stats = self.collect_stats(store).await?;
        report.final_stats(&stats)?;

        let samples = store
            .sample_by_type(BACKFILL_TYPE, self.sample_limit)
            .await?;
        report.samples(&samples)?;
        report.closing_note(BACKFILL_TYPE)?;

        Ok(BackfillOutcome::Backfilled {
            update,
            stats,
            samples,
        })
    }

    async fn collect_stats<S>(&self, store: &S) -> Result<TypeStats>
    where
        S: TopicStore + ?Sized,
    {
        let mut stats = TypeStats {
            total: store.count_all().await?,
            ..TypeStats::default()
        };
        for kind in TopicType::ALL {
            stats.set(kind, store.count_by_type(kind).await?);
        }
        Ok(stats)
    }
}

/// Resolve settings, connect, run the backfill, and always close the store.
///
/// `connect` is only called once settings resolved, so a configuration error
/// never reaches the network.
pub async fn execute<S, F, Fut, W>(
    sources: &ConfigSources,
    connect: F,
    report: &mut Report<W>,
) -> Result<BackfillOutcome>
where
    S: TopicStore,
    F: FnOnce(Settings) -> Fut,
    Fut: Future<Output = Result<S>>,
    W: Write,
{
    let settings = Settings::resolve(sources)?;
    info!(
        source = %settings.url_source,
        database = %settings.database_name,
        collection = %settings.collection_name,
        "Resolved connection settings"
    );

    report.connecting(&settings.database_name)?;
    let mut store = connect(settings).await?;

    // From here on every path must reach `close`
    let outcome = match report.connected() {
        Ok(()) => BackfillRunner::new().run(&store, report).await,
        Err(e) => Err(e),
    };

    let closed = store.close().await;
    let reported = report.connection_closed();

    let outcome = outcome?;
    closed?;
    reported?;
    Ok(outcome)
}
