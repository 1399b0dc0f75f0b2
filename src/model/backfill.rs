use chrono::NaiveDate;
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{error, info, warn, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::{
    error::RankingError,
    model::{decay::window_start, ranking_engine::RankingEngine, structures::discipline::Discipline},
    utils::progress_utils::progress_span
};

/// Inclusive range of event dates to rebuild snapshots for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillRange {
    pub from: NaiveDate,
    pub to: NaiveDate
}

impl BackfillRange {
    /// The full 24 month lookback ending at `today`.
    pub fn lookback(today: NaiveDate) -> BackfillRange {
        BackfillRange {
            from: window_start(today),
            to: today
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Distinct event dates in the plan
    pub event_dates: usize,
    pub snapshots_written: usize,
    pub snapshots_skipped: usize,
    pub rows_written: usize,
    pub rider_errors: usize,
    pub snapshot_errors: usize
}

/// Orders the per-discipline event dates into a single oldest-first plan, so each
/// snapshot's previous positions are already stored when it is computed.
pub fn plan_backfill(event_dates: &[(Discipline, Vec<NaiveDate>)]) -> Vec<(NaiveDate, Discipline)> {
    event_dates
        .iter()
        .flat_map(|(discipline, dates)| dates.iter().map(move |date| (*date, *discipline)))
        .sorted()
        .dedup()
        .collect()
}

impl RankingEngine {
    /// Rebuilds one snapshot per discipline per event date in `range`, each computed
    /// as of its own date.
    ///
    /// Only a failed connection or missing tables fail the whole run. A snapshot
    /// that fails is logged and counted, and the run moves on to the next one.
    /// With `skip_existing`, snapshots already stored are left alone, which lets an
    /// interrupted run resume.
    pub async fn backfill(
        &mut self,
        range: BackfillRange,
        skip_existing: bool
    ) -> Result<BackfillSummary, RankingError> {
        self.check_prerequisites().await?;

        let mut event_dates = Vec::new();
        for discipline in Discipline::iter() {
            let dates = self.db().get_event_dates(discipline, range.from, range.to).await?;
            info!("{}: {} event dates between {} and {}", discipline, dates.len(), range.from, range.to);
            event_dates.push((discipline, dates));
        }

        let plan = plan_backfill(&event_dates);
        let mut summary = BackfillSummary {
            event_dates: plan.iter().map(|(date, _)| date).dedup().count(),
            ..BackfillSummary::default()
        };

        info!("Backfilling {} snapshots over {} event dates", plan.len(), summary.event_dates);

        let span = progress_span(plan.len() as u64, "Backfilling snapshots");
        self.run_plan(&plan, skip_existing, &mut summary, &span)
            .instrument(span.clone())
            .await;

        info!(
            "Backfill finished: {} written ({} rows), {} skipped, {} failed, {} riders skipped",
            summary.snapshots_written,
            summary.rows_written,
            summary.snapshots_skipped,
            summary.snapshot_errors,
            summary.rider_errors
        );

        Ok(summary)
    }

    async fn run_plan(
        &mut self,
        plan: &[(NaiveDate, Discipline)],
        skip_existing: bool,
        summary: &mut BackfillSummary,
        progress: &Span
    ) {
        let total = plan.len();

        for (i, (date, discipline)) in plan.iter().copied().enumerate() {
            progress.pb_inc(1);

            if skip_existing {
                match self.db().snapshot_exists(discipline, date).await {
                    Ok(true) => {
                        summary.snapshots_skipped += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!("[{}/{}] {} {}: {}", i + 1, total, discipline, date, e);
                        summary.snapshot_errors += 1;
                        continue;
                    }
                }
            }

            match self.rebuild_snapshot(discipline, date, date).await {
                Ok(set) => {
                    summary.snapshots_written += 1;
                    summary.rows_written += set.riders.len() + set.clubs.len();
                    summary.rider_errors += set.failures.len();

                    if !set.failures.is_empty() {
                        warn!(
                            "[{}/{}] {} {}: {} riders skipped",
                            i + 1,
                            total,
                            discipline,
                            date,
                            set.failures.len()
                        );
                    }
                    info!(
                        "[{}/{}] {} {}: {} riders, {} clubs",
                        i + 1,
                        total,
                        discipline,
                        date,
                        set.riders.len(),
                        set.clubs.len()
                    );
                }
                Err(e) => {
                    error!("[{}/{}] {} {}: {}", i + 1, total, discipline, date, e);
                    summary.snapshot_errors += 1;
                }
            }
        }
    }
}
