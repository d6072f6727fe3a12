use chrono::Local;
use tracing::{error, info};

use crate::classify::{classify, dedup_by_id};
use crate::config::Filter;
use crate::error::RunError;
use crate::models::{Endpoint, Posting};
use crate::notify::{decide, MarkerAction, Notifier, RunOutcome};
use crate::sources::PostingSource;
use crate::storage::{HistoryStore, MarkerStore};

/// One end-to-end poll cycle: fetch for every filter on both endpoints,
/// dedup, classify against history, persist new findings, then run the
/// alert state machine. Returns the number of new postings; a run-level
/// error comes back as `Err` after the notification was attempted, so the
/// process can exit non-zero for its scheduler.
pub async fn run_once<S: PostingSource, N: Notifier>(
    filters: &[Filter],
    source: &S,
    notifier: &N,
    history: &HistoryStore,
    marker: &MarkerStore,
) -> Result<usize, RunError> {
    let outcome = match cycle(filters, source, history).await {
        Ok(new) if new.is_empty() => RunOutcome::NoChange,
        Ok(new) => RunOutcome::NewItems(new),
        Err(e) => RunOutcome::Failed(e),
    };

    let previous = marker.read()?;
    let (alerts, action) = decide(&outcome, previous.as_deref());

    let mut all_sent = true;
    for alert in &alerts {
        if let Err(e) = notifier.send(&alert.subject, &alert.body).await {
            error!("failed to send notification {:?}: {e}", alert.subject);
            all_sent = false;
        }
    }

    // Advance the marker only when every alert went out, so a transient
    // mail failure cannot swallow the one alert the user gets per error.
    if all_sent {
        match action {
            MarkerAction::Set(kind) => marker.set(&kind)?,
            MarkerAction::Clear => marker.clear()?,
            MarkerAction::Keep => {}
        }
    }

    match outcome {
        RunOutcome::Failed(e) => Err(e),
        RunOutcome::NewItems(new) => Ok(new.len()),
        RunOutcome::NoChange => Ok(0),
    }
}

/// Fetch, classify and persist. Fails fast on the first fetch error; no
/// partial novelty detection happens for a failed run.
async fn cycle<S: PostingSource>(
    filters: &[Filter],
    source: &S,
    history: &HistoryStore,
) -> Result<Vec<Posting>, RunError> {
    let known = history.load()?;

    let mut fetched = Vec::new();
    for filter in filters {
        for endpoint in Endpoint::ALL {
            let postings = source.fetch(filter, endpoint.base_url()).await?;
            info!(
                "postings found on {} for {:?}: {}",
                endpoint.name(),
                filter.search,
                postings.len()
            );
            fetched.extend(postings);
        }
    }

    let new = classify(dedup_by_id(fetched), &known);
    info!("new findings: {}", new.len());

    if !new.is_empty() {
        history.append(&new, Local::now().naive_local())?;
    }
    Ok(new)
}
