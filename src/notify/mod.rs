mod email;

pub use email::EmailNotifier;

use async_trait::async_trait;

use crate::error::RunError;
use crate::models::Posting;

/// Outcome of one poll cycle, fed to the alert state machine exactly once
/// per run after all fetches completed or failed.
#[derive(Debug)]
pub enum RunOutcome {
    NewItems(Vec<Posting>),
    NoChange,
    Failed(RunError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// What to do with the persisted error marker after this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerAction {
    Set(String),
    Clear,
    Keep,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), RunError>;
}

/// The alert state machine. `previous` is the kind name of the last error
/// that was alerted, if any. Rules:
/// - a failed run alerts only when its kind differs from the marker, and
///   sets the marker to its kind;
/// - a repeat of the marked kind stays silent;
/// - a successful run with a standing marker sends a resolution alert and
///   clears the marker, then reports new items if there are any;
/// - a successful run with no marker and no new items sends nothing.
pub fn decide(outcome: &RunOutcome, previous: Option<&str>) -> (Vec<Alert>, MarkerAction) {
    match outcome {
        RunOutcome::Failed(error) => {
            if previous == Some(error.kind_name()) {
                (Vec::new(), MarkerAction::Keep)
            } else {
                (
                    vec![error_alert(error)],
                    MarkerAction::Set(error.kind_name().to_string()),
                )
            }
        }
        RunOutcome::NewItems(postings) => {
            let mut alerts = Vec::new();
            let action = if previous.is_some() {
                alerts.push(resolved_alert());
                MarkerAction::Clear
            } else {
                MarkerAction::Keep
            };
            alerts.push(new_items_alert(postings));
            (alerts, action)
        }
        RunOutcome::NoChange => {
            if previous.is_some() {
                (vec![resolved_alert()], MarkerAction::Clear)
            } else {
                (Vec::new(), MarkerAction::Keep)
            }
        }
    }
}

fn error_alert(error: &RunError) -> Alert {
    Alert {
        subject: "An error occurred".to_string(),
        body: error.to_string(),
    }
}

fn new_items_alert(postings: &[Posting]) -> Alert {
    let body = postings
        .iter()
        .map(|p| format!("{p}: {}", p.direct_url()))
        .collect::<Vec<_>>()
        .join("\n");
    Alert {
        subject: format!("{} new items", postings.len()),
        body,
    }
}

fn resolved_alert() -> Alert {
    Alert {
        subject: "Error fixed".to_string(),
        body: "Previous error fixed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostingId;
    use pretty_assertions::assert_eq;

    fn posting(id: &str) -> Posting {
        Posting {
            posting_id: PostingId(id.into()),
            pim_id: format!("pim-{id}"),
            name: format!("Item {id}"),
            posting_text: String::new(),
            price: 25.0,
            shipping_cost: 1.99,
            discount_in_percent: 10.0,
            base_url: "https://www.saturn.de/de/data/fundgrube".into(),
            outlet_id: Some("3".into()),
        }
    }

    #[test]
    fn first_error_alerts_and_sets_marker() {
        let outcome = RunOutcome::Failed(RunError::Fetch("timeout".into()));
        let (alerts, action) = decide(&outcome, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subject, "An error occurred");
        assert_eq!(action, MarkerAction::Set("FetchError".into()));
    }

    #[test]
    fn repeated_error_kind_is_suppressed() {
        let outcome = RunOutcome::Failed(RunError::Fetch("still down".into()));
        let (alerts, action) = decide(&outcome, Some("FetchError"));
        assert!(alerts.is_empty());
        assert_eq!(action, MarkerAction::Keep);
    }

    #[test]
    fn different_error_kind_alerts_again() {
        let outcome = RunOutcome::Failed(RunError::StoreCorrupt("bad row".into()));
        let (alerts, action) = decide(&outcome, Some("FetchError"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(action, MarkerAction::Set("StoreCorruptError".into()));
    }

    #[test]
    fn recovery_alerts_once_and_clears_marker() {
        let (alerts, action) = decide(&RunOutcome::NoChange, Some("FetchError"));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subject, "Error fixed");
        assert_eq!(action, MarkerAction::Clear);
    }

    #[test]
    fn quiet_run_sends_nothing() {
        let (alerts, action) = decide(&RunOutcome::NoChange, None);
        assert!(alerts.is_empty());
        assert_eq!(action, MarkerAction::Keep);
    }

    #[test]
    fn new_items_alert_lists_every_posting_with_its_url() {
        let outcome = RunOutcome::NewItems(vec![posting("A"), posting("B"), posting("C")]);
        let (alerts, action) = decide(&outcome, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].subject, "3 new items");
        assert!(alerts[0].body.contains("Item A"));
        assert!(alerts[0].body.contains("outletIds=3&text=pim-C"));
        assert_eq!(alerts[0].body.lines().count(), 3);
        assert_eq!(action, MarkerAction::Keep);
    }

    #[test]
    fn new_items_after_standing_error_resolves_first_then_reports() {
        let outcome = RunOutcome::NewItems(vec![posting("A")]);
        let (alerts, action) = decide(&outcome, Some("FetchError"));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].subject, "Error fixed");
        assert_eq!(alerts[1].subject, "1 new items");
        assert_eq!(action, MarkerAction::Clear);
    }
}
