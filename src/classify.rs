use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

use crate::models::{Posting, PostingId};

/// Partitions fetched postings into new and known, keeping only the new
/// ones. A posting is new iff its id is absent from the loaded history.
/// Pure function; fetch order is preserved because it becomes the persisted
/// and notified order.
pub fn classify(
    fetched: Vec<Posting>,
    history: &HashMap<PostingId, NaiveDateTime>,
) -> Vec<Posting> {
    fetched
        .into_iter()
        .filter(|posting| !history.contains_key(&posting.posting_id))
        .collect()
}

/// Drops postings whose id was already seen earlier in the same run, keeping
/// the first occurrence. The same item can show up on both endpoints; only
/// one record per id may ever reach the history store.
pub fn dedup_by_id(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    postings
        .into_iter()
        .filter(|posting| seen.insert(posting.posting_id.clone()))
        .collect()
}
