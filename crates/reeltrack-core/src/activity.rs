use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use futures::future::join_all;
use tracing::warn;

use reeltrack_models::{ActivityDataPoint, ListKind};
use reeltrack_store::{paths, DocumentStore, IdentityProvider};

use crate::membership::{fetch_list_titles, ADDED_AT};

/// Months covered by the completion histogram, current month included.
const WINDOW_MONTHS: usize = 11;

/// Pull-based statistics over a user's list collections. Reads the store
/// directly when a statistics view opens; nothing here is triggered by
/// writes.
pub struct ActivityAggregator {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ActivityAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Completions per calendar month over a fixed window ending at the
    /// current month: exactly eleven points, chronological, zero-filled.
    /// The window is anchored to the calendar, never to the data.
    ///
    /// Documents still missing their `addedAt` stamp are excluded. A failed
    /// read degrades to an empty result.
    pub async fn monthly_completed_stats(&self) -> Vec<ActivityDataPoint> {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return Vec::new(),
        };

        let collection = paths::user_list(&user_id, ListKind::Completed.collection_name());
        let docs = match self.store.list(&collection).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "failed to read completed list for stats");
                return Vec::new();
            }
        };

        let mut counts: HashMap<String, u32> = HashMap::new();
        for doc in &docs {
            if let Some(added) = reeltrack_store::timestamp_field(doc, ADDED_AT) {
                *counts.entry(month_key(added)).or_insert(0) += 1;
            }
        }

        month_window(Utc::now())
            .into_iter()
            .map(|month| {
                let count = counts.get(&month).copied().unwrap_or(0);
                ActivityDataPoint { month, count }
            })
            .collect()
    }

    /// Total watch time across all five lists, in hours.
    ///
    /// Fans out five concurrent reads and joins them all. A failed read
    /// contributes an empty partition rather than failing the whole
    /// aggregation; minutes are summed first and rounded to hours once.
    pub async fn cumulative_watch_hours(&self) -> u64 {
        let user_id = match self.identity.current_user_id() {
            Some(id) => id,
            None => return 0,
        };

        let reads = ListKind::ALL
            .into_iter()
            .map(|list| fetch_list_titles(self.store.as_ref(), &user_id, list));

        let total_minutes: u64 = join_all(reads)
            .await
            .into_iter()
            .flatten()
            .map(|title| u64::from(title.runtime_minutes.unwrap_or(0)))
            .sum();

        (total_minutes as f64 / 60.0).round() as u64
    }
}

fn month_key(ts: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}

/// The `WINDOW_MONTHS` consecutive `YYYY-MM` keys ending at `now`'s month.
fn month_window(now: DateTime<Utc>) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month() as i32 - (WINDOW_MONTHS as i32 - 1);
    while month < 1 {
        month += 12;
        year -= 1;
    }

    let mut months = Vec::with_capacity(WINDOW_MONTHS);
    for _ in 0..WINDOW_MONTHS {
        months.push(format!("{:04}-{:02}", year, month));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}
