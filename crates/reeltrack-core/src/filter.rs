use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use reeltrack_models::{FilterConfig, SortMode, Title};

/// Filter then sort an in-memory title collection for display.
///
/// Pure and synchronous; the store is never touched. Stage order is part of
/// the contract: genre, then minimum rating, then year range, then sort.
/// All sorts except `Random` are stable, so ties keep their input-relative
/// order.
pub fn apply(titles: &[Title], config: &FilterConfig) -> Vec<Title> {
    let wanted_genres: Option<Vec<String>> = config
        .genres
        .as_ref()
        .filter(|genres| !genres.is_empty())
        .map(|genres| genres.iter().map(|g| g.to_lowercase()).collect());

    let mut result: Vec<Title> = titles
        .iter()
        .filter(|title| match &wanted_genres {
            Some(wanted) => title
                .genres
                .as_ref()
                .map(|genres| genres.iter().any(|g| wanted.contains(&g.to_lowercase())))
                .unwrap_or(false),
            None => true,
        })
        .filter(|title| match config.min_rating {
            Some(min) => title
                .average_rating
                .map(|rating| rating as i32 >= min)
                .unwrap_or(false),
            None => true,
        })
        .filter(|title| {
            let from_ok = config
                .year_from
                .map(|from| title.start_year.map_or(false, |year| year >= from))
                .unwrap_or(true);
            let to_ok = config
                .year_to
                .map(|to| title.start_year.map_or(false, |year| year <= to))
                .unwrap_or(true);
            from_ok && to_ok
        })
        .cloned()
        .collect();

    match config.sort {
        Some(SortMode::Popularity) => {
            result.sort_by(|a, b| b.num_votes.unwrap_or(0).cmp(&a.num_votes.unwrap_or(0)));
        }
        Some(SortMode::Rating) => {
            result.sort_by(|a, b| {
                b.average_rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.average_rating.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            });
        }
        Some(SortMode::Alphabetical) => {
            result.sort_by(|a, b| {
                a.primary_title
                    .as_deref()
                    .unwrap_or("")
                    .cmp(b.primary_title.as_deref().unwrap_or(""))
            });
        }
        Some(SortMode::ReleaseDate) => {
            result.sort_by(|a, b| b.start_year.unwrap_or(0).cmp(&a.start_year.unwrap_or(0)));
        }
        Some(SortMode::Random) => shuffle(&mut result),
        None => {}
    }

    result
}

// Fisher-Yates keyed by a freshly seeded std hasher: a different order on
// every call, not reproducible, unsuitable for pagination.
fn shuffle(titles: &mut [Title]) {
    let state = RandomState::new();
    for i in (1..titles.len()).rev() {
        let mut hasher = state.build_hasher();
        i.hash(&mut hasher);
        let j = (hasher.finish() % (i as u64 + 1)) as usize;
        titles.swap(i, j);
    }
}
