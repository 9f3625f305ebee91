//! Catalog search/filter engine.
//!
//! Pure functions from a catalog snapshot and a set of criteria to a
//! filtered, optionally sorted view. Criteria arrive as raw form-style
//! strings; an empty string means the criterion is absent, and every
//! supplied criterion must hold (conjunctive semantics).

use crate::catalog::GameRecord;
use serde::Deserialize;

/// Inclusive window around the target for the weight criterion.
pub const WEIGHT_TOLERANCE: f64 = 0.3;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub title: String,
    pub publisher: String,
    pub designer: String,
    pub mechanics: String,
    pub notes: String,
    /// Player count the game must accommodate.
    pub players: String,
    /// Playtime in minutes the game must accommodate.
    pub playtime: String,
    /// Target complexity; matches within +/- [`WEIGHT_TOLERANCE`].
    pub weight: String,
    /// "Yes" or "No", compared case-insensitively.
    pub expansion: String,
    pub sort: Option<SortKey>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Weight,
    Designer,
    Publisher,
    Notes,
}

impl SortKey {
    /// Query-parameter form; unknown values are ignored by the caller.
    pub fn parse(s: &str) -> Option<SortKey> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "weight" => Some(SortKey::Weight),
            "designer" => Some(SortKey::Designer),
            "publisher" => Some(SortKey::Publisher),
            "notes" => Some(SortKey::Notes),
            _ => None,
        }
    }
}

/// Records satisfying every supplied criterion, in catalog order unless a
/// sort key is given. Never mutates the input.
pub fn filter(games: &[GameRecord], criteria: &SearchCriteria) -> Vec<GameRecord> {
    let mut results: Vec<GameRecord> = games
        .iter()
        .filter(|game| matches(game, criteria))
        .cloned()
        .collect();
    if let Some(key) = criteria.sort {
        sort_games(&mut results, key);
    }
    results
}

/// Ascending stable sort; case-insensitive for text fields, numeric for
/// weight with missing values sorting as zero.
pub fn sort_games(games: &mut [GameRecord], key: SortKey) {
    match key {
        SortKey::Title => sort_by_text(games, |g| &g.title),
        SortKey::Designer => sort_by_text(games, |g| &g.designer),
        SortKey::Publisher => sort_by_text(games, |g| &g.publisher),
        SortKey::Notes => sort_by_text(games, |g| &g.notes),
        SortKey::Weight => games.sort_by(|a, b| {
            let wa = a.weight.unwrap_or(0.0);
            let wb = b.weight.unwrap_or(0.0);
            wa.partial_cmp(&wb).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

fn sort_by_text(games: &mut [GameRecord], field: fn(&GameRecord) -> &str) {
    games.sort_by(|a, b| field(a).to_lowercase().cmp(&field(b).to_lowercase()));
}

fn matches(game: &GameRecord, criteria: &SearchCriteria) -> bool {
    if !contains_fold(&game.title, &criteria.title) {
        return false;
    }
    if !contains_fold(&game.publisher, &criteria.publisher) {
        return false;
    }
    if !contains_fold(&game.designer, &criteria.designer) {
        return false;
    }
    if !contains_fold(&game.mechanics, &criteria.mechanics) {
        return false;
    }
    if !contains_fold(&game.notes, &criteria.notes) {
        return false;
    }

    // Non-numeric input fails the criterion outright, it is not ignored.
    if !criteria.players.trim().is_empty() {
        match criteria.players.trim().parse::<i64>() {
            Ok(n) => {
                if !in_range(n, game.min_players, game.max_players) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }

    if !criteria.playtime.trim().is_empty() {
        match criteria.playtime.trim().parse::<i64>() {
            Ok(n) => {
                if !in_range(n, game.min_playtime, game.max_playtime) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }

    if !criteria.weight.trim().is_empty() {
        let target = match criteria.weight.trim().parse::<f64>() {
            Ok(t) => t,
            Err(_) => return false,
        };
        let Some(weight) = game.weight else {
            return false;
        };
        // additive window, so target 2.7 accepts weight 3.0
        if !(target - WEIGHT_TOLERANCE <= weight && weight <= target + WEIGHT_TOLERANCE) {
            return false;
        }
    }

    let expansion = criteria.expansion.trim();
    if !expansion.is_empty() && !expansion.eq_ignore_ascii_case(game.expansion_label()) {
        return false;
    }

    true
}

/// Range containment with absent bounds treated as unbounded on that side.
fn in_range(n: i64, min: Option<u32>, max: Option<u32>) -> bool {
    if let Some(min) = min {
        if n < i64::from(min) {
            return false;
        }
    }
    if let Some(max) = max {
        if n > i64::from(max) {
            return false;
        }
    }
    true
}

fn contains_fold(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
