//! Board game catalog domain model.
//!
//! The catalog is an ordered sequence of [`GameRecord`]s, most-recent-first.
//! Titles are unique case-insensitively; inserting a colliding record is a
//! no-op reported as [`AddOutcome::AlreadyPresent`].

pub mod tsv;

use serde::{Deserialize, Serialize};

/// One game in the catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Opaque identifier, assigned by the external lookup service.
    pub id: String,
    pub title: String,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    /// Up to 2 comma-joined publisher names.
    pub publisher: String,
    /// Up to 2 comma-joined designer names.
    pub designer: String,
    /// Complexity rating.
    pub weight: Option<f64>,
    pub min_playtime: Option<u32>,
    pub max_playtime: Option<u32>,
    /// Comma-joined, unbounded.
    pub mechanics: String,
    pub is_expansion: bool,
    /// Free text, user-editable only.
    pub notes: String,
}

impl GameRecord {
    /// Textual form of the expansion flag, as persisted and as matched by
    /// the expansion search criterion.
    pub fn expansion_label(&self) -> &'static str {
        if self.is_expansion {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Case-insensitive key used for title uniqueness within the catalog.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Partial update for a record's mutable fields; unset fields are left
/// untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GameRecordPatch {
    pub title: Option<String>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub publisher: Option<String>,
    pub designer: Option<String>,
    pub weight: Option<f64>,
    pub min_playtime: Option<u32>,
    pub max_playtime: Option<u32>,
    pub mechanics: Option<String>,
    pub is_expansion: Option<bool>,
    pub notes: Option<String>,
}

/// The full ordered collection of games, most-recent-first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    games: Vec<GameRecord>,
}

impl Catalog {
    pub fn new(games: Vec<GameRecord>) -> Self {
        Catalog { games }
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&GameRecord> {
        let key = title_key(title);
        self.games.iter().find(|g| title_key(&g.title) == key)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.find_by_title(title).is_some()
    }

    /// Inserts at the front unless a record with the same title (compared
    /// case-insensitively) is already present.
    pub fn add_if_absent(&mut self, record: GameRecord) -> AddOutcome {
        if self.contains_title(&record.title) {
            return AddOutcome::AlreadyPresent;
        }
        self.games.insert(0, record);
        AddOutcome::Added
    }

    /// Replaces only the supplied fields on the record with the given id.
    /// Returns false when no record matches.
    pub fn update(&mut self, id: &str, patch: &GameRecordPatch) -> bool {
        let Some(game) = self.games.iter_mut().find(|g| g.id == id) else {
            return false;
        };
        if let Some(title) = &patch.title {
            game.title = title.clone();
        }
        if let Some(min_players) = patch.min_players {
            game.min_players = Some(min_players);
        }
        if let Some(max_players) = patch.max_players {
            game.max_players = Some(max_players);
        }
        if let Some(publisher) = &patch.publisher {
            game.publisher = publisher.clone();
        }
        if let Some(designer) = &patch.designer {
            game.designer = designer.clone();
        }
        if let Some(weight) = patch.weight {
            game.weight = Some(weight);
        }
        if let Some(min_playtime) = patch.min_playtime {
            game.min_playtime = Some(min_playtime);
        }
        if let Some(max_playtime) = patch.max_playtime {
            game.max_playtime = Some(max_playtime);
        }
        if let Some(mechanics) = &patch.mechanics {
            game.mechanics = mechanics.clone();
        }
        if let Some(is_expansion) = patch.is_expansion {
            game.is_expansion = is_expansion;
        }
        if let Some(notes) = &patch.notes {
            game.notes = notes.clone();
        }
        true
    }

    /// Deletes the first record whose identifier matches.
    pub fn remove(&mut self, id: &str) -> RemoveOutcome {
        match self.games.iter().position(|g| g.id == id) {
            Some(index) => {
                self.games.remove(index);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn add_if_absent_inserts_at_front() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.add_if_absent(record("1", "Catan")), AddOutcome::Added);
        assert_eq!(
            catalog.add_if_absent(record("2", "Pandemic")),
            AddOutcome::Added
        );
        assert_eq!(catalog.games()[0].title, "Pandemic");
        assert_eq!(catalog.games()[1].title, "Catan");
    }

    #[test]
    fn add_if_absent_rejects_case_insensitive_duplicate() {
        let mut catalog = Catalog::new(vec![record("1", "Catan")]);
        assert_eq!(
            catalog.add_if_absent(record("99", "CATAN")),
            AddOutcome::AlreadyPresent
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.games()[0].id, "1");
    }

    #[test]
    fn update_replaces_only_supplied_fields() {
        let mut catalog = Catalog::new(vec![GameRecord {
            id: "1".to_string(),
            title: "Catan".to_string(),
            min_players: Some(3),
            notes: "old".to_string(),
            ..Default::default()
        }]);

        let patch = GameRecordPatch {
            notes: Some("trade routes".to_string()),
            ..Default::default()
        };
        assert!(catalog.update("1", &patch));

        let game = catalog.get("1").unwrap();
        assert_eq!(game.title, "Catan");
        assert_eq!(game.min_players, Some(3));
        assert_eq!(game.notes, "trade routes");
    }

    #[test]
    fn update_unknown_id_reports_false() {
        let mut catalog = Catalog::new(vec![record("1", "Catan")]);
        assert!(!catalog.update("nope", &GameRecordPatch::default()));
    }

    #[test]
    fn remove_missing_id_leaves_catalog_unchanged() {
        let mut catalog = Catalog::new(vec![record("1", "Catan"), record("2", "Pandemic")]);
        assert_eq!(catalog.remove("77"), RemoveOutcome::NotFound);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.games()[0].title, "Catan");

        assert_eq!(catalog.remove("1"), RemoveOutcome::Removed);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.games()[0].id, "2");
    }
}
