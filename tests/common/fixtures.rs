//! Test data: sample catalog records and scripted upstream fakes

use async_trait::async_trait;
use meepledex::catalog::{Catalog, GameRecord};
use meepledex::extractor::{ExtractorError, TitleExtractor};
use meepledex::lookup::{fold_title, Candidate, GameLookup, LookupError};
use std::collections::HashMap;

pub fn record(id: &str, title: &str) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

/// Three games, most-recent-first: Gloomhaven, Catan, Pandemic.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        GameRecord {
            id: super::constants::GLOOMHAVEN_ID.to_string(),
            title: "Gloomhaven".to_string(),
            min_players: Some(1),
            max_players: Some(4),
            publisher: "Cephalofair Games".to_string(),
            designer: "Isaac Childres".to_string(),
            weight: Some(3.91),
            min_playtime: Some(60),
            max_playtime: Some(120),
            mechanics: "Campaign / Battle Card Driven, Cooperative Game".to_string(),
            is_expansion: false,
            notes: String::new(),
        },
        GameRecord {
            id: super::constants::CATAN_ID.to_string(),
            title: "Catan".to_string(),
            min_players: Some(3),
            max_players: Some(4),
            publisher: "KOSMOS".to_string(),
            designer: "Klaus Teuber".to_string(),
            weight: Some(2.29),
            min_playtime: Some(60),
            max_playtime: Some(120),
            mechanics: "Dice Rolling, Trading".to_string(),
            is_expansion: false,
            notes: "well worn".to_string(),
        },
        GameRecord {
            id: super::constants::PANDEMIC_ID.to_string(),
            title: "Pandemic".to_string(),
            min_players: Some(2),
            max_players: Some(4),
            publisher: "Z-Man Games".to_string(),
            designer: "Matt Leacock".to_string(),
            weight: Some(2.4),
            min_playtime: Some(45),
            max_playtime: Some(45),
            mechanics: "Cooperative Game, Hand Management".to_string(),
            is_expansion: false,
            notes: String::new(),
        },
    ])
}

/// A buffer that `infer` recognizes as a PNG image.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ]
}

/// Scripted lookup service keyed by the folded query title.
#[derive(Default)]
pub struct FakeLookup {
    candidates: HashMap<String, Vec<Candidate>>,
    details: HashMap<String, GameRecord>,
    failing: bool,
}

impl FakeLookup {
    pub fn new() -> Self {
        FakeLookup::default()
    }

    pub fn failing() -> Self {
        FakeLookup {
            failing: true,
            ..Default::default()
        }
    }

    /// One candidate for `title`, with full details behind it.
    pub fn with_single(mut self, title: &str, details: GameRecord) -> Self {
        self.candidates.insert(
            fold_title(title),
            vec![Candidate {
                id: details.id.clone(),
                title: details.title.clone(),
                year: Some(2015),
            }],
        );
        self.details.insert(details.id.clone(), details);
        self
    }

    /// Several candidates for `title`, each resolvable to its details.
    pub fn with_ambiguous(mut self, title: &str, games: Vec<GameRecord>) -> Self {
        let candidates = games
            .iter()
            .map(|g| Candidate {
                id: g.id.clone(),
                title: g.title.clone(),
                year: None,
            })
            .collect();
        self.candidates.insert(fold_title(title), candidates);
        for game in games {
            self.details.insert(game.id.clone(), game);
        }
        self
    }
}

#[async_trait]
impl GameLookup for FakeLookup {
    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError> {
        if self.failing {
            return Err(LookupError::Connection("connection refused".to_string()));
        }
        Ok(self
            .candidates
            .get(&fold_title(title))
            .cloned()
            .unwrap_or_default())
    }

    async fn details(&self, id: &str) -> Result<Option<GameRecord>, LookupError> {
        if self.failing {
            return Err(LookupError::Connection("connection refused".to_string()));
        }
        Ok(self.details.get(id).cloned())
    }
}

/// Extractor that returns a fixed title list for any image.
#[derive(Default)]
pub struct FakeExtractor {
    titles: Vec<String>,
    failing: bool,
}

impl FakeExtractor {
    pub fn returning(titles: &[&str]) -> Self {
        FakeExtractor {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        FakeExtractor {
            titles: Vec::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl TitleExtractor for FakeExtractor {
    async fn extract_titles(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<Vec<String>, ExtractorError> {
        if self.failing {
            return Err(ExtractorError::Connection("model offline".to_string()));
        }
        Ok(self.titles.clone())
    }
}
