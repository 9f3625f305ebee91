//! TSV codec for the persisted catalog file.
//!
//! A header row followed by one row per record, tab-separated, fixed column
//! order. Round-trips losslessly for well-formed fields (no embedded tabs or
//! newlines). Malformed rows and unparseable numeric cells are tolerated on
//! load rather than failing the whole file.

use super::{Catalog, GameRecord};
use anyhow::{anyhow, Context, Result};

const HEADER: [&str; 12] = [
    "ID",
    "Title",
    "MinPlayers",
    "MaxPlayers",
    "Publisher",
    "Designer",
    "Weight",
    "MinPlaytime",
    "MaxPlaytime",
    "Mechanics",
    "IsExpansion",
    "Notes",
];

pub fn parse(content: &str) -> Result<Catalog> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut games = Vec::new();
    for result in reader.records() {
        let row = match result {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("Skipping malformed catalog row: {err}");
                continue;
            }
        };

        let get = |i: usize| row.get(i).unwrap_or("").to_string();
        games.push(GameRecord {
            id: get(0),
            title: get(1),
            min_players: parse_num(row.get(2)),
            max_players: parse_num(row.get(3)),
            publisher: get(4),
            designer: get(5),
            weight: parse_num(row.get(6)),
            min_playtime: parse_num(row.get(7)),
            max_playtime: parse_num(row.get(8)),
            mechanics: get(9),
            is_expansion: row
                .get(10)
                .map(|v| v.trim().eq_ignore_ascii_case("yes"))
                .unwrap_or(false),
            notes: get(11),
        });
    }
    Ok(Catalog::new(games))
}

pub fn serialize(catalog: &Catalog) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .context("Failed to write catalog header")?;
    for game in catalog.games() {
        writer
            .write_record([
                game.id.clone(),
                game.title.clone(),
                opt_string(game.min_players),
                opt_string(game.max_players),
                game.publisher.clone(),
                game.designer.clone(),
                opt_string(game.weight),
                opt_string(game.min_playtime),
                opt_string(game.max_playtime),
                game.mechanics.clone(),
                game.expansion_label().to_string(),
                game.notes.clone(),
            ])
            .with_context(|| format!("Failed to write catalog row for {}", game.id))?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("Failed to flush catalog rows: {err}"))
}

fn parse_num<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

fn opt_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
