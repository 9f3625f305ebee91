//! BoardGameGeek XML API2 client.

use super::{titles_match, Candidate, GameLookup, LookupError};
use crate::catalog::GameRecord;
use async_trait::async_trait;
use quick_xml::{events::Event, Reader};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";

pub struct BggClient {
    client: reqwest::Client,
    base_url: String,
}

impl BggClient {
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    async fn get_xml(&self, url: &str) -> Result<String, LookupError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::Connection(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Api {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|err| LookupError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl GameLookup for BggClient {
    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError> {
        let url = format!(
            "{}/search?query={}&type=boardgame",
            self.base_url,
            urlencoding::encode(title)
        );
        let xml = self.get_xml(&url).await?;
        let candidates = parse_search_response(&xml)?;
        Ok(candidates
            .into_iter()
            .filter(|c| titles_match(title, &c.title))
            .collect())
    }

    async fn details(&self, id: &str) -> Result<Option<GameRecord>, LookupError> {
        let url = format!(
            "{}/thing?id={}&stats=1",
            self.base_url,
            urlencoding::encode(id)
        );
        let xml = self.get_xml(&url).await?;
        parse_thing_response(&xml)
    }
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            if let Ok(value) = attr.unescape_value() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn attr_num<T: std::str::FromStr>(e: &quick_xml::events::BytesStart<'_>) -> Option<T> {
    attr_value(e, b"value").and_then(|v| v.parse().ok())
}

fn parse_search_response(xml: &str) -> Result<Vec<Candidate>, LookupError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut out = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_title: Option<String> = None;
    let mut current_year: Option<i32> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"item" => {
                    current_id = attr_value(&e, b"id");
                    current_title = None;
                    current_year = None;
                }
                b"name" => {
                    if let Some(value) = attr_value(&e, b"value") {
                        // the primary name wins, any name is a fallback
                        if attr_value(&e, b"type").as_deref() == Some("primary") {
                            current_title = Some(value);
                        } else if current_title.is_none() {
                            current_title = Some(value);
                        }
                    }
                }
                b"yearpublished" => {
                    current_year = attr_num(&e);
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let (Some(id), Some(title)) = (current_id.take(), current_title.take()) {
                        out.push(Candidate {
                            id,
                            title,
                            year: current_year.take(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(LookupError::InvalidResponse(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn parse_thing_response(xml: &str) -> Result<Option<GameRecord>, LookupError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut found_item = false;
    let mut id = String::new();
    let mut title: Option<String> = None;
    let mut publishers: Vec<String> = Vec::new();
    let mut designers: Vec<String> = Vec::new();
    let mut mechanics: Vec<String> = Vec::new();
    let mut is_expansion = false;
    let mut min_players: Option<u32> = None;
    let mut max_players: Option<u32> = None;
    let mut min_playtime: Option<u32> = None;
    let mut max_playtime: Option<u32> = None;
    let mut weight: Option<f64> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"item" if !found_item => {
                    found_item = true;
                    id = attr_value(&e, b"id").unwrap_or_default();
                }
                b"name" => {
                    if let Some(value) = attr_value(&e, b"value") {
                        if attr_value(&e, b"type").as_deref() == Some("primary") {
                            title = Some(value);
                        } else if title.is_none() {
                            title = Some(value);
                        }
                    }
                }
                b"link" => {
                    if let (Some(link_type), Some(value)) =
                        (attr_value(&e, b"type"), attr_value(&e, b"value"))
                    {
                        match link_type.as_str() {
                            "boardgamepublisher" => publishers.push(value),
                            "boardgamedesigner" => designers.push(value),
                            "boardgamemechanic" => mechanics.push(value),
                            "boardgamecategory" => {
                                if value.to_lowercase().contains("expansion") {
                                    is_expansion = true;
                                }
                            }
                            _ => {}
                        }
                    }
                }
                b"minplayers" => min_players = attr_num(&e),
                b"maxplayers" => max_players = attr_num(&e),
                b"minplaytime" => min_playtime = attr_num(&e),
                b"maxplaytime" => max_playtime = attr_num(&e),
                b"averageweight" => weight = attr_num(&e),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(LookupError::InvalidResponse(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !found_item {
        return Ok(None);
    }

    Ok(Some(GameRecord {
        id,
        title: title.unwrap_or_default(),
        min_players,
        max_players,
        publisher: join_limited(&publishers, Some(2)),
        designer: join_limited(&designers, Some(2)),
        weight,
        min_playtime,
        max_playtime,
        mechanics: join_limited(&mechanics, None),
        is_expansion,
        notes: String::new(),
    }))
}

fn join_limited(values: &[String], limit: Option<usize>) -> String {
    let take = limit.unwrap_or(values.len());
    values
        .iter()
        .take(take)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
