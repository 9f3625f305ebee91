//! Session-checkpointed disambiguation wizard.
//!
//! Turns a batch of extracted titles into confirmed catalog insertions: each
//! queued title is resolved against the lookup service, pausing exactly when
//! more than one candidate matches. Once the queue drains, every selected
//! candidate is detail-fetched into a staged batch that the caller commits
//! or discards; the catalog itself is untouched until commit.
//!
//! All state lives in a serializable value checkpointed into the session
//! between externally visible steps, never on a live execution stack.

use crate::catalog::GameRecord;
use crate::lookup::{fold_title, Candidate, GameLookup};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Flash-style status message surfaced to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// A title whose lookup produced several candidates; the wizard is parked
/// here until an explicit choice arrives. No default and no timeout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub title: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedCandidate {
    pub id: String,
    pub title: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Resolving,
    AwaitingChoice,
    Confirming,
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("no pending choice to resolve")]
    NoPendingChoice,
    #[error("candidate {0} is not among the offered candidates")]
    UnknownCandidate(String),
    #[error("the wizard is not ready to commit")]
    NotReadyToCommit,
}

/// Per-session wizard state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WizardState {
    id: String,
    pending_titles: VecDeque<String>,
    /// Folded forms of every title already popped off the queue.
    processed: Vec<String>,
    selected: Vec<SelectedCandidate>,
    awaiting: Option<PendingChoice>,
    staged: Vec<GameRecord>,
    notices: Vec<Notice>,
}

impl WizardState {
    pub fn new(titles: Vec<String>) -> Self {
        WizardState {
            id: uuid::Uuid::new_v4().to_string(),
            pending_titles: titles.into(),
            processed: Vec::new(),
            selected: Vec::new(),
            awaiting: None,
            staged: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// A wizard already parked on a known candidate list, used by the
    /// manual add flow to avoid a second search round-trip.
    pub fn parked(title: String, candidates: Vec<Candidate>) -> Self {
        let mut wizard = WizardState::new(Vec::new());
        wizard.processed.push(fold_title(&title));
        wizard.awaiting = Some(PendingChoice { title, candidates });
        wizard
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> WizardPhase {
        if self.awaiting.is_some() {
            WizardPhase::AwaitingChoice
        } else if self.pending_titles.is_empty() {
            WizardPhase::Confirming
        } else {
            WizardPhase::Resolving
        }
    }

    pub fn pending_titles(&self) -> &VecDeque<String> {
        &self.pending_titles
    }

    pub fn awaiting(&self) -> Option<&PendingChoice> {
        self.awaiting.as_ref()
    }

    pub fn selected(&self) -> &[SelectedCandidate] {
        &self.selected
    }

    pub fn staged(&self) -> &[GameRecord] {
        &self.staged
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Nothing awaited, queued, or staged; there is no step left to take.
    pub fn is_exhausted(&self) -> bool {
        self.awaiting.is_none() && self.pending_titles.is_empty() && self.staged.is_empty()
    }

    pub fn ready_to_commit(&self) -> bool {
        self.awaiting.is_none() && self.pending_titles.is_empty() && !self.staged.is_empty()
    }

    fn is_duplicate_in_flight(&self, folded: &str) -> bool {
        self.processed.iter().any(|p| p == folded)
            || self
                .selected
                .iter()
                .any(|s| fold_title(&s.title) == *folded)
    }

    /// Resolve queued titles until a choice is required or the queue drains.
    ///
    /// Zero candidates (or a lookup failure) drop the title with a warning;
    /// a single candidate is auto-selected; several candidates park the
    /// wizard. When the queue drains, selections are detail-fetched into
    /// the staged batch.
    pub async fn advance(&mut self, lookup: &dyn GameLookup) {
        while self.awaiting.is_none() {
            let Some(title) = self.pending_titles.pop_front() else {
                break;
            };

            let folded = fold_title(&title);
            if self.is_duplicate_in_flight(&folded) {
                self.notices.push(Notice::info(format!(
                    "{} is already queued in this batch",
                    title
                )));
                continue;
            }
            self.processed.push(folded);

            match lookup.search(&title).await {
                Ok(candidates) if candidates.is_empty() => {
                    self.notices.push(Notice::warning(format!(
                        "Could not find {} in the game database",
                        title
                    )));
                }
                Ok(mut candidates) if candidates.len() == 1 => {
                    let candidate = candidates.remove(0);
                    debug!(wizard = %self.id, "Auto-selected {} for {}", candidate.id, title);
                    self.selected.push(SelectedCandidate {
                        id: candidate.id,
                        title: candidate.title,
                    });
                }
                Ok(candidates) => {
                    debug!(
                        wizard = %self.id,
                        "Parking on {} ({} candidates)",
                        title,
                        candidates.len()
                    );
                    self.awaiting = Some(PendingChoice { title, candidates });
                }
                Err(err) => {
                    warn!(wizard = %self.id, "Lookup for {} failed: {}", title, err);
                    self.notices.push(Notice::warning(format!(
                        "Could not find {} in the game database",
                        title
                    )));
                }
            }
        }

        if self.awaiting.is_none()
            && self.pending_titles.is_empty()
            && self.staged.is_empty()
            && !self.selected.is_empty()
        {
            self.stage_selected(lookup).await;
        }
    }

    /// Resolve the parked choice with one of the offered candidate ids.
    pub fn choose(&mut self, candidate_id: &str) -> Result<(), WizardError> {
        let Some(choice) = self.awaiting.as_ref() else {
            return Err(WizardError::NoPendingChoice);
        };
        let Some(candidate) = choice.candidates.iter().find(|c| c.id == candidate_id) else {
            return Err(WizardError::UnknownCandidate(candidate_id.to_string()));
        };
        debug!(wizard = %self.id, "Chose {} for {}", candidate.id, choice.title);
        self.selected.push(SelectedCandidate {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
        });
        self.awaiting = None;
        Ok(())
    }

    /// Take the staged batch for commit; the caller destroys the wizard.
    pub fn take_staged(&mut self) -> Result<Vec<GameRecord>, WizardError> {
        if !self.ready_to_commit() {
            return Err(WizardError::NotReadyToCommit);
        }
        Ok(std::mem::take(&mut self.staged))
    }

    async fn stage_selected(&mut self, lookup: &dyn GameLookup) {
        for selection in &self.selected {
            if self.staged.iter().any(|r| r.id == selection.id) {
                self.notices.push(Notice::info(format!(
                    "{} is already queued in this batch",
                    selection.title
                )));
                continue;
            }
            match lookup.details(&selection.id).await {
                Ok(Some(record)) => self.staged.push(record),
                Ok(None) => self.notices.push(Notice::warning(format!(
                    "Details not found for {}",
                    selection.title
                ))),
                Err(err) => {
                    warn!(
                        wizard = %self.id,
                        "Detail fetch for {} failed: {}",
                        selection.id,
                        err
                    );
                    self.notices.push(Notice::warning(format!(
                        "Details not found for {}",
                        selection.title
                    )));
                }
            }
        }
    }
}
