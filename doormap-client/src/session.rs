//! Edit-session state machine
//!
//! A session moves through Loading → Ready → Saving → Saved, with Failed as
//! the terminal error branch. Draft edits are only accepted in Ready, and a
//! save is only attempted once the draft passes local validation, so a
//! rejected draft never leaves Ready.

use crate::normalize::NormalizedAggregate;
use crate::{ClientError, Result};
use doormap_common::config::Location;

/// Lifecycle state of one create/edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Fetching the record (edit) or resolving defaults (create)
    Loading,
    /// Draft is editable
    Ready,
    /// Save request in flight; edits are rejected
    Saving,
    /// Save acknowledged by the server
    Saved,
    /// Save failed; draft is preserved for retry
    Failed,
}

/// Editable form fields for one aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateDraft {
    pub lat: f64,
    pub long: f64,
    pub address: String,
    pub language: String,
    pub congregation_id: i64,
    pub number_of_doors: usize,
    pub door_labels: Vec<String>,
}

impl AggregateDraft {
    /// Blank draft pinned at a location, for the create flow
    pub fn at_location(location: Location) -> Self {
        Self {
            lat: location.lat,
            long: location.long,
            address: String::new(),
            language: String::new(),
            congregation_id: 1,
            number_of_doors: 0,
            door_labels: Vec::new(),
        }
    }

    /// Draft seeded from a fetched record, for the edit flow
    pub fn from_record(record: &NormalizedAggregate) -> Self {
        Self {
            lat: record.lat,
            long: record.long,
            address: record.address.clone().unwrap_or_default(),
            language: record.language.clone().unwrap_or_default(),
            congregation_id: record.congregation_id.unwrap_or(1),
            number_of_doors: record.number_of_doors,
            door_labels: record.door_labels.clone(),
        }
    }

    /// Checks that must pass before a save request is sent
    fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(ClientError::Validation("Address is required".to_string()));
        }
        if !Location::new(self.lat, self.long).is_valid() {
            return Err(ClientError::Validation(format!(
                "Coordinates out of range: ({}, {})",
                self.lat, self.long
            )));
        }
        if self.door_labels.len() != self.number_of_doors {
            return Err(ClientError::Validation(format!(
                "Door count is {} but {} labels were entered",
                self.number_of_doors,
                self.door_labels.len()
            )));
        }
        Ok(())
    }
}

/// One create/edit session, from load through save
#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    draft: Option<AggregateDraft>,
    /// Draft as last loaded or saved, for dirty tracking
    snapshot: Option<AggregateDraft>,
    error: Option<String>,
}

impl EditSession {
    /// Fresh session in Loading; call a resolve method once data arrives
    pub fn loading() -> Self {
        Self {
            state: SessionState::Loading,
            draft: None,
            snapshot: None,
            error: None,
        }
    }

    /// Resolve into a create session with a blank draft at `location`
    pub fn resolve_create(&mut self, location: Location) {
        let draft = AggregateDraft::at_location(location);
        self.snapshot = Some(draft.clone());
        self.draft = Some(draft);
        self.state = SessionState::Ready;
        self.error = None;
    }

    /// Resolve into an edit session seeded from a fetched record
    pub fn resolve_edit(&mut self, record: &NormalizedAggregate) {
        let draft = AggregateDraft::from_record(record);
        self.snapshot = Some(draft.clone());
        self.draft = Some(draft);
        self.state = SessionState::Ready;
        self.error = None;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> Option<&AggregateDraft> {
        self.draft.as_ref()
    }

    /// Last validation or save error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when the draft differs from its loaded/saved snapshot
    pub fn is_dirty(&self) -> bool {
        self.draft != self.snapshot
    }

    /// Apply an edit to the draft; only legal in Ready
    pub fn update_draft<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut AggregateDraft),
    {
        if self.state != SessionState::Ready {
            return Err(ClientError::InvalidState(format!(
                "cannot edit draft in {:?} state",
                self.state
            )));
        }
        if let Some(draft) = self.draft.as_mut() {
            edit(draft);
        }
        Ok(())
    }

    /// Validate the draft and enter Saving
    ///
    /// A draft that fails validation keeps the session in Ready with the
    /// message recorded, so the form can be corrected and retried.
    pub fn begin_save(&mut self) -> Result<&AggregateDraft> {
        if self.state != SessionState::Ready {
            return Err(ClientError::InvalidState(format!(
                "cannot save in {:?} state",
                self.state
            )));
        }
        let validation = match self.draft.as_ref() {
            Some(draft) => draft.validate(),
            None => return Err(ClientError::InvalidState("no draft loaded".to_string())),
        };
        if let Err(err) = validation {
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.error = None;
        self.state = SessionState::Saving;
        match self.draft.as_ref() {
            Some(draft) => Ok(draft),
            None => Err(ClientError::InvalidState("no draft loaded".to_string())),
        }
    }

    /// Record a successful save; the draft becomes the new snapshot
    pub fn complete_save(&mut self) -> Result<()> {
        if self.state != SessionState::Saving {
            return Err(ClientError::InvalidState(format!(
                "cannot complete save in {:?} state",
                self.state
            )));
        }
        self.snapshot = self.draft.clone();
        self.state = SessionState::Saved;
        Ok(())
    }

    /// Record a failed save; the draft is preserved for retry
    ///
    /// The failure message does not expire on its own. A UI that wants the
    /// banner to disappear after a delay runs its own timer and calls
    /// [`clear_error`](Self::clear_error) when it fires.
    pub fn fail_save(&mut self, message: impl Into<String>) -> Result<()> {
        if self.state != SessionState::Saving {
            return Err(ClientError::InvalidState(format!(
                "cannot fail save in {:?} state",
                self.state
            )));
        }
        self.error = Some(message.into());
        self.state = SessionState::Failed;
        Ok(())
    }

    /// Acknowledge a failed save and return to Ready for another attempt
    ///
    /// Whether this fires from a dismiss button or a timeout is the
    /// caller's choice; the session itself holds no timer.
    pub fn clear_error(&mut self) -> Result<()> {
        if self.state != SessionState::Failed {
            return Err(ClientError::InvalidState(format!(
                "cannot clear error in {:?} state",
                self.state
            )));
        }
        self.error = None;
        self.state = SessionState::Ready;
        Ok(())
    }
}
