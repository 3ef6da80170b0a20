//! The voyage lifecycle controller.
//!
//! Owns the live voyage record for the duration of one voyage and is
//! its single writer: every mutation flows through `&mut self`, and the
//! only mutation path is the recursive merge of server responses. The
//! main state machine is `None -> Started -> {Recalled, Failed}`, with
//! an orthogonal dilemma-pending flag derived from the record.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use voycalc_core::crew::{CrewMember, SLOT_COUNT};
use voycalc_timing::NarrativeEvent;

use crate::merge::merge_into;
use crate::server::{GameServer, ServerError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no active voyage")]
    NoActiveVoyage,
    /// Start precheck: the server contract requires exactly 12 crew.
    #[error("voyage start requires exactly {SLOT_COUNT} crew ids, got {got}")]
    CrewCount { got: usize },
    /// Start precheck: a selected crew member is committed elsewhere.
    /// Advisory only -- the server remains authoritative.
    #[error("crew '{name}' (id {crew_id}) is already active elsewhere")]
    CrewActive { crew_id: u32, name: String },
    #[error(transparent)]
    Server(#[from] ServerError),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Main lifecycle state, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoyageState {
    /// No voyage underway.
    None,
    Started,
    Recalled,
    Failed,
}

impl VoyageState {
    /// Map the server's state string. Unknown strings read as `Started`:
    /// the server only distinguishes terminal states.
    fn from_symbol(symbol: &str) -> VoyageState {
        match symbol {
            "recalled" => VoyageState::Recalled,
            "failed" => VoyageState::Failed,
            _ => VoyageState::Started,
        }
    }
}

/// Typed read view over the voyage record. Partial by design: the raw
/// record retains fields this view does not model.
#[derive(Debug, Clone, Deserialize)]
pub struct VoyageStatus {
    pub id: u64,
    pub state: String,
    /// Antimatter remaining.
    pub hp: f64,
    pub max_hp: f64,
    #[serde(default)]
    pub voyage_duration: f64,
    #[serde(default)]
    pub log_index: u32,
    #[serde(default)]
    pub seconds_between_dilemmas: f64,
    #[serde(default)]
    pub seconds_since_last_dilemma: f64,
    #[serde(default)]
    pub dilemma: Option<Dilemma>,
    #[serde(default)]
    pub skill_aggregates: HashMap<String, SkillAggregate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dilemma {
    pub id: u64,
    #[serde(default)]
    pub resolutions: Vec<Value>,
}

/// Per-skill aggregate range across the assigned crew.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillAggregate {
    pub skill: String,
    pub core: f64,
    pub range_min: f64,
    pub range_max: f64,
}

// ---------------------------------------------------------------------------
// VoyageController
// ---------------------------------------------------------------------------

/// Issues lifecycle commands and folds the server's partial responses
/// into the retained voyage record.
pub struct VoyageController<S: GameServer> {
    server: S,
    /// The live voyage record; `Null` when no voyage is retained.
    record: Value,
}

impl<S: GameServer> VoyageController<S> {
    pub fn new(server: S) -> Self {
        Self {
            server,
            record: Value::Null,
        }
    }

    /// Adopt an already-running voyage record, e.g. from login sync.
    pub fn adopt(server: S, record: Value) -> Self {
        Self { server, record }
    }

    /// The raw voyage record.
    pub fn record(&self) -> &Value {
        &self.record
    }

    /// The underlying server handle.
    pub fn server(&self) -> &S {
        &self.server
    }

    /// Typed view of the record, when one is retained and well-formed.
    pub fn status(&self) -> Option<VoyageStatus> {
        serde_json::from_value(self.record.clone()).ok()
    }

    pub fn voyage_id(&self) -> Option<u64> {
        self.record.get("id")?.as_u64()
    }

    /// Main lifecycle state, derived from the record's state string.
    pub fn state(&self) -> VoyageState {
        match self.record.get("state").and_then(Value::as_str) {
            Some(symbol) => VoyageState::from_symbol(symbol),
            None => VoyageState::None,
        }
    }

    /// Whether the record carries an unresolved dilemma. Orthogonal to
    /// the main state.
    pub fn dilemma_pending(&self) -> bool {
        self.record.get("dilemma").is_some_and(Value::is_object)
    }

    /// Drop the retained record (voyage abandoned or superseded).
    pub fn reset(&mut self) {
        self.record = Value::Null;
    }

    // -- Commands --

    /// `voyage/refresh`: fold the server's partial record into local
    /// state and return any narrative log entries.
    ///
    /// Stored dilemma resolutions are cleared before the merge; the
    /// merge-by-id rules would otherwise accumulate duplicates across
    /// refreshes.
    pub fn refresh(&mut self, new_only: bool) -> Result<Vec<NarrativeEvent>, ControllerError> {
        let voyage_id = self.require_voyage()?;
        let response = self.server.refresh(voyage_id, new_only)?;

        if let Some(update) = response.voyage_update {
            self.clear_dilemma_resolutions();
            merge_into(&mut self.record, &update, &[]);
        }

        let mut narrative = Vec::with_capacity(response.narrative.len());
        for entry in response.narrative {
            match serde_json::from_value::<NarrativeEvent>(entry) {
                Ok(event) => narrative.push(event),
                Err(err) => log::warn!("skipping malformed narrative entry: {err}"),
            }
        }
        Ok(narrative)
    }

    /// `voyage/recall`: begin the recall countdown. The state change
    /// arrives in the server's response record.
    pub fn recall(&mut self) -> Result<(), ControllerError> {
        let voyage_id = self.require_voyage()?;
        let update = self.server.recall(voyage_id)?;
        merge_into(&mut self.record, &update, &[]);
        Ok(())
    }

    /// `voyage/resolve_dilemma`: commit a choice. Clears the pending
    /// dilemma without touching the main state.
    pub fn resolve_dilemma(
        &mut self,
        dilemma_id: u64,
        choice_index: u32,
    ) -> Result<(), ControllerError> {
        let voyage_id = self.require_voyage()?;
        let update = self
            .server
            .resolve_dilemma(voyage_id, dilemma_id, choice_index)?;

        self.clear_dilemma_resolutions();
        merge_into(&mut self.record, &update, &[]);

        // The response may omit the dilemma field entirely; the choice
        // is committed either way.
        if update.get("dilemma").is_none()
            && let Value::Object(record) = &mut self.record
        {
            record.insert("dilemma".to_string(), Value::Null);
        }
        Ok(())
    }

    /// Two-step finalize: `voyage/complete` then `voyage/claim`, in that
    /// order. Drops the record on success.
    pub fn complete(&mut self) -> Result<(), ControllerError> {
        let voyage_id = self.require_voyage()?;
        self.server.complete(voyage_id)?;
        self.server.claim(voyage_id)?;
        self.reset();
        Ok(())
    }

    /// `voyage/revive`: resurrect a failed voyage.
    pub fn revive(&mut self) -> Result<(), ControllerError> {
        let voyage_id = self.require_voyage()?;
        let update = self.server.revive(voyage_id)?;
        merge_into(&mut self.record, &update, &[]);
        Ok(())
    }

    /// `voyage/start`: begin a new voyage, replacing any retained record.
    ///
    /// Prechecks the server contract -- exactly twelve crew ids, none
    /// already active -- against a fresh availability sync. The check is
    /// advisory; the server's own rejection remains possible and is
    /// surfaced verbatim.
    pub fn start(
        &mut self,
        voyage_symbol: &str,
        ship_id: u64,
        ship_name: Option<&str>,
        crew_ids: &[u32],
        roster: &[CrewMember],
    ) -> Result<(), ControllerError> {
        if crew_ids.len() != SLOT_COUNT {
            return Err(ControllerError::CrewCount {
                got: crew_ids.len(),
            });
        }

        let available = self.server.available_crew()?;
        for &crew_id in crew_ids {
            if !available.contains(&crew_id) {
                let name = roster
                    .iter()
                    .find(|c| c.matches_id(crew_id))
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| crew_id.to_string());
                return Err(ControllerError::CrewActive { crew_id, name });
            }
        }

        let record = self
            .server
            .start(voyage_symbol, ship_id, ship_name, crew_ids)?;
        self.record = record;
        Ok(())
    }

    // -- Internals --

    fn require_voyage(&self) -> Result<u64, ControllerError> {
        self.voyage_id().ok_or(ControllerError::NoActiveVoyage)
    }

    fn clear_dilemma_resolutions(&mut self) {
        if let Some(Value::Object(dilemma)) = self.record.get_mut("dilemma")
            && dilemma.contains_key("resolutions")
        {
            dilemma.insert("resolutions".to_string(), Value::Array(Vec::new()));
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
