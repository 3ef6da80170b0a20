//! The remote game server, seen at its command boundary.
//!
//! Every lifecycle transition is driven by a server response; the
//! controller never invents one locally. The server is authoritative --
//! client-side prechecks are advisory only.

use serde_json::Value;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures reported by (or on the way to) the game server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The server rejected a lifecycle command. Surfaced verbatim.
    #[error("server rejected {command} for voyage {voyage_id}: {message}")]
    Rejection {
        command: &'static str,
        voyage_id: u64,
        message: String,
    },
    /// The server answered a command with no usable data.
    #[error("empty response for {command}")]
    EmptyResponse { command: &'static str },
    /// The request never reached the server.
    #[error("transport failure: {0}")]
    Transport(String),
}

// ---------------------------------------------------------------------------
// GameServer
// ---------------------------------------------------------------------------

/// Response to a `voyage/refresh` command: an optional partial voyage
/// record plus zero or more narrative log fragments.
#[derive(Debug, Clone, Default)]
pub struct RefreshResponse {
    /// Partial voyage record to fold into local state.
    pub voyage_update: Option<Value>,
    /// Narrative log entries, newest fragment last.
    pub narrative: Vec<Value>,
}

/// Abstract command surface of the remote game server.
///
/// Each method is a state-changing POST except `refresh`, which is
/// read-mostly and idempotent. Implementations translate these calls
/// into the game's HTTP API; tests script them.
pub trait GameServer {
    /// `voyage/refresh`. `new_only` limits the narrative to unseen
    /// entries.
    fn refresh(&mut self, voyage_id: u64, new_only: bool) -> Result<RefreshResponse, ServerError>;

    /// `voyage/recall` -- begin the recall countdown.
    fn recall(&mut self, voyage_id: u64) -> Result<Value, ServerError>;

    /// `voyage/resolve_dilemma` -- commit an irreversible choice.
    /// Returns the partial voyage record reflecting the resolution.
    fn resolve_dilemma(
        &mut self,
        voyage_id: u64,
        dilemma_id: u64,
        choice_index: u32,
    ) -> Result<Value, ServerError>;

    /// `voyage/complete` -- first half of the two-step finalize.
    fn complete(&mut self, voyage_id: u64) -> Result<(), ServerError>;

    /// `voyage/claim` -- second half; must follow `complete`.
    fn claim(&mut self, voyage_id: u64) -> Result<(), ServerError>;

    /// `voyage/revive` -- spend a resource to resurrect a failed voyage.
    /// Returns the partial voyage record for the revived state.
    fn revive(&mut self, voyage_id: u64) -> Result<Value, ServerError>;

    /// `voyage/start` -- begin a new voyage with exactly twelve crew.
    /// Returns the freshly created voyage record.
    fn start(
        &mut self,
        voyage_symbol: &str,
        ship_id: u64,
        ship_name: Option<&str>,
        crew_ids: &[u32],
    ) -> Result<Value, ServerError>;

    /// Current roster availability: the set of crew instance ids not
    /// committed elsewhere. Used for the advisory pre-start check.
    fn available_crew(&mut self) -> Result<std::collections::HashSet<u32>, ServerError>;
}
