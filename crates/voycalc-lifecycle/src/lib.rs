//! Voyage lifecycle: server commands and the local record they drive.
//!
//! A voyage is a long-running server-side process; the client holds a
//! copy of its record and keeps it current by folding the server's
//! partial responses into it ([`merge::merge_into`]). [`VoyageController`]
//! issues the lifecycle commands -- start, refresh, recall, dilemma
//! resolution, complete/claim, revive -- against any [`GameServer`]
//! implementation and is the record's single writer.

pub mod controller;
pub mod merge;
pub mod server;

pub use controller::{ControllerError, VoyageController, VoyageState, VoyageStatus};
pub use merge::merge_into;
pub use server::{GameServer, RefreshResponse, ServerError};
