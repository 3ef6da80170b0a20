//! Voycalc Core -- data model and binary codec for the voyage solver.
//!
//! A voyage sends twelve crew members out in fixed slots, each slot
//! requiring one skill and one trait. This crate defines the roster and
//! slot model and the bit-exact, little-endian wire format the external
//! combinatorial solver consumes:
//!
//! - [`skill::Skill`] -- the fixed six-skill ordering both ends of the
//!   solver boundary index by.
//! - [`crew::CrewMember`] / [`crew::VoyageSlots`] -- roster entries and
//!   the twelve-slot configuration (slot count enforced at construction).
//! - [`config::SolverConfig`] -- scalar tuning parameters, opaque to the
//!   codec beyond correct encoding.
//! - [`wire`] -- encode/decode for the configuration, result, and
//!   estimate segments, plus the [`wire::SolverInput`] wrapper.
//!
//! Everything here is synchronous and side-effect-free; dispatching a
//! payload to the solver is the bridge crate's job.

pub mod config;
pub mod crew;
pub mod skill;
pub mod wire;

pub use config::SolverConfig;
pub use crew::{CrewMember, CrewSlot, SLOT_COUNT, VoyageSlots};
pub use skill::{SKILL_COUNT, Skill, SkillTriple};
pub use wire::{Assignment, CodecError, SolverInput};
