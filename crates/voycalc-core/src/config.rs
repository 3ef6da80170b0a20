//! Tuning parameters forwarded to the solver.

use serde::{Deserialize, Serialize};

use crate::skill::Skill;

/// Scalar tuning parameters for the external solver.
///
/// These are opaque to the codec beyond correct encoding; the solver
/// decides what they mean. The defaults match the tool's shipped
/// calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Search depth for the combinatorial scan, clamped by the solver.
    pub search_depth: u8,
    /// How many two-hour extensions the search should optimize for.
    pub extends_target: u8,
    /// Starting antimatter of the selected ship.
    pub ship_antimatter: u16,
    /// Weight applied to the voyage's primary skill.
    pub skill_primary_multiplier: f32,
    /// Weight applied to the voyage's secondary skill.
    pub skill_secondary_multiplier: f32,
    /// Weight applied when a crew's skill matches the slot skill.
    pub skill_matching_multiplier: f32,
    /// Flat score bonus for matching a slot's required trait.
    pub trait_score_boost: u16,
    /// The voyage's primary skill.
    pub primary_skill: Skill,
    /// The voyage's secondary skill.
    pub secondary_skill: Skill,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            search_depth: 6,
            extends_target: 0,
            ship_antimatter: 2500,
            skill_primary_multiplier: 3.5,
            skill_secondary_multiplier: 2.5,
            skill_matching_multiplier: 1.1,
            trait_score_boost: 200,
            primary_skill: Skill::Command,
            secondary_skill: Skill::Diplomacy,
        }
    }
}
