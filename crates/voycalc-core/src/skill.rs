//! The fixed six-skill ordering shared with the solver.
//!
//! Skill indices cross the solver boundary as raw bytes, so both the
//! encoder and the decoder must agree on one ordering. This module is
//! the single source of that mapping; nothing else in the workspace
//! hard-codes a skill index.

use serde::{Deserialize, Serialize};

/// Number of skills. The wire layout hard-codes this.
pub const SKILL_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// One of the six crew skills, in wire order.
///
/// The discriminant of each variant is its wire index. Declaration order
/// is load-bearing: reordering variants silently corrupts every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    Command,
    Science,
    Security,
    Engineering,
    Diplomacy,
    Medicine,
}

impl Skill {
    /// All skills in wire order.
    pub const ALL: [Skill; SKILL_COUNT] = [
        Skill::Command,
        Skill::Science,
        Skill::Security,
        Skill::Engineering,
        Skill::Diplomacy,
        Skill::Medicine,
    ];

    /// Wire index of this skill (0-5).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a skill by wire index. Returns `None` for indices >= 6.
    pub fn from_index(index: u8) -> Option<Skill> {
        Self::ALL.get(index as usize).copied()
    }

    /// The game's symbol string for this skill (e.g. `"command_skill"`).
    pub fn symbol(self) -> &'static str {
        match self {
            Skill::Command => "command_skill",
            Skill::Science => "science_skill",
            Skill::Security => "security_skill",
            Skill::Engineering => "engineering_skill",
            Skill::Diplomacy => "diplomacy_skill",
            Skill::Medicine => "medicine_skill",
        }
    }

    /// Look up a skill by its game symbol string.
    pub fn from_symbol(symbol: &str) -> Option<Skill> {
        Self::ALL.iter().copied().find(|s| s.symbol() == symbol)
    }
}

// ---------------------------------------------------------------------------
// SkillTriple
// ---------------------------------------------------------------------------

/// Per-skill values for one crew member: core plus proficiency range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTriple {
    pub core: u16,
    pub range_min: u16,
    pub range_max: u16,
}

impl SkillTriple {
    pub fn new(core: u16, range_min: u16, range_max: u16) -> Self {
        Self {
            core,
            range_min,
            range_max,
        }
    }

    /// Voyage value: core plus the average proficiency roll.
    pub fn voyage_value(self) -> u32 {
        self.core as u32 + (self.range_min as u32 + self.range_max as u32) / 2
    }
}

// ===========================================================================
// Tests
// ===========================================================================
