//! Fixed-layout binary buffers exchanged with the voyage solver.
//!
//! Three buffer shapes cross the solver boundary, all little-endian:
//!
//! - the 34-byte **configuration segment** ([`encode_config`]) plus a
//!   variable-length crew list, wrapped in [`SolverInput`];
//! - the 52-byte **result segment** ([`decode_assignment`]): an IEEE-754
//!   single score followed by twelve u32 crew identifiers;
//! - the 52-byte **estimate segment** ([`encode_estimate_config`]) for
//!   remaining-duration queries, whose result reuses the score-at-offset-0
//!   layout but carries a duration in hours.
//!
//! Layouts are defined offset by offset below. There is no length field
//! for the slot array, so the 12-slot invariant is enforced before any
//! byte is written (see [`crate::crew::VoyageSlots`]).

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::crew::{CrewMember, SLOT_COUNT, VoyageSlots};
use crate::skill::{SKILL_COUNT, Skill};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Size of the configuration segment.
pub const CONFIG_LEN: usize = 34;

/// Size of the estimate configuration segment.
pub const ESTIMATE_CONFIG_LEN: usize = 4 + 4 * SLOT_COUNT;

/// Size of a result segment: f32 score + 12 u32 identifiers.
pub const RESULT_LEN: usize = 4 + 4 * SLOT_COUNT;

/// Values per crew in the flattened skill array: {core, min, max} x 6.
pub const SKILL_DATA_LEN: usize = SKILL_COUNT * 3;

// Configuration segment offsets.
const OFF_SEARCH_DEPTH: usize = 0;
const OFF_EXTENDS_TARGET: usize = 1;
const OFF_SHIP_ANTIMATTER: usize = 2;
const OFF_PRIMARY_MULT: usize = 4;
const OFF_SECONDARY_MULT: usize = 8;
const OFF_MATCHING_MULT: usize = 12;
const OFF_TRAIT_BOOST: usize = 16;
const OFF_PRIMARY_SKILL: usize = 18;
const OFF_SECONDARY_SKILL: usize = 19;
const OFF_SLOT_SKILLS: usize = 20;
const OFF_CREW_LEN: usize = 32;

// Trait bitmask flag bits. Bits 0-11 are per-slot trait matches.
const FROZEN_BIT: u16 = 12;
const ACTIVE_BIT: u16 = 13;
const FF100_BIT: u16 = 14;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the codec. Encoding invariant violations abort before
/// any cross-boundary call; decode errors describe the offending buffer.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("voyage slot configuration must have exactly {SLOT_COUNT} slots, got {got}")]
    SlotCount { got: usize },
    #[error("result buffer too short: need {RESULT_LEN} bytes, got {len}")]
    ResultTooShort { len: usize },
    #[error("configuration buffer too short: need {CONFIG_LEN} bytes, got {len}")]
    ConfigTooShort { len: usize },
    #[error("skill index {index} out of range at config offset {offset}")]
    BadSkillIndex { index: u8, offset: usize },
    #[error("crew entry for '{name}' has {got} skill values, expected {SKILL_DATA_LEN}")]
    SkillDataLen { name: String, got: usize },
}

// ---------------------------------------------------------------------------
// Little-endian helpers
// ---------------------------------------------------------------------------

fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut [u8], off: usize, v: f32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn get_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn get_f32(buf: &[u8], off: usize) -> f32 {
    f32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

// ---------------------------------------------------------------------------
// Configuration segment
// ---------------------------------------------------------------------------

/// Encode the 34-byte configuration segment.
///
/// | Offset | Size | Field                                 |
/// |--------|------|---------------------------------------|
/// | 0      | 1    | search depth                          |
/// | 1      | 1    | extension target                      |
/// | 2      | 2    | ship antimatter                       |
/// | 4      | 4    | primary-skill multiplier (f32)        |
/// | 8      | 4    | secondary-skill multiplier (f32)      |
/// | 12     | 4    | skill-match multiplier (f32)          |
/// | 16     | 2    | trait score boost                     |
/// | 18     | 1    | primary skill index                   |
/// | 19     | 1    | secondary skill index                 |
/// | 20     | 12   | per-slot required-skill index         |
/// | 32     | 2    | crew-list length                      |
pub fn encode_config(
    config: &SolverConfig,
    slots: &VoyageSlots,
    crew_len: u16,
) -> [u8; CONFIG_LEN] {
    let mut buf = [0u8; CONFIG_LEN];
    buf[OFF_SEARCH_DEPTH] = config.search_depth;
    buf[OFF_EXTENDS_TARGET] = config.extends_target;
    put_u16(&mut buf, OFF_SHIP_ANTIMATTER, config.ship_antimatter);
    put_f32(&mut buf, OFF_PRIMARY_MULT, config.skill_primary_multiplier);
    put_f32(&mut buf, OFF_SECONDARY_MULT, config.skill_secondary_multiplier);
    put_f32(&mut buf, OFF_MATCHING_MULT, config.skill_matching_multiplier);
    put_u16(&mut buf, OFF_TRAIT_BOOST, config.trait_score_boost);
    buf[OFF_PRIMARY_SKILL] = config.primary_skill.index();
    buf[OFF_SECONDARY_SKILL] = config.secondary_skill.index();
    for (i, slot) in slots.iter().enumerate() {
        buf[OFF_SLOT_SKILLS + i] = slot.skill.index();
    }
    put_u16(&mut buf, OFF_CREW_LEN, crew_len);
    buf
}

/// A decoded configuration segment, as seen from the solver side.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedConfig {
    pub config: SolverConfig,
    /// Required skill per slot, in slot order.
    pub slot_skills: [Skill; SLOT_COUNT],
    pub crew_len: u16,
}

/// Decode a configuration segment.
///
/// This is the solver-side inverse of [`encode_config`], kept in the same
/// module so the skill ordering cannot drift between the two ends: a
/// mismatch there corrupts results silently rather than erroring.
pub fn decode_config(data: &[u8]) -> Result<DecodedConfig, CodecError> {
    if data.len() < CONFIG_LEN {
        return Err(CodecError::ConfigTooShort { len: data.len() });
    }

    let skill_at = |offset: usize| {
        Skill::from_index(data[offset]).ok_or(CodecError::BadSkillIndex {
            index: data[offset],
            offset,
        })
    };

    let mut slot_skills = [Skill::Command; SLOT_COUNT];
    for (i, slot) in slot_skills.iter_mut().enumerate() {
        *slot = skill_at(OFF_SLOT_SKILLS + i)?;
    }

    Ok(DecodedConfig {
        config: SolverConfig {
            search_depth: data[OFF_SEARCH_DEPTH],
            extends_target: data[OFF_EXTENDS_TARGET],
            ship_antimatter: get_u16(data, OFF_SHIP_ANTIMATTER),
            skill_primary_multiplier: get_f32(data, OFF_PRIMARY_MULT),
            skill_secondary_multiplier: get_f32(data, OFF_SECONDARY_MULT),
            skill_matching_multiplier: get_f32(data, OFF_MATCHING_MULT),
            trait_score_boost: get_u16(data, OFF_TRAIT_BOOST),
            primary_skill: skill_at(OFF_PRIMARY_SKILL)?,
            secondary_skill: skill_at(OFF_SECONDARY_SKILL)?,
        },
        slot_skills,
        crew_len: get_u16(data, OFF_CREW_LEN),
    })
}

// ---------------------------------------------------------------------------
// Crew entries and the solver input wrapper
// ---------------------------------------------------------------------------

/// Compute a crew member's slot-relative trait bitmask.
///
/// Bit *i* (0-11) is set iff the crew possesses the trait required by slot
/// *i*. Bit 12 marks frozen crew, bit 13 active crew, bit 14 crew that are
/// fully fused at maximum level.
pub fn trait_bitmask(crew: &CrewMember, slots: &VoyageSlots) -> u16 {
    let mut mask = 0u16;
    for (i, slot) in slots.iter().enumerate() {
        if crew.has_trait(&slot.required_trait) {
            mask |= 1 << i;
        }
    }
    if crew.frozen {
        mask |= 1 << FROZEN_BIT;
    }
    if crew.active {
        mask |= 1 << ACTIVE_BIT;
    }
    if crew.ff100 {
        mask |= 1 << FF100_BIT;
    }
    mask
}

/// One crew member as shipped to the solver. Field names mirror the wire
/// contract the external engine parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewEntry {
    pub id: u32,
    pub name: String,
    #[serde(rename = "traitBitMask")]
    pub trait_bitmask: u16,
    pub max_rarity: u8,
    /// Flattened {core, min, max} per skill in wire order; 18 values.
    #[serde(rename = "skillData")]
    pub skill_data: Vec<u16>,
}

impl CrewEntry {
    fn from_crew(crew: &CrewMember, slots: &VoyageSlots) -> Self {
        let mut skill_data = Vec::with_capacity(SKILL_DATA_LEN);
        for skill in Skill::ALL {
            let triple = crew.skill(skill);
            skill_data.push(triple.core);
            skill_data.push(triple.range_min);
            skill_data.push(triple.range_max);
        }
        Self {
            id: crew.wire_id(),
            name: crew.sanitized_name(),
            trait_bitmask: trait_bitmask(crew, slots),
            max_rarity: crew.max_rarity,
            skill_data,
        }
    }

    /// Values for one skill out of the flattened array.
    pub fn skill_triple(&self, skill: Skill) -> Result<(u16, u16, u16), CodecError> {
        if self.skill_data.len() != SKILL_DATA_LEN {
            return Err(CodecError::SkillDataLen {
                name: self.name.clone(),
                got: self.skill_data.len(),
            });
        }
        let base = skill.index() as usize * 3;
        Ok((
            self.skill_data[base],
            self.skill_data[base + 1],
            self.skill_data[base + 2],
        ))
    }

    /// Whether bit `flag` of the trait bitmask is set.
    fn flag(&self, bit: u16) -> bool {
        self.trait_bitmask & (1 << bit) != 0
    }

    pub fn is_frozen(&self) -> bool {
        self.flag(FROZEN_BIT)
    }

    pub fn is_active(&self) -> bool {
        self.flag(ACTIVE_BIT)
    }

    pub fn is_ff100(&self) -> bool {
        self.flag(FF100_BIT)
    }

    /// Whether the crew satisfies slot `slot_index`'s required trait.
    pub fn matches_slot_trait(&self, slot_index: usize) -> bool {
        debug_assert!(slot_index < SLOT_COUNT);
        self.trait_bitmask & (1 << slot_index) != 0
    }
}

/// The JSON-ish wrapper handed across the solver boundary: the crew list
/// plus the binary segments embedded as plain integer arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverInput {
    pub crew: Vec<CrewEntry>,
    #[serde(rename = "binaryConfig")]
    pub binary_config: Vec<u8>,
    #[serde(rename = "estimateBinaryConfig", skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub estimate_binary_config: Option<Vec<u8>>,
}

/// Encode a full optimization payload: configuration segment plus one
/// entry per roster member.
pub fn encode_input(
    config: &SolverConfig,
    slots: &VoyageSlots,
    roster: &[CrewMember],
) -> SolverInput {
    let crew: Vec<CrewEntry> = roster
        .iter()
        .map(|c| CrewEntry::from_crew(c, slots))
        .collect();
    let binary_config = encode_config(config, slots, crew.len() as u16).to_vec();
    SolverInput {
        crew,
        binary_config,
        estimate_binary_config: None,
    }
}

// ---------------------------------------------------------------------------
// Result segment
// ---------------------------------------------------------------------------

/// A decoded solver result: a score and a crew-to-slot assignment.
///
/// Slots whose identifier was absent from the roster are `None`; callers
/// proceed with the partial assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Solver score. Estimated voyage duration in hours for the shipped
    /// engine; solver-defined in general.
    pub score: f32,
    /// Crew identifier per slot, in slot order.
    pub slots: [Option<u32>; SLOT_COUNT],
}

impl Assignment {
    /// Number of slots with a valid assignment.
    pub fn assigned_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count() == SLOT_COUNT
    }
}

/// Decode a result segment against the known roster.
///
/// Identifiers the roster does not contain (under either identifier
/// scheme) are dropped with a warning, never treated as fatal.
pub fn decode_assignment(data: &[u8], roster: &[CrewMember]) -> Result<Assignment, CodecError> {
    if data.len() < RESULT_LEN {
        return Err(CodecError::ResultTooShort { len: data.len() });
    }

    let score = get_f32(data, 0);
    let mut slots = [None; SLOT_COUNT];
    for (i, slot) in slots.iter_mut().enumerate() {
        let id = get_u32(data, 4 + 4 * i);
        if roster.iter().any(|c| c.matches_id(id)) {
            *slot = Some(id);
        } else {
            log::warn!("solver returned unknown crew id {id} for slot {i}; leaving unassigned");
        }
    }

    Ok(Assignment { score, slots })
}

/// Encode a result segment. Used by in-process solvers and by tests
/// building synthetic result buffers; the real engine produces the same
/// layout natively.
pub fn encode_assignment(score: f32, crew_ids: &[u32; SLOT_COUNT]) -> [u8; RESULT_LEN] {
    let mut buf = [0u8; RESULT_LEN];
    put_f32(&mut buf, 0, score);
    for (i, id) in crew_ids.iter().enumerate() {
        put_u32(&mut buf, 4 + 4 * i, *id);
    }
    buf
}

// ---------------------------------------------------------------------------
// Estimate segment
// ---------------------------------------------------------------------------

/// Encode the 52-byte configuration segment for a remaining-duration query.
///
/// Elapsed time is split into whole hours (byte 0) and remainder minutes
/// (byte 1) so no floating-point value crosses the boundary; remaining
/// antimatter is a u16 at bytes 2-3, followed by the twelve assigned crew
/// identifiers as u32s.
pub fn encode_estimate_config(
    elapsed_seconds: u64,
    remaining_antimatter: u16,
    assigned: &[u32; SLOT_COUNT],
) -> [u8; ESTIMATE_CONFIG_LEN] {
    let mut buf = [0u8; ESTIMATE_CONFIG_LEN];
    let hours = (elapsed_seconds / 3600).min(u8::MAX as u64) as u8;
    let minutes = ((elapsed_seconds % 3600) / 60) as u8;
    buf[0] = hours;
    buf[1] = minutes;
    put_u16(&mut buf, 2, remaining_antimatter);
    for (i, id) in assigned.iter().enumerate() {
        put_u32(&mut buf, 4 + 4 * i, *id);
    }
    buf
}

/// Decoded estimate segment, as seen from the solver side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEstimate {
    pub elapsed_hours: u8,
    pub elapsed_minutes: u8,
    pub remaining_antimatter: u16,
    pub assigned: [u32; SLOT_COUNT],
}

impl DecodedEstimate {
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_hours as u64 * 3600 + self.elapsed_minutes as u64 * 60
    }
}

/// Decode an estimate configuration segment.
pub fn decode_estimate_config(data: &[u8]) -> Result<DecodedEstimate, CodecError> {
    if data.len() < ESTIMATE_CONFIG_LEN {
        return Err(CodecError::ConfigTooShort { len: data.len() });
    }
    let mut assigned = [0u32; SLOT_COUNT];
    for (i, id) in assigned.iter_mut().enumerate() {
        *id = get_u32(data, 4 + 4 * i);
    }
    Ok(DecodedEstimate {
        elapsed_hours: data[0],
        elapsed_minutes: data[1],
        remaining_antimatter: get_u16(data, 2),
        assigned,
    })
}

/// Build a remaining-duration query payload: the regular crew list and
/// configuration plus the estimate segment.
pub fn encode_estimate_input(
    config: &SolverConfig,
    slots: &VoyageSlots,
    roster: &[CrewMember],
    elapsed_seconds: u64,
    remaining_antimatter: u16,
    assigned: &[u32; SLOT_COUNT],
) -> SolverInput {
    let mut input = encode_input(config, slots, roster);
    input.estimate_binary_config =
        Some(encode_estimate_config(elapsed_seconds, remaining_antimatter, assigned).to_vec());
    input
}

/// Decode an estimate result. The wire value is a duration in hours.
pub fn decode_estimate_hours(data: &[u8]) -> Result<f32, CodecError> {
    if data.len() < 4 {
        return Err(CodecError::ResultTooShort { len: data.len() });
    }
    Ok(get_f32(data, 0))
}

/// Decode an estimate result as minutes (the hours value times 60).
pub fn decode_estimate_minutes(data: &[u8]) -> Result<f64, CodecError> {
    Ok(decode_estimate_hours(data)? as f64 * 60.0)
}

// ===========================================================================
// Tests
// ===========================================================================
