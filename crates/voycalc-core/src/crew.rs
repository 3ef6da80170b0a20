//! Crew records and the twelve-slot voyage configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::skill::{SKILL_COUNT, Skill, SkillTriple};
use crate::wire::CodecError;

/// Number of crew slots on a voyage. The wire layout hard-codes this;
/// there is no length field for the slot array.
pub const SLOT_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// CrewMember
// ---------------------------------------------------------------------------

/// A single roster entry considered for voyage assignment.
///
/// # Identifiers
///
/// The game uses two identifiers interchangeably: `crew_id` is the roster
/// instance id (absent for crew not currently owned), `archetype_id` the
/// template id. Call sites in the game fall back from one to the other and
/// neither is clearly canonical, so both are kept: [`CrewMember::wire_id`]
/// picks the instance id when present, and result decoding matches either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Roster instance id, when the crew is owned.
    pub crew_id: Option<u32>,
    /// Archetype (template) id. Always present.
    pub archetype_id: u32,
    /// Display name. Sanitized to 7-bit ASCII at encode time.
    pub name: String,
    /// Maximum rarity, 1-5.
    pub max_rarity: u8,
    /// Per-skill values, indexed by [`Skill`] wire order.
    pub skills: [SkillTriple; SKILL_COUNT],
    /// Trait symbols, unordered.
    pub traits: BTreeSet<String>,
    /// Vaulted (frozen) crew cannot be sent on voyages.
    pub frozen: bool,
    /// Already committed to a shuttle or another voyage.
    pub active: bool,
    /// Fully fused and at maximum level.
    pub ff100: bool,
}

impl CrewMember {
    /// The identifier written to the wire: instance id when owned,
    /// archetype id otherwise.
    pub fn wire_id(&self) -> u32 {
        self.crew_id.unwrap_or(self.archetype_id)
    }

    /// Whether a decoded identifier refers to this crew member, under
    /// either identifier scheme.
    pub fn matches_id(&self, id: u32) -> bool {
        self.crew_id == Some(id) || self.archetype_id == id
    }

    /// Values for one skill.
    pub fn skill(&self, skill: Skill) -> SkillTriple {
        self.skills[skill.index() as usize]
    }

    pub fn has_trait(&self, trait_symbol: &str) -> bool {
        self.traits.contains(trait_symbol)
    }

    /// Display name re-encoded to the 7-bit-safe character set the solver
    /// accepts. Non-ASCII characters are stripped and embedded double
    /// quotes become single quotes so names cannot collide with the
    /// wrapper's string delimiters.
    pub fn sanitized_name(&self) -> String {
        self.name
            .chars()
            .filter(|c| c.is_ascii())
            .map(|c| if c == '"' { '\'' } else { c })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Voyage slots
// ---------------------------------------------------------------------------

/// One voyage slot: a required skill and a required trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSlot {
    pub skill: Skill,
    pub required_trait: String,
}

impl CrewSlot {
    pub fn new(skill: Skill, required_trait: impl Into<String>) -> Self {
        Self {
            skill,
            required_trait: required_trait.into(),
        }
    }
}

/// The ordered sequence of exactly [`SLOT_COUNT`] voyage slots.
///
/// The constructor is the choke point for the slot-count invariant: the
/// binary layout has no slot-array length field, so an off-count
/// configuration must fail loudly here, before anything is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyageSlots(Vec<CrewSlot>);

impl VoyageSlots {
    /// Build a slot configuration, rejecting any count other than 12.
    pub fn new(slots: Vec<CrewSlot>) -> Result<Self, CodecError> {
        if slots.len() != SLOT_COUNT {
            return Err(CodecError::SlotCount { got: slots.len() });
        }
        Ok(Self(slots))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrewSlot> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> &CrewSlot {
        &self.0[index]
    }

    pub fn len(&self) -> usize {
        SLOT_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn crew(name: &str) -> CrewMember {
        CrewMember {
            crew_id: Some(7),
            archetype_id: 1007,
            name: name.to_string(),
            max_rarity: 4,
            skills: Default::default(),
            traits: BTreeSet::new(),
            frozen: false,
            active: false,
            ff100: false,
        }
    }

    #[test]
    fn wire_id_prefers_instance_id() {
        let mut c = crew("Kira");
        assert_eq!(c.wire_id(), 7);
        c.crew_id = None;
        assert_eq!(c.wire_id(), 1007);
    }

    #[test]
    fn matches_either_identifier() {
        let c = crew("Kira");
        assert!(c.matches_id(7));
        assert!(c.matches_id(1007));
        assert!(!c.matches_id(42));
    }

    #[test]
    fn name_sanitization_strips_and_requotes() {
        let c = crew("Grilka, \"Mistress\" of Qo\u{2019}noS");
        assert_eq!(c.sanitized_name(), "Grilka, 'Mistress' of QonoS");
    }

    #[test]
    fn slot_count_is_enforced() {
        let eleven: Vec<CrewSlot> = (0..11)
            .map(|i| CrewSlot::new(Skill::Command, format!("trait{i}")))
            .collect();
        let err = VoyageSlots::new(eleven).unwrap_err();
        assert!(matches!(err, CodecError::SlotCount { got: 11 }));

        let twelve: Vec<CrewSlot> = (0..12)
            .map(|i| CrewSlot::new(Skill::Command, format!("trait{i}")))
            .collect();
        assert!(VoyageSlots::new(twelve).is_ok());
    }
}
