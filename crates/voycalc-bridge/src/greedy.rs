//! Greedy reference solver.
//!
//! A trivial in-process [`Solver`]: best weighted-skill-match assignment,
//! slot by slot. It exists to exercise the encode/dispatch/decode
//! protocol end to end without the real combinatorial engine, and it
//! speaks exactly the same wire format -- both configuration segments in,
//! score-plus-twelve-identifiers out.

use voycalc_core::crew::SLOT_COUNT;
use voycalc_core::skill::{SKILL_COUNT, Skill};
use voycalc_core::wire::{
    self, CrewEntry, DecodedConfig, SolverInput, encode_assignment,
};
use voycalc_timing::{ANTIMATTER_FOR_TRAIT_MATCH, estimate_duration};

use crate::{Solver, SolverError};

/// Greedy best-skill-match assignment over the encoded payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySolver;

impl Solver for GreedySolver {
    fn run(
        &self,
        input: &SolverInput,
        progress: &mut dyn FnMut(Vec<u8>),
    ) -> Result<Vec<u8>, SolverError> {
        if input.estimate_binary_config.is_some() {
            self.run_estimate(input)
        } else {
            self.run_optimize(input, progress)
        }
    }
}

impl GreedySolver {
    fn run_optimize(
        &self,
        input: &SolverInput,
        progress: &mut dyn FnMut(Vec<u8>),
    ) -> Result<Vec<u8>, SolverError> {
        let decoded = wire::decode_config(&input.binary_config)
            .map_err(|e| SolverError::BadInput(e.to_string()))?;

        let mut used = vec![false; input.crew.len()];
        let mut chosen: [usize; SLOT_COUNT] = [0; SLOT_COUNT];
        let mut total_score = 0.0f64;

        for slot in 0..SLOT_COUNT {
            let mut best: Option<(usize, f64)> = None;
            for (i, entry) in input.crew.iter().enumerate() {
                if used[i] || entry.is_frozen() || entry.is_active() {
                    continue;
                }
                let score = slot_score(entry, &decoded, slot)?;
                if score > 0.0 && best.is_none_or(|(_, b)| score > b) {
                    best = Some((i, score));
                }
            }
            let (index, score) = best.ok_or_else(|| {
                SolverError::BadInput(format!(
                    "roster has no eligible crew left for slot {slot}"
                ))
            })?;
            used[index] = true;
            chosen[slot] = index;
            total_score += score;
        }

        // Intermediate event: the raw greedy pass, scored by the weighted
        // sum before the duration model refines it.
        let ids: [u32; SLOT_COUNT] = core::array::from_fn(|i| input.crew[chosen[i]].id);
        progress(encode_assignment(total_score as f32, &ids).to_vec());

        let hours = self.score_hours(input, &decoded, &chosen)?;
        Ok(encode_assignment(hours, &ids).to_vec())
    }

    /// Estimated voyage duration in hours for a completed assignment,
    /// via the closed-form skill-value model.
    fn score_hours(
        &self,
        input: &SolverInput,
        decoded: &DecodedConfig,
        chosen: &[usize; SLOT_COUNT],
    ) -> Result<f32, SolverError> {
        let mut skill_values = [0.0f64; SKILL_COUNT];
        let mut antimatter = decoded.config.ship_antimatter as f64;

        for (slot, &index) in chosen.iter().enumerate() {
            let entry = &input.crew[index];
            for skill in Skill::ALL {
                skill_values[skill.index() as usize] += voyage_value(entry, skill)?;
            }
            if entry.matches_slot_trait(slot) {
                antimatter += ANTIMATTER_FOR_TRAIT_MATCH as f64;
            }
        }

        let minutes = estimate_duration(
            decoded.config.primary_skill,
            decoded.config.secondary_skill,
            &skill_values,
            0.0,
            antimatter,
        );
        Ok((minutes / 60.0) as f32)
    }

    fn run_estimate(&self, input: &SolverInput) -> Result<Vec<u8>, SolverError> {
        let decoded = wire::decode_config(&input.binary_config)
            .map_err(|e| SolverError::BadInput(e.to_string()))?;
        let estimate = input
            .estimate_binary_config
            .as_deref()
            .map(wire::decode_estimate_config)
            .transpose()
            .map_err(|e| SolverError::BadInput(e.to_string()))?
            .ok_or_else(|| SolverError::BadInput("missing estimate segment".into()))?;

        let elapsed_minutes = estimate.elapsed_seconds() as f64 / 60.0;
        let mut skill_values = [0.0f64; SKILL_COUNT];
        for id in estimate.assigned {
            let Some(entry) = input.crew.iter().find(|c| c.id == id) else {
                log::warn!("estimate references crew id {id} not present in the payload");
                continue;
            };
            for skill in Skill::ALL {
                skill_values[skill.index() as usize] += voyage_value(entry, skill)?;
            }
        }

        let total_minutes = estimate_duration(
            decoded.config.primary_skill,
            decoded.config.secondary_skill,
            &skill_values,
            elapsed_minutes,
            estimate.remaining_antimatter as f64,
        );
        let remaining_hours = ((total_minutes - elapsed_minutes) / 60.0).max(0.0) as f32;
        Ok(remaining_hours.to_le_bytes().to_vec())
    }
}

/// Crew voyage value for one skill: core plus average proficiency.
fn voyage_value(entry: &CrewEntry, skill: Skill) -> Result<f64, SolverError> {
    let (core, min, max) = entry
        .skill_triple(skill)
        .map_err(|e| SolverError::BadInput(e.to_string()))?;
    Ok(core as f64 + (min as f64 + max as f64) / 2.0)
}

/// Weighted score of one crew for one slot: every skill contributes its
/// voyage value, scaled by the primary/secondary/slot-match multiplier,
/// plus the flat trait boost when slot trait bit is set. Zero when the
/// crew lacks the slot skill entirely.
fn slot_score(
    entry: &CrewEntry,
    decoded: &DecodedConfig,
    slot: usize,
) -> Result<f64, SolverError> {
    let slot_skill = decoded.slot_skills[slot];
    if voyage_value(entry, slot_skill)? == 0.0 {
        return Ok(0.0);
    }

    let config = &decoded.config;
    let mut score = 0.0;
    for skill in Skill::ALL {
        let value = voyage_value(entry, skill)?;
        let weighted = if skill == config.primary_skill {
            value * config.skill_primary_multiplier as f64
        } else if skill == config.secondary_skill {
            value * config.skill_secondary_multiplier as f64
        } else if skill == slot_skill {
            value * config.skill_matching_multiplier as f64
        } else {
            value
        };
        score += weighted;
    }
    if entry.matches_slot_trait(slot) {
        score += config.trait_score_boost as f64;
    }
    Ok(score)
}

// ===========================================================================
// Tests
// ===========================================================================
