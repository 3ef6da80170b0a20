//! Closed-form voyage timing models.
//!
//! Pure functions over immutable inputs: actual voyage duration from the
//! event log, antimatter-decay time estimates, dilemma-arrival chance,
//! and a skill-value duration estimator for when the native estimate is
//! not available. No state, no I/O; safe from any number of threads.

use serde::{Deserialize, Serialize};

use voycalc_core::skill::{SKILL_COUNT, Skill};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Simulation tick length in seconds.
pub const SECONDS_PER_TICK: u32 = 20;

/// Ticks between dilemmas: one dilemma every two hours at 20 s/tick.
pub const TICKS_PER_DILEMMA: u32 = 360;

/// Worst-case antimatter decay rate in AM per minute.
///
/// Derived from the simulated hazard cadence: one hazard every 80 s with
/// a 30 AM loss on failure plus three 1 AM ticks (-33 AM / 80 s =
/// -0.4125 AM/s), every sixth hazard replaced by loot (+30 AM / 480 s =
/// +0.0625 AM/s) with a net +1 AM (+1/480 = +0.002083 AM/s):
/// -0.4125 + 0.0625 + 0.002083 = -0.347916 AM/s = 20.875 AM/min.
pub const AM_DECAY_PER_MINUTE: f64 = 20.875;

/// Antimatter granted per slot whose crew matches the required trait.
pub const ANTIMATTER_FOR_TRAIT_MATCH: u32 = 25;

// ---------------------------------------------------------------------------
// Narrative log
// ---------------------------------------------------------------------------

/// One logged voyage event: a monotonically increasing tick index and a
/// wall-clock timestamp in seconds. Server narrative entries carry more
/// fields; only these two matter for timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub index: u32,
    pub event_time: f64,
}

/// Actual voyage duration in seconds, determined from the narrative log.
///
/// The tick counter pauses while a dilemma waits, so wall-clock deltas
/// are only trusted for the tail after the last dilemma boundary:
/// `dilemma_count` whole intervals are charged at face value, and the
/// tail is measured from the first event after the boundary to the last
/// event. An empty log yields zero.
pub fn voyage_duration(narrative: &[NarrativeEvent]) -> f64 {
    let Some(last) = narrative.last() else {
        return 0.0;
    };

    let max_index = last.index;
    let dilemma_count = max_index / TICKS_PER_DILEMMA;
    let last_dilemma_tick = dilemma_count * TICKS_PER_DILEMMA;
    let base_seconds = (dilemma_count * TICKS_PER_DILEMMA * SECONDS_PER_TICK) as f64;

    if max_index > last_dilemma_tick
        && let Some(first_after) = narrative.iter().find(|e| e.index == last_dilemma_tick + 1)
    {
        let tail_time = last.event_time - first_after.event_time;
        // Add one tick back: the subtraction measured from the event
        // *after* the boundary.
        let tail_ticks = tail_time / SECONDS_PER_TICK as f64 + 1.0;
        return base_seconds + tail_ticks * SECONDS_PER_TICK as f64;
    }

    base_seconds
}

// ---------------------------------------------------------------------------
// Decay estimates
// ---------------------------------------------------------------------------

/// Estimated minutes of voyage left at the worst-case decay rate.
pub fn decay_minutes_left(antimatter: f64) -> f64 {
    antimatter / AM_DECAY_PER_MINUTE
}

/// Chance (0-100) that the voyage survives long enough to reach the next
/// dilemma.
///
/// The survival window is bracketed between a pessimistic estimate
/// (`minutes_left * 0.75 - 1` minutes) and the full estimate. A
/// degenerate bracket (equal bounds) returns 0 rather than propagating a
/// NaN from the division.
pub fn dilemma_chance(
    estimated_minutes_left: f64,
    seconds_between_dilemmas: f64,
    seconds_since_last_dilemma: f64,
) -> f64 {
    let min_estimate = (estimated_minutes_left * 0.75 - 1.0) * 60.0;
    let max_estimate = estimated_minutes_left * 60.0;
    if min_estimate == max_estimate {
        return 0.0;
    }

    let raw = 100.0 * (seconds_between_dilemmas - seconds_since_last_dilemma - min_estimate)
        / (max_estimate - min_estimate);
    100.0 - raw.clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Skill-value duration estimator
// ---------------------------------------------------------------------------

// Hazard model parameters. One skill check every four narrative indexes;
// a pass refunds 5 AM, a fail costs 30; primary/secondary/other skills
// are selected with chances .35/.25/.1; a skill stops passing at 15% of
// its aggregate value; leftover antimatter drains at roughly 21 AM/min.
const INDEXES_PER_HAZARD: f64 = 4.0;
const PASS_AM: f64 = 5.0;
const FAIL_AM: f64 = 30.0;
const PRIMARY_CHANCE: f64 = 0.35;
const SECONDARY_CHANCE: f64 = 0.25;
const OTHER_CHANCE: f64 = 0.1;
const FIRST_FAILURE_FRACTION: f64 = 0.15;
const TAIL_AM_PER_MINUTE: f64 = 21.0;

/// Estimate total voyage duration in minutes from aggregate skill values.
///
/// `skill_values` are the summed voyage values of the assigned crew, in
/// wire order. `elapsed_minutes` > 0 turns this into a remaining-time
/// estimate measured from the current position. This is the client-side
/// fallback model; the native solver computes a sharper figure.
pub fn estimate_duration(
    primary: Skill,
    secondary: Skill,
    skill_values: &[f64; SKILL_COUNT],
    elapsed_minutes: f64,
    antimatter: f64,
) -> f64 {
    let elapsed_ticks = elapsed_minutes * 60.0 / SECONDS_PER_TICK as f64;

    let chance = |skill: Skill| {
        if skill == primary {
            PRIMARY_CHANCE
        } else if skill == secondary {
            SECONDARY_CHANCE
        } else {
            OTHER_CHANCE
        }
    };

    // First-failure index per skill: the tick past which checks against
    // that skill stop passing.
    let mut ffi = [0.0f64; SKILL_COUNT];
    let mut ffi_max = 0.0f64;
    for skill in Skill::ALL {
        let i = skill.index() as usize;
        let value = skill_values[i];
        if value <= 0.0 {
            continue;
        }
        ffi[i] = (value * FIRST_FAILURE_FRACTION - elapsed_ticks).max(0.0);
        ffi_max = ffi_max.max(ffi[i]);
    }

    let mut am_balance = antimatter - ffi_max; // 1 AM per tick
    for skill in Skill::ALL {
        let i = skill.index() as usize;
        let passes = ffi[i] * chance(skill) / INDEXES_PER_HAZARD;
        let fails = (ffi_max - ffi[i]) * chance(skill) / INDEXES_PER_HAZARD;
        am_balance += passes * PASS_AM;
        am_balance -= fails * FAIL_AM;
    }

    let first_failure_minutes = ffi_max * SECONDS_PER_TICK as f64 / 60.0;
    first_failure_minutes + am_balance / TAIL_AM_PER_MINUTE + elapsed_minutes
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // voyage_duration
    // -----------------------------------------------------------------------

    #[test]
    fn duration_of_empty_log_is_zero() {
        assert_eq!(voyage_duration(&[]), 0.0);
    }

    #[test]
    fn duration_at_exact_dilemma_boundary() {
        // Max index is exactly 2 * 360 with no tail event.
        let narrative = vec![
            NarrativeEvent { index: 1, event_time: 0.0 },
            NarrativeEvent { index: 360, event_time: 7180.0 },
            NarrativeEvent { index: 720, event_time: 14380.0 },
        ];
        assert_eq!(voyage_duration(&narrative), (2 * 360 * 20) as f64);
    }

    #[test]
    fn duration_includes_measured_tail() {
        // One dilemma interval, then 10 ticks measured by wall clock.
        let narrative = vec![
            NarrativeEvent { index: 1, event_time: 0.0 },
            NarrativeEvent { index: 361, event_time: 8000.0 },
            NarrativeEvent { index: 370, event_time: 8180.0 },
        ];
        // tail_time = 180 s => 9 ticks + 1 = 10 ticks.
        let expected = (360.0 * 20.0) + 10.0 * 20.0;
        assert_eq!(voyage_duration(&narrative), expected);
    }

    #[test]
    fn duration_with_tail_but_missing_boundary_event_falls_back() {
        // Tail ticks exist by index but the boundary+1 event was pruned;
        // without a measurement anchor only whole intervals count.
        let narrative = vec![
            NarrativeEvent { index: 1, event_time: 0.0 },
            NarrativeEvent { index: 365, event_time: 7300.0 },
        ];
        assert_eq!(voyage_duration(&narrative), (360 * 20) as f64);
    }

    #[test]
    fn duration_before_first_dilemma_is_zero_without_anchor() {
        // Max index below 360: zero whole intervals, and index 1 is the
        // anchor for the tail measurement.
        let narrative = vec![
            NarrativeEvent { index: 1, event_time: 100.0 },
            NarrativeEvent { index: 30, event_time: 680.0 },
        ];
        // tail_time = 580 s => 29 ticks + 1 = 30 ticks.
        assert_eq!(voyage_duration(&narrative), 600.0);
    }

    // -----------------------------------------------------------------------
    // Decay estimates
    // -----------------------------------------------------------------------

    #[test]
    fn decay_eta_for_900_am() {
        let minutes = decay_minutes_left(900.0);
        assert!((minutes - 43.11).abs() < 0.01, "got {minutes}");
    }

    #[test]
    fn dilemma_chance_degenerate_bracket_is_zero() {
        // min == max exactly when estimated_minutes_left == -4.
        assert_eq!(dilemma_chance(-4.0, 7200.0, 3600.0), 0.0);
    }

    #[test]
    fn dilemma_chance_certain_when_estimate_covers_interval() {
        // 100 minutes left, next dilemma 10 minutes away.
        let chance = dilemma_chance(100.0, 7200.0, 6600.0);
        assert_eq!(chance, 100.0);
    }

    #[test]
    fn dilemma_chance_zero_when_estimate_far_short() {
        // 5 minutes left, next dilemma 110 minutes away.
        let chance = dilemma_chance(5.0, 7200.0, 600.0);
        assert_eq!(chance, 0.0);
    }

    proptest! {
        #[test]
        fn dilemma_chance_always_clamped(
            minutes_left in 0.0f64..2000.0,
            between in 1.0f64..20_000.0,
            since in 0.0f64..20_000.0,
        ) {
            let chance = dilemma_chance(minutes_left, between, since);
            prop_assert!((0.0..=100.0).contains(&chance), "chance {chance}");
        }
    }

    // -----------------------------------------------------------------------
    // Skill-value estimator
    // -----------------------------------------------------------------------

    #[test]
    fn estimate_duration_scales_with_skill() {
        let weak = estimate_duration(
            Skill::Command,
            Skill::Diplomacy,
            &[4000.0, 2000.0, 2000.0, 2000.0, 3000.0, 1000.0],
            0.0,
            2500.0,
        );
        let strong = estimate_duration(
            Skill::Command,
            Skill::Diplomacy,
            &[9000.0, 5000.0, 5000.0, 5000.0, 7000.0, 3000.0],
            0.0,
            2500.0,
        );
        assert!(strong > weak, "strong {strong} <= weak {weak}");
        assert!(weak > 0.0);
    }

    #[test]
    fn estimate_duration_remaining_shrinks_with_elapsed() {
        let values = [9000.0, 5000.0, 5000.0, 5000.0, 7000.0, 3000.0];
        let from_start =
            estimate_duration(Skill::Command, Skill::Diplomacy, &values, 0.0, 2500.0);
        let midway =
            estimate_duration(Skill::Command, Skill::Diplomacy, &values, 120.0, 1200.0);
        // A remaining-time estimate reports total duration including the
        // elapsed part; with antimatter half gone it lands below the
        // fresh-start figure plus the elapsed time.
        assert!(midway < from_start + 120.0);
        assert!(midway > 120.0);
    }
}
