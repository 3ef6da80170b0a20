//! Full voyage lifecycle against a scripted game server.
//!
//! Walks one voyage through its whole arc -- start, periodic refreshes
//! with partial-record merges, a dilemma, recall, complete/claim -- and
//! a separate failure/revive arc, asserting the retained record after
//! every step.

use std::collections::HashSet;

use serde_json::{Value, json};
use voycalc_core::crew::CrewMember;
use voycalc_core::skill::{SKILL_COUNT, SkillTriple};
use voycalc_lifecycle::server::RefreshResponse;
use voycalc_lifecycle::{
    ControllerError, GameServer, ServerError, VoyageController, VoyageState,
};

/// Scripted server: pops pre-arranged refresh responses in order and
/// records every command for sequencing assertions.
#[derive(Default)]
struct MockGameServer {
    commands: Vec<String>,
    refreshes: Vec<RefreshResponse>,
    available: HashSet<u32>,
    fail_on_recall: bool,
}

impl GameServer for MockGameServer {
    fn refresh(&mut self, voyage_id: u64, new_only: bool) -> Result<RefreshResponse, ServerError> {
        self.commands.push(format!("refresh {voyage_id} {new_only}"));
        if self.refreshes.is_empty() {
            return Err(ServerError::EmptyResponse { command: "refresh" });
        }
        Ok(self.refreshes.remove(0))
    }

    fn recall(&mut self, voyage_id: u64) -> Result<Value, ServerError> {
        self.commands.push(format!("recall {voyage_id}"));
        if self.fail_on_recall {
            return Err(ServerError::Rejection {
                command: "recall",
                voyage_id,
                message: "voyage already recalled".to_string(),
            });
        }
        Ok(json!({ "state": "recalled", "recall_time_left": 5400 }))
    }

    fn resolve_dilemma(
        &mut self,
        voyage_id: u64,
        dilemma_id: u64,
        choice_index: u32,
    ) -> Result<Value, ServerError> {
        self.commands
            .push(format!("resolve {voyage_id} {dilemma_id} {choice_index}"));
        Ok(json!({
            "hp": 1650,
            "pending_rewards": [{ "id": 301, "quantity": 1 }],
        }))
    }

    fn complete(&mut self, voyage_id: u64) -> Result<(), ServerError> {
        self.commands.push(format!("complete {voyage_id}"));
        Ok(())
    }

    fn claim(&mut self, voyage_id: u64) -> Result<(), ServerError> {
        self.commands.push(format!("claim {voyage_id}"));
        Ok(())
    }

    fn revive(&mut self, voyage_id: u64) -> Result<Value, ServerError> {
        self.commands.push(format!("revive {voyage_id}"));
        Ok(json!({ "state": "started", "hp": 100 }))
    }

    fn start(
        &mut self,
        voyage_symbol: &str,
        ship_id: u64,
        _ship_name: Option<&str>,
        crew_ids: &[u32],
    ) -> Result<Value, ServerError> {
        self.commands
            .push(format!("start {voyage_symbol} ship {ship_id}"));
        Ok(json!({
            "id": 42,
            "state": "started",
            "hp": 2700.0,
            "max_hp": 2700.0,
            "log_index": 0,
            "seconds_between_dilemmas": 7200.0,
            "seconds_since_last_dilemma": 0.0,
            "crew_slots": crew_ids
                .iter()
                .enumerate()
                .map(|(i, id)| json!({ "id": id, "slot_index": i }))
                .collect::<Vec<_>>(),
            "pending_rewards": [],
        }))
    }

    fn available_crew(&mut self) -> Result<HashSet<u32>, ServerError> {
        Ok(self.available.clone())
    }
}

fn roster() -> Vec<CrewMember> {
    (1..=12)
        .map(|id| CrewMember {
            crew_id: Some(id),
            archetype_id: id + 100_000,
            name: format!("crew {id}"),
            max_rarity: 5,
            skills: [SkillTriple::new(400, 100, 200); SKILL_COUNT],
            traits: Default::default(),
            frozen: false,
            active: false,
            ff100: false,
        })
        .collect()
}

fn crew_ids() -> Vec<u32> {
    (1..=12).collect()
}

#[test]
fn happy_path_start_to_claim() {
    let server = MockGameServer {
        available: (1..=12).collect(),
        refreshes: vec![
            // First refresh: routine decay plus new log entries.
            RefreshResponse {
                voyage_update: Some(json!({
                    "hp": 2100.0,
                    "log_index": 150,
                    "seconds_since_last_dilemma": 3000.0,
                })),
                narrative: vec![
                    json!({ "index": 140, "event_time": 2800.0 }),
                    json!({ "index": 150, "event_time": 3000.0 }),
                ],
            },
            // Second refresh: a dilemma has arrived.
            RefreshResponse {
                voyage_update: Some(json!({
                    "hp": 1700.0,
                    "log_index": 360,
                    "dilemma": { "id": 9, "resolutions": [
                        { "id": 1, "option": "port" },
                        { "id": 2, "option": "starboard" },
                    ]},
                })),
                narrative: vec![],
            },
        ],
        ..Default::default()
    };

    let mut ctrl = VoyageController::new(server);

    ctrl.start("voyage_1", 5, Some("Dauntless"), &crew_ids(), &roster())
        .unwrap();
    assert_eq!(ctrl.state(), VoyageState::Started);
    assert_eq!(ctrl.voyage_id(), Some(42));

    let narrative = ctrl.refresh(true).unwrap();
    assert_eq!(narrative.len(), 2);
    assert_eq!(narrative[1].index, 150);
    // Partial merge: updated fields replaced, the rest retained.
    assert_eq!(ctrl.record()["hp"], json!(2100.0));
    assert_eq!(ctrl.record()["max_hp"], json!(2700.0));
    assert!(!ctrl.dilemma_pending());

    ctrl.refresh(true).unwrap();
    assert!(ctrl.dilemma_pending());
    let status = ctrl.status().unwrap();
    assert_eq!(status.dilemma.as_ref().unwrap().id, 9);
    assert_eq!(status.dilemma.unwrap().resolutions.len(), 2);

    ctrl.resolve_dilemma(9, 1).unwrap();
    assert!(!ctrl.dilemma_pending());
    assert_eq!(ctrl.state(), VoyageState::Started);
    // Reward array merged by id into the record.
    assert_eq!(ctrl.record()["pending_rewards"][0]["id"], json!(301));

    ctrl.recall().unwrap();
    assert_eq!(ctrl.state(), VoyageState::Recalled);

    ctrl.complete().unwrap();
    assert_eq!(ctrl.state(), VoyageState::None);
    assert!(ctrl.record().is_null());
}

#[test]
fn finalize_issues_complete_before_claim() {
    let server = MockGameServer {
        available: (1..=12).collect(),
        ..Default::default()
    };
    let mut ctrl = VoyageController::new(server);
    ctrl.start("voyage_1", 5, None, &crew_ids(), &roster())
        .unwrap();
    ctrl.complete().unwrap();

    let commands = &ctrl.server().commands;
    let complete_at = commands.iter().position(|c| c == "complete 42").unwrap();
    let claim_at = commands.iter().position(|c| c == "claim 42").unwrap();
    assert!(complete_at < claim_at);
}

#[test]
fn repeated_refreshes_do_not_duplicate_resolutions() {
    // The same dilemma arrives on consecutive refreshes; merge-by-id
    // with the pre-merge resolution reset keeps the list stable.
    let dilemma = json!({ "id": 9, "resolutions": [
        { "id": 1, "option": "port" },
        { "id": 2, "option": "starboard" },
    ]});
    let server = MockGameServer {
        available: (1..=12).collect(),
        refreshes: vec![
            RefreshResponse {
                voyage_update: Some(json!({ "dilemma": dilemma.clone() })),
                narrative: vec![],
            },
            RefreshResponse {
                voyage_update: Some(json!({ "dilemma": dilemma })),
                narrative: vec![],
            },
        ],
        ..Default::default()
    };

    let mut ctrl = VoyageController::new(server);
    ctrl.start("voyage_1", 5, None, &crew_ids(), &roster())
        .unwrap();
    ctrl.refresh(true).unwrap();
    ctrl.refresh(true).unwrap();

    let resolutions = ctrl.record()["dilemma"]["resolutions"].as_array().unwrap();
    assert_eq!(resolutions.len(), 2);
}

#[test]
fn failed_voyage_revives_into_started() {
    let mut ctrl = VoyageController::adopt(
        MockGameServer::default(),
        json!({ "id": 42, "state": "failed", "hp": 0.0, "max_hp": 2700.0 }),
    );
    assert_eq!(ctrl.state(), VoyageState::Failed);

    ctrl.revive().unwrap();
    assert_eq!(ctrl.state(), VoyageState::Started);
    assert_eq!(ctrl.record()["hp"], json!(100));
}

#[test]
fn server_rejection_is_surfaced_and_record_untouched() {
    let server = MockGameServer {
        fail_on_recall: true,
        ..Default::default()
    };
    let mut ctrl = VoyageController::adopt(
        server,
        json!({ "id": 42, "state": "started", "hp": 2000.0, "max_hp": 2700.0 }),
    );

    let err = ctrl.recall().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Server(ServerError::Rejection { .. })
    ));
    assert_eq!(ctrl.state(), VoyageState::Started);
}

#[test]
fn start_precheck_blocks_committed_crew() {
    let server = MockGameServer {
        available: (2..=12).collect(),
        ..Default::default()
    };
    let mut ctrl = VoyageController::new(server);

    let err = ctrl
        .start("voyage_1", 5, None, &crew_ids(), &roster())
        .unwrap_err();
    match err {
        ControllerError::CrewActive { crew_id, name } => {
            assert_eq!(crew_id, 1);
            assert_eq!(name, "crew 1");
        }
        other => panic!("expected CrewActive, got {other}"),
    }
    // The start command never went out.
    assert!(ctrl.server().commands.is_empty());
}
