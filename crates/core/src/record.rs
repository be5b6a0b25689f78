use crate::plan::{decode_turns, RawAction, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan document parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Community vote block attached to a shared plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Votes {
    #[serde(default)]
    pub up: Option<i64>,
    #[serde(default)]
    pub down: Option<i64>,
    #[serde(default)]
    pub mine: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRef {
    pub id: i64,
    pub phase: i64,
    pub enemy_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOptions {
    pub mighty_chain: bool,
    pub disable_event: bool,
    pub simulate_ai: bool,
    #[serde(default)]
    pub point_buffs: Option<Value>,
    #[serde(default)]
    pub enemy_rate_up: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticCode {
    pub mystic_code_id: i64,
    pub level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldServant {
    pub svt_id: i64,
    pub limit_count: i64,
    pub skill_ids: Vec<i64>,
    pub skill_lvs: Vec<i64>,
    pub td_id: i64,
    pub td_lv: i64,
    pub lv: i64,
    pub atk_fou: i64,
    pub hp_fou: i64,
    pub support_type: String,
    #[serde(default)]
    pub ce_id: Option<i64>,
    #[serde(default)]
    pub ce_limit_break: Option<bool>,
    #[serde(default)]
    pub ce_lv: Option<i64>,
    #[serde(default)]
    pub append_lvs: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub mystic_code: MysticCode,
    pub on_field_svts: Vec<FieldServant>,
    #[serde(default)]
    pub backup_svts: Vec<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub min_build: i64,
    pub app_build: i64,
    pub quest: QuestRef,
    pub options: PlanOptions,
    pub team: Team,
    /// Opaque replay payload of the upstream simulator; carried, never read.
    #[serde(default)]
    pub delegate: Value,
    pub is_crit_team: bool,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataWrapper {
    pub result: PlanResult,
}

/// Persisted plan document, exactly as the sharing service emits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub id: i64,
    pub ver: i64,
    pub app_ver: String,
    pub user_id: i64,
    pub quest_id: i64,
    pub phase: i64,
    pub enemy_hash: String,
    pub created_at: i64,
    pub content: String,
    pub username: String,
    pub votes: Votes,
    pub data: DataWrapper,
}

/// Battle-facing projection of a plan document. Turns are derived once at
/// construction and stay immutable for the rest of the battle.
#[derive(Debug, Clone)]
pub struct BattleRecord {
    pub id: i64,
    pub version: i64,
    pub quest_id: i64,
    pub username: String,
    pub team: Option<Team>,
    pub actions: Vec<RawAction>,
    turns: Vec<Turn>,
}

impl BattleRecord {
    pub fn new(document: PlanDocument) -> Self {
        let result = document.data.result;
        let turns = decode_turns(&result.actions);
        Self {
            id: document.id,
            version: document.ver,
            quest_id: document.quest_id,
            username: document.username,
            team: Some(result.team),
            actions: result.actions,
            turns,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, PlanError> {
        let document: PlanDocument = serde_json::from_str(raw)?;
        Ok(Self::new(document))
    }

    /// Builds a record straight from an action log. Used by dry runs and
    /// tests that have no full document on hand.
    pub fn from_actions(id: i64, quest_id: i64, actions: Vec<RawAction>) -> Self {
        let turns = decode_turns(&actions);
        Self {
            id,
            version: 1,
            quest_id,
            username: String::new(),
            team: None,
            actions,
            turns,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "id": 1001,
        "ver": 1,
        "appVer": "2.91.5",
        "userId": 77,
        "questId": 93040105,
        "phase": 3,
        "enemyHash": "a1b2c3",
        "createdAt": 1735689600,
        "content": "farming setup",
        "username": "ritsuka",
        "votes": { "up": 12, "down": 0, "mine": null },
        "data": {
            "result": {
                "minBuild": 1,
                "appBuild": 5,
                "quest": { "id": 93040105, "phase": 3, "enemyHash": "a1b2c3" },
                "options": { "mightyChain": true, "disableEvent": false, "simulateAi": false },
                "team": {
                    "mysticCode": { "mysticCodeId": 210, "level": 10 },
                    "onFieldSvts": [
                        {
                            "svtId": 500800, "limitCount": 4,
                            "skillIds": [1, 2, 3], "skillLvs": [10, 10, 10],
                            "tdId": 9, "tdLv": 5, "lv": 90,
                            "atkFou": 1000, "hpFou": 1000,
                            "supportType": "none",
                            "ceId": 9400340, "ceLimitBreak": true, "ceLv": 100
                        }
                    ],
                    "backupSvts": []
                },
                "delegate": {},
                "isCritTeam": false,
                "actions": [
                    { "type": "skill", "skill": 0, "svt": 0,
                      "options": { "playerTarget": -1, "enemyTarget": -1, "random": 0, "threshold": 0 } },
                    { "type": "attack",
                      "attacks": [ { "svt": 0, "card": 0, "isTD": true, "critical": false, "cardType": "buster" } ] },
                    { "type": "skill", "skill": 1, "svt": 1 },
                    { "type": "attack",
                      "attacks": [ { "svt": 1, "card": 2, "isTD": false, "critical": true, "cardType": "arts" } ] }
                ]
            }
        }
    }"#;

    #[test]
    fn fixture_parses_and_derives_turns() {
        let record = BattleRecord::from_json(FIXTURE).unwrap();
        assert_eq!(record.id, 1001);
        assert_eq!(record.quest_id, 93040105);
        assert_eq!(record.username, "ritsuka");
        assert_eq!(record.turns().len(), 2);
        assert_eq!(record.turn(0).unwrap().skills.len(), 1);
        assert_eq!(record.turn(1).unwrap().number, 2);
        assert!(record.turn(2).is_none());
        let team = record.team.as_ref().unwrap();
        assert_eq!(team.on_field_svts[0].svt_id, 500800);
    }

    #[test]
    fn missing_required_field_is_a_plan_error() {
        // no questId
        let raw = r#"{ "id": 1, "ver": 1, "appVer": "x", "userId": 1 }"#;
        assert!(matches!(
            BattleRecord::from_json(raw),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn empty_action_log_yields_no_turns() {
        let record = BattleRecord::from_actions(1, 2, Vec::new());
        assert!(record.turns().is_empty());
    }
}
