use serde::{Deserialize, Serialize};
use tracing::warn;

/// Color of an ordinary command card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Buster,
    Arts,
    Quick,
}

/// One card selection inside an attack action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attack {
    pub svt: usize,
    pub card: usize,
    #[serde(rename = "isTD")]
    pub is_np: bool,
    pub critical: bool,
    #[serde(rename = "cardType")]
    pub kind: CardKind,
}

/// Targeting data shared by skill and attack records. -1 means "no target".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionOptions {
    pub player_target: i64,
    pub enemy_target: i64,
    pub random: i64,
    pub threshold: i64,
}

impl ActionOptions {
    pub fn player_target(&self) -> Option<usize> {
        usize::try_from(self.player_target).ok()
    }

    pub fn enemy_target(&self) -> Option<usize> {
        usize::try_from(self.enemy_target).ok()
    }
}

/// Skill cast. A missing `svt` marks a mystic-code (master) skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillAction {
    pub skill: usize,
    #[serde(default)]
    pub svt: Option<usize>,
    #[serde(default)]
    pub options: Option<ActionOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttackAction {
    pub attacks: Vec<Attack>,
    #[serde(default)]
    pub options: Option<ActionOptions>,
}

/// One record of the flat, chronologically-ordered action log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawAction {
    Skill(SkillAction),
    Attack(AttackAction),
    #[serde(other)]
    Unknown,
}

/// Actions of one battle turn, in cast order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub number: u32,
    pub skills: Vec<SkillAction>,
    pub attacks: Vec<AttackAction>,
}

impl Turn {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.attacks.is_empty()
    }
}

/// Groups the flat action log into turns.
///
/// A skill record opens a new turn only when the running turn already holds
/// at least one attack; attack records never close a turn on their own.
pub fn decode_turns(actions: &[RawAction]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut skills: Vec<SkillAction> = Vec::new();
    let mut attacks: Vec<AttackAction> = Vec::new();
    let mut number = 1u32;

    for (index, action) in actions.iter().enumerate() {
        match action {
            RawAction::Skill(skill) => {
                if !attacks.is_empty() {
                    turns.push(Turn {
                        number,
                        skills: std::mem::take(&mut skills),
                        attacks: std::mem::take(&mut attacks),
                    });
                    number += 1;
                }
                skills.push(skill.clone());
            }
            RawAction::Attack(attack) => attacks.push(attack.clone()),
            RawAction::Unknown => {
                warn!(index, "skipping action record with unrecognized tag");
            }
        }
    }

    if !skills.is_empty() || !attacks.is_empty() {
        turns.push(Turn {
            number,
            skills,
            attacks,
        });
    }
    turns
}
