use crate::{AgentError, InputDevice, Vision};
use grail_core::{Positions, SkillAction, Timing, Turn, COMMAND_CARDS};
use std::time::Duration;
use tracing::{debug, warn};

/// Hard cap on card selections per attack phase.
pub const MAX_CARD_PICKS: usize = 3;

/// Executes one turn's skill and attack phases against the touch device.
/// Transient collaborator failures propagate so the caller can retry the
/// whole phase; malformed plan entries are logged and skipped in place.
pub struct TurnExecutor<'a, D: InputDevice, V: Vision> {
    input: &'a mut D,
    vision: &'a mut V,
    positions: &'a Positions,
    timing: &'a Timing,
}

impl<'a, D: InputDevice, V: Vision> TurnExecutor<'a, D, V> {
    pub fn new(
        input: &'a mut D,
        vision: &'a mut V,
        positions: &'a Positions,
        timing: &'a Timing,
    ) -> Self {
        Self {
            input,
            vision,
            positions,
            timing,
        }
    }

    fn settle(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    /// Casts the turn's skills in order. Returns how many were cast.
    pub fn skill_phase(&mut self, turn: &Turn) -> Result<usize, AgentError> {
        let mut cast = 0usize;
        for (index, skill) in turn.skills.iter().enumerate() {
            if self.cast_skill(index, skill)? {
                cast += 1;
            }
        }
        Ok(cast)
    }

    fn cast_skill(&mut self, index: usize, skill: &SkillAction) -> Result<bool, AgentError> {
        if let Some(enemy) = skill.options.as_ref().and_then(|o| o.enemy_target()) {
            match self.positions.enemy_target(enemy) {
                Some(point) => self.input.tap(point)?,
                None => warn!(index, enemy, "enemy target out of range, tap skipped"),
            }
        }

        let button = match skill.svt {
            Some(unit) => self.positions.skill_button(unit, skill.skill),
            None => {
                self.input.tap(self.positions.master_menu)?;
                self.settle(self.timing.master_menu_ms);
                self.positions.master_skill(skill.skill)
            }
        };
        let Some(button) = button else {
            warn!(
                index,
                unit = ?skill.svt,
                slot = skill.skill,
                "skill slot out of range, cast skipped"
            );
            return Ok(false);
        };
        self.input.tap(button)?;

        if let Some(target) = skill.options.as_ref().and_then(|o| o.player_target()) {
            self.settle(self.timing.target_menu_ms);
            match self.positions.player_target(target) {
                Some(point) => self.input.tap(point)?,
                None => warn!(index, target, "player target out of range, tap skipped"),
            }
        }

        // No animation-complete signal exists; a fixed settle has to do.
        self.settle(self.timing.skill_settle_ms);
        Ok(true)
    }

    /// Opens card selection and picks cards for the turn. Returns the number
    /// of cards picked (always topped up to the cap via backfill).
    pub fn attack_phase(&mut self, turn: &Turn) -> Result<usize, AgentError> {
        self.input.tap(self.positions.attack_button)?;
        self.settle(self.timing.attack_menu_ms);

        let mut picks = 0usize;
        let mut used = [false; COMMAND_CARDS];

        if let Some(action) = turn.attacks.first() {
            if let Some(enemy) = action.options.as_ref().and_then(|o| o.enemy_target()) {
                match self.positions.enemy_target(enemy) {
                    Some(point) => self.input.tap(point)?,
                    None => warn!(enemy, "enemy target out of range, tap skipped"),
                }
            }

            for (index, attack) in action.attacks.iter().enumerate() {
                if picks >= MAX_CARD_PICKS {
                    warn!(
                        ignored = action.attacks.len() - index,
                        "attack entries beyond the pick cap ignored"
                    );
                    break;
                }
                let point = if attack.is_np {
                    self.positions.np_card(attack.svt)
                } else {
                    self.positions.command_card(attack.card)
                };
                let Some(point) = point else {
                    warn!(
                        index,
                        unit = attack.svt,
                        card = attack.card,
                        np = attack.is_np,
                        "card slot out of range, pick skipped"
                    );
                    continue;
                };
                self.input.tap(point)?;
                if !attack.is_np {
                    used[attack.card] = true;
                }
                picks += 1;
                self.settle(self.timing.card_interval_ms);
            }
        }
        if turn.attacks.len() > 1 {
            warn!(
                extra = turn.attacks.len() - 1,
                "extra attack actions in one turn ignored"
            );
        }

        self.backfill(&mut picks, &mut used)?;
        Ok(picks)
    }

    /// Heuristic turn for plans with no data: fire every charged noble
    /// phantasm, then advantaged cards, then whatever is leftmost.
    pub fn auto_turn(&mut self) -> Result<usize, AgentError> {
        let ready = self.vision.ready_noble_phantasms()?;
        debug!(ready = ?ready, "auto battle turn");

        self.input.tap(self.positions.attack_button)?;
        self.settle(self.timing.attack_menu_ms);

        let mut picks = 0usize;
        let mut used = [false; COMMAND_CARDS];

        for unit in ready {
            if picks >= MAX_CARD_PICKS {
                break;
            }
            match self.positions.np_card(unit) {
                Some(point) => {
                    self.input.tap(point)?;
                    picks += 1;
                    self.settle(self.timing.card_interval_ms);
                }
                None => warn!(unit, "noble phantasm slot out of range, skipped"),
            }
        }

        if picks < MAX_CARD_PICKS {
            for slot in self.vision.advantage_cards()? {
                if picks >= MAX_CARD_PICKS {
                    break;
                }
                if slot >= COMMAND_CARDS || used[slot] {
                    continue;
                }
                let Some(point) = self.positions.command_card(slot) else {
                    continue;
                };
                self.input.tap(point)?;
                used[slot] = true;
                picks += 1;
                self.settle(self.timing.card_interval_ms);
            }
        }

        self.backfill(&mut picks, &mut used)?;
        Ok(picks)
    }

    // Left-to-right top-up; not card-availability-aware.
    fn backfill(
        &mut self,
        picks: &mut usize,
        used: &mut [bool; COMMAND_CARDS],
    ) -> Result<(), AgentError> {
        let mut slot = 0usize;
        while *picks < MAX_CARD_PICKS && slot < COMMAND_CARDS {
            if !used[slot] {
                if let Some(point) = self.positions.command_card(slot) {
                    self.input.tap(point)?;
                    used[slot] = true;
                    *picks += 1;
                    self.settle(self.timing.card_interval_ms);
                }
            }
            slot += 1;
        }
        Ok(())
    }
}
