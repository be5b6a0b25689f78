use crate::{
    AgentError, BattleReport, FlowEvent, InputDevice, RetryPolicy, RunStatus, SupportPick,
    SupportSelector, TurnExecutor, TurnSource, Vision,
};
use grail_core::{should_consume_resupply, AgentConfig, BattleRecord, Point, Turn};
use std::time::Duration;
use tracing::{info, warn};

fn sleep_ms(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Every mutable counter of a session, in one place with one writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    pub wave: u32,
    pub turn: u32,
    pub runs: u32,
    pub resupply_used: u32,
    pub waves_cleared: u32,
    pub turns_played: u32,
    pub planned_turns: u32,
    pub auto_turns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    NextTurn,
    WaveCleared,
    BattleEnded,
}

/// Walks a decoded plan across turns, waves and post-battle dialogs.
///
/// The derived turn sequence is consumed through a flat cursor that only
/// moves forward; the per-wave turn counter restarts at wave transitions and
/// exists for signals and reporting. An exhausted cursor (or a turn with no
/// usable actions) falls back to the auto-battle heuristic for that turn.
pub struct BattleRunner<D: InputDevice, V: Vision> {
    device: D,
    vision: V,
    config: AgentConfig,
    record: BattleRecord,
    retry: RetryPolicy,
    counters: Counters,
    cursor: usize,
    events: Vec<FlowEvent>,
}

impl<D: InputDevice, V: Vision> BattleRunner<D, V> {
    pub fn new(device: D, vision: V, config: AgentConfig, record: BattleRecord) -> Self {
        let retry = RetryPolicy::with_backoff(3, config.timing.retry_backoff_ms);
        Self {
            device,
            vision,
            config,
            record,
            retry,
            counters: Counters::default(),
            cursor: 0,
            events: Vec::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Runs the session to completion and hands back the report.
    pub fn run(mut self) -> Result<BattleReport, AgentError> {
        info!(
            plan = self.record.id,
            quest = self.record.quest_id,
            turns = self.record.turns().len(),
            "plan loaded"
        );
        self.events.push(FlowEvent::PlanLoaded {
            turns: self.record.turns().len(),
        });

        let status = loop {
            self.run_battle()?;
            if let Some(status) = self.post_battle()? {
                break status;
            }
        };

        self.events.push(FlowEvent::Quit { status });
        info!(
            ?status,
            runs = self.counters.runs,
            turns = self.counters.turns_played,
            resupply = self.counters.resupply_used,
            "automation finished"
        );
        Ok(self.into_report(status))
    }

    fn run_battle(&mut self) -> Result<(), AgentError> {
        self.counters.runs += 1;
        self.counters.wave = 1;
        self.counters.turn = 0;
        info!(run = self.counters.runs, "battle started");

        loop {
            self.counters.turn += 1;
            self.play_turn()?;
            match self.await_resolution() {
                Resolution::NextTurn => {}
                Resolution::WaveCleared => {
                    let cleared = self.counters.wave;
                    self.counters.waves_cleared += 1;
                    self.events.push(FlowEvent::WaveCleared { wave: cleared });
                    self.counters.wave += 1;
                    self.counters.turn = 0;
                    sleep_ms(self.config.timing.wave_transition_ms);
                    if self.counters.wave > self.config.battle.max_waves.max(1) {
                        warn!(
                            wave = self.counters.wave,
                            max = self.config.battle.max_waves,
                            "wave counter past configured max, treating battle as over"
                        );
                        return Ok(());
                    }
                }
                Resolution::BattleEnded => {
                    self.events.push(FlowEvent::BattleEnded {
                        run: self.counters.runs,
                    });
                    return Ok(());
                }
            }
        }
    }

    fn play_turn(&mut self) -> Result<(), AgentError> {
        let planned: Option<Turn> = match self.record.turn(self.cursor) {
            Some(turn) if !turn.is_empty() => {
                let turn = turn.clone();
                self.cursor += 1;
                Some(turn)
            }
            Some(_) => {
                self.cursor += 1;
                warn!(
                    wave = self.counters.wave,
                    turn = self.counters.turn,
                    "planned turn holds no usable actions, falling back to auto battle"
                );
                None
            }
            None => None,
        };

        let retry = self.retry;
        let source;
        let card_taps;
        match planned {
            Some(turn) => {
                source = TurnSource::Planned;
                self.counters.planned_turns += 1;
                let cast = retry.run("skill phase", || {
                    TurnExecutor::new(
                        &mut self.device,
                        &mut self.vision,
                        &self.config.positions,
                        &self.config.timing,
                    )
                    .skill_phase(&turn)
                });
                if cast.is_none() {
                    self.events.push(FlowEvent::PhaseAbandoned {
                        op: "skill phase".into(),
                    });
                }
                let picks = retry.run("attack phase", || {
                    TurnExecutor::new(
                        &mut self.device,
                        &mut self.vision,
                        &self.config.positions,
                        &self.config.timing,
                    )
                    .attack_phase(&turn)
                });
                if picks.is_none() {
                    self.events.push(FlowEvent::PhaseAbandoned {
                        op: "attack phase".into(),
                    });
                }
                card_taps = picks.unwrap_or(0);
            }
            None => {
                source = TurnSource::Auto;
                self.counters.auto_turns += 1;
                let picks = retry.run("auto battle", || {
                    TurnExecutor::new(
                        &mut self.device,
                        &mut self.vision,
                        &self.config.positions,
                        &self.config.timing,
                    )
                    .auto_turn()
                });
                if picks.is_none() {
                    self.events.push(FlowEvent::PhaseAbandoned {
                        op: "auto battle".into(),
                    });
                }
                card_taps = picks.unwrap_or(0);
            }
        }

        self.counters.turns_played += 1;
        self.events.push(FlowEvent::TurnPlayed {
            run: self.counters.runs,
            wave: self.counters.wave,
            turn: self.counters.turn,
            source,
            card_taps,
        });
        Ok(())
    }

    /// Waits out the settle delay, then asks vision what happened. The two
    /// signals are mutually exclusive; the wave check has priority. A failed
    /// check degrades to "same wave" since later checks self-correct.
    fn await_resolution(&mut self) -> Resolution {
        sleep_ms(self.config.timing.resolution_settle_ms);
        match self.vision.wave_transition_visible() {
            Ok(true) => return Resolution::WaveCleared,
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, "wave check failed, assuming same wave");
                return Resolution::NextTurn;
            }
        }
        match self.vision.battle_end_visible() {
            Ok(true) => Resolution::BattleEnded,
            Ok(false) => Resolution::NextTurn,
            Err(err) => {
                warn!(error = %err, "battle end check failed, assuming same wave");
                Resolution::NextTurn
            }
        }
    }

    /// Dismisses the result screens and decides whether the quest repeats.
    /// `None` means the next run is already set up.
    fn post_battle(&mut self) -> Result<Option<RunStatus>, AgentError> {
        let retry = self.retry;
        let taps = self.config.battle.result_taps;
        let dismissed = retry.run("result dialogs", || {
            for _ in 0..taps {
                self.device.tap(self.config.positions.result_tap)?;
                sleep_ms(self.config.timing.result_tap_interval_ms);
            }
            Ok(taps)
        });
        match dismissed {
            Some(taps) => self.events.push(FlowEvent::DialogsDismissed { taps }),
            None => self.events.push(FlowEvent::PhaseAbandoned {
                op: "result dialogs".into(),
            }),
        }

        let continue_visible = match self.vision.continue_prompt_visible() {
            Ok(visible) => visible,
            Err(err) => {
                warn!(error = %err, "continue prompt check failed, assuming absent");
                false
            }
        };
        if !continue_visible {
            return Ok(Some(RunStatus::Completed));
        }
        if !self.config.battle.auto_repeat {
            self.tap_checked("continue decline", self.config.positions.continue_decline);
            return Ok(Some(RunStatus::Completed));
        }
        let max_runs = self.config.battle.max_runs;
        if max_runs > 0 && self.counters.runs >= max_runs {
            info!(runs = self.counters.runs, "run cap reached, declining continue");
            self.tap_checked("continue decline", self.config.positions.continue_decline);
            return Ok(Some(RunStatus::RunLimit));
        }

        self.tap_checked("continue prompt", self.config.positions.continue_accept);
        self.counters.wave = 1;
        self.counters.turn = 0;
        self.events.push(FlowEvent::ContinueAccepted {
            run: self.counters.runs + 1,
        });
        sleep_ms(self.config.timing.dialog_settle_ms);

        let ap_low = match self.vision.ap_insufficient_visible() {
            Ok(visible) => visible,
            Err(err) => {
                warn!(error = %err, "stamina prompt check failed, assuming absent");
                false
            }
        };
        if ap_low {
            if should_consume_resupply(
                self.counters.resupply_used,
                self.config.battle.resupply_limit,
                self.config.battle.auto_resupply,
            ) {
                let tier = self.config.battle.resupply_tier;
                let consumed = retry.run("resupply dialog", || {
                    self.device.tap(self.config.positions.resupply_item(tier))?;
                    sleep_ms(self.config.timing.dialog_settle_ms);
                    self.device.tap(self.config.positions.ap_confirm)
                });
                match consumed {
                    Some(()) => {
                        self.counters.resupply_used += 1;
                        self.events.push(FlowEvent::ResupplyConsumed {
                            used: self.counters.resupply_used,
                        });
                    }
                    None => self.events.push(FlowEvent::PhaseAbandoned {
                        op: "resupply dialog".into(),
                    }),
                }
            } else {
                info!(
                    used = self.counters.resupply_used,
                    limit = self.config.battle.resupply_limit,
                    "stamina out and resupply declined, quitting quest"
                );
                self.tap_checked("quit quest", self.config.positions.ap_cancel);
                return Ok(Some(RunStatus::ApExhausted));
            }
        }

        if self.config.support.enabled {
            let pick = retry.run("support selection", || {
                SupportSelector::new(
                    &mut self.device,
                    &mut self.vision,
                    &self.config.positions,
                    &self.config.timing,
                    &self.config.support,
                )
                .select()
            });
            match pick {
                Some(pick) => self.events.push(FlowEvent::SupportPicked {
                    fallback: pick == SupportPick::Fallback,
                }),
                None => self.events.push(FlowEvent::PhaseAbandoned {
                    op: "support selection".into(),
                }),
            }
        }

        self.cursor = 0;
        Ok(None)
    }

    fn tap_checked(&mut self, op: &str, point: Point) {
        let retry = self.retry;
        if retry.run(op, || self.device.tap(point)).is_none() {
            self.events.push(FlowEvent::PhaseAbandoned { op: op.into() });
        }
    }

    fn into_report(self, status: RunStatus) -> BattleReport {
        BattleReport {
            status,
            runs: self.counters.runs,
            waves_cleared: self.counters.waves_cleared,
            turns_played: self.counters.turns_played,
            planned_turns: self.counters.planned_turns,
            auto_turns: self.counters.auto_turns,
            resupply_used: self.counters.resupply_used,
            events: self.events,
        }
    }
}
