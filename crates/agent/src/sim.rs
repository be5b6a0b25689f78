use crate::{AgentError, Frame, InputDevice, SupportCriterion, Vision};
use grail_core::Point;

/// What the scripted screen shows after each turn resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimResolution {
    NextTurn,
    WaveCleared,
    BattleEnded,
}

/// Input device double: acknowledges every gesture and records it. A scripted
/// failure budget lets tests exercise the retry paths.
#[derive(Debug, Default)]
pub struct SimDevice {
    pub taps: Vec<Point>,
    pub swipes: Vec<(Point, Point, u64)>,
    /// Upcoming tap calls that fail before anything is recorded.
    pub fail_taps: u32,
}

impl SimDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputDevice for SimDevice {
    fn tap(&mut self, point: Point) -> Result<(), AgentError> {
        if self.fail_taps > 0 {
            self.fail_taps -= 1;
            return Err(AgentError::Device("scripted tap failure".into()));
        }
        self.taps.push(point);
        Ok(())
    }

    fn swipe(&mut self, from: Point, to: Point, duration_ms: u64) -> Result<(), AgentError> {
        self.swipes.push((from, to, duration_ms));
        Ok(())
    }
}

/// Vision double driven by a fixed resolution schedule, one entry per played
/// turn. An exhausted schedule reads as battle end so a mis-scripted test
/// cannot spin forever.
#[derive(Debug, Default)]
pub struct SimVision {
    schedule: Vec<SimResolution>,
    cursor: usize,
    /// Continue prompts still to be shown after battles.
    pub continue_prompts: u32,
    /// Stamina prompts still to be shown after accepting a continue.
    pub ap_prompts: u32,
    /// Wave checks that fail before the schedule is consulted again.
    pub fail_wave_checks: u32,
    pub ready_nps: Vec<usize>,
    pub advantage: Vec<usize>,
    /// 0-based `find_support` call on which the match appears.
    pub support_match_on_call: Option<u32>,
    pub support_match_row: usize,
    pub support_calls: u32,
}

impl SimVision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one quest run: `turns_per_wave[i]` turns in wave i, a wave
    /// transition between waves and a battle end after the last.
    pub fn script_run(&mut self, turns_per_wave: &[u32]) {
        let waves = turns_per_wave.len();
        for (index, turns) in turns_per_wave.iter().enumerate() {
            for _ in 1..(*turns).max(1) {
                self.schedule.push(SimResolution::NextTurn);
            }
            if index + 1 == waves {
                self.schedule.push(SimResolution::BattleEnded);
            } else {
                self.schedule.push(SimResolution::WaveCleared);
            }
        }
    }

    /// Appends raw schedule entries.
    pub fn script(&mut self, entries: &[SimResolution]) {
        self.schedule.extend_from_slice(entries);
    }
}

impl Vision for SimVision {
    fn capture_frame(&mut self) -> Result<Frame, AgentError> {
        Ok(Frame::default())
    }

    fn match_template(
        &mut self,
        _frame: &Frame,
        _template: &str,
        _threshold: f64,
    ) -> Result<Option<Point>, AgentError> {
        Ok(None)
    }

    fn wave_transition_visible(&mut self) -> Result<bool, AgentError> {
        if self.fail_wave_checks > 0 {
            self.fail_wave_checks -= 1;
            return Err(AgentError::Vision("scripted wave check failure".into()));
        }
        match self.schedule.get(self.cursor) {
            Some(SimResolution::WaveCleared) => {
                self.cursor += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn battle_end_visible(&mut self) -> Result<bool, AgentError> {
        match self.schedule.get(self.cursor) {
            Some(SimResolution::BattleEnded) => {
                self.cursor += 1;
                Ok(true)
            }
            Some(SimResolution::NextTurn) => {
                self.cursor += 1;
                Ok(false)
            }
            Some(SimResolution::WaveCleared) => Ok(false),
            None => Ok(true),
        }
    }

    fn continue_prompt_visible(&mut self) -> Result<bool, AgentError> {
        if self.continue_prompts > 0 {
            self.continue_prompts -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn ap_insufficient_visible(&mut self) -> Result<bool, AgentError> {
        if self.ap_prompts > 0 {
            self.ap_prompts -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn ready_noble_phantasms(&mut self) -> Result<Vec<usize>, AgentError> {
        Ok(self.ready_nps.clone())
    }

    fn advantage_cards(&mut self) -> Result<Vec<usize>, AgentError> {
        Ok(self.advantage.clone())
    }

    fn find_support(&mut self, _criterion: &SupportCriterion) -> Result<Option<usize>, AgentError> {
        let call = self.support_calls;
        self.support_calls += 1;
        if self.support_match_on_call == Some(call) {
            Ok(Some(self.support_match_row))
        } else {
            Ok(None)
        }
    }
}
