use crate::{AgentError, SupportCriterion};
use grail_core::Point;

/// Captured screen image. The agent never inspects pixels itself; frames are
/// only handed back to the vision collaborator.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Touch transport. Calls block until the gesture is acknowledged, which is
/// the only ordering guarantee the UI gets.
pub trait InputDevice {
    fn tap(&mut self, point: Point) -> Result<(), AgentError>;
    fn swipe(&mut self, from: Point, to: Point, duration_ms: u64) -> Result<(), AgentError>;
}

/// Screen reading. Implementations wrap the actual template matcher / OCR;
/// the agent only consumes their verdicts.
pub trait Vision {
    fn capture_frame(&mut self) -> Result<Frame, AgentError>;
    fn match_template(
        &mut self,
        frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<Point>, AgentError>;
    fn wave_transition_visible(&mut self) -> Result<bool, AgentError>;
    fn battle_end_visible(&mut self) -> Result<bool, AgentError>;
    fn continue_prompt_visible(&mut self) -> Result<bool, AgentError>;
    fn ap_insufficient_visible(&mut self) -> Result<bool, AgentError>;
    /// Unit slots whose noble phantasm gauge is full.
    fn ready_noble_phantasms(&mut self) -> Result<Vec<usize>, AgentError>;
    /// Ordinary card slots the matcher judges type-advantaged this turn.
    fn advantage_cards(&mut self) -> Result<Vec<usize>, AgentError>;
    /// Row of the first visible support entry matching the criterion.
    fn find_support(&mut self, criterion: &SupportCriterion) -> Result<Option<usize>, AgentError>;
}
