use crate::AgentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStatus {
    /// Battle ended and the quest was not (or could not be) repeated.
    Completed,
    /// Stamina ran out and the resupply policy declined to spend an item.
    ApExhausted,
    /// The configured run cap was reached.
    RunLimit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnSource {
    Planned,
    Auto,
}

/// Lifecycle trace of one automation session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FlowEvent {
    PlanLoaded { turns: usize },
    TurnPlayed {
        run: u32,
        wave: u32,
        turn: u32,
        source: TurnSource,
        card_taps: usize,
    },
    PhaseAbandoned { op: String },
    WaveCleared { wave: u32 },
    BattleEnded { run: u32 },
    DialogsDismissed { taps: u32 },
    ContinueAccepted { run: u32 },
    ResupplyConsumed { used: u32 },
    SupportPicked { fallback: bool },
    Quit { status: RunStatus },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleReport {
    pub status: RunStatus,
    pub runs: u32,
    pub waves_cleared: u32,
    pub turns_played: u32,
    pub planned_turns: u32,
    pub auto_turns: u32,
    pub resupply_used: u32,
    pub events: Vec<FlowEvent>,
}

impl BattleReport {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!("status/状态: {}", status_label(self.status)),
            format!(
                "summary/汇总: runs/周回={} waves/波次={} turns/回合={} (planned/按谱={} auto/自动={}) resupply/回复={}",
                self.runs,
                self.waves_cleared,
                self.turns_played,
                self.planned_turns,
                self.auto_turns,
                self.resupply_used
            ),
            String::new(),
            "events/事件:".to_string(),
        ];
        for event in &self.events {
            lines.push(format!("  {}", event_line(event)));
        }
        lines.join("\n")
    }
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Completed => "Completed/完成",
        RunStatus::ApExhausted => "ApExhausted/体力耗尽",
        RunStatus::RunLimit => "RunLimit/达到周回上限",
    }
}

fn event_line(event: &FlowEvent) -> String {
    match event {
        FlowEvent::PlanLoaded { turns } => format!("plan loaded/读谱: turns/回合数={turns}"),
        FlowEvent::TurnPlayed {
            run,
            wave,
            turn,
            source,
            card_taps,
        } => {
            let source = match source {
                TurnSource::Planned => "planned/按谱",
                TurnSource::Auto => "auto/自动",
            };
            format!("run/周回 {run} wave/波次 {wave} turn/回合 {turn} | {source} | cards/出卡={card_taps}")
        }
        FlowEvent::PhaseAbandoned { op } => format!("phase abandoned/放弃阶段: {op}"),
        FlowEvent::WaveCleared { wave } => format!("wave cleared/波次结束: {wave}"),
        FlowEvent::BattleEnded { run } => format!("battle ended/战斗结束: run/周回 {run}"),
        FlowEvent::DialogsDismissed { taps } => {
            format!("result dialogs dismissed/结算点击: taps/点击={taps}")
        }
        FlowEvent::ContinueAccepted { run } => {
            format!("continue accepted/继续周回: next run/下一轮 {run}")
        }
        FlowEvent::ResupplyConsumed { used } => {
            format!("resupply consumed/回复体力: total/累计={used}")
        }
        FlowEvent::SupportPicked { fallback } => {
            if *fallback {
                "support picked/选择助战: fallback/默认首位".to_string()
            } else {
                "support picked/选择助战: matched/命中目标".to_string()
            }
        }
        FlowEvent::Quit { status } => format!("quit/结束: {}", status_label(*status)),
    }
}

pub fn write_json(path: &Path, report: &BattleReport) -> Result<(), AgentError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}
