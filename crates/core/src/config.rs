use serde::{Deserialize, Serialize};

/// Field unit slots visible at once.
pub const FIELD_UNITS: usize = 3;
/// Skill buttons per field unit.
pub const UNIT_SKILLS: usize = 3;
/// Mystic-code skill buttons.
pub const MASTER_SKILLS: usize = 3;
/// Ordinary command cards dealt per turn.
pub const COMMAND_CARDS: usize = 5;
/// Targetable enemy slots.
pub const ENEMY_SLOTS: usize = 3;
/// Support list rows visible without scrolling.
pub const SUPPORT_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen coordinate table for a 1280x720 layout. Every derived lookup is
/// bounds-checked; `None` means the index has no tappable element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Positions {
    pub skill_origin: Point,
    pub unit_spacing_x: i32,
    pub skill_spacing_x: i32,
    pub master_menu: Point,
    pub master_skill_origin: Point,
    pub master_skill_spacing_x: i32,
    pub enemy_origin: Point,
    pub enemy_spacing_x: i32,
    pub player_target_origin: Point,
    pub player_target_spacing_x: i32,
    pub attack_button: Point,
    pub card_origin: Point,
    pub card_spacing_x: i32,
    pub np_origin: Point,
    pub np_spacing_x: i32,
    pub result_tap: Point,
    pub continue_accept: Point,
    pub continue_decline: Point,
    pub resupply_origin: Point,
    pub resupply_spacing_y: i32,
    pub ap_confirm: Point,
    pub ap_cancel: Point,
    pub support_entry_origin: Point,
    pub support_entry_spacing_y: i32,
    pub support_refresh: Point,
    pub support_refresh_confirm: Point,
    pub support_class_origin: Point,
    pub support_class_spacing_x: i32,
    pub support_scroll_from: Point,
    pub support_scroll_to: Point,
}

impl Default for Positions {
    fn default() -> Self {
        Self {
            skill_origin: Point::new(61, 594),
            unit_spacing_x: 317,
            skill_spacing_x: 100,
            master_menu: Point::new(1230, 290),
            master_skill_origin: Point::new(960, 290),
            master_skill_spacing_x: 85,
            enemy_origin: Point::new(40, 40),
            enemy_spacing_x: 210,
            player_target_origin: Point::new(300, 450),
            player_target_spacing_x: 320,
            attack_button: Point::new(1135, 600),
            card_origin: Point::new(110, 500),
            card_spacing_x: 255,
            np_origin: Point::new(330, 180),
            np_spacing_x: 300,
            result_tap: Point::new(640, 360),
            continue_accept: Point::new(835, 536),
            continue_decline: Point::new(450, 536),
            resupply_origin: Point::new(640, 220),
            resupply_spacing_y: 110,
            ap_confirm: Point::new(835, 536),
            ap_cancel: Point::new(450, 536),
            support_entry_origin: Point::new(640, 170),
            support_entry_spacing_y: 130,
            support_refresh: Point::new(930, 110),
            support_refresh_confirm: Point::new(835, 440),
            support_class_origin: Point::new(100, 110),
            support_class_spacing_x: 100,
            support_scroll_from: Point::new(640, 550),
            support_scroll_to: Point::new(640, 200),
        }
    }
}

impl Positions {
    pub fn skill_button(&self, unit: usize, skill: usize) -> Option<Point> {
        if unit >= FIELD_UNITS || skill >= UNIT_SKILLS {
            return None;
        }
        Some(Point::new(
            self.skill_origin.x
                + unit as i32 * self.unit_spacing_x
                + skill as i32 * self.skill_spacing_x,
            self.skill_origin.y,
        ))
    }

    pub fn master_skill(&self, skill: usize) -> Option<Point> {
        if skill >= MASTER_SKILLS {
            return None;
        }
        Some(Point::new(
            self.master_skill_origin.x + skill as i32 * self.master_skill_spacing_x,
            self.master_skill_origin.y,
        ))
    }

    pub fn enemy_target(&self, index: usize) -> Option<Point> {
        if index >= ENEMY_SLOTS {
            return None;
        }
        Some(Point::new(
            self.enemy_origin.x + index as i32 * self.enemy_spacing_x,
            self.enemy_origin.y,
        ))
    }

    pub fn player_target(&self, index: usize) -> Option<Point> {
        if index >= FIELD_UNITS {
            return None;
        }
        Some(Point::new(
            self.player_target_origin.x + index as i32 * self.player_target_spacing_x,
            self.player_target_origin.y,
        ))
    }

    pub fn command_card(&self, slot: usize) -> Option<Point> {
        if slot >= COMMAND_CARDS {
            return None;
        }
        Some(Point::new(
            self.card_origin.x + slot as i32 * self.card_spacing_x,
            self.card_origin.y,
        ))
    }

    pub fn np_card(&self, unit: usize) -> Option<Point> {
        if unit >= FIELD_UNITS {
            return None;
        }
        Some(Point::new(
            self.np_origin.x + unit as i32 * self.np_spacing_x,
            self.np_origin.y,
        ))
    }

    pub fn resupply_item(&self, tier: ResupplyTier) -> Point {
        Point::new(
            self.resupply_origin.x,
            self.resupply_origin.y + tier.row() as i32 * self.resupply_spacing_y,
        )
    }

    pub fn support_entry(&self, row: usize) -> Option<Point> {
        if row >= SUPPORT_ROWS {
            return None;
        }
        Some(Point::new(
            self.support_entry_origin.x,
            self.support_entry_origin.y + row as i32 * self.support_entry_spacing_y,
        ))
    }

    pub fn support_class(&self, index: usize) -> Point {
        Point::new(
            self.support_class_origin.x + index as i32 * self.support_class_spacing_x,
            self.support_class_origin.y,
        )
    }
}

/// Phase delays in milliseconds. Fixed sleeps stand in for animation-complete
/// events the game never exposes; the desync risk is accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timing {
    pub skill_settle_ms: u64,
    pub master_menu_ms: u64,
    pub target_menu_ms: u64,
    pub attack_menu_ms: u64,
    pub card_interval_ms: u64,
    pub resolution_settle_ms: u64,
    pub wave_transition_ms: u64,
    pub result_tap_interval_ms: u64,
    pub dialog_settle_ms: u64,
    pub support_scroll_ms: u64,
    pub support_refresh_ms: u64,
    pub retry_backoff_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            skill_settle_ms: 1500,
            master_menu_ms: 400,
            target_menu_ms: 300,
            attack_menu_ms: 800,
            card_interval_ms: 300,
            resolution_settle_ms: 2000,
            wave_transition_ms: 3000,
            result_tap_interval_ms: 800,
            dialog_settle_ms: 600,
            support_scroll_ms: 500,
            support_refresh_ms: 1000,
            retry_backoff_ms: 1000,
        }
    }
}

impl Timing {
    /// All delays zeroed. For simulated replays and tests.
    pub fn immediate() -> Self {
        Self {
            skill_settle_ms: 0,
            master_menu_ms: 0,
            target_menu_ms: 0,
            attack_menu_ms: 0,
            card_interval_ms: 0,
            resolution_settle_ms: 0,
            wave_transition_ms: 0,
            result_tap_interval_ms: 0,
            dialog_settle_ms: 0,
            support_scroll_ms: 0,
            support_refresh_ms: 0,
            retry_backoff_ms: 0,
        }
    }
}

/// Stamina resupply item, best first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResupplyTier {
    GoldenApple,
    SilverApple,
    BronzeApple,
    SaintQuartz,
}

impl ResupplyTier {
    /// Row inside the stamina-recovery dialog list.
    pub fn row(self) -> usize {
        match self {
            Self::SaintQuartz => 0,
            Self::GoldenApple => 1,
            Self::SilverApple => 2,
            Self::BronzeApple => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BattleOptions {
    pub auto_repeat: bool,
    pub auto_resupply: bool,
    pub resupply_tier: ResupplyTier,
    /// Resupply uses allowed per session; 0 means unlimited.
    pub resupply_limit: u32,
    pub max_waves: u32,
    /// Quest runs allowed per session; 0 means unlimited.
    pub max_runs: u32,
    pub result_taps: u32,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            auto_repeat: true,
            auto_resupply: false,
            resupply_tier: ResupplyTier::GoldenApple,
            resupply_limit: 0,
            max_waves: 3,
            max_runs: 0,
            result_taps: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportOptions {
    pub enabled: bool,
    #[serde(default)]
    pub servant: Option<String>,
    #[serde(default)]
    pub craft_essence: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub class_filter: Option<usize>,
    pub max_scrolls: u32,
    pub allow_refresh: bool,
}

impl Default for SupportOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            servant: None,
            craft_essence: None,
            skill: None,
            class_filter: None,
            max_scrolls: 3,
            allow_refresh: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub positions: Positions,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub battle: BattleOptions,
    #[serde(default)]
    pub support: SupportOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_lookup_is_bounds_checked() {
        let positions = Positions::default();
        assert!(positions.skill_button(2, 2).is_some());
        assert!(positions.skill_button(3, 0).is_none());
        assert!(positions.skill_button(0, 3).is_none());
    }

    #[test]
    fn card_slots_are_laid_out_left_to_right() {
        let positions = Positions::default();
        let first = positions.command_card(0).unwrap();
        let last = positions.command_card(4).unwrap();
        assert!(first.x < last.x);
        assert!(positions.command_card(5).is_none());
    }

    #[test]
    fn immediate_timing_has_no_delays() {
        let timing = Timing::immediate();
        assert_eq!(timing.skill_settle_ms, 0);
        assert_eq!(timing.resolution_settle_ms, 0);
        assert_eq!(timing.retry_backoff_ms, 0);
    }
}
