use crate::{AgentError, InputDevice, Vision};
use grail_core::{Positions, SupportOptions, Timing};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// One search target, evaluated strictly in priority order: named servant,
/// then named craft essence, then named skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SupportCriterion {
    Servant(String),
    CraftEssence(String),
    Skill(String),
}

impl SupportCriterion {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Servant(_) => "servant",
            Self::CraftEssence(_) => "craft_essence",
            Self::Skill(_) => "skill",
        }
    }
}

pub fn criteria_from(options: &SupportOptions) -> Vec<SupportCriterion> {
    let mut criteria = Vec::new();
    if let Some(name) = options.servant.as_ref() {
        criteria.push(SupportCriterion::Servant(name.clone()));
    }
    if let Some(name) = options.craft_essence.as_ref() {
        criteria.push(SupportCriterion::CraftEssence(name.clone()));
    }
    if let Some(name) = options.skill.as_ref() {
        criteria.push(SupportCriterion::Skill(name.clone()));
    }
    criteria
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportPick {
    Matched { row: usize },
    /// Every page was searched; the first visible entry was taken instead.
    Fallback,
}

/// Priority-ordered search over the scrollable support list. Degrades to a
/// default pick instead of failing; only transient collaborator errors
/// surface (for the caller's retry wrap).
pub struct SupportSelector<'a, D: InputDevice, V: Vision> {
    input: &'a mut D,
    vision: &'a mut V,
    positions: &'a Positions,
    timing: &'a Timing,
    options: &'a SupportOptions,
}

impl<'a, D: InputDevice, V: Vision> SupportSelector<'a, D, V> {
    pub fn new(
        input: &'a mut D,
        vision: &'a mut V,
        positions: &'a Positions,
        timing: &'a Timing,
        options: &'a SupportOptions,
    ) -> Self {
        Self {
            input,
            vision,
            positions,
            timing,
            options,
        }
    }

    fn settle(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    pub fn select(&mut self) -> Result<SupportPick, AgentError> {
        if let Some(class) = self.options.class_filter {
            self.input.tap(self.positions.support_class(class))?;
            self.settle(self.timing.dialog_settle_ms);
        }

        let criteria = criteria_from(self.options);
        if criteria.is_empty() {
            return self.pick_first("no criteria configured");
        }

        let mut scrolls = 0u32;
        let mut refreshed = false;
        loop {
            for criterion in &criteria {
                if let Some(row) = self.vision.find_support(criterion)? {
                    match self.positions.support_entry(row) {
                        Some(point) => {
                            self.input.tap(point)?;
                            info!(kind = criterion.label(), row, "support matched");
                            return Ok(SupportPick::Matched { row });
                        }
                        None => warn!(row, "matched support row out of range, ignored"),
                    }
                }
            }

            if scrolls < self.options.max_scrolls {
                self.input.swipe(
                    self.positions.support_scroll_from,
                    self.positions.support_scroll_to,
                    self.timing.support_scroll_ms,
                )?;
                scrolls += 1;
                self.settle(self.timing.support_scroll_ms);
            } else if self.options.allow_refresh && !refreshed {
                // Burns a refresh the caller does not account for.
                self.input.tap(self.positions.support_refresh)?;
                self.settle(self.timing.dialog_settle_ms);
                self.input.tap(self.positions.support_refresh_confirm)?;
                self.settle(self.timing.support_refresh_ms);
                scrolls = 0;
                refreshed = true;
            } else {
                break;
            }
        }

        self.pick_first("search exhausted")
    }

    fn pick_first(&mut self, reason: &str) -> Result<SupportPick, AgentError> {
        info!(reason, "taking first visible support entry");
        if let Some(point) = self.positions.support_entry(0) {
            self.input.tap(point)?;
        }
        Ok(SupportPick::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SimDevice, SimVision};

    fn options(max_scrolls: u32, allow_refresh: bool) -> SupportOptions {
        SupportOptions {
            enabled: true,
            servant: Some("Castoria".into()),
            craft_essence: None,
            skill: None,
            class_filter: None,
            max_scrolls,
            allow_refresh,
        }
    }

    #[test]
    fn match_on_first_page_taps_the_row() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        vision.support_match_on_call = Some(0);
        vision.support_match_row = 1;
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = options(3, true);
        let pick = SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(pick, SupportPick::Matched { row: 1 });
        assert_eq!(device.taps, [positions.support_entry(1).unwrap()]);
        assert!(device.swipes.is_empty());
    }

    #[test]
    fn no_criteria_takes_first_entry_immediately() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = SupportOptions {
            servant: None,
            ..options(3, true)
        };
        let pick = SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(pick, SupportPick::Fallback);
        assert_eq!(device.taps, [positions.support_entry(0).unwrap()]);
        assert_eq!(vision.support_calls, 0);
    }

    #[test]
    fn exhausted_search_scrolls_refreshes_then_falls_back() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = options(2, true);
        let pick = SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(pick, SupportPick::Fallback);
        // pages: initial + 2 scrolls, refresh, initial + 2 scrolls again
        assert_eq!(vision.support_calls, 6);
        assert_eq!(device.swipes.len(), 4);
        // refresh button, refresh confirm, then the fallback entry
        assert_eq!(device.taps.len(), 3);
        assert_eq!(*device.taps.last().unwrap(), positions.support_entry(0).unwrap());
    }

    #[test]
    fn refresh_disallowed_stops_at_scroll_budget() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = options(3, false);
        let pick = SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(pick, SupportPick::Fallback);
        assert_eq!(vision.support_calls, 4);
        assert_eq!(device.swipes.len(), 3);
    }

    #[test]
    fn match_after_refresh_is_still_found() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        // initial page + 1 scroll = calls 0..=1 miss, refresh, hit on call 2
        vision.support_match_on_call = Some(2);
        vision.support_match_row = 0;
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = options(1, true);
        let pick = SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(pick, SupportPick::Matched { row: 0 });
    }

    #[test]
    fn class_filter_is_tapped_once_up_front() {
        let mut device = SimDevice::new();
        let mut vision = SimVision::new();
        vision.support_match_on_call = Some(0);
        let positions = Positions::default();
        let timing = Timing::immediate();
        let opts = SupportOptions {
            class_filter: Some(4),
            ..options(3, true)
        };
        SupportSelector::new(&mut device, &mut vision, &positions, &timing, &opts)
            .select()
            .unwrap();
        assert_eq!(device.taps[0], positions.support_class(4));
    }
}
