//! Built-in timer presets

use serde::Serialize;

use super::{TimerMode, TimerState};

/// A named, read-only timer setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub mode: TimerMode,
    pub duration_seconds: u64,
    pub rounds: Option<u32>,
    pub work_seconds: Option<u64>,
    pub rest_seconds: Option<u64>,
    pub description: &'static str,
}

impl PresetDefinition {
    const fn single(
        id: &'static str,
        name: &'static str,
        mode: TimerMode,
        duration_seconds: u64,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            mode,
            duration_seconds,
            rounds: None,
            work_seconds: None,
            rest_seconds: None,
            description,
        }
    }

    const fn intervals(
        id: &'static str,
        name: &'static str,
        work: u64,
        rest: u64,
        rounds: u32,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            mode: TimerMode::Tabata,
            duration_seconds: rounds as u64 * (work + rest),
            rounds: Some(rounds),
            work_seconds: Some(work),
            rest_seconds: Some(rest),
            description,
        }
    }
}

static CATALOG: [PresetDefinition; 10] = [
    PresetDefinition::single("rest-3m", "Rest Timer (3 min)", TimerMode::Countdown, 180, "Rest between working sets"),
    PresetDefinition {
        rounds: Some(10),
        ..PresetDefinition::single("emom-10", "EMOM 10 min", TimerMode::Emom, 600, "Every Minute On the Minute")
    },
    PresetDefinition::single("amrap-12", "AMRAP 12 min", TimerMode::Amrap, 720, "As Many Rounds As Possible"),
    PresetDefinition::intervals("tabata-20-10", "Tabata (20/10)", 20, 10, 8, "8 rounds of 20s work / 10s rest"),
    PresetDefinition::intervals("hiit-40-20", "HIIT (40/20)", 40, 20, 8, "8 rounds of 40s work / 20s rest"),
    PresetDefinition::single("rest-90s", "Short Rest (90s)", TimerMode::Countdown, 90, "Between accessory sets"),
    PresetDefinition::intervals("tabata-30-15", "Extended Tabata (30/15)", 30, 15, 8, "8 rounds of 30s work / 15s rest"),
    PresetDefinition::intervals("tabata-brutal", "Brutal (40/20)", 40, 20, 10, "10 rounds of 40s work / 20s rest"),
    PresetDefinition::single("rest-60s", "Rest 60s", TimerMode::Countdown, 60, "Quick rest"),
    PresetDefinition::single("rest-2m", "Rest 2 min", TimerMode::Countdown, 120, "Rest between heavy sets"),
];

/// Every preset, in display order
pub fn catalog() -> &'static [PresetDefinition] {
    &CATALOG
}

pub fn find_preset(id: &str) -> Option<&'static PresetDefinition> {
    CATALOG.iter().find(|p| p.id == id)
}

/// Build the initial state a preset describes
pub fn instantiate(preset: &PresetDefinition) -> TimerState {
    let rounds = preset.rounds.unwrap_or(1);
    match (preset.mode, preset.work_seconds, preset.rest_seconds) {
        (TimerMode::Tabata, Some(work), Some(rest)) => TimerState::tabata(work, rest, rounds),
        (mode, _, _) => TimerState::new(mode, preset.duration_seconds, rounds),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = catalog().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_catalog_entries_are_well_formed() {
        for preset in catalog() {
            assert!(preset.duration_seconds > 0, "{} has no duration", preset.id);
            if preset.mode == TimerMode::Tabata {
                assert!(preset.work_seconds.unwrap_or(0) > 0, "{} has no work interval", preset.id);
                assert!(preset.rest_seconds.unwrap_or(0) > 0, "{} has no rest interval", preset.id);
                assert!(preset.rounds.unwrap_or(0) > 0, "{} has no rounds", preset.id);
            }
        }
    }

    #[test]
    fn test_instantiate_countdown() {
        let state = instantiate(find_preset("rest-3m").unwrap());
        assert_eq!(state.mode, TimerMode::Countdown);
        assert_eq!(state.elapsed_or_remaining, 180);
        assert_eq!(state.target_duration_seconds, 180);
        assert_eq!(state.total_rounds, 1);
        assert!(!state.is_running);
    }

    #[test]
    fn test_instantiate_emom_keeps_rounds() {
        let state = instantiate(find_preset("emom-10").unwrap());
        assert_eq!(state.elapsed_or_remaining, 600);
        assert_eq!(state.total_rounds, 10);
        assert_eq!(state.current_round, 1);
    }

    #[test]
    fn test_instantiate_tabata() {
        let state = instantiate(find_preset("hiit-40-20").unwrap());
        assert_eq!(state.elapsed_or_remaining, 40);
        assert_eq!(state.work_duration_seconds, 40);
        assert_eq!(state.rest_duration_seconds, 20);
        assert_eq!(state.total_rounds, 8);
        assert_eq!(state.target_duration_seconds, 480);
        assert!(state.is_work_phase);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(find_preset("yoga").is_none());
    }
}
