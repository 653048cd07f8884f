//! Per-mode tick transitions
//!
//! Each mode gets one pure function from the current state to the next state
//! plus the events the engine must announce. Nothing here touches the outside
//! world; the engine applies the result.

use serde::{Deserialize, Serialize};

use super::{TimerMode, TimerState};

/// Something the athlete should be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A new minute (EMOM) or the switch from work to rest (Tabata)
    IntervalCue,
    /// Tabata moved on to its next work interval
    RoundAdvanced { round: u32, total: u32 },
    /// The session ran out; the timer has stopped itself
    Completed,
}

/// Advance `state` by one second under the rules of `mode`
pub fn next_state(mode: TimerMode, state: &TimerState) -> (TimerState, Vec<TimerEvent>) {
    match mode {
        TimerMode::Stopwatch => stopwatch_tick(state),
        TimerMode::Countdown | TimerMode::Amrap => countdown_tick(state),
        TimerMode::Emom => emom_tick(state),
        TimerMode::Tabata => tabata_tick(state),
    }
}

fn stopwatch_tick(state: &TimerState) -> (TimerState, Vec<TimerEvent>) {
    let mut next = state.clone();
    next.elapsed_or_remaining = next.elapsed_or_remaining.saturating_add(1);
    (next, Vec::new())
}

fn countdown_tick(state: &TimerState) -> (TimerState, Vec<TimerEvent>) {
    let mut next = state.clone();
    next.elapsed_or_remaining = next.elapsed_or_remaining.saturating_sub(1);
    if next.elapsed_or_remaining == 0 {
        finish(&mut next);
        return (next, vec![TimerEvent::Completed]);
    }
    (next, Vec::new())
}

fn emom_tick(state: &TimerState) -> (TimerState, Vec<TimerEvent>) {
    let (next, events) = countdown_tick(state);
    // rounds stay informational; only the window clock ends an EMOM
    if next.elapsed_or_remaining > 0 && next.elapsed_or_remaining % 60 == 0 {
        return (next, vec![TimerEvent::IntervalCue]);
    }
    (next, events)
}

fn tabata_tick(state: &TimerState) -> (TimerState, Vec<TimerEvent>) {
    let mut next = state.clone();
    next.elapsed_or_remaining = next.elapsed_or_remaining.saturating_sub(1);
    if next.elapsed_or_remaining > 0 {
        return (next, Vec::new());
    }

    if next.is_work_phase {
        next.is_work_phase = false;
        next.elapsed_or_remaining = next.rest_duration_seconds;
        return (next, vec![TimerEvent::IntervalCue]);
    }

    next.is_work_phase = true;
    if next.current_round >= next.total_rounds {
        finish(&mut next);
        return (next, vec![TimerEvent::Completed]);
    }

    next.current_round += 1;
    next.elapsed_or_remaining = next.work_duration_seconds;
    let round = TimerEvent::RoundAdvanced {
        round: next.current_round,
        total: next.total_rounds,
    };
    (next, vec![round])
}

fn finish(state: &mut TimerState) {
    state.elapsed_or_remaining = 0;
    state.is_running = false;
    state.is_paused = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(mut state: TimerState) -> TimerState {
        state.is_running = true;
        state
    }

    /// Run `ticks` transitions, collecting every event along the way
    fn run(mut state: TimerState, ticks: usize) -> (TimerState, Vec<(u64, TimerEvent)>) {
        let mut seen = Vec::new();
        for _ in 0..ticks {
            if !state.is_running {
                break;
            }
            let (next, events) = next_state(state.mode, &state);
            seen.extend(events.into_iter().map(|e| (next.elapsed_or_remaining, e)));
            state = next;
        }
        (state, seen)
    }

    #[test]
    fn test_stopwatch_counts_up_without_end() {
        let (state, events) = run(running(TimerState::new(TimerMode::Stopwatch, 0, 1)), 5000);
        assert_eq!(state.elapsed_or_remaining, 5000);
        assert!(state.is_running);
        assert!(events.is_empty());
    }

    #[test]
    fn test_countdown_decrements_by_one() {
        let mut state = running(TimerState::new(TimerMode::Countdown, 10, 1));
        for expected in (1..10).rev() {
            let (next, events) = next_state(state.mode, &state);
            assert_eq!(next.elapsed_or_remaining, expected);
            assert!(events.is_empty());
            state = next;
        }
        let (done, events) = next_state(state.mode, &state);
        assert_eq!(done.elapsed_or_remaining, 0);
        assert_eq!(events, vec![TimerEvent::Completed]);
        assert!(!done.is_running);
    }

    #[test]
    fn test_every_countdown_mode_steps_by_one() {
        let sessions = [
            TimerState::new(TimerMode::Countdown, 95, 1),
            TimerState::new(TimerMode::Emom, 600, 10),
            TimerState::new(TimerMode::Amrap, 720, 1),
            TimerState::tabata(20, 10, 3),
        ];

        for initial in sessions {
            let mode = initial.mode;
            let mut state = running(initial);
            let mut completions = 0;

            while state.is_running {
                let (next, events) = next_state(mode, &state);
                let crossed_zero = state.elapsed_or_remaining == 1;

                if crossed_zero {
                    // phase end: exactly one transition event
                    assert_eq!(events.len(), 1, "{} at {:?}", mode, state);
                    if events[0] == TimerEvent::Completed {
                        completions += 1;
                    }
                } else {
                    assert_eq!(next.elapsed_or_remaining, state.elapsed_or_remaining - 1, "{}", mode);
                    let minute_cue = mode == TimerMode::Emom && next.elapsed_or_remaining % 60 == 0;
                    if minute_cue {
                        assert_eq!(events, vec![TimerEvent::IntervalCue]);
                    } else {
                        assert!(events.is_empty(), "{} fired {:?} at {}", mode, events, next.elapsed_or_remaining);
                    }
                }
                state = next;
            }

            assert_eq!(completions, 1, "{}", mode);
            assert_eq!(state.elapsed_or_remaining, 0);
        }
    }

    #[test]
    fn test_zero_start_completes_once() {
        let state = running(TimerState::new(TimerMode::Countdown, 0, 1));
        let (state, events) = run(state, 10);
        assert_eq!(state.elapsed_or_remaining, 0);
        assert_eq!(events, vec![(0, TimerEvent::Completed)]);
    }

    #[test]
    fn test_emom_cue_cadence() {
        let (state, events) = run(running(TimerState::new(TimerMode::Emom, 600, 10)), 1000);

        let cues: Vec<u64> = events
            .iter()
            .filter(|(_, e)| *e == TimerEvent::IntervalCue)
            .map(|(at, _)| *at)
            .collect();
        assert_eq!(cues, vec![540, 480, 420, 360, 300, 240, 180, 120, 60]);

        let completions = events.iter().filter(|(_, e)| *e == TimerEvent::Completed).count();
        assert_eq!(completions, 1);
        assert_eq!(state.current_round, 1);
        assert!(!state.is_running);
    }

    #[test]
    fn test_amrap_leaves_rounds_alone() {
        let initial = running(TimerState::new(TimerMode::Amrap, 720, 1));
        let (state, events) = run(initial.clone(), 720);
        assert_eq!(events, vec![(0, TimerEvent::Completed)]);
        assert_eq!(state.current_round, initial.current_round);
        assert_eq!(state.total_rounds, initial.total_rounds);
        assert_eq!(state.is_work_phase, initial.is_work_phase);
    }

    #[test]
    fn test_tabata_phase_flips() {
        let (state, _) = run(running(TimerState::tabata(20, 10, 8)), 20);
        assert!(!state.is_work_phase);
        assert_eq!(state.elapsed_or_remaining, 10);
        assert_eq!(state.current_round, 1);

        let (state, events) = run(state, 10);
        assert!(state.is_work_phase);
        assert_eq!(state.elapsed_or_remaining, 20);
        assert_eq!(state.current_round, 2);
        assert_eq!(events, vec![(20, TimerEvent::RoundAdvanced { round: 2, total: 8 })]);
    }

    #[test]
    fn test_tabata_round_accounting() {
        for rounds in 1..=5u32 {
            let (state, events) = run(running(TimerState::tabata(3, 2, rounds)), 10_000);

            let work_ends = events.iter().filter(|(_, e)| *e == TimerEvent::IntervalCue).count();
            let advances = events
                .iter()
                .filter(|(_, e)| matches!(e, TimerEvent::RoundAdvanced { .. }))
                .count();
            let completions = events.iter().filter(|(_, e)| *e == TimerEvent::Completed).count();

            assert_eq!(work_ends, rounds as usize);
            // the final rest ends in completion instead of another round
            assert_eq!(advances + completions, rounds as usize);
            assert_eq!(completions, 1);
            assert_eq!(state.current_round, rounds);
            assert!(!state.is_running);
        }
    }

    #[test]
    fn test_tabata_single_round_terminates() {
        let (state, events) = run(running(TimerState::tabata(20, 10, 1)), 31);
        assert!(!state.is_running);
        assert_eq!(events.last(), Some(&(0, TimerEvent::Completed)));
        assert_eq!(events.len(), 2);
    }
}
