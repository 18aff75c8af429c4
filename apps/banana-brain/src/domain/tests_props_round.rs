//! Property tests for the round machine under arbitrary event streams.
//!
//! Properties tested:
//! - At most one final-score report per round, whatever the event order
//! - A quit round never reports
//! - Once ended, no event mutates the state
//! - Answers outside AwaitingAnswer leave the state unchanged
//! - Score only moves in whole scoring units

use proptest::prelude::*;

use crate::domain::policy::RoundConfig;
use crate::domain::round::{EndReason, Phase, RoundEffect, RoundEvent, RoundMachine};
use crate::domain::{test_gens, test_prelude};

fn reports(effects: &[RoundEffect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, RoundEffect::ReportFinalScore { .. }))
        .count()
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_report_fires_at_most_once(
        tier in test_gens::tier(),
        mode in test_gens::puzzle_mode(),
        events in prop::collection::vec(test_gens::round_event(), 0..400),
    ) {
        let (mut machine, _) = RoundMachine::start(RoundConfig::for_mode(tier, mode));
        let mut total = 0;
        for event in events {
            total += reports(&machine.apply(event));
        }
        prop_assert!(total <= 1);
        let expected = match machine.state().end_reason {
            None | Some(EndReason::Quit) => 0,
            Some(_) => 1,
        };
        prop_assert_eq!(total, expected);
    }

    #[test]
    fn prop_ended_round_is_frozen(
        tier in test_gens::tier(),
        mode in test_gens::puzzle_mode(),
        events in prop::collection::vec(test_gens::round_event(), 0..200),
        late in prop::collection::vec(test_gens::round_event(), 1..40),
    ) {
        let (mut machine, _) = RoundMachine::start(RoundConfig::for_mode(tier, mode));
        for event in events {
            machine.apply(event);
        }
        machine.end(EndReason::Timeout);
        let frozen = machine.state().clone();
        for event in late {
            prop_assert!(machine.apply(event).is_empty());
        }
        prop_assert_eq!(machine.state(), &frozen);
    }

    #[test]
    fn prop_answers_outside_awaiting_are_noops(
        tier in test_gens::tier(),
        mode in test_gens::puzzle_mode(),
        events in prop::collection::vec(test_gens::round_event(), 0..200),
        candidate in 0u8..=9,
    ) {
        let (mut machine, _) = RoundMachine::start(RoundConfig::for_mode(tier, mode));
        for event in events {
            machine.apply(event);
            if machine.phase() != Phase::AwaitingAnswer {
                let before = machine.state().clone();
                prop_assert!(machine.apply(RoundEvent::Answer(candidate)).is_empty());
                prop_assert_eq!(machine.state(), &before);
            }
        }
        let unit = machine.config().policy.score_unit;
        prop_assert_eq!(machine.state().score % unit, 0);
        prop_assert_eq!(machine.state().score, machine.state().correct_answers * unit);
    }
}
