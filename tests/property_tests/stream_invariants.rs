//! Frame decoding and fold invariants

use proptest::prelude::*;

use super::generators::{analysis_run, encode_all};
use glassbox::client::{reduce_analysis, AnalysisState, FrameDecoder, SessionController};
use glassbox::streaming::AnalysisEvent;

fn fold(events: &[AnalysisEvent]) -> AnalysisState {
    events
        .iter()
        .fold(AnalysisState::analyzing(), reduce_analysis)
}

fn decode_in_chunks(bytes: &[u8], sizes: &[usize]) -> Vec<AnalysisEvent> {
    let mut decoder = FrameDecoder::<AnalysisEvent>::new();
    let mut events = Vec::new();
    let mut offset = 0;
    let mut sizes = sizes.iter().cycle();
    while offset < bytes.len() {
        let size = sizes.next().copied().unwrap_or(1);
        let end = (offset + size).min(bytes.len());
        events.extend(decoder.push(&bytes[offset..end]));
        offset = end;
    }
    events.extend(decoder.finish());
    events
}

proptest! {
    #[test]
    fn chunking_does_not_change_the_final_state(
        events in analysis_run(),
        sizes in proptest::collection::vec(1usize..24, 1..32),
    ) {
        let bytes = encode_all(&events);
        let chunked = decode_in_chunks(&bytes, &sizes);
        let byte_at_a_time = decode_in_chunks(&bytes, &[1]);

        prop_assert_eq!(&chunked, &events);
        prop_assert_eq!(fold(&chunked), fold(&events));
        prop_assert_eq!(fold(&byte_at_a_time), fold(&events));
    }

    #[test]
    fn pass_order_does_not_change_the_results(
        (events, shuffled) in analysis_run().prop_flat_map(|events| {
            let middle = events[1..events.len() - 1].to_vec();
            (Just(events), Just(middle).prop_shuffle())
        }),
    ) {
        let mut reordered = vec![events[0].clone()];
        reordered.extend(shuffled);
        reordered.push(AnalysisEvent::done());

        let expected = fold(&events);
        let actual = fold(&reordered);
        prop_assert_eq!(&actual.results, &expected.results);
        prop_assert_eq!(&actual.pass_errors, &expected.pass_errors);
        prop_assert_eq!(actual.current_pass_number, expected.current_pass_number);
        prop_assert_eq!(actual.status, expected.status);
    }

    #[test]
    fn a_malformed_frame_is_skipped(
        events in analysis_run(),
        position in any::<proptest::sample::Index>(),
        garbage in "[a-z{\":]{0,20}",
    ) {
        let at = position.index(events.len() + 1);
        let mut bytes = encode_all(&events[..at]);
        bytes.extend_from_slice(format!("data:{{\"event_type\":{garbage}\n\n").as_bytes());
        bytes.extend(encode_all(&events[at..]));

        let decoded = decode_in_chunks(&bytes, &[7]);
        prop_assert_eq!(fold(&decoded), fold(&events));
    }

    #[test]
    fn superseded_session_events_never_land(
        old_run in analysis_run(),
        new_run in analysis_run(),
        interleave in proptest::collection::vec(any::<bool>(), 0..64),
    ) {
        let controller = SessionController::new(AnalysisState::default());
        let old = controller.begin(AnalysisState::analyzing());
        let new = controller.begin(AnalysisState::analyzing());

        let mut old_events = old_run.iter();
        let mut new_events = new_run.iter();
        for pick_old in interleave {
            let next = if pick_old { old_events.next().map(|e| (old, e)) } else { new_events.next().map(|e| (new, e)) };
            if let Some((id, event)) = next {
                controller.apply(id, |state| reduce_analysis(state, event));
            }
        }
        for event in old_events {
            prop_assert!(!controller.apply(old, |state| reduce_analysis(state, event)));
        }
        for event in new_events {
            controller.apply(new, |state| reduce_analysis(state, event));
        }

        prop_assert_eq!(controller.snapshot(), fold(&new_run));
    }
}
