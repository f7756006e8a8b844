//! Shared proptest strategies

use proptest::prelude::*;
use proptest::sample::subsequence;
use serde_json::json;

use glassbox::domain::passes::PassName;
use glassbox::domain::payloads::{AnalysisResults, PassResult};
use glassbox::streaming::encoder::encode_frame;
use glassbox::streaming::AnalysisEvent;

/// Short reasoning steps, including non-ASCII text
pub fn reasoning() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zé ]{1,12}", 0..4)
}

/// One settled pass: a well-formed report or a degraded payload
pub fn pass_complete(pass: PassName) -> impl Strategy<Value = AnalysisEvent> {
    (reasoning(), any::<bool>(), "[a-z]{0,10}").prop_map(move |(steps, degraded, purpose)| {
        let data = if degraded {
            json!({"error": "JSON parse error: EOF", "raw": purpose})
        } else {
            json!({"reasoning_steps": steps, "purpose": purpose})
        };
        AnalysisEvent::PassComplete {
            pass_name: pass,
            pass_number: pass.number(),
            data,
            reasoning: if degraded { Vec::new() } else { steps },
            message: format!("{} complete (1.0s)", pass.definition().title),
            elapsed: 1.0,
        }
    })
}

/// Terminal events for a distinct subset of passes, in pass order
pub fn settled_passes() -> impl Strategy<Value = Vec<AnalysisEvent>> {
    subsequence(PassName::ALL.to_vec(), 0..=PassName::ALL.len()).prop_flat_map(|passes| {
        passes
            .into_iter()
            .map(|pass| {
                prop_oneof![
                    3 => pass_complete(pass),
                    1 => Just(AnalysisEvent::pass_error(pass.definition(), "timeout")),
                ]
                .boxed()
            })
            .collect::<Vec<_>>()
    })
}

/// A whole run: start, settled passes, done
pub fn analysis_run() -> impl Strategy<Value = Vec<AnalysisEvent>> {
    settled_passes().prop_map(|passes| {
        let mut events = vec![AnalysisEvent::start("demo", PassName::ALL.len())];
        events.extend(passes);
        events.push(AnalysisEvent::done());
        events
    })
}

/// A result set over any subset of passes
pub fn analysis_results() -> impl Strategy<Value = AnalysisResults> {
    settled_passes().prop_map(|events| {
        events
            .into_iter()
            .filter_map(|event| match event {
                AnalysisEvent::PassComplete {
                    pass_name, data, ..
                } => Some((pass_name, data)),
                _ => None,
            })
            .fold(AnalysisResults::new(), |results, (pass, data)| {
                results.with(pass, PassResult::from_wire(pass, data))
            })
    })
}

pub fn encode_all(events: &[AnalysisEvent]) -> Vec<u8> {
    events
        .iter()
        .flat_map(|event| encode_frame(event).unwrap().to_vec())
        .collect()
}
