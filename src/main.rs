use anyhow::anyhow;
use gesture_engine::logging;
use gesture_engine::mouse_gestures::{
    best_match, load_gestures, CaptureMachine, CaptureNotification, InputEvent, ManualClock,
};
use gesture_engine::settings::GestureSettings;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraceEntry {
    at_ms: u64,
    event: InputEvent,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [settings_path, gestures_path, trace_path] = args.as_slice() else {
        return Err(anyhow!(
            "usage: gesture_replay <settings.json> <gestures.json> <trace.json>"
        ));
    };

    let settings = GestureSettings::load(settings_path)?;
    logging::init(settings.debug_logging, None);

    let gestures = load_gestures(gestures_path)?.snapshot();
    let trace: Vec<TraceEntry> = serde_json::from_str(&std::fs::read_to_string(trace_path)?)?;
    tracing::info!(
        gestures = gestures.len(),
        events = trace.len(),
        "replaying input trace"
    );

    let clock = Arc::new(ManualClock::new(0));
    let mut machine = CaptureMachine::new(settings.clone(), clock.clone())?;
    let mut matched = 0usize;
    for entry in &trace {
        clock.set(entry.at_ms);
        let transition = machine.process(&entry.event);
        for notification in transition.notifications {
            match notification {
                CaptureNotification::Start { batch, .. } => {
                    tracing::debug!(at_ms = entry.at_ms, buffered = batch.len(), "gesture started");
                }
                CaptureNotification::Abort => {
                    tracing::info!(at_ms = entry.at_ms, "gesture aborted");
                }
                CaptureNotification::End { pattern, aborted } if !aborted => {
                    match best_match(
                        &pattern,
                        &gestures,
                        settings.deviation_tolerance,
                        settings.matching_algorithm,
                    ) {
                        Some(found) => {
                            matched += 1;
                            tracing::info!(
                                at_ms = entry.at_ms,
                                label = %found.record.label,
                                action = %found.record.command.action,
                                difference = found.difference,
                                "gesture matched"
                            );
                        }
                        None => tracing::info!(
                            at_ms = entry.at_ms,
                            vectors = pattern.len(),
                            "gesture did not match"
                        ),
                    }
                }
                _ => {}
            }
        }
    }

    tracing::info!(matched, "replay finished");
    Ok(())
}
