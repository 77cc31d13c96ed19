#![cfg(feature = "serde")]

use goap_tools::{TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, "goap.plan.call").with_a(2).with_b(0),
            TraceEvent::new(1, "goap.plan.result").with_a(3).with_b(1),
            TraceEvent::new(4, "goap.action.complete").with_a(7),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
