//! Structured log fields emitted by the miner.
//!
//! Installs a global subscriber, so this file holds a single test.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

use rulebeam_core::config::{ObjectiveFunction, RulebeamConfig};
use rulebeam_core::tracing::metrics;
use rulebeam_mining::predicate::range::{range, ranges};
use rulebeam_mining::{Database, Miner};

/// One recorded event: its field names, its `condition` value, and the
/// mined target of the span it was emitted in.
#[derive(Debug, Clone)]
struct Recorded {
    fields: Vec<String>,
    condition: Option<String>,
    span_target: Option<String>,
}

#[derive(Default)]
struct Captured {
    span_targets: HashMap<u64, String>,
    span_fields: Vec<String>,
    events: Vec<Recorded>,
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Captured>>);

#[derive(Default)]
struct StrFields(HashMap<String, String>);

impl Visit for StrFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let mut values = StrFields::default();
        attrs.record(&mut values);
        let mut captured = self.0.lock().unwrap();
        captured
            .span_fields
            .extend(attrs.metadata().fields().iter().map(|f| f.name().to_string()));
        if let Some(target) = values.0.remove(metrics::TARGET) {
            captured.span_targets.insert(id.into_u64(), target);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut values = StrFields::default();
        event.record(&mut values);
        let span_id = event
            .parent()
            .cloned()
            .or_else(|| ctx.current_span().id().cloned());
        let mut captured = self.0.lock().unwrap();
        let span_target = span_id.and_then(|id| captured.span_targets.get(&id.into_u64()).cloned());
        captured.events.push(Recorded {
            fields: event.metadata().fields().iter().map(|f| f.name().to_string()).collect(),
            condition: values.0.remove("condition"),
            span_target,
        });
    }
}

#[test]
fn test_miner_logs_metric_fields_in_target_spans() {
    let capture = Capture::default();
    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(capture.clone()))
        .unwrap();

    let db: Database<i64> = (0..100).collect();
    let predicates = ranges(0, 100, 10);
    let targets = [range(20i64, 50), range(60i64, 90)];
    let mut config = RulebeamConfig::default();
    config.mining.objective = Some(ObjectiveFunction::Conviction);
    config.mining.max_complexity = Some(3);
    config.mining.top_per_complexity = Some(2);
    config.runtime.threads = Some(4);
    let results = Miner::new(&config).unwrap().mine(&db, &predicates, &targets).unwrap();
    assert!(results.iter().all(|r| !r.is_failed()));

    let captured = capture.0.lock().unwrap();
    let mut names: Vec<&str> = captured
        .events
        .iter()
        .flat_map(|e| e.fields.iter().map(String::as_str))
        .chain(captured.span_fields.iter().map(String::as_str))
        .collect();
    names.sort_unstable();
    names.dedup();
    for field in [
        metrics::TARGET,
        metrics::LEVEL,
        metrics::CANDIDATES,
        metrics::ADMITTED,
        metrics::CACHE_HIT_RATE,
        metrics::TARGET_DURATION,
    ] {
        assert!(names.contains(&field), "missing field {field}");
    }

    // A candidate never contains an atomic of its own target, so one that
    // does was logged inside the other target's span.
    let offered: Vec<&Recorded> = captured
        .events
        .iter()
        .filter(|e| e.condition.is_some())
        .collect();
    assert!(!offered.is_empty());
    for event in offered {
        let condition = event.condition.as_deref().unwrap_or_default();
        let excluded: &[&str] = match event.span_target.as_deref() {
            Some("[20;50)") => &["[20;30)", "[30;40)", "[40;50)"],
            Some("[60;90)") => &["[60;70)", "[70;80)", "[80;90)"],
            other => panic!("candidate {condition} logged outside a target span: {other:?}"),
        };
        for atomic in excluded {
            assert!(!condition.contains(atomic), "{condition} logged in wrong span");
        }
    }
}
