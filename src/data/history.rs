//! Breach state tracking across refreshes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use wssi_types::StressLevel;

use super::monitor::Reading;

/// Last known state for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectState {
    pub level: StressLevel,
    pub last_value: f64,
    /// Number of times the subject has moved into a breach level.
    pub alert_count: u32,
    pub first_alert_at: Option<DateTime<Utc>>,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// A change of level for one subject between two refreshes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub subject: String,
    pub label: String,
    pub from: StressLevel,
    pub to: StressLevel,
    pub value: f64,
}

impl Transition {
    /// True when the subject got worse.
    pub fn is_escalation(&self) -> bool {
        self.to.rank() > self.from.rank()
    }
}

/// Remembers the last level per subject and reports only changes.
///
/// Unseen subjects start as `stable`, so a first reading at watch or above
/// is reported while a first stable reading is not.
#[derive(Debug, Clone, Default)]
pub struct BreachTracker {
    states: HashMap<String, SubjectState>,
}

impl BreachTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one refresh worth of readings, returning the transitions.
    ///
    /// Subjects missing from `readings` keep their previous state.
    pub fn observe(&mut self, readings: &[Reading], at: DateTime<Utc>) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for reading in readings {
            if reading.level == StressLevel::Unknown {
                continue;
            }
            let state = self
                .states
                .entry(reading.subject.clone())
                .or_insert_with(|| SubjectState {
                    level: StressLevel::Stable,
                    last_value: reading.value,
                    alert_count: 0,
                    first_alert_at: None,
                    last_alert_at: None,
                });

            let previous = state.level;
            state.last_value = reading.value;
            if previous == reading.level {
                continue;
            }

            state.level = reading.level;
            if reading.is_breach() {
                state.alert_count += 1;
                state.first_alert_at.get_or_insert(at);
                state.last_alert_at = Some(at);
            }

            transitions.push(Transition {
                subject: reading.subject.clone(),
                label: reading.label.clone(),
                from: previous,
                to: reading.level,
                value: reading.value,
            });
        }

        transitions
    }

    pub fn state(&self, subject: &str) -> Option<&SubjectState> {
        self.states.get(subject)
    }

    /// Subjects currently at watch or above.
    pub fn active_breaches(&self) -> usize {
        self.states
            .values()
            .filter(|s| s.level.rank() >= StressLevel::Watch.rank())
            .count()
    }
}
