//! Read engine counters from a local debugging recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Create a recorder for `metrics::with_local_recorder` and its snapshotter.
#[must_use]
pub fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

#[derive(Debug)]
struct CounterSeries {
    name: String,
    labels: Vec<(String, String)>,
    count: u64,
}

/// Counter values read from one recorder snapshot.
///
/// Taking a snapshot drains the recorder's counters, so read every counter a
/// test needs from a single `CounterSnapshot`.
#[derive(Debug)]
pub struct CounterSnapshot {
    series: Vec<CounterSeries>,
}

impl CounterSnapshot {
    /// Drain the counters recorded so far.
    #[must_use]
    pub fn take(snapshotter: &Snapshotter) -> Self {
        let series = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => Some(CounterSeries {
                    name: key.key().name().to_owned(),
                    labels: key
                        .key()
                        .labels()
                        .map(|l| (l.key().to_owned(), l.value().to_owned()))
                        .collect(),
                    count,
                }),
                _ => None,
            })
            .collect();
        Self { series }
    }

    /// Sum of the counter `name` across series carrying `label` (any series
    /// when `label` is `None`).
    #[must_use]
    pub fn total(&self, name: &str, label: Option<(&str, &str)>) -> u64 {
        self.series
            .iter()
            .filter(|series| series.name == name)
            .filter(|series| {
                label.is_none_or(|(label_key, label_value)| {
                    series
                        .labels
                        .iter()
                        .any(|(key, value)| key == label_key && value == label_value)
                })
            })
            .map(|series| series.count)
            .sum()
    }
}

