//! Lifting metrics using metrics-rs.
//!
//! Metrics are recorded unconditionally; they only go somewhere once a
//! recorder is installed. The CLI installs [`CliRecorder`] under `--metrics`
//! and prints a summary on exit.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;

use crate::LiftedInstruction;

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        "reil_instructions_lifted_total",
        Unit::Count,
        "Native instructions lifted"
    );
    describe_counter!(
        "reil_unknown_mnemonics_total",
        Unit::Count,
        "Native instructions lifted to an UNKNOWN placeholder"
    );
    describe_counter!(
        "reil_instructions_evaluated_total",
        Unit::Count,
        "Native instructions executed by eval"
    );
    describe_gauge!(
        "reil_lift_duration_seconds",
        Unit::Seconds,
        "Wall-clock time of the last lift"
    );
    describe_histogram!(
        "reil_ir_per_instruction",
        Unit::Count,
        "REIL instructions per native instruction"
    );
}

// ============================================================================
// Recording
// ============================================================================

/// Record the outcome of lifting one listing.
#[allow(clippy::cast_precision_loss)]
pub fn record_lift(lifted: &[LiftedInstruction], elapsed_secs: f64) {
    counter!("reil_instructions_lifted_total").increment(lifted.len() as u64);
    gauge!("reil_lift_duration_seconds").set(elapsed_secs);

    let per_instruction = histogram!("reil_ir_per_instruction");
    for l in lifted {
        per_instruction.record(l.ir.len() as f64);
        if l.is_unknown() {
            let labels = [("mnemonic", l.native.mnemonic().to_string())];
            counter!("reil_unknown_mnemonics_total", &labels).increment(1);
        }
    }
}

/// Record native instructions executed by one evaluation.
pub fn record_eval(steps: usize) {
    counter!("reil_instructions_evaluated_total").increment(steps as u64);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

/// Shared values for one metric kind, keyed by rendered metric key.
struct Storage<T> {
    values: RwLock<HashMap<String, T>>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone> Storage<T> {
    fn update(&self, key: &str, f: impl FnOnce(&mut T), init: impl FnOnce() -> T) {
        let mut values = self.values.write();
        f(values.entry(key.to_string()).or_insert_with(init));
    }

    fn get(&self, key: &str) -> Option<T> {
        self.values.read().get(key).cloned()
    }

    fn sorted(&self) -> Vec<(String, T)> {
        let mut entries: Vec<_> = self
            .values
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Handle bound to one metric key.
struct Handle<T> {
    key: String,
    storage: Arc<Storage<T>>,
}

impl metrics::CounterFn for Handle<u64> {
    fn increment(&self, value: u64) {
        self.storage.update(&self.key, |v| *v += value, || 0);
    }

    fn absolute(&self, value: u64) {
        self.storage.update(&self.key, |v| *v = value, || 0);
    }
}

impl metrics::GaugeFn for Handle<f64> {
    fn increment(&self, value: f64) {
        self.storage.update(&self.key, |v| *v += value, || 0.0);
    }

    fn decrement(&self, value: f64) {
        self.storage.update(&self.key, |v| *v -= value, || 0.0);
    }

    fn set(&self, value: f64) {
        self.storage.update(&self.key, |v| *v = value, || 0.0);
    }
}

impl metrics::HistogramFn for Handle<Vec<f64>> {
    fn record(&self, value: f64) {
        self.storage.update(&self.key, |v| v.push(value), Vec::new);
    }
}

/// In-memory recorder that prints a human-readable summary.
#[derive(Default)]
pub struct CliRecorder {
    counters: Arc<Storage<u64>>,
    gauges: Arc<Storage<f64>>,
    histograms: Arc<Storage<Vec<f64>>>,
}

impl CliRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if another recorder is already installed.
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            counters: Arc::clone(&self.counters),
            gauges: Arc::clone(&self.gauges),
            histograms: Arc::clone(&self.histograms),
        }
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(Handle {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(Handle {
            key: key_to_string(key),
            storage: Arc::clone(&self.gauges),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(Handle {
            key: key_to_string(key),
            storage: Arc::clone(&self.histograms),
        }))
    }
}

/// Read access to what an installed [`CliRecorder`] collected.
pub struct CliRecorderHandle {
    counters: Arc<Storage<u64>>,
    gauges: Arc<Storage<f64>>,
    histograms: Arc<Storage<Vec<f64>>>,
}

impl CliRecorderHandle {
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.get(key)
    }

    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.gauges.get(key)
    }

    pub fn get_histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.histograms.get(key)
    }

    /// Print everything collected, sorted by key.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        let counters = self.counters.sorted();
        let gauges = self.gauges.sorted();
        let histograms = self.histograms.sorted();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            println!("No metrics collected.");
            return;
        }

        println!();
        println!("## Metrics Summary");
        println!();

        if !counters.is_empty() {
            println!("### Counters");
            for (key, value) in &counters {
                println!("  {key}: {value}");
            }
            println!();
        }

        if !gauges.is_empty() {
            println!("### Gauges");
            for (key, value) in &gauges {
                println!("  {key}: {value:.6}");
            }
            println!();
        }

        if !histograms.is_empty() {
            println!("### Histograms");
            for (key, values) in histograms.iter().filter(|(_, v)| !v.is_empty()) {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                println!(
                    "  {key}: count={}, min={min:.2}, max={max:.2}, avg={avg:.2}",
                    values.len()
                );
            }
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::Label;

    #[test]
    fn test_key_to_string() {
        let key = Key::from_name("reil_ir_per_instruction");
        assert_eq!(key_to_string(&key), "reil_ir_per_instruction");

        let key = Key::from_parts(
            "reil_unknown_mnemonics_total",
            vec![Label::new("mnemonic", "fadd")],
        );
        assert_eq!(
            key_to_string(&key),
            "reil_unknown_mnemonics_total{mnemonic=fadd}"
        );
    }

    #[test]
    fn test_recorder_storage() {
        let recorder = CliRecorder::new();
        let handle = recorder.handle();

        let counter = Handle {
            key: "lifted".to_string(),
            storage: Arc::clone(&recorder.counters),
        };
        metrics::CounterFn::increment(&counter, 5);
        metrics::CounterFn::increment(&counter, 2);
        assert_eq!(handle.get_counter("lifted"), Some(7));
        metrics::CounterFn::absolute(&counter, 1);
        assert_eq!(handle.get_counter("lifted"), Some(1));

        let gauge = Handle {
            key: "duration".to_string(),
            storage: Arc::clone(&recorder.gauges),
        };
        metrics::GaugeFn::set(&gauge, 1.5);
        metrics::GaugeFn::decrement(&gauge, 0.5);
        assert_eq!(handle.get_gauge("duration"), Some(1.0));

        let hist = Handle {
            key: "per_instr".to_string(),
            storage: Arc::clone(&recorder.histograms),
        };
        metrics::HistogramFn::record(&hist, 3.0);
        metrics::HistogramFn::record(&hist, 9.0);
        assert_eq!(handle.get_histogram("per_instr"), Some(vec![3.0, 9.0]));
        assert_eq!(handle.get_counter("missing"), None);
    }

    #[test]
    fn test_record_lift_through_local_recorder() {
        let recorder = CliRecorder::new();
        let handle = recorder.handle();
        let listing = crate::parse_listing("0x1000: li r3, 1\n0x1004: fmr f1, f2\n").unwrap();
        let lifted = crate::Pipeline::default().lift(&listing).unwrap();

        metrics::with_local_recorder(&recorder, || record_lift(&lifted, 0.25));

        assert_eq!(handle.get_counter("reil_instructions_lifted_total"), Some(2));
        assert_eq!(
            handle.get_counter("reil_unknown_mnemonics_total{mnemonic=fmr}"),
            Some(1)
        );
        assert_eq!(
            handle.get_histogram("reil_ir_per_instruction").map(|v| v.len()),
            Some(2)
        );
    }
}
