use crate::error::SampleError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Prefix shared by every metric the exporter publishes.
pub const NAMESPACE: &str = "jellyfin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Counter,
    Gauge,
}

/// Joins the non-empty parts with `_`, e.g. `jellyfin_now_playing_state`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Fixed metadata of one metric family.
///
/// Label values of a [`Sample`] are matched to `label_names` by position, so the order
/// declared here is part of the exported contract.
#[derive(Debug, PartialEq, Eq)]
pub struct Descriptor {
    fq_name: String,
    help: &'static str,
    label_names: &'static [&'static str],
}

impl Descriptor {
    pub fn new(
        subsystem: &str,
        name: &str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: build_fq_name(NAMESPACE, subsystem, name),
            help,
            label_names,
        })
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        self.help
    }

    pub fn label_names(&self) -> &[&'static str] {
        self.label_names
    }
}

/// One observation of a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    descriptor: Arc<Descriptor>,
    kind: ValueKind,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    pub fn new(
        descriptor: &Arc<Descriptor>,
        kind: ValueKind,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<Self, SampleError> {
        if label_values.len() != descriptor.label_names.len() {
            return Err(SampleError::LabelCount {
                metric: descriptor.fq_name.clone(),
                expected: descriptor.label_names.len(),
                actual: label_values.len(),
            });
        }
        Ok(Self {
            descriptor: Arc::clone(descriptor),
            kind,
            value,
            label_values,
        })
    }

    pub fn counter(descriptor: &Arc<Descriptor>, value: f64, label_values: Vec<String>) -> Result<Self, SampleError> {
        Self::new(descriptor, ValueKind::Counter, value, label_values)
    }

    pub fn gauge(descriptor: &Arc<Descriptor>, value: f64, label_values: Vec<String>) -> Result<Self, SampleError> {
        Self::new(descriptor, ValueKind::Gauge, value, label_values)
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Looks a label value up by name. Mostly useful in tests.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.label_values[i].as_str())
    }
}

/// Shared output channel of one scrape. Cloning is cheap and every clone feeds the same receiver.
#[derive(Debug, Clone)]
pub struct SampleSink {
    tx: mpsc::UnboundedSender<Sample>,
}

impl SampleSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, sample: Sample) -> Result<(), SampleError> {
        self.tx.send(sample).map_err(|_| SampleError::SinkClosed)
    }
}
