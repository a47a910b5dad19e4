//! Prometheus text format rendering of a scrape's samples.
//!
//! Every scrape gets its own [`Registry`], so families only exist while their samples do.

use jellyfin_exporter_collector::{
    Sample,
    ValueKind,
};
use prometheus::{
    core::Collector,
    CounterVec,
    Encoder as _,
    GaugeVec,
    Opts,
    Registry,
    TextEncoder,
};
use std::collections::{
    hash_map::Entry,
    HashMap,
};

pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

enum Family {
    Counter(CounterVec),
    Gauge(GaugeVec),
}

impl Family {
    fn new(sample: &Sample) -> prometheus::Result<Self> {
        let descriptor = sample.descriptor();
        let opts = Opts::new(descriptor.fq_name(), descriptor.help());
        Ok(match sample.kind() {
            ValueKind::Counter => Family::Counter(CounterVec::new(opts, descriptor.label_names())?),
            ValueKind::Gauge => Family::Gauge(GaugeVec::new(opts, descriptor.label_names())?),
        })
    }

    fn collector(&self) -> Box<dyn Collector> {
        match self {
            Family::Counter(vec) => Box::new(vec.clone()),
            Family::Gauge(vec) => Box::new(vec.clone()),
        }
    }

    /// Samples sharing a label set are merged: counters add up, the last gauge wins.
    fn observe(&self, sample: &Sample) -> prometheus::Result<()> {
        let labels: Vec<&str> = sample.label_values().iter().map(String::as_str).collect();
        let value = sample.value();
        match self {
            Family::Counter(vec) => {
                if value.is_nan() || value < 0.0 {
                    return Err(prometheus::Error::Msg(format!(
                        "counter {} cannot take value {value}",
                        sample.descriptor().fq_name()
                    )));
                }
                vec.get_metric_with_label_values(&labels)?.inc_by(value);
            }
            Family::Gauge(vec) => vec.get_metric_with_label_values(&labels)?.set(value),
        }
        Ok(())
    }
}

/// Encodes samples in the text format, families sorted by name.
pub fn render(samples: &[Sample]) -> prometheus::Result<Vec<u8>> {
    let registry = Registry::new();
    let mut families: HashMap<&str, Family> = HashMap::new();
    for sample in samples {
        let family = match families.entry(sample.descriptor().fq_name()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let family = Family::new(sample)?;
                registry.register(family.collector())?;
                entry.insert(family)
            }
        };
        family.observe(sample)?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}
