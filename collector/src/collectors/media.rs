use crate::{
    collector::{
        Collector,
        CollectorContext,
    },
    error::SampleError,
    pipeline::{
        Report,
        ReportCollector,
    },
    sample::{
        Descriptor,
        Sample,
    },
};
use std::{
    collections::BTreeMap,
    sync::Arc,
};

pub const NAME: &str = "media";

/// Body of `Items/Counts`, e.g. `{"MovieCount": 12, "SeriesCount": 3}`.
pub type MediaCounts = BTreeMap<String, f64>;

pub struct MediaReport {
    items: Arc<Descriptor>,
}

impl MediaReport {
    pub fn new() -> Self {
        Self {
            items: Descriptor::new("media", "count", "Total media items.", &["type"]),
        }
    }
}

impl Default for MediaReport {
    fn default() -> Self {
        Self::new()
    }
}

impl Report for MediaReport {
    type Payload = MediaCounts;

    const NAME: &'static str = NAME;

    fn endpoint(&self) -> String {
        "Items/Counts".to_string()
    }

    fn samples(&self, payload: Self::Payload) -> Result<Vec<Sample>, SampleError> {
        payload
            .into_iter()
            .map(|(field, count)| {
                let item_type = field.replace("Count", "");
                debug!(item_type, count, "media total");
                Sample::counter(&self.items, count, vec![item_type])
            })
            .collect()
    }
}

pub fn new(context: &CollectorContext) -> Arc<dyn Collector> {
    Arc::new(ReportCollector::new(MediaReport::new(), context))
}
