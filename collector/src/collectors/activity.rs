use crate::{
    collector::{
        Collector,
        CollectorContext,
    },
    error::SampleError,
    pipeline::{
        nullable,
        Report,
        ReportCollector,
    },
    sample::{
        Descriptor,
        Sample,
    },
};
use serde::Deserialize;
use std::sync::Arc;

pub const NAME: &str = "activity";

/// Row of the Playback Reporting plugin's per-user activity report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserActivity {
    #[serde(deserialize_with = "nullable")]
    pub latest_date: String,
    #[serde(deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(deserialize_with = "nullable")]
    pub total_count: f64,
    #[serde(deserialize_with = "nullable")]
    pub total_time: f64,
    #[serde(deserialize_with = "nullable")]
    pub item_name: String,
    #[serde(deserialize_with = "nullable")]
    pub client_name: String,
    #[serde(deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(deserialize_with = "nullable")]
    pub has_image: bool,
    #[serde(deserialize_with = "nullable")]
    pub last_seen: String,
    #[serde(deserialize_with = "nullable")]
    pub total_play_time: String,
}

pub struct ActivityReport {
    days: u32,
    activity: Arc<Descriptor>,
}

impl ActivityReport {
    pub fn new(days: u32) -> Self {
        Self {
            days,
            activity: Descriptor::new(
                "activity",
                "count",
                "Playback Reporting activity.",
                &["user_id", "username", "last_seen", "total_play_time"],
            ),
        }
    }
}

impl Report for ActivityReport {
    type Payload = Vec<UserActivity>;

    const NAME: &'static str = NAME;

    fn endpoint(&self) -> String {
        format!("user_usage_stats/user_activity?days={}", self.days)
    }

    fn samples(&self, payload: Self::Payload) -> Result<Vec<Sample>, SampleError> {
        payload
            .into_iter()
            .map(|activity| {
                debug!(user = %activity.user_name, title = %activity.item_name, "playback reporting activity");
                Sample::counter(
                    &self.activity,
                    activity.total_count,
                    vec![
                        activity.user_id,
                        activity.user_name,
                        activity.last_seen.trim().to_string(),
                        activity.total_play_time.trim().to_string(),
                    ],
                )
            })
            .collect()
    }
}

pub fn new(context: &CollectorContext) -> Arc<dyn Collector> {
    Arc::new(ReportCollector::new(ActivityReport::new(context.activity_days), context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coerce::RawResponse,
        sample::{
            SampleSink,
            ValueKind,
        },
        test_support::{
            context,
            drain,
            FakeFetch,
            BASE_URL,
        },
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn one_counter_per_activity_row() {
        let body = json!([
            {
                "latest_date": "2024-05-01 20:11:02",
                "user_id": "u1",
                "total_count": 42,
                "total_time": 3600,
                "item_name": "Pilot",
                "client_name": "Web",
                "user_name": "alice",
                "has_image": true,
                "last_seen": " 2 days ago ",
                "total_play_time": "1 hour \n"
            },
            { "user_id": "u2", "user_name": "bob", "total_count": 0, "last_seen": null }
        ]);
        let fetch = FakeFetch::default().route("user_usage_stats/user_activity?days=7", RawResponse::Json(body));
        let calls = fetch.calls();
        let collector = new(&context(fetch, true));
        let (sink, mut rx) = SampleSink::channel();

        collector.update(&sink).await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![format!("{BASE_URL}/user_usage_stats/user_activity?days=7")]
        );
        let samples = drain(&mut rx);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].descriptor().fq_name(), "jellyfin_activity_count");
        assert_eq!(samples[0].kind(), ValueKind::Counter);
        assert_eq!(samples[0].value(), 42.0);
        assert_eq!(samples[0].label_values(), ["u1", "alice", "2 days ago", "1 hour"]);
        assert_eq!(samples[1].label_values(), ["u2", "bob", "", ""]);
    }

    #[tokio::test]
    async fn empty_report_emits_nothing() {
        let fetch = FakeFetch::default().route("user_usage_stats/user_activity?days=7", RawResponse::Text("[]".into()));
        let collector = new(&context(fetch, true));
        let (sink, mut rx) = SampleSink::channel();

        collector.update(&sink).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }
}
