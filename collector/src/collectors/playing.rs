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

pub const NAME: &str = "playing";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PlayState {
    #[serde(deserialize_with = "nullable")]
    pub position_ticks: i64,
    #[serde(deserialize_with = "nullable")]
    pub can_seek: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_paused: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_muted: bool,
    #[serde(deserialize_with = "nullable")]
    pub play_method: String,
    #[serde(deserialize_with = "nullable")]
    pub repeat_mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct NowPlayingItem {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "Type", deserialize_with = "nullable")]
    pub r#type: String,
    #[serde(deserialize_with = "nullable")]
    pub series_name: String,
    #[serde(rename = "ParentIndexNumber", deserialize_with = "nullable")]
    pub parent_index: i64,
    #[serde(deserialize_with = "nullable")]
    pub index_number: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Session {
    pub play_state: Option<PlayState>,
    pub now_playing_item: Option<NowPlayingItem>,
    #[serde(deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(deserialize_with = "nullable")]
    pub device_name: String,
    #[serde(deserialize_with = "nullable")]
    pub client: String,
    #[serde(deserialize_with = "nullable")]
    pub application_version: String,
    #[serde(deserialize_with = "nullable")]
    pub remote_end_point: String,
    #[serde(deserialize_with = "nullable")]
    pub last_activity_date: String,
}

pub struct PlayingReport {
    now_playing: Arc<Descriptor>,
}

impl PlayingReport {
    pub fn new() -> Self {
        Self {
            now_playing: Descriptor::new(
                "now_playing",
                "state",
                "Jellyfin currently playing sessions.",
                &[
                    "user_id",
                    "username",
                    "device",
                    "type",
                    "title",
                    "series_title",
                    "series_season",
                    "series_episode",
                    "method",
                ],
            ),
        }
    }

    fn session_sample(&self, session: Session) -> Result<Sample, SampleError> {
        let (state, method) = match &session.play_state {
            Some(play_state) => (
                if play_state.is_paused { 0.0 } else { 1.0 },
                play_state.play_method.to_lowercase(),
            ),
            None => (1.0, String::new()),
        };
        let item = session.now_playing_item.unwrap_or_default();
        let season = numbered("S", item.parent_index);
        let episode = numbered("E", item.index_number);

        debug!(user = %session.user_name, title = %item.name, state, "now playing");
        Sample::gauge(
            &self.now_playing,
            state,
            vec![
                session.user_id,
                session.user_name,
                session.device_name,
                item.r#type,
                item.name,
                item.series_name,
                season,
                episode,
                method,
            ],
        )
    }
}

impl Default for PlayingReport {
    fn default() -> Self {
        Self::new()
    }
}

/// `"S3"` for `("S", 3)`; empty for zero or negative indices.
fn numbered(prefix: &str, index: i64) -> String {
    if index > 0 {
        format!("{prefix}{index}")
    } else {
        String::new()
    }
}

impl Report for PlayingReport {
    type Payload = Vec<Session>;

    const NAME: &'static str = NAME;

    fn endpoint(&self) -> String {
        "Sessions?IsPlaying=true".to_string()
    }

    fn samples(&self, payload: Self::Payload) -> Result<Vec<Sample>, SampleError> {
        payload
            .into_iter()
            .map(|session| self.session_sample(session))
            .collect()
    }
}

pub fn new(context: &CollectorContext) -> Arc<dyn Collector> {
    Arc::new(ReportCollector::new(PlayingReport::new(), context))
}
