use crate::{
    collector::{
        Collector,
        CollectorContext,
    },
    error::{
        CollectorError,
        SampleError,
    },
    pipeline::{
        fetch_json,
        nullable,
    },
    sample::{
        Descriptor,
        Sample,
        SampleSink,
    },
};
use chrono::DateTime;
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};
use tracing::{
    Instrument as _,
    Span,
};

pub const NAME: &str = "users";

const USERS_ENDPOINT: &str = "Users";
const SESSIONS_ENDPOINT: &str = "Sessions";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct UserPolicy {
    #[serde(deserialize_with = "nullable")]
    pub is_disabled: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_administrator: bool,
    #[serde(deserialize_with = "nullable")]
    pub enabled_folders: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct User {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    pub last_activity_date: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub policy: UserPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SessionUser {
    #[serde(deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(deserialize_with = "nullable")]
    pub client: String,
    #[serde(deserialize_with = "nullable")]
    pub application_version: String,
    #[serde(deserialize_with = "nullable")]
    pub device_name: String,
    #[serde(deserialize_with = "nullable")]
    pub remote_end_point: String,
}

/// Unix seconds of an RFC 3339 timestamp, or an empty string if it is missing or malformed.
fn last_active(user: &User) -> String {
    let Some(raw) = user.last_activity_date.as_deref().filter(|d| !d.is_empty()) else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => timestamp.timestamp().to_string(),
        Err(err) => {
            debug!(user = %user.name, value = raw, error = %err, "ignoring unparsable LastActivityDate");
            String::new()
        }
    }
}

/// Reports accounts from `Users` and active clients from `Sessions`.
///
/// The two endpoints are independent: if one of them fails, samples from the other are still
/// emitted before the failure is returned.
pub struct UsersCollector {
    context: CollectorContext,
    account: Arc<Descriptor>,
    active: Arc<Descriptor>,
    span: Span,
}

impl UsersCollector {
    pub fn new(context: &CollectorContext) -> Self {
        Self {
            context: context.clone(),
            account: Descriptor::new(
                "user",
                "account",
                "Jellyfin user accounts.",
                &["user_id", "username", "admin", "last_access"],
            ),
            active: Descriptor::new(
                "user",
                "active",
                "Jellyfin current active users.",
                &["user_id", "username", "client", "client_version", "device", "ip_address"],
            ),
            span: info_span!("collector", name = NAME),
        }
    }

    pub fn account_samples(&self, users: Vec<User>) -> Result<Vec<Sample>, SampleError> {
        users
            .into_iter()
            .map(|user| {
                debug!(user = %user.name, "user account");
                let last_active = last_active(&user);
                let enabled = if user.policy.is_disabled { 0.0 } else { 1.0 };
                let admin = if user.policy.is_administrator { "1" } else { "0" };
                Sample::gauge(
                    &self.account,
                    enabled,
                    vec![user.id, user.name, admin.to_string(), last_active],
                )
            })
            .collect()
    }

    pub fn active_samples(&self, sessions: Vec<SessionUser>) -> Result<Vec<Sample>, SampleError> {
        sessions
            .into_iter()
            .map(|session| {
                debug!(user = %session.user_name, "user session active");
                Sample::gauge(
                    &self.active,
                    1.0,
                    vec![
                        session.user_id,
                        session.user_name,
                        session.client,
                        session.application_version,
                        session.device_name,
                        session.remote_end_point,
                    ],
                )
            })
            .collect()
    }
}

impl Collector for UsersCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn update<'a>(
        &'a self,
        sink: &'a SampleSink,
    ) -> Pin<Box<dyn Future<Output = Result<(), CollectorError>> + Send + 'a>> {
        Box::pin(
            async move {
                let connection = self.context.resolver.resolve()?;
                let fetcher = self.context.fetcher.as_ref();
                let (users, sessions) = futures::join!(
                    fetch_json::<Vec<User>>(fetcher, &connection, USERS_ENDPOINT),
                    fetch_json::<Vec<SessionUser>>(fetcher, &connection, SESSIONS_ENDPOINT),
                );

                let mut first_error = None;
                match users {
                    Ok(users) => {
                        for sample in self.account_samples(users)? {
                            sink.emit(sample)?;
                        }
                    }
                    Err(err) => first_error = Some(err),
                }
                match sessions {
                    Ok(sessions) => {
                        for sample in self.active_samples(sessions)? {
                            sink.emit(sample)?;
                        }
                    }
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }

                first_error.map_or(Ok(()), Err)
            }
            .instrument(self.span.clone()),
        )
    }
}

pub fn new(context: &CollectorContext) -> Arc<dyn Collector> {
    Arc::new(UsersCollector::new(context))
}
