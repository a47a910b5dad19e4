//! # Report Collectors
//!
//! One module per Jellyfin report. Each exposes a `NAME` and a `new` constructor matching
//! [`Constructor`](crate::registry::Constructor).
//!
//! - **`activity`**: Playback Reporting plugin usage per user (`jellyfin_activity_count`)
//! - **`media`**: library item totals (`jellyfin_media_count`)
//! - **`playing`**: sessions currently playing something (`jellyfin_now_playing_state`)
//! - **`users`**: accounts and active sessions (`jellyfin_user_account`, `jellyfin_user_active`)

pub mod activity;
pub mod media;
pub mod playing;
pub mod users;

pub use activity::{
    ActivityReport,
    UserActivity,
};
pub use media::{
    MediaCounts,
    MediaReport,
};
pub use playing::{
    NowPlayingItem,
    PlayState,
    PlayingReport,
    Session,
};
pub use users::{
    SessionUser,
    User,
    UserPolicy,
    UsersCollector,
};
