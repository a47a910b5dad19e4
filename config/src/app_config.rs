use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

lazy_static::lazy_static! {
    pub(crate) static ref PROJECT_NAME: String = "JELLYFIN_EXPORTER".to_string();
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{}_CONFIG_DIR", PROJECT_NAME.clone()))
        .ok()
        .map(PathBuf::from);
}

pub fn get_config_dir() -> PathBuf {
    let directory = if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    };
    directory
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "jellyfin", env!("CARGO_PKG_NAME"))
}
