use std::path::{Path, PathBuf};

pub const STATE_DIR: &str = ".webface";
pub const STATE_FILE_NAME: &str = "state.json";

/// Default location of the persisted client state under `cwd`.
#[must_use]
pub fn state_file_path(cwd: &Path) -> PathBuf {
    cwd.join(STATE_DIR).join(STATE_FILE_NAME)
}

/// Sibling path used for write-then-rename persistence.
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STATE_FILE_NAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}
