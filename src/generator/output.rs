use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Sibling temporary path used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `contents` to a sibling temporary file, then rename it over `path`.
///
/// Readers never observe a partially written file. On failure the temporary
/// file is removed and `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let result = fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, path).with_context(|| {
                format!("Failed to move {} to {}", tmp.display(), path.display())
            })
        });
    if result.is_err() {
        if let Err(err) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %err, "temporary file not removed");
        }
    }
    result
}
