//! Saving completed payloads.
//!
//! The payload is written to `<name>.part`, synced, then renamed onto the
//! final name so a crash or write error never leaves a truncated file under
//! the real filename.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.zip` → `file.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `payload` to `dir/filename` atomically. `filename` must already be sanitized.
/// Returns the final path.
pub fn save_payload(dir: &Path, filename: &str, payload: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    let final_path = dir.join(filename);
    let tp = temp_path(&final_path);

    if let Err(e) = write_synced(&tp, payload) {
        let _ = std::fs::remove_file(&tp);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&tp, &final_path) {
        let _ = std::fs::remove_file(&tp);
        return Err(e).with_context(|| {
            format!("failed to rename {} to {}", tp.display(), final_path.display())
        });
    }
    Ok(final_path)
}

fn write_synced(path: &Path, payload: &[u8]) -> Result<()> {
    let mut f =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    f.write_all(payload)
        .with_context(|| format!("failed to write {}", path.display()))?;
    f.sync_all().context("storage sync failed")?;
    Ok(())
}
