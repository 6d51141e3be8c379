//! Snapshot file I/O.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::snapshot::SnapshotError;
use crate::snapshot::codec::SnapshotCodec;
use crate::snapshot::format::{decode_snapshot, encode_snapshot};
use crate::tree::{AvlTree, TraversalOrder};

/// Sibling path used while a snapshot is being written.
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

/// Write `tree` to `path`, replacing any existing snapshot atomically.
///
/// Missing parent directories are created. The bytes are written to a
/// sibling staging file, synced, and renamed over `path`, so a crash leaves
/// either the old snapshot or the new one.
pub fn save_to_path<K, V>(
    tree: &AvlTree<K, V>,
    path: &Path,
    order: TraversalOrder,
) -> Result<(), SnapshotError>
where
    K: SnapshotCodec,
    V: SnapshotCodec,
{
    let bytes = encode_snapshot(tree, order)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(SnapshotError::Io)?;
    }

    let staging = staging_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&staging)
        .map_err(SnapshotError::Io)?;
    file.write_all(&bytes).map_err(SnapshotError::Io)?;
    file.sync_all().map_err(SnapshotError::Io)?;
    drop(file);

    fs::rename(&staging, path).map_err(SnapshotError::Io)?;

    tracing::info!(
        "Saved {} records ({} bytes) to {}",
        tree.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Read the snapshot at `path` and rebuild its tree.
pub fn load_from_path<K, V>(path: &Path) -> Result<AvlTree<K, V>, SnapshotError>
where
    K: SnapshotCodec + Ord,
    V: SnapshotCodec,
{
    let bytes = fs::read(path).map_err(SnapshotError::Io)?;

    match decode_snapshot(&bytes) {
        Ok(tree) => {
            tracing::info!("Loaded {} records from {}", tree.len(), path.display());
            Ok(tree)
        }
        Err(e) => {
            tracing::warn!("Rejected snapshot {}: {e}", path.display());
            Err(e)
        }
    }
}
