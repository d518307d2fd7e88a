// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use log::debug;

use crate::error::{PaimonError, PaimonResult};
use crate::io::{read_file, snapshot_file_name, write_new_file, write_pointer, EARLIEST, LATEST};
use crate::spec::Snapshot;

/// Reads a snapshot pointer file, returning `None` when it does not exist.
pub fn read_pointer(snapshot_dir: &Path, name: &str) -> PaimonResult<Option<i64>> {
    let path = snapshot_dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = read_file(&path)?;
    let text = String::from_utf8_lossy(&bytes);
    text.trim().parse::<i64>().map(Some).map_err(|e| {
        PaimonError::invariant(format!(
            "{} does not hold a snapshot id: {e}",
            path.display()
        ))
    })
}

/// Publishes snapshots of one table.
pub struct SnapshotCommit<'a> {
    snapshot_dir: &'a Path,
}

impl<'a> SnapshotCommit<'a> {
    pub fn new(snapshot_dir: &'a Path) -> Self {
        Self { snapshot_dir }
    }

    /// Writes `snapshot-<id>` and moves the pointers.
    /// `EARLIEST` is only written for the first snapshot since snapshots are never expired.
    pub fn commit(&self, snapshot: &Snapshot) -> PaimonResult<i64> {
        let path = self.snapshot_dir.join(snapshot_file_name(snapshot.id));
        let size = write_new_file(&path, &snapshot.to_json_bytes()?)?;
        let id = snapshot.id.to_string();
        if read_pointer(self.snapshot_dir, EARLIEST)?.is_none() {
            write_pointer(&self.snapshot_dir.join(EARLIEST), &id)?;
        }
        write_pointer(&self.snapshot_dir.join(LATEST), &id)?;
        debug!("committed snapshot {id} at {}", path.display());
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use std::fs;

    use super::*;
    use crate::spec::SnapshotBuilder;

    #[test]
    fn test_pointers_move_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        let commit = SnapshotCommit::new(dir.path());
        assert_eq!(read_pointer(dir.path(), LATEST).unwrap(), None);

        commit.commit(&SnapshotBuilder::new(1, 0, "a").build()).unwrap();
        assert_eq!(read_pointer(dir.path(), EARLIEST).unwrap(), Some(1));
        assert_eq!(read_pointer(dir.path(), LATEST).unwrap(), Some(1));

        commit.commit(&SnapshotBuilder::new(2, 0, "b").build()).unwrap();
        assert_eq!(read_pointer(dir.path(), EARLIEST).unwrap(), Some(1));
        assert_eq!(read_pointer(dir.path(), LATEST).unwrap(), Some(2));
        assert_eq!(fs::read_to_string(dir.path().join(LATEST)).unwrap(), "2");
    }

    #[test]
    fn test_snapshot_files_are_never_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let commit = SnapshotCommit::new(dir.path());
        commit.commit(&SnapshotBuilder::new(1, 0, "a").build()).unwrap();
        let err = commit
            .commit(&SnapshotBuilder::new(1, 0, "b").build())
            .unwrap_err();
        assert!(matches!(err, PaimonError::Io { .. }));
        assert_eq!(read_pointer(dir.path(), LATEST).unwrap(), Some(1));
    }

    #[test]
    fn test_malformed_pointer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LATEST), "snapshot-1").unwrap();
        assert!(matches!(
            read_pointer(dir.path(), LATEST),
            Err(PaimonError::Invariant(_))
        ));
    }
}
