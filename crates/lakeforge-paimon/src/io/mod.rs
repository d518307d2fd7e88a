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

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use log::trace;

use crate::error::{PaimonError, PaimonResult};

mod directories;
mod identifier;
mod path_factory;

pub use directories::*;
pub use identifier::*;
pub use path_factory::*;

/// Writes a file that must not exist yet and returns its size on disk.
pub fn write_new_file(path: &Path, bytes: &[u8]) -> PaimonResult<i64> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| PaimonError::io(path, e))?;
    file.write_all(bytes).map_err(|e| PaimonError::io(path, e))?;
    file.sync_all().map_err(|e| PaimonError::io(path, e))?;
    let size = file_size(path)?;
    trace!("wrote {} ({size} bytes)", path.display());
    Ok(size)
}

/// Creates or replaces a pointer file with the given content.
pub fn write_pointer(path: &Path, content: &str) -> PaimonResult<()> {
    fs::write(path, content).map_err(|e| PaimonError::io(path, e))?;
    trace!("updated {} to {content}", path.display());
    Ok(())
}

pub fn read_file(path: &Path) -> PaimonResult<Vec<u8>> {
    fs::read(path).map_err(|e| PaimonError::io(path, e))
}

pub fn file_size(path: &Path) -> PaimonResult<i64> {
    let metadata = fs::metadata(path).map_err(|e| PaimonError::io(path, e))?;
    i64::try_from(metadata.len())
        .map_err(|_| PaimonError::invariant(format!("file too large: {}", path.display())))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_write_new_file_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        assert_eq!(write_new_file(&path, b"hello").unwrap(), 5);
        let err = write_new_file(&path, b"again").unwrap_err();
        assert!(matches!(err, PaimonError::Io { .. }));
        assert_eq!(read_file(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_write_pointer_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LATEST");
        write_pointer(&path, "1").unwrap();
        write_pointer(&path, "2").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"2");
    }
}
