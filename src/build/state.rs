use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Content fingerprint of a generators folder.
///
/// Keys are `/`-separated paths relative to the folder; values are SHA-256
/// digests in hex. Two configures from identical inputs compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainState {
    pub files: BTreeMap<String, String>,
}

impl ToolchainState {
    pub fn capture(dir: &Path) -> io::Result<Self> {
        let mut files = BTreeMap::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let digest = Sha256::digest(fs::read(entry.path())?);
            files.insert(rel, format!("{:x}", digest));
        }
        Ok(Self { files })
    }

    /// One digest over every file name and content digest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (path, digest) in &self.files {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(digest.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.files.contains_key(rel)
    }
}
