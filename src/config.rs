use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Where the persisted stores live inside the data directory.
#[derive(Debug, Clone, Default)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: &Path) -> Self {
        DataDir {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vocabulary(&self) -> PathBuf {
        self.root.join("dictionary.txt")
    }

    pub fn labels(&self) -> PathBuf {
        self.root.join("labels.txt")
    }

    pub fn features(&self) -> PathBuf {
        self.root.join("features.json")
    }

    pub fn statistics(&self) -> PathBuf {
        self.root.join("statistics.txt")
    }

    /// Creates the directory and any missing store as an empty file.
    pub fn ensure_exists(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        for path in [self.vocabulary(), self.labels(), self.features(), self.statistics()].iter() {
            OpenOptions::new().create(true).append(true).open(path)?;
        }
        Ok(())
    }
}

/// How to reach the mailbox API.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_base: String,
    pub user: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub max_pages: Option<usize>,
}
