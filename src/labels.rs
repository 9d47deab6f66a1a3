use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Message id to human label, `true` meaning good.
pub type LabelMap = BTreeMap<String, bool>;

/// One raw line of the label file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub id: String,
    pub good: bool,
}

/// Line-oriented store of `<id>\t<True|False>` records.
#[derive(Debug, Clone)]
pub struct LabelStore {
    path: PathBuf,
}

impl LabelStore {
    pub fn new(path: &Path) -> Self {
        LabelStore {
            path: path.to_path_buf(),
        }
    }

    /// Every record in file order, duplicates included.
    pub fn records(&self) -> Result<Vec<LabelRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };
        let mut records = vec![];
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (id, good) = match (fields.next(), fields.next()) {
                (Some(id), Some("True")) => (id, true),
                (Some(id), Some("False")) => (id, false),
                _ => {
                    return Err(Error::InvalidLabelLine {
                        path: self.path.clone(),
                        line_no: i + 1,
                        line: line.to_string(),
                    })
                }
            };
            records.push(LabelRecord {
                id: id.to_string(),
                good,
            });
        }
        Ok(records)
    }

    /// The labels keyed by message id. A missing or empty label file gives
    /// an empty map; a later record for the same id wins.
    pub fn load(&self) -> Result<LabelMap> {
        Ok(self
            .records()?
            .into_iter()
            .map(|record| (record.id, record.good))
            .collect())
    }

    /// Adds one record. Callers are responsible for not repeating ids.
    pub fn append(&self, id: &str, good: bool) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}\t{}", id, if good { "True" } else { "False" })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LabelStore::new(&dir.path().join("labels.txt"));
        store.append("m1", true).unwrap();
        let expected: LabelMap = vec![("m1".to_string(), true)].into_iter().collect();
        assert_eq!(store.load().unwrap(), expected);

        store.append("m2", false).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("labels.txt")).unwrap(),
            "m1\tTrue\nm2\tFalse\n"
        );
    }

    #[test]
    fn test_missing_or_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.txt");
        let store = LabelStore::new(&path);
        assert!(store.load().unwrap().is_empty());
        fs::write(&path, "").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_loading_ignores_feature_cache_state() {
        // Labels are readable even before any feature cache has been written.
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("features.json"), "").unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "a\tTrue\nb\tFalse\n").unwrap();
        let labels = LabelStore::new(&path).load().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["a"], true);
        assert_eq!(labels["b"], false);
    }

    #[test]
    fn test_duplicates_keep_last() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "a\tTrue\na\tFalse\n").unwrap();
        let store = LabelStore::new(&path);
        assert_eq!(store.records().unwrap().len(), 2);
        assert_eq!(store.load().unwrap()["a"], false);
    }

    #[test]
    fn test_invalid_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "a\tTrue\nb\tmaybe\n").unwrap();
        match LabelStore::new(&path).load() {
            Err(Error::InvalidLabelLine { line_no, .. }) => assert_eq!(line_no, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
