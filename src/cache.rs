use crate::error::Result;
use crate::features::{FeatureSpace, FeatureVector};
use crate::labels::LabelMap;
use crate::message::Message;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A feature vector with its human label, stored as `[[0, 1, ...], 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord(pub FeatureVector, #[serde(with = "label_flag")] pub bool);

impl TrainingRecord {
    pub fn features(&self) -> &[u32] {
        &self.0
    }

    pub fn good(&self) -> bool {
        self.1
    }
}

/// Labels are written as 0/1; `true`/`false` are accepted on read.
mod label_flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
    }

    pub fn serialize<S: Serializer>(good: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*good as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(good) => Ok(good),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(n) => Err(D::Error::custom(format!("label must be 0 or 1, got {}", n))),
        }
    }
}

/// Message id to training record, persisted as a single JSON object.
#[derive(Debug)]
pub struct FeatureCache {
    path: PathBuf,
    records: BTreeMap<String, TrainingRecord>,
}

impl FeatureCache {
    /// Reads the cache. A missing or blank file is an empty cache; malformed
    /// JSON is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        let records = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)?
        };
        Ok(FeatureCache {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn records(&self) -> &BTreeMap<String, TrainingRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn insert(&mut self, id: &str, record: TrainingRecord) {
        self.records.insert(id.to_string(), record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records whose width differs from `width`.
    pub fn ragged(&self, width: usize) -> usize {
        self.records
            .values()
            .filter(|record| record.features().len() != width)
            .count()
    }

    /// Computes a record for every labeled message missing from the cache,
    /// refreshes labels of records already present, and writes the whole
    /// cache back. `fetch` returns `None` for messages that should be skipped.
    /// Returns the number of newly computed records.
    pub fn rebuild<F>(
        &mut self,
        labels: &LabelMap,
        space: &FeatureSpace,
        progress: &ProgressBar,
        mut fetch: F,
    ) -> Result<usize>
    where
        F: FnMut(&str) -> Result<Option<Message>>,
    {
        let mut count = 0;
        for (id, &good) in labels.iter() {
            if let Some(record) = self.records.get_mut(id) {
                record.1 = good;
                progress.inc(1);
                continue;
            }
            if let Some(message) = fetch(id)? {
                let record = TrainingRecord(space.extract(&message), good);
                self.records.insert(id.clone(), record);
                count += 1;
                if count % 100 == 0 {
                    log::info!("Counted words of {} messages", count);
                }
            }
            progress.inc(1);
        }
        self.save()?;
        Ok(count)
    }

    /// Rewrites the whole cache through a temporary file.
    pub fn save(&self) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &self.records)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
