use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Running count of right and wrong predictions made in prediction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub right: u64,
    pub wrong: u64,
}

impl Statistics {
    /// Reads the two counters. A missing or empty file counts as zero.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        let (right, wrong) = match (lines.next(), lines.next()) {
            (None, _) => return Ok(Self::default()),
            (Some(right), Some(wrong)) => (right, wrong),
            (Some(_), None) => return Err(invalid(path, "expected two lines")),
        };
        let parse = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|err| invalid(path, &format!("{:?}: {}", value, err)))
        };
        Ok(Statistics {
            right: parse(right)?,
            wrong: parse(wrong)?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, format!("{}\n{}", self.right, self.wrong))?;
        Ok(())
    }

    pub fn record(&mut self, correct: bool) {
        if correct {
            self.right += 1;
        } else {
            self.wrong += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.right + self.wrong
    }

    pub fn accuracy(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.right as f64 / total as f64),
        }
    }
}

fn invalid(path: &Path, reason: &str) -> Error {
    Error::InvalidStatistics {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
