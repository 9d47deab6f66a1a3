use crate::error::Result;
use crate::message::Message;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only list of known stems, backed by a file with one stem per line
/// in first-seen order.
#[derive(Debug)]
pub struct Vocabulary {
    path: PathBuf,
    words: Vec<String>,
    known: HashSet<String>,
}

impl Vocabulary {
    /// Reads the stored stems. A missing file is an empty vocabulary.
    pub fn load(path: &Path) -> Result<Self> {
        let mut vocabulary = Vocabulary {
            path: path.to_path_buf(),
            words: vec![],
            known: HashSet::new(),
        };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vocabulary),
            Err(err) => return Err(err.into()),
        };
        for word in content.lines().map(str::trim).filter(|w| !w.is_empty()) {
            if vocabulary.known.insert(word.to_string()) {
                vocabulary.words.push(word.to_string());
            }
        }
        Ok(vocabulary)
    }

    /// Starts a fresh vocabulary file from the stems of `messages`.
    pub fn build<'a, I>(path: &Path, messages: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        File::create(path)?;
        let mut vocabulary = Vocabulary {
            path: path.to_path_buf(),
            words: vec![],
            known: HashSet::new(),
        };
        vocabulary.extend(messages)?;
        Ok(vocabulary)
    }

    /// Appends every stem of `messages` not seen before and returns how many
    /// were added. Existing entries are never touched.
    pub fn extend<'a, I>(&mut self, messages: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut added = 0;
        for message in messages {
            for stem in message.stems() {
                if self.known.contains(stem) {
                    continue;
                }
                writeln!(writer, "{}", stem)?;
                self.known.insert(stem.to_string());
                self.words.push(stem.to_string());
                added += 1;
            }
        }
        writer.flush()?;
        Ok(added)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
