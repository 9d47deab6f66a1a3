use crate::cache::FeatureCache;
use crate::config::DataDir;
use crate::error::{Error, Result};
use crate::features::FeatureSpace;
use crate::labels::{LabelMap, LabelStore};
use crate::mailbox::Mailbox;
use crate::message::Message;
use crate::stats::Statistics;
use crate::text::Analyzer;
use crate::utils;
use crate::vocabulary::Vocabulary;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Keeps the vocabulary and feature cache in step with the label store,
/// fetching labeled messages from the mailbox as needed.
pub struct Dataset<'a, M> {
    pub mailbox: &'a M,
    pub analyzer: &'a Analyzer,
    pub dir: &'a DataDir,
    pub quiet: bool,
}

impl<'a, M: Mailbox> Dataset<'a, M> {
    /// Fetches and parses one message. Unparseable messages are skipped
    /// with a warning; every other failure propagates.
    pub fn fetch(&self, id: &str) -> Result<Option<Message>> {
        let raw = self.mailbox.get_message(id)?;
        match Message::parse(raw, self.analyzer) {
            Ok(message) => Ok(Some(message)),
            Err(err @ Error::UnparseableMessage { .. }) => {
                log::warn!("Skipping message: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every labeled message keyed by id, `None` for skipped ones.
    fn fetch_labeled(&self, labels: &LabelMap) -> Result<BTreeMap<String, Option<Message>>> {
        let progress = utils::create_progress_bar(self.quiet, labels.len(), "Reading");
        let mut messages = BTreeMap::new();
        for id in labels.keys() {
            messages.insert(id.clone(), self.fetch(id)?);
            progress.inc(1);
        }
        progress.finish_and_clear();
        Ok(messages)
    }

    /// Creates the vocabulary from every labeled message if there is none
    /// yet, then brings the feature cache up to date.
    pub fn build(&self) -> Result<FeatureCache> {
        let labels = LabelStore::new(&self.dir.labels()).load()?;
        let mut vocabulary = Vocabulary::load(&self.dir.vocabulary())?;
        let mut fetched = BTreeMap::new();
        if vocabulary.is_empty() {
            log::info!("Creating word list...");
            fetched = self.fetch_labeled(&labels)?;
            let messages = self.in_label_order(&fetched)?;
            vocabulary = Vocabulary::build(&self.dir.vocabulary(), messages)?;
            log::info!("Vocabulary has {} stems", vocabulary.len());
        }
        self.count_all_words(&labels, &vocabulary, fetched, false)
    }

    /// Brings the feature cache up to date with the labels. With `refresh`
    /// every record is recomputed against the current vocabulary.
    pub fn update(&self, refresh: bool) -> Result<FeatureCache> {
        let labels = LabelStore::new(&self.dir.labels()).load()?;
        let vocabulary = Vocabulary::load(&self.dir.vocabulary())?;
        self.count_all_words(&labels, &vocabulary, BTreeMap::new(), refresh)
    }

    /// Adds the stems of every labeled message to the vocabulary.
    pub fn extend_vocabulary(&self) -> Result<usize> {
        let labels = LabelStore::new(&self.dir.labels()).load()?;
        let mut vocabulary = Vocabulary::load(&self.dir.vocabulary())?;
        let messages = self.fetch_labeled(&labels)?;
        let added = vocabulary.extend(self.in_label_order(&messages)?)?;
        if added > 0 {
            log::warn!(
                "Added {} stems; run `update --refresh` so cached features match",
                added
            );
        }
        Ok(added)
    }

    /// Fetched messages in the order their ids first appear in the label file.
    fn in_label_order<'m>(
        &self,
        fetched: &'m BTreeMap<String, Option<Message>>,
    ) -> Result<Vec<&'m Message>> {
        let mut seen = HashSet::new();
        Ok(LabelStore::new(&self.dir.labels())
            .records()?
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .filter_map(|record| fetched.get(&record.id).and_then(Option::as_ref))
            .collect())
    }

    fn count_all_words(
        &self,
        labels: &LabelMap,
        vocabulary: &Vocabulary,
        mut fetched: BTreeMap<String, Option<Message>>,
        refresh: bool,
    ) -> Result<FeatureCache> {
        log::info!("Counting all words...");
        let space = FeatureSpace::new(vocabulary);
        let mut cache = FeatureCache::load(&self.dir.features())?;
        if refresh {
            cache.clear();
        }
        let progress = utils::create_progress_bar(self.quiet, labels.len(), "Counting");
        let added = cache.rebuild(labels, &space, &progress, |id| match fetched.remove(id) {
            Some(message) => Ok(message),
            None => self.fetch(id),
        })?;
        progress.finish_and_clear();
        log::info!("Counted words of {} new messages", added);

        let ragged = cache.ragged(space.len());
        if ragged > 0 {
            log::warn!(
                "{} cached feature vectors do not match the {} stem vocabulary; \
                 run `update --refresh`",
                ragged,
                space.len()
            );
        }
        Ok(cache)
    }
}

/// Offline overview of everything stored in the data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub records: usize,
    pub unique_ids: usize,
    pub good: usize,
    pub spam: usize,
    pub vocabulary: usize,
    pub cached: usize,
    pub ragged: usize,
    pub statistics: Statistics,
}

pub fn summarize(dir: &DataDir) -> Result<Summary> {
    let records = LabelStore::new(&dir.labels()).records()?;
    let labels: LabelMap = records
        .iter()
        .map(|record| (record.id.clone(), record.good))
        .collect();
    let unique: HashSet<&str> = records.iter().map(|record| record.id.as_str()).collect();
    let vocabulary = Vocabulary::load(&dir.vocabulary())?;
    let cache = FeatureCache::load(&dir.features())?;
    let good = labels.values().filter(|&&good| good).count();
    Ok(Summary {
        records: records.len(),
        unique_ids: unique.len(),
        good,
        spam: labels.len() - good,
        vocabulary: vocabulary.len(),
        cached: cache.len(),
        ragged: cache.ragged(vocabulary.len()),
        statistics: Statistics::load(&dir.statistics())?,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Number of emails: {}", self.records)?;
        writeln!(f, "Number of unique email ids: {}", self.unique_ids)?;
        writeln!(f, "Good: {}, Spam: {}", self.good, self.spam)?;
        writeln!(f, "Vocabulary size: {}", self.vocabulary)?;
        writeln!(f, "Cached feature vectors: {} ({} out of date)", self.cached, self.ragged)?;
        write!(
            f,
            "Predictions: {} right, {} wrong",
            self.statistics.right, self.statistics.wrong
        )?;
        if let Some(accuracy) = self.statistics.accuracy() {
            write!(f, " ({:.1}% accurate)", accuracy * 100.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mailbox::{MailLabel, MessagePage, MessageSummary};
    use crate::message::{RawBody, RawHeader, RawMessage, RawPart};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory mailbox that counts every call made to it.
    #[derive(Default)]
    pub(crate) struct FakeMailbox {
        pub pages: Vec<Vec<&'static str>>,
        pub bodies: HashMap<&'static str, (&'static str, &'static str)>,
        pub list_calls: Cell<usize>,
        pub fetched: RefCell<Vec<String>>,
    }

    impl FakeMailbox {
        /// One page holding `(id, subject, body)` messages in order.
        pub(crate) fn with_messages(
            messages: &[(&'static str, &'static str, &'static str)],
        ) -> Self {
            FakeMailbox {
                pages: vec![messages.iter().map(|(id, _, _)| *id).collect()],
                bodies: messages
                    .iter()
                    .map(|&(id, subject, body)| (id, (subject, body)))
                    .collect(),
                ..FakeMailbox::default()
            }
        }
    }

    impl Mailbox for FakeMailbox {
        fn labels(&self) -> Result<Vec<MailLabel>> {
            Ok(vec![MailLabel {
                id: "INBOX".to_string(),
                name: "INBOX".to_string(),
            }])
        }

        fn list_messages(&self, page_token: Option<&str>, _page_size: u32) -> Result<MessagePage> {
            let index: usize = page_token.and_then(|token| token.parse().ok()).unwrap_or(0);
            self.list_calls.set(self.list_calls.get() + 1);
            let messages = self.pages.get(index).cloned().unwrap_or_default();
            Ok(MessagePage {
                messages: messages
                    .into_iter()
                    .map(|id| MessageSummary {
                        id: id.to_string(),
                        thread_id: None,
                    })
                    .collect(),
                next_page_token: if index + 1 < self.pages.len() {
                    Some((index + 1).to_string())
                } else {
                    None
                },
            })
        }

        fn get_message(&self, id: &str) -> Result<RawMessage> {
            self.fetched.borrow_mut().push(id.to_string());
            let (subject, body) = match self.bodies.get(id) {
                Some(&content) => content,
                None => {
                    return Ok(RawMessage {
                        id: id.to_string(),
                        ..RawMessage::default()
                    })
                }
            };
            Ok(RawMessage {
                id: id.to_string(),
                label_ids: vec![],
                payload: Some(RawPart {
                    mime_type: "text/plain".to_string(),
                    headers: vec![
                        RawHeader {
                            name: "From".to_string(),
                            value: "Sender <sender@example.com>".to_string(),
                        },
                        RawHeader {
                            name: "Subject".to_string(),
                            value: subject.to_string(),
                        },
                    ],
                    body: Some(RawBody {
                        data: Some(URL_SAFE_NO_PAD.encode(body)),
                    }),
                    parts: None,
                }),
            })
        }
    }

    fn dataset<'a>(
        mailbox: &'a FakeMailbox,
        analyzer: &'a Analyzer,
        dir: &'a DataDir,
    ) -> Dataset<'a, FakeMailbox> {
        Dataset {
            mailbox,
            analyzer,
            dir,
            quiet: true,
        }
    }

    #[test]
    fn test_build_fetches_each_message_once() {
        let tmp = TempDir::new().unwrap();
        let dir = DataDir::new(tmp.path());
        dir.ensure_exists().unwrap();
        fs::write(dir.labels(), "a\tFalse\nb\tTrue\nbroken\tTrue\n").unwrap();
        let mailbox = FakeMailbox::with_messages(&[
            ("a", "Free prize", "Claim your free prize"),
            ("b", "Lunch", "Lunch tomorrow"),
        ]);
        let analyzer = Analyzer::english();

        let cache = dataset(&mailbox, &analyzer, &dir).build().unwrap();
        assert_eq!(*mailbox.fetched.borrow(), vec!["a", "b", "broken"]);
        let vocabulary = Vocabulary::load(&dir.vocabulary()).unwrap();
        assert_eq!(vocabulary.words(), ["free", "prize", "claim", "lunch", "tomorrow"]);
        assert_eq!(cache.len(), 2);
        // claim, free, lunch, prize, tomorrow
        assert_eq!(cache.records()["a"].features(), [1, 2, 0, 2, 0]);
        assert_eq!(cache.records()["b"].features(), [0, 0, 2, 0, 1]);

        // A second build only fetches what is still missing.
        mailbox.fetched.borrow_mut().clear();
        dataset(&mailbox, &analyzer, &dir).build().unwrap();
        assert_eq!(*mailbox.fetched.borrow(), vec!["broken"]);
    }

    #[test]
    fn test_vocabulary_follows_label_file_order() {
        let tmp = TempDir::new().unwrap();
        let dir = DataDir::new(tmp.path());
        dir.ensure_exists().unwrap();
        fs::write(dir.labels(), "b\tTrue\na\tFalse\nb\tTrue\n").unwrap();
        let mailbox = FakeMailbox::with_messages(&[
            ("a", "Free prize", "Claim your free prize"),
            ("b", "Lunch", "Lunch tomorrow"),
        ]);
        let analyzer = Analyzer::english();

        let cache = dataset(&mailbox, &analyzer, &dir).build().unwrap();
        assert_eq!(
            fs::read_to_string(dir.vocabulary()).unwrap(),
            "lunch\ntomorrow\nfree\nprize\nclaim\n"
        );
        // Positions stay lexicographic whatever the file order.
        assert_eq!(cache.records()["a"].features(), [1, 2, 0, 2, 0]);
    }

    #[test]
    fn test_extend_then_refresh() {
        let tmp = TempDir::new().unwrap();
        let dir = DataDir::new(tmp.path());
        dir.ensure_exists().unwrap();
        fs::write(dir.vocabulary(), "lunch\n").unwrap();
        fs::write(dir.labels(), "b\tTrue\n").unwrap();
        let mailbox = FakeMailbox::with_messages(&[("b", "Lunch", "Lunch tomorrow")]);
        let analyzer = Analyzer::english();
        let data = dataset(&mailbox, &analyzer, &dir);

        let cache = data.build().unwrap();
        assert_eq!(cache.records()["b"].features(), [2]);
        assert_eq!(data.extend_vocabulary().unwrap(), 1);
        assert_eq!(data.extend_vocabulary().unwrap(), 0);

        let stale = data.update(false).unwrap();
        assert_eq!(stale.ragged(2), 1);
        let fresh = data.update(true).unwrap();
        assert_eq!(fresh.records()["b"].features(), [2, 1]);
    }

    #[test]
    fn test_summary() {
        let tmp = TempDir::new().unwrap();
        let dir = DataDir::new(tmp.path());
        dir.ensure_exists().unwrap();
        fs::write(dir.labels(), "a\tFalse\nb\tTrue\na\tTrue\n").unwrap();
        fs::write(dir.vocabulary(), "buy\nfree\n").unwrap();
        fs::write(dir.features(), r#"{"a": [[1, 0], 0], "b": [[0], 1]}"#).unwrap();
        fs::write(dir.statistics(), "3\n1").unwrap();

        let summary = summarize(&dir).unwrap();
        assert_eq!(
            summary,
            Summary {
                records: 3,
                unique_ids: 2,
                good: 2,
                spam: 0,
                vocabulary: 2,
                cached: 2,
                ragged: 1,
                statistics: Statistics { right: 3, wrong: 1 },
            }
        );
        assert!(summary.to_string().ends_with("Predictions: 3 right, 1 wrong (75.0% accurate)"));
    }
}
