use crate::cache::FeatureCache;
use crate::classify;
use crate::config::{DataDir, MailConfig};
use crate::dataset::Dataset;
use crate::features::FeatureSpace;
use crate::labels::LabelStore;
use crate::mailbox::Mailbox;
use crate::prompt::{Mode, Prompt, Response};
use crate::stats::Statistics;
use crate::vocabulary::Vocabulary;
use anyhow::{Context, Result};

/// How a collecting session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub mode: Mode,
    pub labeled: usize,
    pub exited: bool,
    pub statistics: Statistics,
}

/// Walks the mailbox page by page and asks the user to label every message
/// that has no label yet, optionally showing the classifier's guess first.
pub struct Collector<'a, M, P> {
    pub dataset: Dataset<'a, M>,
    pub prompt: &'a mut P,
    pub page_size: u32,
    pub max_pages: Option<usize>,
}

impl<'a, M: Mailbox, P: Prompt> Collector<'a, M, P> {
    pub fn new(dataset: Dataset<'a, M>, prompt: &'a mut P, config: &MailConfig) -> Self {
        Collector {
            dataset,
            prompt,
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    fn dir(&self) -> &DataDir {
        self.dataset.dir
    }

    pub fn run(&mut self) -> Result<Outcome> {
        self.dir()
            .ensure_exists()
            .with_context(|| format!("Failed to create {}", self.dir().root().display()))?;

        let mode = if FeatureCache::load(&self.dir().features())?.is_empty() {
            Mode::Collection
        } else {
            self.prompt.ask_mode()?
        };
        log::debug!("Collecting in {:?} mode", mode);

        let stats_path = self.dir().statistics();
        let mut statistics = Statistics::load(&stats_path)?;

        self.dataset
            .build()
            .context("Failed to update the training data")?;
        let space = match mode {
            Mode::Prediction => Some(FeatureSpace::new(&Vocabulary::load(
                &self.dir().vocabulary(),
            )?)),
            Mode::Collection => None,
        };

        let store = LabelStore::new(&self.dir().labels());
        let mut labels = store.load()?;
        let mut labeled = 0;
        let mut exited = false;
        let mut page_token: Option<String> = None;
        let mut pages = 0;
        self.prompt.show("Messages: ")?;
        'pages: loop {
            let page = self
                .dataset
                .mailbox
                .list_messages(page_token.as_deref(), self.page_size)?;
            pages += 1;
            for (ind, summary) in page.messages.iter().enumerate() {
                if labels.contains_key(&summary.id) {
                    continue;
                }
                let message = match self.dataset.fetch(&summary.id)? {
                    Some(message) => message,
                    None => continue,
                };
                self.prompt.show(&format!("{} {}", ind, message))?;

                let prediction = match &space {
                    Some(space) => {
                        let features = space.extract(&message);
                        let prediction =
                            classify::predict_from_cache(&self.dir().features(), &features)
                                .context("Failed to classify message")?;
                        self.prompt.show(if prediction {
                            "The prediction is: Not Spam"
                        } else {
                            "The prediction is: Spam"
                        })?;
                        Some(prediction)
                    }
                    None => None,
                };

                let good = match self.prompt.ask_label()? {
                    Response::Good => true,
                    Response::Spam => false,
                    Response::Exit => {
                        exited = true;
                        break 'pages;
                    }
                };
                if let Some(prediction) = prediction {
                    statistics.record(prediction == good);
                }
                store.append(&summary.id, good)?;
                labels.insert(summary.id.clone(), good);
                labeled += 1;
            }

            page_token = page.next_page_token;
            if page_token.is_none() || self.max_pages.map_or(false, |max| pages >= max) {
                break;
            }
        }

        statistics.save(&stats_path)?;
        log::info!("Labeled {} messages", labeled);
        Ok(Outcome {
            mode,
            labeled,
            exited,
            statistics,
        })
    }
}
