use crate::message::Message;
use crate::vocabulary::Vocabulary;
use std::collections::BTreeMap;

pub type FeatureVector = Vec<u32>;

/// Fixes the feature order for one vocabulary: stems sorted lexicographically.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    positions: BTreeMap<String, usize>,
}

impl FeatureSpace {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self::from_words(vocabulary.words())
    }

    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let mut positions: BTreeMap<String, usize> = words
            .iter()
            .map(|word| (word.as_ref().to_string(), 0))
            .collect();
        for (i, position) in positions.values_mut().enumerate() {
            *position = i;
        }
        FeatureSpace { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Counts how often each vocabulary stem occurs in the subject and body.
    /// Stems outside the vocabulary are ignored.
    pub fn extract(&self, message: &Message) -> FeatureVector {
        let mut counts = vec![0; self.positions.len()];
        for stem in message.stems() {
            if let Some(&i) = self.positions.get(stem) {
                counts[i] += 1;
            }
        }
        counts
    }
}
