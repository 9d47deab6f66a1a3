use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Message bodies come base64url encoded, with or without padding.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

/// Turns free text into the stems used as features.
///
/// Words are lowercased, anything that is not purely alphabetic or is an
/// English stop word is dropped, and the remainder is stemmed. The output
/// keeps duplicates and source order.
pub struct Analyzer {
    stemmer: Stemmer,
}

impl Analyzer {
    pub fn english() -> Self {
        Analyzer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(str::to_lowercase)
            .filter(|word| word.chars().all(char::is_alphabetic))
            .filter(|word| !is_stop_word(word))
            .map(|word| self.stemmer.stem(&word).into_owned())
            .collect()
    }

    /// Decodes a base64url body, strips any markup and analyzes the text.
    /// Undecodable data yields no words.
    pub fn analyze_encoded(&self, data: &str) -> Vec<String> {
        match decode_body(data) {
            Some(text) => self.analyze(&text),
            None => vec![],
        }
    }
}

pub fn decode_body(data: &str) -> Option<String> {
    let bytes = match BODY_ENGINE.decode(data.trim()) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("Discarding undecodable body: {}", err);
            return None;
        }
    };
    let html = String::from_utf8_lossy(&bytes);
    Some(nanohtml2text::html2text(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze() {
        let analyzer = Analyzer::english();
        assert_eq!(
            analyzer.analyze("The Running dogs, and 42 running cats!"),
            vec!["run", "dog", "run", "cat"]
        );
    }

    #[test]
    fn test_stop_words_are_case_insensitive() {
        let analyzer = Analyzer::english();
        assert!(analyzer.analyze("THE And oF").is_empty());
    }

    #[test]
    fn test_analyze_encoded() {
        let analyzer = Analyzer::english();
        let data = BODY_ENGINE.encode("<p>Buy cheap watches</p>");
        assert_eq!(analyzer.analyze_encoded(&data), vec!["buy", "cheap", "watch"]);
        assert!(analyzer.analyze_encoded("%%% not base64 %%%").is_empty());
    }

    #[test]
    fn test_decode_body_accepts_padding() {
        assert_eq!(decode_body("aGk=").as_deref().map(str::trim), Some("hi"));
        assert_eq!(decode_body("aGk").as_deref().map(str::trim), Some("hi"));
    }
}
