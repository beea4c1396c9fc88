use std::{collections::HashMap, fs, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The token that stands in for unknown words, and for padding
pub static UNK: &str = "<UNK>";

/// The id of the unknown / padding token
pub const UNK_ID: usize = 0;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[\w'\-]+").expect("valid token pattern");
}

/// Split text into word tokens, keeping their case.
///
/// Runs of word characters, apostrophes and hyphens are split further where
/// capitals mark a boundary: an acronym ends before a capitalized word
/// (`"USBcable"` → `"US"`, `"Bcable"`), and a capitalized word ends before the
/// next capital (`"KindleFire"` → `"Kindle"`, `"Fire"`).
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for run in TOKEN.find_iter(text) {
        let mut rest = run.as_str();

        while !rest.is_empty() {
            let (token, tail) = rest.split_at(capitalized_prefix(rest).unwrap_or(rest.len()));
            tokens.push(token.to_string());
            rest = tail;
        }
    }

    tokens
}

/// Length of a leading acronym or camel-case word, if the run starts with one
fn capitalized_prefix(run: &str) -> Option<usize> {
    let bytes = run.as_bytes();
    let upper = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();

    if upper >= 2 {
        if !bytes.get(upper).is_some_and(u8::is_ascii_lowercase) {
            return Some(upper);
        }

        // The last capital starts the next word
        if upper >= 3 {
            return Some(upper - 1);
        }

        return None;
    }

    if upper == 1 {
        let lower = bytes[1..]
            .iter()
            .take_while(|b| b.is_ascii_lowercase())
            .count();

        if lower >= 1 && bytes.get(1 + lower).is_some_and(u8::is_ascii_uppercase) {
            return Some(1 + lower);
        }
    }

    None
}

/// A word index fitted on training texts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vocabulary {
    /// The longest training document, in tokens
    max_document_length: usize,

    /// Words in id order, starting with the unknown token
    words: Vec<String>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from the given texts, assigning ids in first-seen order
    pub fn fit<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vocabulary = Self::from_words(vec![UNK.to_string()], 0);

        for text in texts {
            let tokens = tokenize(text);

            vocabulary.max_document_length = vocabulary.max_document_length.max(tokens.len());

            for token in tokens {
                if !vocabulary.index.contains_key(&token) {
                    vocabulary.index.insert(token.clone(), vocabulary.words.len());
                    vocabulary.words.push(token);
                }
            }
        }

        vocabulary
    }

    fn from_words(words: Vec<String>, max_document_length: usize) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(id, word)| (word.clone(), id))
            .collect();

        Self {
            max_document_length,
            words,
            index,
        }
    }

    /// Map text to token ids, truncated to the longest training document
    pub fn encode(&self, text: &str) -> Vec<usize> {
        tokenize(text)
            .into_iter()
            .take(self.max_document_length)
            .map(|token| self.id(&token))
            .collect()
    }

    /// The id of a word, or the unknown id
    pub fn id(&self, word: &str) -> usize {
        self.index.get(word).copied().unwrap_or(UNK_ID)
    }

    /// The words in id order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The number of ids, including the unknown token
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when nothing beyond the unknown token was learned
    pub fn is_empty(&self) -> bool {
        self.words.len() <= 1
    }

    /// The longest training document, in tokens
    pub fn max_document_length(&self) -> usize {
        self.max_document_length
    }

    /// Write the vocabulary as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;

        fs::write(path.as_ref(), json)
            .map_err(|e| anyhow!("Unable to write vocabulary to {:?}: {}", path.as_ref(), e))
    }

    /// Read a vocabulary written by [`Vocabulary::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Unable to read vocabulary from {:?}: {}", path.as_ref(), e))?;

        let Vocabulary {
            max_document_length,
            words,
            ..
        } = serde_json::from_str(&json)?;

        Ok(Self::from_words(words, max_document_length))
    }
}
