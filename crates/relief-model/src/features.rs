//! Per-message features computed before vectorization.

use std::sync::LazyLock;

use regex::Regex;

use crate::tokenize::tokenize;

/// Sorted base-form verbs that commonly open a request or instruction.
const LEADING_VERBS: &[&str] = &[
  "ask", "bring", "build", "call", "check", "come", "contact", "deliver",
  "distribute", "do", "donate", "evacuate", "feed", "find", "get", "give", "go",
  "help", "inform", "keep", "know", "leave", "let", "look", "make", "move",
  "need", "pass", "pray", "protect", "provide", "reach", "rebuild", "repair",
  "report", "rescue", "return", "save", "search", "see", "send", "share",
  "stay", "stop", "supply", "support", "take", "tell", "text", "visit", "wait",
  "want", "watch", "write",
];

/// Retweet marker.
const RETWEET: &str = "rt";

static SENTENCE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[.!?\n]+").expect("sentence regex"));

/// A message after tokenization, ready for any vectorizer configuration.
///
/// Tokenizing is the expensive part of feature extraction and does not depend
/// on vectorizer parameters, so grid search computes documents once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  pub tokens:           Vec<String>,
  pub starts_with_verb: bool,
}

impl Document {
  pub fn new(text: &str) -> Self {
    Self {
      tokens:           tokenize(text),
      starts_with_verb: starts_with_verb(text),
    }
  }
}

/// Whether any sentence of `text` opens with a leading verb or a retweet
/// marker.
pub fn starts_with_verb(text: &str) -> bool {
  SENTENCE_RE.split(text).any(|sentence| {
    tokenize(sentence).first().is_some_and(|first| {
      first == RETWEET || LEADING_VERBS.binary_search(&first.as_str()).is_ok()
    })
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lexicon_is_sorted_for_binary_search() {
    assert!(LEADING_VERBS.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn detects_imperative_openings() {
    assert!(starts_with_verb("Please note. Send water to Jacmel"));
    assert!(starts_with_verb("Need food and tents"));
    assert!(starts_with_verb("RT @someone: roads closed"));
  }

  #[test]
  fn ignores_verbs_in_the_middle() {
    assert!(!starts_with_verb("We need food and water"));
    assert!(!starts_with_verb(""));
  }

  #[test]
  fn document_tokenizes_once() {
    let doc = Document::new("Help! Houses collapsed");
    assert_eq!(doc.tokens, vec!["help", "!", "house", "collapsed"]);
    assert!(doc.starts_with_verb);
  }
}
