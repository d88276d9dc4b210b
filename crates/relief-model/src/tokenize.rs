//! Text normalisation: URL masking, word tokenization and lemmatization.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

/// Replacement token for every URL in a message.
pub const URL_PLACEHOLDER: &str = "urlplaceholder";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
    .expect("url regex")
});

/// Words (with an optional apostrophe suffix such as `'s`) or single
/// punctuation marks.
static TOKEN_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\w+(?:'\w+)?|[^\w\s]").expect("token regex"));

/// Split `text` into normalised tokens.
///
/// URLs become [`URL_PLACEHOLDER`]; every other token is lowercased and
/// reduced to its singular form.
pub fn tokenize(text: &str) -> Vec<String> {
  let text = URL_RE.replace_all(text, URL_PLACEHOLDER);
  TOKEN_RE
    .find_iter(&text)
    .map(|m| {
      let lower = m.as_str().trim().to_lowercase();
      lemmatize(&lower).into_owned()
    })
    .filter(|t| !t.is_empty())
    .collect()
}

/// Reduce a lowercase noun to its singular form with plural-suffix rules.
///
/// Short words (three characters or fewer) and words ending in `ss`, `us` or
/// `is` are left alone.
pub fn lemmatize(word: &str) -> Cow<'_, str> {
  if word.chars().count() <= 3 || !word.ends_with('s') {
    return Cow::Borrowed(word);
  }

  if let Some(stem) = word.strip_suffix("ies")
    && stem.chars().count() > 1
  {
    return Cow::Owned(format!("{stem}y"));
  }

  for suffix in ["sses", "xes", "ches", "shes"] {
    if word.ends_with(suffix) {
      return Cow::Borrowed(&word[..word.len() - 2]);
    }
  }

  if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
    return Cow::Borrowed(word);
  }

  Cow::Borrowed(&word[..word.len() - 1])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn replaces_urls() {
    let tokens = tokenize("see http://bit.ly/abc%20d?x=1 and https://t.co/Z9");
    assert_eq!(tokens, vec!["see", URL_PLACEHOLDER, "and", URL_PLACEHOLDER]);
  }

  #[test]
  fn lowercases_and_keeps_punctuation() {
    assert_eq!(tokenize("Need WATER, now!"), vec![
      "need", "water", ",", "now", "!"
    ]);
  }

  #[test]
  fn keeps_apostrophe_suffixes_together() {
    assert_eq!(tokenize("We don't have food"), vec![
      "we", "don't", "have", "food"
    ]);
  }

  #[test]
  fn singularises_plurals() {
    assert_eq!(lemmatize("supplies"), "supply");
    assert_eq!(lemmatize("tents"), "tent");
    assert_eq!(lemmatize("boxes"), "box");
    assert_eq!(lemmatize("churches"), "church");
    assert_eq!(lemmatize("addresses"), "address");
  }

  #[test]
  fn leaves_non_plurals_alone() {
    assert_eq!(lemmatize("this"), "this");
    assert_eq!(lemmatize("virus"), "virus");
    assert_eq!(lemmatize("crisis"), "crisis");
    assert_eq!(lemmatize("access"), "access");
    assert_eq!(lemmatize("gas"), "gas");
  }

  #[test]
  fn empty_text_has_no_tokens() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \n\t").is_empty());
  }
}
