//! HTML page generation.
//!
//! Pages are written with `quick-xml`'s writer, so every query echoed back to
//! the browser is escaped.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};
use relief_core::prediction::Prediction;
use relief_model::Classifier;

use crate::error::{Error, Result};

const TITLE: &str = "Disaster Response Project";

/// Dataset summary shown on the landing page when a store is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
  pub genres:     Vec<(String, u64)>,
  pub categories: Vec<(String, u64)>,
}

// ─── Pages ───────────────────────────────────────────────────────────────────

/// The landing page: query form, model summary and optional dataset overview.
pub fn index_page(classifier: &Classifier, overview: Option<&Overview>) -> Result<String> {
  let mut page = Page::new()?;
  page.query_form("")?;

  let w = &mut page.writer;
  write_text_elem(w, "h2", "Model")?;
  write_start_with_attr(w, "p", &[("class", "fingerprint")])?;
  write_text(w, "Fingerprint: ")?;
  write_text_elem(w, "code", classifier.fingerprint())?;
  write_end(w, "p")?;
  write_start(w, "ul")?;
  for name in classifier.categories().iter() {
    write_text_elem(w, "li", name)?;
  }
  write_end(w, "ul")?;

  if let Some(overview) = overview {
    write_text_elem(w, "h2", "Distribution of Message Genres")?;
    write_count_table(w, "Genre", &overview.genres)?;
    write_text_elem(w, "h2", "Distribution of Message Categories")?;
    write_count_table(w, "Category", &overview.categories)?;
  }

  page.finish()
}

/// The result page for one query. A blank query shows a notice instead of
/// flags.
pub fn result_page(query: &str, prediction: &Prediction) -> Result<String> {
  let mut page = Page::new()?;
  page.query_form(query)?;

  let w = &mut page.writer;
  if query.trim().is_empty() {
    write_start_with_attr(w, "p", &[("class", "notice")])?;
    write_text(w, "Enter a message to classify.")?;
    write_end(w, "p")?;
  } else {
    write_text_elem(w, "h2", "Result")?;
    write_start_with_attr(w, "p", &[("class", "query")])?;
    write_text(w, query)?;
    write_end(w, "p")?;
  }

  write_start_with_attr(w, "ul", &[("class", "categories")])?;
  for label in prediction.labels() {
    let class = if label.flagged { "flagged" } else { "unflagged" };
    write_start_with_attr(w, "li", &[("class", class)])?;
    write_text(w, label.name)?;
    write_end(w, "li")?;
  }
  write_end(w, "ul")?;

  page.finish()
}

// ─── Page skeleton ───────────────────────────────────────────────────────────

struct Page {
  writer: Writer<Cursor<Vec<u8>>>,
}

impl Page {
  fn new() -> Result<Self> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_event(&mut writer, Event::DocType(BytesText::from_escaped("html")))?;
    write_start_with_attr(&mut writer, "html", &[("lang", "en")])?;
    write_start(&mut writer, "head")?;
    write_empty_with_attr(&mut writer, "meta", &[("charset", "utf-8")])?;
    write_text_elem(&mut writer, "title", TITLE)?;
    write_end(&mut writer, "head")?;
    write_start(&mut writer, "body")?;
    write_text_elem(&mut writer, "h1", TITLE)?;
    Ok(Self { writer })
  }

  fn query_form(&mut self, query: &str) -> Result<()> {
    let w = &mut self.writer;
    write_start_with_attr(w, "form", &[("action", "/go"), ("method", "get")])?;
    write_empty_with_attr(w, "input", &[
      ("type", "text"),
      ("name", "query"),
      ("placeholder", "Enter a message to classify"),
      ("value", query),
    ])?;
    write_start_with_attr(w, "button", &[("type", "submit")])?;
    write_text(w, "Classify Message")?;
    write_end(w, "button")?;
    write_end(w, "form")
  }

  fn finish(mut self) -> Result<String> {
    write_end(&mut self.writer, "body")?;
    write_end(&mut self.writer, "html")?;
    let bytes = self.writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| Error::Render(e.to_string()))
  }
}

// ─── Writer helpers ──────────────────────────────────────────────────────────

type HtmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_event(w: &mut HtmlWriter, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(|e| Error::Render(e.to_string()))
}

fn write_start(w: &mut HtmlWriter, tag: &str) -> Result<()> {
  write_event(w, Event::Start(BytesStart::new(tag)))
}

fn write_start_with_attr(w: &mut HtmlWriter, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  write_event(w, Event::Start(el))
}

fn write_empty_with_attr(w: &mut HtmlWriter, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
  let mut el = BytesStart::new(tag);
  for (k, v) in attrs {
    el.push_attribute((*k, *v));
  }
  write_event(w, Event::Empty(el))
}

fn write_end(w: &mut HtmlWriter, tag: &str) -> Result<()> {
  write_event(w, Event::End(BytesEnd::new(tag)))
}

fn write_text(w: &mut HtmlWriter, text: &str) -> Result<()> {
  write_event(w, Event::Text(BytesText::new(text)))
}

fn write_text_elem(w: &mut HtmlWriter, tag: &str, text: &str) -> Result<()> {
  write_start(w, tag)?;
  write_text(w, text)?;
  write_end(w, tag)
}

fn write_count_table(w: &mut HtmlWriter, label: &str, rows: &[(String, u64)]) -> Result<()> {
  write_start(w, "table")?;
  write_start(w, "tr")?;
  write_text_elem(w, "th", label)?;
  write_text_elem(w, "th", "Messages")?;
  write_end(w, "tr")?;
  for (name, count) in rows {
    write_start(w, "tr")?;
    write_text_elem(w, "td", name)?;
    write_text_elem(w, "td", &count.to_string())?;
    write_end(w, "tr")?;
  }
  write_end(w, "table")
}
