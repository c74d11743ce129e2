use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of a parsed article
/// The engine never mutates documents it is handed.
pub trait Document {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn author(&self) -> &str;
    /// body paragraphs in reading order
    fn paragraphs(&self) -> &[String];

    /// first body paragraph, empty when the article has no body
    fn first_paragraph(&self) -> &str {
        self.paragraphs().first().map(String::as_str).unwrap_or("")
    }
}

/// Document with a stable id and a publication time, used for deduplication
pub trait DatedDocument: Document {
    fn id(&self) -> &str;
    fn published_at(&self) -> DateTime<Utc>;
}

/// Plain owned document
/// Deserializable from the JSON the crawler emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub published_at: DateTime<Utc>,
}

impl ParsedDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs.push(paragraph.into());
        self
    }

    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = at;
        self
    }
}

impl Document for ParsedDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }
}

impl DatedDocument for ParsedDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}
