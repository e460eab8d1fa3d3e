//! Blog entry domain models
//!
//! [`EntryDraft`] is what callers send on create/update, [`Entry`] is what
//! the server confirms back. Update is a full replace: anything missing from
//! a draft is gone after the PUT, so [`merge_draft`] exists for callers that
//! want patch-like behaviour.

use serde::{Deserialize, Serialize};

use crate::error::{HatenaError, Operation};

/// Text format of an entry body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    PlainText,
    HatenaSyntax,
    Markdown,
    #[default]
    Html,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::PlainText => "text/plain",
            ContentType::HatenaSyntax => "text/x-hatena-syntax",
            ContentType::Markdown => "text/x-markdown",
            ContentType::Html => "text/html",
        }
    }

    /// Accepts either the MIME string or the short name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text/plain" | "text" | "plain" => Some(ContentType::PlainText),
            "text/x-hatena-syntax" | "hatena" => Some(ContentType::HatenaSyntax),
            "text/x-markdown" | "markdown" | "md" => Some(ContentType::Markdown),
            "text/html" | "html" => Some(ContentType::Html),
            _ => None,
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::parse(s).ok_or_else(|| {
            format!("Unknown content type: {s} (expected text, hatena, markdown or html)")
        })
    }
}

/// Entry as sent to the server on create or update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub custom_url: Option<String>,
    /// ISO-8601 timestamp overriding the published/updated date
    #[serde(default)]
    pub updated: Option<String>,
}

impl EntryDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Reject drafts the server would refuse anyway
    pub fn validate(&self, operation: Operation) -> Result<(), HatenaError> {
        if self.title.trim().is_empty() {
            return Err(HatenaError::validation(operation, "title must not be empty"));
        }

        if let Some(updated) = &self.updated {
            chrono::DateTime::parse_from_rfc3339(updated).map_err(|e| {
                HatenaError::validation(
                    operation,
                    format!("updated is not an ISO-8601 timestamp ({updated}): {e}"),
                )
            })?;
        }

        if matches!(&self.custom_url, Some(url) if url.trim().is_empty()) {
            return Err(HatenaError::validation(
                operation,
                "custom_url must be omitted rather than empty",
            ));
        }

        Ok(())
    }
}

/// Entry as confirmed by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_id: String,
    pub edit_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    pub title: String,
    pub content: String,
    pub content_type: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub is_draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

/// One page of the entry collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedPage {
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Fields a caller wants to change; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
    pub categories: Option<Vec<String>>,
    pub is_draft: Option<bool>,
    pub custom_url: Option<String>,
    pub updated: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self == &EntryPatch::default()
    }
}

/// Build a full-replace draft from the current server state plus a patch
pub fn merge_draft(current: &Entry, patch: EntryPatch) -> EntryDraft {
    let content_type = patch.content_type.unwrap_or_else(|| {
        current
            .content_type
            .as_deref()
            .and_then(ContentType::parse)
            .unwrap_or_default()
    });

    EntryDraft {
        title: patch.title.unwrap_or_else(|| current.title.clone()),
        content: patch.content.unwrap_or_else(|| current.content.clone()),
        content_type,
        author: current.author.clone(),
        categories: patch
            .categories
            .unwrap_or_else(|| current.categories.clone()),
        is_draft: patch.is_draft.unwrap_or(current.is_draft),
        custom_url: patch.custom_url.or_else(|| current.custom_url.clone()),
        updated: patch.updated,
    }
}

/// Convert a confirmed entry back into a draft, e.g. to post it elsewhere
pub fn draft_from_entry(entry: &Entry) -> EntryDraft {
    merge_draft(entry, EntryPatch::default())
}
