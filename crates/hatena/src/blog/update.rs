use std::path::PathBuf;

use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use colored::Colorize;
use hatena_core::entry::merge_draft;
use hatena_core::{ContentType, Entry, EntryPatch};
use serde::{Deserialize, Serialize};

/// Options for replacing an entry.
///
/// AtomPub updates are full replacements. Fields left out here are read from
/// the current entry first.
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct UpdateOptions {
    /// Entry ID to update
    pub entry_id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read the new body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// New body format: text, hatena, markdown or html
    #[arg(long)]
    pub content_type: Option<ContentType>,

    /// Replace categories (repeatable)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Remove all categories
    #[arg(long, conflicts_with = "categories")]
    pub clear_categories: bool,

    /// Turn the entry into a draft
    #[arg(long, conflicts_with = "publish")]
    pub draft: bool,

    /// Publish the entry
    #[arg(long)]
    pub publish: bool,

    /// New custom URL path
    #[arg(long)]
    pub custom_url: Option<String>,

    /// Override the entry date (ISO-8601)
    #[arg(long)]
    pub updated: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateOptions {
    fn into_patch(self) -> Result<EntryPatch> {
        let content = super::create::read_content(self.content, self.file.as_ref())?;

        let categories = if self.clear_categories {
            Some(Vec::new())
        } else if self.categories.is_empty() {
            None
        } else {
            Some(self.categories)
        };

        let is_draft = match (self.draft, self.publish) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Ok(EntryPatch {
            title: self.title,
            content,
            content_type: self.content_type,
            categories,
            is_draft,
            custom_url: self.custom_url,
            updated: self.updated,
        })
    }
}

pub async fn run(options: UpdateOptions, client: &HatenaBlogClient) -> Result<()> {
    let json = options.json;
    let entry_id = options.entry_id.clone();
    let entry = update_entry_data(client, &entry_id, options.into_patch()?).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "{} {} ({})",
            "Updated".green().bold(),
            entry.title,
            entry.entry_id
        );
    }

    Ok(())
}

/// Apply `patch` to an entry.
///
/// The patch is always merged over the entry's current state, so the PUT
/// keeps the body format, author and custom URL the caller did not mention.
pub async fn update_entry_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    entry_id: &str,
    patch: EntryPatch,
) -> Result<Entry> {
    if patch.is_empty() {
        return Err(eyre!("Nothing to update for entry {entry_id}"));
    }

    let current = client.get_entry(entry_id).await?;
    let draft = merge_draft(&current, patch);

    let entry = client.update_entry(entry_id, &draft).await?;
    log::info!("Updated entry {}", entry.entry_id);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{fake_client, FakeHatena};
    use hatena_core::EntryDraft;

    fn seeded() -> HatenaBlogClient<FakeHatena> {
        let mut draft = EntryDraft::new("Original", "Body");
        draft.categories = vec!["keep".to_string()];
        draft.is_draft = true;
        fake_client(FakeHatena::with_entries(vec![draft]))
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let client = seeded();
        let patch = EntryPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let entry = update_entry_data(&client, "1", patch).await.unwrap();
        assert_eq!(entry.title, "Renamed");
        assert_eq!(entry.content, "Body");
        assert_eq!(entry.categories, vec!["keep"]);
        assert!(entry.is_draft);
    }

    #[tokio::test]
    async fn test_every_field_patch_keeps_format_and_custom_url() {
        let mut draft = EntryDraft::new("Original", "Body");
        draft.content_type = ContentType::Markdown;
        draft.custom_url = Some("original-slug".to_string());
        let client = fake_client(FakeHatena::with_entries(vec![draft]));

        let patch = EntryPatch {
            title: Some("New".to_string()),
            content: Some("Text".to_string()),
            categories: Some(vec![]),
            is_draft: Some(false),
            ..Default::default()
        };

        let entry = update_entry_data(&client, "1", patch).await.unwrap();
        assert_eq!(entry.title, "New");
        assert!(entry.categories.is_empty());
        assert!(!entry.is_draft);
        assert_eq!(entry.content_type.as_deref(), Some("text/x-markdown"));
        assert_eq!(entry.custom_url.as_deref(), Some("original-slug"));
        // GET for the current state, then the PUT
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let client = seeded();
        assert!(update_entry_data(&client, "1", EntryPatch::default())
            .await
            .is_err());
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn test_options_into_patch() {
        let options = UpdateOptions {
            entry_id: "1".to_string(),
            title: None,
            content: Some("c".to_string()),
            file: None,
            content_type: None,
            categories: vec![],
            clear_categories: true,
            draft: false,
            publish: true,
            custom_url: None,
            updated: None,
            json: false,
        };

        let patch = options.into_patch().unwrap();
        assert_eq!(patch.content.as_deref(), Some("c"));
        assert_eq!(patch.categories, Some(vec![]));
        assert_eq!(patch.is_draft, Some(false));
        assert!(patch.title.is_none());
    }
}
