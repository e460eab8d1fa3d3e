use std::path::PathBuf;

use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use colored::Colorize;
use hatena_core::{ContentType, Entry, EntryDraft};
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct CreateOptions {
    /// Entry title
    pub title: String,

    /// Entry body
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read the entry body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Body format: text, hatena, markdown or html
    #[arg(long, env = "HATENA_CONTENT_TYPE", default_value = "html")]
    pub content_type: ContentType,

    /// Category (repeatable)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Save as a draft instead of publishing
    #[arg(long)]
    pub draft: bool,

    /// Custom URL path for the entry
    #[arg(long)]
    pub custom_url: Option<String>,

    /// Override the entry date (ISO-8601, e.g. 2024-01-01T09:00:00+09:00)
    #[arg(long)]
    pub updated: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Body from `--content` or `--file`
pub(crate) fn read_content(content: Option<String>, file: Option<&PathBuf>) -> Result<Option<String>> {
    match (content, file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        (None, None) => Ok(None),
    }
}

impl CreateOptions {
    fn into_draft(self) -> Result<EntryDraft> {
        let content = read_content(self.content, self.file.as_ref())?.unwrap_or_default();

        Ok(EntryDraft {
            title: self.title,
            content,
            content_type: self.content_type,
            author: None,
            categories: self.categories,
            is_draft: self.draft,
            custom_url: self.custom_url,
            updated: self.updated,
        })
    }
}

pub async fn run(options: CreateOptions, client: &HatenaBlogClient) -> Result<()> {
    let json = options.json;
    let entry = create_entry_data(client, options.into_draft()?).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", format_created_text(&entry));
    }

    Ok(())
}

/// Post a new entry
pub async fn create_entry_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    draft: EntryDraft,
) -> Result<Entry> {
    let entry = client.create_entry(&draft).await?;
    log::info!("Created entry {} ({})", entry.entry_id, entry.title);
    Ok(entry)
}

fn format_created_text(entry: &Entry) -> String {
    let verb = if entry.is_draft {
        "Saved draft".yellow().bold()
    } else {
        "Published".green().bold()
    };

    let mut result = format!("{verb} {} ({})", entry.title, entry.entry_id);
    if let Some(url) = &entry.public_url {
        result.push_str(&format!("\n{}", url.cyan().underline()));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::tests::sample_entry;
    use crate::client::testing::{fake_client, FakeHatena};
    use clap::Parser;
    use std::io::Write;

    #[derive(Debug, clap::Parser)]
    struct Cli {
        #[command(flatten)]
        options: CreateOptions,
    }

    #[test]
    fn test_options_into_draft() {
        let cli = Cli::parse_from([
            "create",
            "Hello",
            "--content",
            "# Body",
            "--content-type",
            "markdown",
            "-c",
            "rust",
            "-c",
            "blog",
            "--draft",
        ]);

        let draft = cli.options.into_draft().unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.content, "# Body");
        assert_eq!(draft.content_type, ContentType::Markdown);
        assert_eq!(draft.categories, vec!["rust", "blog"]);
        assert!(draft.is_draft);
        assert!(draft.author.is_none());
    }

    #[test]
    fn test_content_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("from file".as_bytes()).unwrap();

        let content = read_content(None, Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(content.as_deref(), Some("from file"));
    }

    #[test]
    fn test_content_and_file_conflict() {
        let result = Cli::try_parse_from(["create", "T", "--content", "a", "--file", "b.md"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_content_required() {
        assert!(Cli::try_parse_from(["create", "T"]).is_err());
    }

    #[test]
    fn test_format_created_text() {
        let published = format_created_text(&sample_entry("1", false));
        assert!(published.contains("Published"));
        assert!(published.contains("https://user.hatenablog.com/entry/1"));

        let draft = format_created_text(&sample_entry("2", true));
        assert!(draft.contains("Saved draft"));
    }

    #[tokio::test]
    async fn test_create_entry_data() {
        let client = fake_client(FakeHatena::default());
        let mut draft = EntryDraft::new("Hello", "<p>World</p>");
        draft.categories = vec!["news".to_string()];

        let entry = create_entry_data(&client, draft).await.unwrap();
        assert_eq!(entry.entry_id, "1");
        assert_eq!(entry.content, "<p>World</p>");
        assert_eq!(entry.categories, vec!["news"]);
        assert_eq!(entry.author.as_deref(), Some("user"));
    }
}
