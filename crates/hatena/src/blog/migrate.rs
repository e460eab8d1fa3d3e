use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use hatena_core::entry::draft_from_entry;
use hatena_core::{Entry, EntryDraft};
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct MigrateOptions {
    /// Entry ID on the source blog
    pub entry_id: String,

    /// Profile name of the destination blog
    #[arg(long)]
    pub to: String,

    /// Append a link back to the original entry
    #[arg(long)]
    pub note: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub source_entry_id: String,
    pub target_blog: String,
    pub entry: Entry,
}

pub async fn run(
    options: MigrateOptions,
    source: &HatenaBlogClient,
    global: &crate::Global,
) -> Result<()> {
    let target = super::create_client_for(global, Some(options.to.clone()))?;

    if global.verbose {
        eprintln!(
            "Migrating entry {} from {} to {}",
            options.entry_id,
            source.credentials().blog_domain,
            target.credentials().blog_domain
        );
    }

    let output = migrate_entry_data(source, &target, &options.entry_id, options.note).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {} to {} as draft {}",
            "Copied".green().bold(),
            output.source_entry_id,
            output.target_blog,
            output.entry.entry_id
        );
    }

    Ok(())
}

/// Draft for the destination blog; the author is left for the target client
fn migration_draft(entry: &Entry, note: bool) -> EntryDraft {
    let mut draft = draft_from_entry(entry);
    draft.author = None;
    draft.is_draft = true;
    // Custom URLs and dates belong to the source blog
    draft.custom_url = None;
    draft.updated = None;

    if note {
        if let Some(url) = &entry.public_url {
            draft.content.push_str(&note_for(&draft.content_type, url));
        }
    }

    draft
}

fn note_for(content_type: &hatena_core::ContentType, url: &str) -> String {
    use hatena_core::ContentType;

    match content_type {
        ContentType::Html => format!("\n<p>Originally published at <a href=\"{url}\">{url}</a></p>\n"),
        ContentType::Markdown => format!("\n\nOriginally published at <{url}>\n"),
        ContentType::HatenaSyntax => format!("\n\nOriginally published at [{url}]\n"),
        ContentType::PlainText => format!("\n\nOriginally published at {url}\n"),
    }
}

/// Copy one entry from `source` to `target` as an unpublished draft
pub async fn migrate_entry_data<S: Transport, T: Transport>(
    source: &HatenaBlogClient<S>,
    target: &HatenaBlogClient<T>,
    entry_id: &str,
    note: bool,
) -> Result<MigrateOutput> {
    let original = source.get_entry(entry_id).await?;
    let draft = migration_draft(&original, note);

    let entry = target
        .create_entry(&draft)
        .await
        .wrap_err_with(|| format!("Failed to copy entry {entry_id}"))?;

    log::info!(
        "Copied entry {entry_id} from {} to {} as {}",
        source.credentials().blog_domain,
        target.credentials().blog_domain,
        entry.entry_id
    );

    Ok(MigrateOutput {
        source_entry_id: original.entry_id,
        target_blog: target.credentials().blog_domain.clone(),
        entry,
    })
}
