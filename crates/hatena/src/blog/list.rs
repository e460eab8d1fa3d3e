use std::time::Duration;

use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use colored::Colorize;
use hatena_core::Entry;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Page cursor printed by a previous listing
    #[arg(long)]
    pub cursor: Option<String>,

    /// Follow next-page links until the last page
    #[arg(long, conflicts_with = "cursor")]
    pub all: bool,

    /// Milliseconds to wait between page requests with --all
    #[arg(long, env = "HATENA_PAGE_DELAY_MS", default_value = "1000")]
    pub delay_ms: u64,

    /// Stop after this many pages with --all
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_command: Option<String>,
}

pub async fn run(options: ListOptions, client: &HatenaBlogClient) -> Result<()> {
    let output = if options.all {
        list_all_entries_data(
            client,
            Duration::from_millis(options.delay_ms),
            options.max_pages,
        )
        .await?
    } else {
        list_entries_data(client, options.cursor.clone()).await?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_list_text(&output));
    }

    Ok(())
}

/// Fetch one page of entries
pub async fn list_entries_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    cursor: Option<String>,
) -> Result<ListOutput> {
    let page = client.list_entries(cursor.as_deref()).await?;

    let next_page_command = page
        .next_cursor
        .as_ref()
        .map(|cursor| format!("hatena blog list --cursor {cursor}"));

    Ok(ListOutput {
        entries: page.entries,
        next_cursor: page.next_cursor,
        next_page_command,
    })
}

/// Fetch every page of entries
pub async fn list_all_entries_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    delay: Duration,
    max_pages: Option<usize>,
) -> Result<ListOutput> {
    let entries = client.list_all_entries(delay, max_pages).await?;

    Ok(ListOutput {
        entries,
        next_cursor: None,
        next_page_command: None,
    })
}

fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();

    if output.entries.is_empty() {
        result.push_str(&format!("{}\n", "No entries found.".yellow()));
        return result;
    }

    result.push_str(&format!("Found {} entry(ies):\n\n", output.entries.len()));

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "Title", "Status", "Updated", "Categories"]);

    for entry in &output.entries {
        table.add_row(prettytable::row![
            &entry.entry_id,
            &entry.title,
            super::status_label(entry),
            entry.updated.as_deref().unwrap_or("-"),
            entry.categories.join(", ")
        ]);
    }

    result.push_str(&table.to_string());

    if let Some(command) = &output.next_page_command {
        result.push_str(&format!("\n{}: {}\n", "Next page".green(), command.cyan()));
    }

    result
}
