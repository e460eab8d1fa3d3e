use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct DeleteOptions {
    /// Entry ID to delete
    pub entry_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub entry_id: String,
    pub deleted: bool,
}

pub async fn run(options: DeleteOptions, client: &HatenaBlogClient) -> Result<()> {
    let output = delete_entry_data(client, &options.entry_id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} entry {}", "Deleted".red().bold(), output.entry_id);
    }

    Ok(())
}

/// Delete one entry by ID
pub async fn delete_entry_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    entry_id: &str,
) -> Result<DeleteOutput> {
    client.delete_entry(entry_id).await?;
    log::info!("Deleted entry {entry_id}");

    Ok(DeleteOutput {
        entry_id: entry_id.to_string(),
        deleted: true,
    })
}
