use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use hatena_core::Entry;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Entry ID (last segment of the entry's edit URL)
    #[clap(env = "HATENA_ENTRY_ID")]
    pub entry_id: String,

    /// Only show metadata, not the body
    #[arg(long)]
    pub no_content: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: GetOptions, client: &HatenaBlogClient) -> Result<()> {
    let entry = get_entry_data(client, &options.entry_id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print!("{}", super::format_entry_text(&entry, !options.no_content));
    }

    Ok(())
}

/// Fetch one entry by ID
pub async fn get_entry_data<T: Transport>(
    client: &HatenaBlogClient<T>,
    entry_id: &str,
) -> Result<Entry> {
    Ok(client.get_entry(entry_id).await?)
}
