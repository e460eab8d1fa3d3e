use crate::client::{HatenaBlogClient, Transport};
use crate::prelude::{println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct VerifyOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    pub hatena_id: String,
    pub blog_domain: String,
    pub auth: String,
    pub service_document: String,
    pub ok: bool,
}

pub async fn run(options: VerifyOptions, client: &HatenaBlogClient) -> Result<()> {
    let output = verify_data(client).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {} can post to {} ({} auth)",
            "OK".green().bold(),
            output.hatena_id,
            output.blog_domain,
            output.auth
        );
    }

    Ok(())
}

/// Fetch the service document to prove the credentials work
pub async fn verify_data<T: Transport>(client: &HatenaBlogClient<T>) -> Result<VerifyOutput> {
    client.verify().await?;

    let credentials = client.credentials();
    Ok(VerifyOutput {
        hatena_id: credentials.hatena_id.clone(),
        blog_domain: credentials.blog_domain.clone(),
        auth: client.auth().to_string(),
        service_document: client.service_document_url(),
        ok: true,
    })
}
