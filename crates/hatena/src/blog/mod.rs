use crate::client::{HatenaBlogClient, ReqwestTransport};
use crate::config::BlogConfig;
use crate::prelude::{eprintln, *};
use colored::Colorize;
use hatena_core::Entry;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod migrate;
pub mod update;
pub mod verify;

// Re-export public data functions
pub use create::create_entry_data;
pub use delete::delete_entry_data;
pub use get::get_entry_data;
pub use list::list_entries_data;
pub use update::update_entry_data;
pub use verify::verify_data;

#[derive(Debug, clap::Parser)]
#[command(name = "blog")]
#[command(about = "Hatena Blog entry operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List entries, newest first
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Show a single entry
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Publish a new entry (or save it as a draft)
    #[clap(name = "create")]
    Create(create::CreateOptions),

    /// Replace an existing entry
    #[clap(name = "update")]
    Update(update::UpdateOptions),

    /// Delete an entry
    #[clap(name = "delete")]
    Delete(delete::DeleteOptions),

    /// Check that the credentials are accepted
    #[clap(name = "verify")]
    Verify(verify::VerifyOptions),

    /// Copy an entry to another blog profile as a draft
    #[clap(name = "migrate")]
    Migrate(migrate::MigrateOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = create_client(&global)?;

    if global.verbose {
        eprintln!("AtomPub endpoint: {}", client.service_document_url());
        eprintln!("Authentication: {}", client.auth());
        eprintln!();
    }

    match app.command {
        Commands::List(options) => list::run(options, &client).await,
        Commands::Get(options) => get::run(options, &client).await,
        Commands::Create(options) => create::run(options, &client).await,
        Commands::Update(options) => update::run(options, &client).await,
        Commands::Delete(options) => delete::run(options, &client).await,
        Commands::Verify(options) => verify::run(options, &client).await,
        Commands::Migrate(options) => migrate::run(options, &client, &global).await,
    }
}

/// Build a client for the blog selected by flags, environment or profile
pub fn create_client(global: &crate::Global) -> Result<HatenaBlogClient<ReqwestTransport>> {
    let config = BlogConfig::from_global(global)?;
    Ok(HatenaBlogClient::from_config(&config)?)
}

/// Same as [`create_client`] but for a named profile, overriding `--blog`
pub fn create_client_for(
    global: &crate::Global,
    blog: Option<String>,
) -> Result<HatenaBlogClient<ReqwestTransport>> {
    match blog {
        Some(blog) => {
            let mut global = global.clone();
            global.blog = Some(blog);
            // Flags describe the default blog, not the requested profile
            global.hatena_id = None;
            global.blog_domain = None;
            global.api_key = None;
            create_client(&global)
        }
        None => create_client(global),
    }
}

pub(crate) fn status_label(entry: &Entry) -> String {
    if entry.is_draft {
        "draft".yellow().to_string()
    } else {
        "published".green().to_string()
    }
}

/// Human-readable rendering of a single entry
pub fn format_entry_text(entry: &Entry, show_content: bool) -> String {
    let mut result = String::new();

    result.push_str(&format!(
        "\n{} {}\n",
        entry.title.white().bold(),
        format!("({})", entry.entry_id).bright_black()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!("{}: {}\n", "Status".green(), status_label(entry)));
    if let Some(url) = &entry.public_url {
        result.push_str(&format!("{}: {}\n", "URL".green(), url.cyan().underline()));
    }
    result.push_str(&format!("{}: {}\n", "Edit URL".green(), entry.edit_url));
    if let Some(author) = &entry.author {
        result.push_str(&format!("{}: {}\n", "Author".green(), author));
    }
    if let Some(published) = &entry.published {
        result.push_str(&format!("{}: {}\n", "Published".green(), published));
    }
    if let Some(updated) = &entry.updated {
        result.push_str(&format!("{}: {}\n", "Updated".green(), updated));
    }
    if let Some(content_type) = &entry.content_type {
        result.push_str(&format!("{}: {}\n", "Format".green(), content_type));
    }
    if !entry.categories.is_empty() {
        result.push_str(&format!(
            "{}: {}\n",
            "Categories".green(),
            entry.categories.join(", ")
        ));
    }
    if let Some(custom_url) = &entry.custom_url {
        result.push_str(&format!("{}: {}\n", "Custom URL".green(), custom_url));
    }

    if show_content {
        result.push_str(&format!("\n{}\n", entry.content));
    }

    result
}
