use crate::prelude::*;
use clap::Parser;
use hatena_core::endpoint::DEFAULT_BASE_URL;
use hatena_core::AuthScheme;
use std::path::PathBuf;

mod blog;
mod client;
mod config;
mod mcp;
mod prelude;
mod profiles;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Hatena Blog AtomPub client and MCP server"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Global {
    /// Hatena ID used as the AtomPub username
    #[clap(long, env = "HATENA_ID", global = true)]
    hatena_id: Option<String>,

    /// Full root domain of the blog (e.g. example.hatenablog.com)
    #[clap(long, env = "HATENA_BLOG_DOMAIN", global = true)]
    blog_domain: Option<String>,

    /// AtomPub API key
    #[clap(long, env = "HATENA_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Named blog profile from the profiles file
    #[clap(long, env = "HATENA_BLOG", global = true)]
    blog: Option<String>,

    /// Path to the blog profiles file (default: ~/.config/hatena/blogs.toml)
    #[clap(long, env = "HATENA_PROFILES", global = true)]
    profiles: Option<PathBuf>,

    /// Authentication scheme: basic or wsse
    #[clap(long, env = "HATENA_AUTH", global = true, default_value = "basic")]
    auth: AuthScheme,

    /// Request timeout in seconds
    #[clap(
        long,
        env = "HATENA_TIMEOUT",
        global = true,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(5..=300)
    )]
    timeout: u64,

    /// AtomPub base URL
    #[clap(long, env = "HATENA_BASE_URL", global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "HATENA_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Blog entry operations (list, get, create, update, delete)
    Blog(crate::blog::App),

    /// List configured blog profiles
    Blogs(crate::profiles::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Blog(sub_app) => crate::blog::run(sub_app, app.global).await,
        SubCommands::Blogs(sub_app) => crate::profiles::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
