use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use hatena_core::profiles::BlogProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Parser)]
#[command(name = "blogs")]
#[command(about = "List configured blog profiles")]
pub struct App {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProfileOutput {
    pub name: String,
    pub hatena_id: String,
    pub blog_domain: String,
    pub api_key_env: String,
    pub description: String,
    /// Whether the API key variable is set in this environment
    pub has_api_key: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        let path = global
            .profiles
            .clone()
            .or_else(crate::config::default_profiles_path);
        eprintln!("Profiles file: {:?}", path);
    }

    let profiles = list_profiles_data(&global)?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else {
        print!("{}", format_profiles_text(&profiles));
    }

    Ok(())
}

/// Profiles from the profiles file, with API key availability
pub fn list_profiles_data(global: &crate::Global) -> Result<Vec<ProfileOutput>> {
    let profiles = crate::config::profiles(global)?;
    Ok(describe_profiles(profiles, |name| {
        std::env::var(name).is_ok_and(|value| !value.is_empty())
    }))
}

fn describe_profiles(
    profiles: Vec<BlogProfile>,
    has_env: impl Fn(&str) -> bool,
) -> Vec<ProfileOutput> {
    profiles
        .into_iter()
        .map(|profile| ProfileOutput {
            has_api_key: has_env(&profile.api_key_env),
            name: profile.name,
            hatena_id: profile.hatena_id,
            blog_domain: profile.blog_domain,
            api_key_env: profile.api_key_env,
            description: profile.description,
        })
        .collect()
}

fn format_profiles_text(profiles: &[ProfileOutput]) -> String {
    if profiles.is_empty() {
        return format!(
            "{}\nAdd [blogs.<name>] sections to the profiles file (--profiles).\n",
            "No blog profiles configured.".yellow()
        );
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Name", "Blog", "Hatena ID", "API key", "Description"]);

    for profile in profiles {
        let key = if profile.has_api_key {
            profile.api_key_env.green().to_string()
        } else {
            format!("{} (unset)", profile.api_key_env).red().to_string()
        };

        table.add_row(prettytable::row![
            &profile.name,
            &profile.blog_domain,
            &profile.hatena_id,
            key,
            &profile.description
        ]);
    }

    table.to_string()
}
