//! Blog configuration resolution
//!
//! Precedence is CLI flag > environment variable > profile file. clap already
//! merges flags with their `env` fallbacks into [`crate::Global`], so all
//! this module has to do is lay those values over the selected profile.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hatena_core::endpoint::validate_base_url;
use hatena_core::profiles::{find_profile, parse_profiles, BlogProfile};
use hatena_core::{AuthScheme, BlogCredentials};

use crate::prelude::*;

/// Everything needed to build a client for one blog
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub credentials: BlogCredentials,
    pub auth: AuthScheme,
    pub timeout: Duration,
    pub base_url: String,
    /// Profile the credentials came from, if any
    pub profile: Option<String>,
}

/// Default location of the profiles file
pub fn default_profiles_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("hatena").join("blogs.toml"))
}

/// Load profiles from `path`; a missing file means no profiles
pub fn load_profiles(path: &Path) -> Result<Vec<BlogProfile>, HatenaError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let source = std::fs::read_to_string(path).map_err(|e| {
        HatenaError::Configuration(format!("Failed to read {}: {e}", path.display()))
    })?;

    parse_profiles(&source).map_err(|e| HatenaError::Configuration(e.to_string()))
}

fn profiles_path(global: &crate::Global) -> Option<PathBuf> {
    global.profiles.clone().or_else(default_profiles_path)
}

/// Profiles visible to this invocation
pub fn profiles(global: &crate::Global) -> Result<Vec<BlogProfile>, HatenaError> {
    match profiles_path(global) {
        Some(path) => load_profiles(&path),
        None => Ok(Vec::new()),
    }
}

/// Combine flags/environment with an optional profile.
///
/// `lookup_env` resolves the profile's `api_key_env`; it is a parameter so
/// the resolution can be exercised without touching the process environment.
pub fn resolve(
    global: &crate::Global,
    profiles: &[BlogProfile],
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Result<BlogConfig, HatenaError> {
    validate_base_url(&global.base_url)?;

    let profile = match &global.blog {
        Some(name) => Some(
            find_profile(profiles, name).map_err(|e| HatenaError::Configuration(e.to_string()))?,
        ),
        None => None,
    };

    let hatena_id = global
        .hatena_id
        .clone()
        .or_else(|| profile.map(|p| p.hatena_id.clone()))
        .unwrap_or_default();
    let blog_domain = global
        .blog_domain
        .clone()
        .or_else(|| profile.map(|p| p.blog_domain.clone()))
        .unwrap_or_default();

    let api_key = match (&global.api_key, profile) {
        (Some(key), _) => key.clone(),
        (None, Some(profile)) => lookup_env(&profile.api_key_env).ok_or_else(|| {
            HatenaError::Configuration(format!(
                "{} is not set (API key for blog profile {})",
                profile.api_key_env, profile.name
            ))
        })?,
        (None, None) => String::new(),
    };

    Ok(BlogConfig {
        credentials: BlogCredentials::new(hatena_id, blog_domain, api_key),
        auth: global.auth,
        timeout: Duration::from_secs(global.timeout),
        base_url: global.base_url.clone(),
        profile: profile.map(|p| p.name.clone()),
    })
}

impl BlogConfig {
    /// Resolve configuration from flags, environment and the profiles file
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let profiles = if global.blog.is_some() {
            profiles(global)?
        } else {
            Vec::new()
        };

        let config = resolve(global, &profiles, |name| std::env::var(name).ok())?;

        log::debug!(
            "Resolved blog {} (profile: {:?}, auth: {}, timeout: {:?})",
            config.credentials.blog_domain,
            config.profile,
            config.auth,
            config.timeout
        );

        Ok(config)
    }
}
