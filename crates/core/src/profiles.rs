//! Named blog profiles
//!
//! One account often runs several blogs. Profiles live in a TOML file:
//!
//! ```toml
//! [blogs.tech]
//! hatena_id = "user"
//! blog_domain = "user.hatenablog.com"
//! api_key_env = "HATENA_API_KEY_TECH"
//! description = "Tech notes"
//! ```
//!
//! The file never holds the API key itself, only the name of the
//! environment variable that does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error type for profile operations
#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("Invalid profiles file: {0}")]
    ParseError(String),
    #[error("Blog profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Invalid blog profile: {0}")]
    InvalidProfile(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogProfile {
    #[serde(skip_deserializing)]
    pub name: String,
    pub hatena_id: String,
    pub blog_domain: String,
    pub api_key_env: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    blogs: BTreeMap<String, BlogProfile>,
}

/// Parse a profiles file, returning profiles sorted by name
pub fn parse_profiles(source: &str) -> Result<Vec<BlogProfile>, ProfileError> {
    let file: ProfilesFile =
        toml::from_str(source).map_err(|e| ProfileError::ParseError(e.to_string()))?;

    file.blogs
        .into_iter()
        .map(|(name, mut profile)| {
            for (field, value) in [
                ("hatena_id", &profile.hatena_id),
                ("blog_domain", &profile.blog_domain),
                ("api_key_env", &profile.api_key_env),
            ] {
                if value.trim().is_empty() {
                    return Err(ProfileError::InvalidProfile(format!(
                        "{name}: {field} must not be empty"
                    )));
                }
            }
            profile.name = name;
            Ok(profile)
        })
        .collect()
}

/// Look up a profile by name
pub fn find_profile<'a>(
    profiles: &'a [BlogProfile],
    name: &str,
) -> Result<&'a BlogProfile, ProfileError> {
    profiles
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ProfileError::ProfileNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: &str = r#"
[blogs.tech]
hatena_id = "user"
blog_domain = "user.hatenablog.com"
api_key_env = "HATENA_API_KEY_TECH"
description = "Tech notes"

[blogs.mountain]
hatena_id = "user"
blog_domain = "mountain.hatenadiary.jp"
api_key_env = "HATENA_API_KEY_MOUNTAIN"
"#;

    #[test]
    fn test_parse_profiles_sorted() {
        let profiles = parse_profiles(PROFILES).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "mountain");
        assert_eq!(profiles[0].description, "");
        assert_eq!(profiles[1].name, "tech");
        assert_eq!(profiles[1].blog_domain, "user.hatenablog.com");
    }

    #[test]
    fn test_find_profile() {
        let profiles = parse_profiles(PROFILES).unwrap();
        assert_eq!(
            find_profile(&profiles, "tech").unwrap().api_key_env,
            "HATENA_API_KEY_TECH"
        );
        assert!(matches!(
            find_profile(&profiles, "missing"),
            Err(ProfileError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_profile_error_messages() {
        let profiles = parse_profiles(PROFILES).unwrap();
        let err = find_profile(&profiles, "missing").unwrap_err();
        assert_eq!(err.to_string(), "Blog profile not found: missing");

        let err: Box<dyn std::error::Error> = Box::new(ProfileError::ParseError("x".to_string()));
        assert_eq!(err.to_string(), "Invalid profiles file: x");
    }

    #[test]
    fn test_empty_file_has_no_profiles() {
        assert!(parse_profiles("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let source = "[blogs.broken]\nhatena_id = \"user\"\n";
        assert!(matches!(
            parse_profiles(source),
            Err(ProfileError::ParseError(_))
        ));
    }

    #[test]
    fn test_blank_field_is_invalid() {
        let source = "[blogs.blank]\nhatena_id = \"user\"\nblog_domain = \" \"\napi_key_env = \"K\"\n";
        assert!(matches!(
            parse_profiles(source),
            Err(ProfileError::InvalidProfile(_))
        ));
    }
}
