//! Credentials for a single Hatena blog

use std::fmt;

use crate::error::HatenaError;

/// Account and blog a client instance talks to.
///
/// `blog_domain` is the full root domain of the blog
/// (e.g. `example.hatenablog.com`), never the short blog ID.
#[derive(Clone, PartialEq, Eq)]
pub struct BlogCredentials {
    pub hatena_id: String,
    pub blog_domain: String,
    pub api_key: String,
}

impl BlogCredentials {
    pub fn new(
        hatena_id: impl Into<String>,
        blog_domain: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            hatena_id: hatena_id.into(),
            blog_domain: blog_domain.into(),
            api_key: api_key.into(),
        }
    }

    /// Reject empty fields before any request is attempted
    pub fn validate(&self) -> Result<(), HatenaError> {
        let fields = [
            ("hatena_id", &self.hatena_id),
            ("blog_domain", &self.blog_domain),
            ("api_key", &self.api_key),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(HatenaError::Configuration(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for BlogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlogCredentials")
            .field("hatena_id", &self.hatena_id)
            .field("blog_domain", &self.blog_domain)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
