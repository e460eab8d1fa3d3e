//! Core library for hatena
//!
//! This crate implements the **Functional Core** of the hatena application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`hatena_core`** (this crate): Pure transformation functions with zero I/O
//! - **`hatena`**: HTTP transport, configuration, CLI and MCP server (the Imperative Shell)
//!
//! Everything here is deterministic: the WSSE builder takes its nonce and
//! timestamp as arguments, the codec works on strings, and HTTP outcomes are
//! classified from a status code and a body. None of it needs mocking to test.
//!
//! # Module Organization
//!
//! - [`credentials`]: Account/blog identity and its validation
//! - [`wsse`]: WSSE `UsernameToken` and Basic authentication headers
//! - [`entry`]: Entry drafts, confirmed entries, feed pages, draft merging
//! - [`codec`]: AtomPub entry/feed XML serialization and parsing
//! - [`endpoint`]: Service document, collection and member URIs
//! - [`error`]: Error taxonomy and HTTP status classification
//! - [`profiles`]: Named multi-blog profiles loaded from TOML
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use hatena_core::codec::{parse_entry, serialize_entry};
//! use hatena_core::entry::EntryDraft;
//!
//! let mut draft = EntryDraft::new("Hello", "**world**");
//! draft.is_draft = true;
//!
//! let xml = serialize_entry(&draft);
//! assert!(xml.contains("<app:draft>yes</app:draft>"));
//! ```

pub mod codec;
pub mod credentials;
pub mod endpoint;
pub mod entry;
pub mod error;
pub mod profiles;
pub mod wsse;

pub use credentials::BlogCredentials;
pub use entry::{ContentType, Entry, EntryDraft, EntryPatch, FeedPage};
pub use error::{ErrorKind, HatenaError, Operation};
pub use wsse::AuthScheme;
