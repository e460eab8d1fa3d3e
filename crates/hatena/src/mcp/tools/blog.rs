use std::time::Duration;

use crate::client::{HatenaBlogClient, Transport};
use hatena_core::{ContentType, EntryDraft, EntryPatch};
use serde::Deserialize;

use super::{parse_args, text_result, tool_error, JsonRpcError, Tool};

const ENTRY_TOOLS: [&str; 6] = [
    "hatena_list_entries",
    "hatena_get_entry",
    "hatena_create_entry",
    "hatena_update_entry",
    "hatena_delete_entry",
    "hatena_verify",
];

/// Default pause between pages when listing everything
const DEFAULT_PAGE_DELAY_MS: u64 = 1000;

pub fn is_entry_tool(name: &str) -> bool {
    ENTRY_TOOLS.contains(&name)
}

fn blog_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Blog profile name from the profiles file (default: the blog configured via HATENA_* environment variables)"
    })
}

fn entry_fields(required: &[&str], with_entry_id: bool) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "blog": blog_property(),
        "title": {
            "type": "string",
            "description": "Entry title"
        },
        "content": {
            "type": "string",
            "description": "Entry body"
        },
        "content_type": {
            "type": "string",
            "description": "Body format (default: html)",
            "enum": ["text", "hatena", "markdown", "html"]
        },
        "categories": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Categories, in order"
        },
        "draft": {
            "type": "boolean",
            "description": "Keep the entry unpublished"
        },
        "custom_url": {
            "type": "string",
            "description": "Custom URL path for the entry"
        },
        "updated": {
            "type": "string",
            "description": "ISO-8601 timestamp overriding the entry date"
        }
    });

    if with_entry_id {
        properties["entry_id"] = serde_json::json!({
            "type": "string",
            "description": "Entry ID (last segment of the entry's edit URL)"
        });
    }

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "hatena_list_entries".to_string(),
            description: "List Hatena Blog entries, newest first. Returns one page with a next_cursor for the following page, or every entry when all is true. Requires HATENA_ID, HATENA_BLOG_DOMAIN and HATENA_API_KEY, or a blog profile.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "blog": blog_property(),
                    "cursor": {
                        "type": "string",
                        "description": "Page cursor from a previous response's next_cursor"
                    },
                    "all": {
                        "type": "boolean",
                        "description": "Follow next-page links until the last page (default: false)"
                    },
                    "max_pages": {
                        "type": "number",
                        "description": "Stop after this many pages when all is true"
                    },
                    "delay_ms": {
                        "type": "number",
                        "description": "Milliseconds to wait between page requests when all is true (default: 1000)"
                    }
                },
                "required": []
            }),
        },
        Tool {
            name: "hatena_get_entry".to_string(),
            description: "Fetch a single Hatena Blog entry with its title, body, categories, draft flag and URLs.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "blog": blog_property(),
                    "entry_id": {
                        "type": "string",
                        "description": "Entry ID (last segment of the entry's edit URL)"
                    }
                },
                "required": ["entry_id"]
            }),
        },
        Tool {
            name: "hatena_create_entry".to_string(),
            description: "Create a Hatena Blog entry. Set draft to true to save it without publishing. Returns the entry as stored by Hatena, including its entry_id.".to_string(),
            input_schema: entry_fields(&["title", "content"], false),
        },
        Tool {
            name: "hatena_update_entry".to_string(),
            description: "Update a Hatena Blog entry. Only the given fields change; the rest are read from the current entry before the full replacement is sent.".to_string(),
            input_schema: entry_fields(&["entry_id"], true),
        },
        Tool {
            name: "hatena_delete_entry".to_string(),
            description: "Delete a Hatena Blog entry. This cannot be undone.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "blog": blog_property(),
                    "entry_id": {
                        "type": "string",
                        "description": "Entry ID to delete"
                    }
                },
                "required": ["entry_id"]
            }),
        },
        Tool {
            name: "hatena_verify".to_string(),
            description: "Check that the configured Hatena credentials are accepted by fetching the AtomPub service document.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "blog": blog_property()
                },
                "required": []
            }),
        },
        Tool {
            name: "hatena_list_blogs".to_string(),
            description: "List the blog profiles configured in the profiles file and whether their API keys are available.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    cursor: Option<String>,
    #[serde(default)]
    all: bool,
    max_pages: Option<usize>,
    delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EntryIdArgs {
    entry_id: String,
}

#[derive(Debug, Deserialize)]
struct EntryFieldArgs {
    entry_id: Option<String>,
    title: Option<String>,
    content: Option<String>,
    content_type: Option<String>,
    categories: Option<Vec<String>>,
    draft: Option<bool>,
    custom_url: Option<String>,
    updated: Option<String>,
}

impl EntryFieldArgs {
    fn content_type(&self) -> Result<Option<ContentType>, JsonRpcError> {
        self.content_type
            .as_deref()
            .map(|value| value.parse::<ContentType>().map_err(JsonRpcError::invalid_params))
            .transpose()
    }

    fn into_draft(self) -> Result<EntryDraft, JsonRpcError> {
        let content_type = self.content_type()?.unwrap_or_default();

        let (Some(title), Some(content)) = (self.title, self.content) else {
            return Err(JsonRpcError::invalid_params(
                "title and content are required",
            ));
        };

        Ok(EntryDraft {
            title,
            content,
            content_type,
            author: None,
            categories: self.categories.unwrap_or_default(),
            is_draft: self.draft.unwrap_or(false),
            custom_url: self.custom_url,
            updated: self.updated,
        })
    }

    fn into_patch(self) -> Result<(String, EntryPatch), JsonRpcError> {
        let content_type = self.content_type()?;

        let entry_id = self
            .entry_id
            .ok_or_else(|| JsonRpcError::invalid_params("entry_id is required"))?;

        Ok((
            entry_id,
            EntryPatch {
                title: self.title,
                content: self.content,
                content_type,
                categories: self.categories,
                is_draft: self.draft,
                custom_url: self.custom_url,
                updated: self.updated,
            },
        ))
    }
}

/// Run one of the entry tools against `client`
pub async fn call_entry_tool<T: Transport>(
    name: &str,
    arguments: Option<serde_json::Value>,
    client: &HatenaBlogClient<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    match name {
        "hatena_list_entries" => {
            let args: ListArgs = parse_args(arguments)?;
            let output = if args.all {
                let delay = Duration::from_millis(args.delay_ms.unwrap_or(DEFAULT_PAGE_DELAY_MS));
                crate::blog::list::list_all_entries_data(client, delay, args.max_pages).await
            } else {
                crate::blog::list_entries_data(client, args.cursor).await
            }
            .map_err(tool_error)?;
            text_result(&output)
        }
        "hatena_get_entry" => {
            let args: EntryIdArgs = parse_args(arguments)?;
            let entry = crate::blog::get_entry_data(client, &args.entry_id)
                .await
                .map_err(tool_error)?;
            text_result(&entry)
        }
        "hatena_create_entry" => {
            let draft = parse_args::<EntryFieldArgs>(arguments)?.into_draft()?;
            let entry = crate::blog::create_entry_data(client, draft)
                .await
                .map_err(tool_error)?;
            text_result(&entry)
        }
        "hatena_update_entry" => {
            let (entry_id, patch) = parse_args::<EntryFieldArgs>(arguments)?.into_patch()?;
            let entry = crate::blog::update_entry_data(client, &entry_id, patch)
                .await
                .map_err(tool_error)?;
            text_result(&entry)
        }
        "hatena_delete_entry" => {
            let args: EntryIdArgs = parse_args(arguments)?;
            let output = crate::blog::delete_entry_data(client, &args.entry_id)
                .await
                .map_err(tool_error)?;
            text_result(&output)
        }
        "hatena_verify" => {
            let output = crate::blog::verify_data(client).await.map_err(tool_error)?;
            text_result(&output)
        }
        _ => Err(JsonRpcError::invalid_params(format!("Unknown tool: {name}"))),
    }
}

pub fn handle_list_blogs(global: &crate::Global) -> Result<serde_json::Value, JsonRpcError> {
    let profiles = crate::profiles::list_profiles_data(global).map_err(tool_error)?;
    text_result(&profiles)
}
