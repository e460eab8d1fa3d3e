//! AtomPub entry XML codec
//!
//! Serialization writes the entry document Hatena expects on POST/PUT.
//! Deserialization walks `quick-xml` events and matches elements by local
//! name, so namespace prefixes chosen by the server do not matter.

use std::fmt::Write as _;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::entry::{ContentType, Entry, EntryDraft, FeedPage};
use crate::error::{truncate_body, HatenaError, Operation};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const APP_NS: &str = "http://www.w3.org/2007/app";
pub const HATENABLOG_NS: &str = "http://www.hatena.ne.jp/info/xmlns#hatenablog";

/// Why a response body could not be turned into an entry
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Not well-formed XML
    #[error("malformed XML: {0}")]
    Malformed(String),
    /// Well-formed, but a required element is absent
    #[error("missing required element: {0}")]
    MissingElement(&'static str),
}

impl CodecError {
    /// Malformed XML is a validation failure, a structurally incomplete
    /// document a protocol failure.
    pub fn into_hatena_error(self, operation: Operation, status: u16, body: &str) -> HatenaError {
        let body = format!("{self}; body: {}", truncate_body(body));
        match self {
            CodecError::Malformed(_) => HatenaError::Validation {
                operation,
                status: Some(status),
                body,
            },
            CodecError::MissingElement(_) => HatenaError::Protocol {
                operation,
                status: Some(status),
                body,
            },
        }
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Escape free text for element content and attribute values
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize a draft into an AtomPub `<entry>` document
pub fn serialize_entry(draft: &EntryDraft) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = write!(xml, "<entry xmlns=\"{ATOM_NS}\" xmlns:app=\"{APP_NS}\"");
    if draft.custom_url.is_some() {
        let _ = write!(xml, " xmlns:hatenablog=\"{HATENABLOG_NS}\"");
    }
    xml.push_str(">\n");

    let _ = writeln!(xml, "  <title>{}</title>", escape_xml(&draft.title));

    if let Some(author) = &draft.author {
        let _ = writeln!(
            xml,
            "  <author><name>{}</name></author>",
            escape_xml(author)
        );
    }

    let _ = writeln!(
        xml,
        "  <content type=\"{}\">{}</content>",
        draft.content_type.mime(),
        escape_xml(&draft.content)
    );

    if let Some(updated) = &draft.updated {
        let _ = writeln!(xml, "  <updated>{}</updated>", escape_xml(updated));
    }

    for category in &draft.categories {
        let _ = writeln!(xml, "  <category term=\"{}\" />", escape_xml(category));
    }

    if let Some(custom_url) = &draft.custom_url {
        let _ = writeln!(
            xml,
            "  <hatenablog:custom-url>{}</hatenablog:custom-url>",
            escape_xml(custom_url)
        );
    }

    let _ = writeln!(
        xml,
        "  <app:control>\n    <app:draft>{}</app:draft>\n  </app:control>",
        if draft.is_draft { "yes" } else { "no" }
    );
    xml.push_str("</entry>\n");

    xml
}

// ============================================================================
// Deserialization
// ============================================================================

/// Entry fields as they appear in the document, before required-field checks
#[derive(Debug, Default)]
struct RawEntry {
    id: Option<String>,
    edit_url: Option<String>,
    public_url: Option<String>,
    title: Option<String>,
    content: Option<String>,
    content_type: Option<String>,
    author: Option<String>,
    categories: Vec<String>,
    draft: Option<String>,
    custom_url: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

impl RawEntry {
    fn into_entry(self) -> Result<Entry, CodecError> {
        let id = self.id.ok_or(CodecError::MissingElement("id"))?;
        let edit_url = self
            .edit_url
            .ok_or(CodecError::MissingElement("link rel=\"edit\""))?;

        let entry_id = entry_id_from_atom_id(&id);
        if entry_id.is_empty() {
            return Err(CodecError::MissingElement("id"));
        }

        Ok(Entry {
            entry_id,
            edit_url,
            public_url: self.public_url,
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            content_type: self.content_type,
            author: self.author,
            categories: self.categories,
            is_draft: self.draft.as_deref().map(str::trim) == Some("yes"),
            custom_url: self.custom_url,
            published: self.published,
            updated: self.updated,
        })
    }

    fn into_draft(self) -> EntryDraft {
        EntryDraft {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            content_type: self
                .content_type
                .as_deref()
                .and_then(ContentType::parse)
                .unwrap_or_default(),
            author: self.author,
            categories: self.categories,
            is_draft: self.draft.as_deref().map(str::trim) == Some("yes"),
            custom_url: self.custom_url,
            updated: self.updated,
        }
    }
}

/// Text-valued fields we collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Content,
    Author,
    Draft,
    CustomUrl,
    Published,
    Updated,
}

#[derive(Debug, Default)]
struct Document {
    root: Option<String>,
    entries: Vec<RawEntry>,
    next_link: Option<String>,
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CodecError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| CodecError::Malformed(err.to_string()))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| CodecError::Malformed(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Pick the field a text element feeds, given its name and parent
fn field_for(name: &str, parent: Option<&str>) -> Option<Field> {
    match (parent, name) {
        (Some("entry"), "id") => Some(Field::Id),
        (Some("entry"), "title") => Some(Field::Title),
        (Some("entry"), "content") => Some(Field::Content),
        (Some("entry"), "published") => Some(Field::Published),
        (Some("entry"), "updated") => Some(Field::Updated),
        (Some("entry"), "custom-url") => Some(Field::CustomUrl),
        (Some("author"), "name") => Some(Field::Author),
        (Some("control"), "draft") => Some(Field::Draft),
        _ => None,
    }
}

fn store(entry: &mut RawEntry, field: Field, text: String) {
    let slot = match field {
        Field::Id => &mut entry.id,
        Field::Title => &mut entry.title,
        Field::Content => &mut entry.content,
        Field::Author => &mut entry.author,
        Field::Draft => &mut entry.draft,
        Field::CustomUrl => &mut entry.custom_url,
        Field::Published => &mut entry.published,
        Field::Updated => &mut entry.updated,
    };
    if slot.is_none() {
        *slot = Some(text);
    }
}

/// Handle attributes of `<link>`, `<category>` and `<content>`
fn visit_attributes(
    e: &BytesStart<'_>,
    name: &str,
    parent: Option<&str>,
    entry: Option<&mut RawEntry>,
    doc: &mut Document,
) -> Result<(), CodecError> {
    match (name, entry) {
        ("link", Some(entry)) if parent == Some("entry") => {
            let rel = attribute(e, "rel")?;
            let href = attribute(e, "href")?;
            let link_type = attribute(e, "type")?;
            match (rel.as_deref(), href) {
                (Some("edit"), Some(href)) if entry.edit_url.is_none() => {
                    entry.edit_url = Some(href);
                }
                (Some("alternate"), Some(href))
                    if entry.public_url.is_none()
                        && matches!(link_type.as_deref(), None | Some("text/html")) =>
                {
                    entry.public_url = Some(href);
                }
                _ => {}
            }
        }
        ("category", Some(entry)) if parent == Some("entry") => {
            if let Some(term) = attribute(e, "term")? {
                entry.categories.push(term);
            }
        }
        ("content", Some(entry)) if parent == Some("entry") => {
            entry.content_type = attribute(e, "type")?;
        }
        ("link", None) if parent == Some("feed") => {
            if attribute(e, "rel")?.as_deref() == Some("next") {
                doc.next_link = attribute(e, "href")?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn read_document(xml: &str) -> Result<Document, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut doc = Document::default();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut capture: Option<(Field, usize, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CodecError::Malformed(format!("at byte {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                let parent = stack.last().map(String::as_str);

                if doc.root.is_none() {
                    doc.root = Some(name.clone());
                }

                if name == "entry" && current.is_none() {
                    current = Some(RawEntry::default());
                } else {
                    visit_attributes(&e, &name, parent, current.as_mut(), &mut doc)?;
                    if current.is_some() && capture.is_none() {
                        if let Some(field) = field_for(&name, parent) {
                            capture = Some((field, stack.len() + 1, String::new()));
                        }
                    }
                }

                stack.push(name);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                let parent = stack.last().map(String::as_str);

                if doc.root.is_none() {
                    doc.root = Some(name.clone());
                }

                visit_attributes(&e, &name, parent, current.as_mut(), &mut doc)?;
                if let Some(entry) = current.as_mut() {
                    if let Some(field) = field_for(&name, parent) {
                        store(entry, field, String::new());
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    let value = t
                        .unescape()
                        .map_err(|e| CodecError::Malformed(e.to_string()))?;
                    text.push_str(&value);
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    let raw = c.into_inner();
                    let value = std::str::from_utf8(&raw)
                        .map_err(|e| CodecError::Malformed(e.to_string()))?;
                    text.push_str(value);
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                let name = stack
                    .pop()
                    .ok_or_else(|| CodecError::Malformed("unbalanced end tag".to_string()))?;

                if matches!(&capture, Some((_, d, _)) if *d == depth) {
                    if let (Some((field, _, text)), Some(entry)) = (capture.take(), current.as_mut()) {
                        store(entry, field, text);
                    }
                }

                if name == "entry" {
                    if let Some(entry) = current.take() {
                        doc.entries.push(entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::Malformed(format!(
            "unexpected end of document inside <{}>",
            stack.join("/")
        )));
    }

    if doc.root.is_none() {
        return Err(CodecError::Malformed(
            "document has no root element".to_string(),
        ));
    }

    Ok(doc)
}

fn single_entry(xml: &str) -> Result<RawEntry, CodecError> {
    let doc = read_document(xml)?;
    if doc.root.as_deref() != Some("entry") {
        return Err(CodecError::MissingElement("entry"));
    }
    doc.entries
        .into_iter()
        .next()
        .ok_or(CodecError::MissingElement("entry"))
}

/// Parse a single `<entry>` response (GET member, PUT)
pub fn parse_entry(xml: &str) -> Result<Entry, CodecError> {
    single_entry(xml)?.into_entry()
}

/// Parse a POST response, falling back to the `Location` header when the
/// body lacks an edit link
pub fn parse_created_entry(xml: &str, location: Option<&str>) -> Result<Entry, CodecError> {
    let mut raw = single_entry(xml)?;
    if raw.edit_url.is_none() {
        raw.edit_url = location.map(str::to_string);
    }
    raw.into_entry()
}

/// Parse an entry request payload back into a draft
pub fn parse_draft(xml: &str) -> Result<EntryDraft, CodecError> {
    Ok(single_entry(xml)?.into_draft())
}

/// Parse a `<feed>` page of the entry collection
pub fn parse_feed(xml: &str) -> Result<FeedPage, CodecError> {
    let doc = read_document(xml)?;
    if doc.root.as_deref() != Some("feed") {
        return Err(CodecError::MissingElement("feed"));
    }

    let entries = doc
        .entries
        .into_iter()
        .map(RawEntry::into_entry)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedPage {
        entries,
        next_cursor: doc.next_link.as_deref().and_then(cursor_from_next_link),
    })
}

/// Derive the entry id from an Atom `<id>`.
///
/// Takes the segment after the last `/`. Hatena ids are tag URIs of the form
/// `tag:blog.hatena.ne.jp,2013:blog-<user>-<blog>-<entry>`; for those the
/// token after the last `-` is the id used in member URIs.
pub fn entry_id_from_atom_id(id: &str) -> String {
    let segment = id.trim().rsplit('/').next().unwrap_or_default();

    if segment.starts_with("tag:") {
        if let Some((_, tail)) = segment.rsplit_once(':') {
            if let Some((_, entry_id)) = tail.rsplit_once('-') {
                return entry_id.to_string();
            }
        }
    }

    segment.to_string()
}

/// Extract the `page` query value from a `rel="next"` href
pub fn cursor_from_next_link(href: &str) -> Option<String> {
    let (_, query) = href.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<entry xmlns="http://www.w3.org/2005/Atom"
       xmlns:app="http://www.w3.org/2007/app">
  <id>tag:blog.hatena.ne.jp,2013:blog-user-8454420450081234567-13574176438012345678</id>
  <link rel="edit" href="https://blog.hatena.ne.jp/user/user.hatenablog.com/atom/entry/13574176438012345678"/>
  <link rel="alternate" type="text/html" href="https://user.hatenablog.com/entry/2024/01/01/000000"/>
  <author><name>user</name></author>
  <title>Hello &amp; welcome</title>
  <updated>2024-01-01T00:00:00+09:00</updated>
  <published>2024-01-01T00:00:00+09:00</published>
  <app:edited>2024-01-01T00:00:00+09:00</app:edited>
  <summary type="text">summary</summary>
  <content type="text/x-markdown">**bold** &lt;tag&gt;</content>
  <hatenablog:formatted-content type="text/html" xmlns:hatenablog="http://www.hatena.ne.jp/info/xmlns#hatenablog">&lt;p&gt;bold&lt;/p&gt;</hatenablog:formatted-content>
  <category term="Rust" />
  <category term="Blog" />
  <app:control>
    <app:draft>no</app:draft>
  </app:control>
</entry>"#;

    fn feed_xml(entries: &[(&str, &str)], next: Option<&str>) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">
  <link rel="first" href="https://blog.hatena.ne.jp/user/user.hatenablog.com/atom/entry" />
  <title>My Blog</title>
  <id>hatenablog://blog/8454420450081234567</id>
"#,
        );
        if let Some(next) = next {
            xml.push_str(&format!(
                "  <link rel=\"next\" href=\"https://blog.hatena.ne.jp/user/user.hatenablog.com/atom/entry?page={next}\" />\n"
            ));
        }
        for (id, title) in entries {
            xml.push_str(&format!(
                r#"  <entry>
    <id>tag:blog.hatena.ne.jp,2013:blog-user-8454420450081234567-{id}</id>
    <link rel="edit" href="https://blog.hatena.ne.jp/user/user.hatenablog.com/atom/entry/{id}"/>
    <title>{title}</title>
    <content type="text/html"></content>
    <app:control><app:draft>yes</app:draft></app:control>
  </entry>
"#
            ));
        }
        xml.push_str("</feed>\n");
        xml
    }

    #[test]
    fn test_parse_entry_full() {
        let entry = parse_entry(ENTRY_XML).unwrap();

        assert_eq!(entry.entry_id, "13574176438012345678");
        assert_eq!(
            entry.edit_url,
            "https://blog.hatena.ne.jp/user/user.hatenablog.com/atom/entry/13574176438012345678"
        );
        assert_eq!(
            entry.public_url.as_deref(),
            Some("https://user.hatenablog.com/entry/2024/01/01/000000")
        );
        assert_eq!(entry.title, "Hello & welcome");
        assert_eq!(entry.content, "**bold** <tag>");
        assert_eq!(entry.content_type.as_deref(), Some("text/x-markdown"));
        assert_eq!(entry.author.as_deref(), Some("user"));
        assert_eq!(entry.categories, vec!["Rust", "Blog"]);
        assert!(!entry.is_draft);
        assert_eq!(entry.published.as_deref(), Some("2024-01-01T00:00:00+09:00"));
        assert_eq!(entry.updated.as_deref(), Some("2024-01-01T00:00:00+09:00"));
    }

    #[test]
    fn test_parse_entry_draft_without_public_url() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">
  <id>https://example.com/atom/entry/42</id>
  <link rel="edit" href="https://example.com/atom/entry/42"/>
  <title>Draft</title>
  <app:control><app:draft>yes</app:draft></app:control>
</entry>"#;
        let entry = parse_entry(xml).unwrap();
        assert_eq!(entry.entry_id, "42");
        assert!(entry.is_draft);
        assert!(entry.public_url.is_none());
        assert!(entry.categories.is_empty());
    }

    #[test]
    fn test_missing_draft_control_means_published() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
  <id>urn:x/1</id>
  <link rel="edit" href="https://example.com/atom/entry/1"/>
  <title>T</title>
</entry>"#;
        assert!(!parse_entry(xml).unwrap().is_draft);
    }

    #[test]
    fn test_parse_entry_missing_id() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
  <link rel="edit" href="https://example.com/atom/entry/1"/>
  <title>T</title>
</entry>"#;
        assert_eq!(parse_entry(xml), Err(CodecError::MissingElement("id")));
    }

    #[test]
    fn test_parse_entry_missing_edit_link() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
  <id>urn:x/1</id>
  <link rel="alternate" type="text/html" href="https://example.com/entry/1"/>
</entry>"#;
        assert!(matches!(
            parse_entry(xml),
            Err(CodecError::MissingElement(_))
        ));
    }

    #[test]
    fn test_created_entry_uses_location_fallback() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom"><id>urn:x/7</id><title>T</title></entry>"#;
        let entry =
            parse_created_entry(xml, Some("https://example.com/atom/entry/7")).unwrap();
        assert_eq!(entry.edit_url, "https://example.com/atom/entry/7");

        assert!(parse_created_entry(xml, None).is_err());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_entry("<entry><title>oops</entry>"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(parse_entry(""), Err(CodecError::Malformed(_))));
        assert!(matches!(
            parse_entry("<entry><title>unterminated"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_wrong_root_element() {
        assert_eq!(
            parse_entry("<feed xmlns=\"http://www.w3.org/2005/Atom\"></feed>"),
            Err(CodecError::MissingElement("entry"))
        );
        assert_eq!(
            parse_feed(ENTRY_XML),
            Err(CodecError::MissingElement("feed"))
        );
    }

    #[test]
    fn test_codec_error_mapping() {
        let err = CodecError::Malformed("x".to_string()).into_hatena_error(
            Operation::GetEntry,
            200,
            "<",
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);

        let err = CodecError::MissingElement("id").into_hatena_error(
            Operation::CreateEntry,
            201,
            "<entry/>",
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Protocol);
        assert_eq!(err.status(), Some(201));
        assert!(err.to_string().contains("missing required element: id"));
    }

    #[test]
    fn test_cursor_from_next_link_decodes_page() {
        assert_eq!(
            cursor_from_next_link("https://example.com/atom/entry?page=17%26x"),
            Some("17&x".to_string())
        );
    }

    #[test]
    fn test_parse_feed_with_next() {
        let xml = feed_xml(&[("1", "First"), ("2", "Second")], Some("1700000000"));
        let page = parse_feed(&xml).unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].entry_id, "1");
        assert_eq!(page.entries[0].title, "First");
        assert!(page.entries[0].is_draft);
        assert_eq!(page.entries[1].entry_id, "2");
        assert_eq!(page.next_cursor.as_deref(), Some("1700000000"));
    }

    #[test]
    fn test_parse_empty_feed() {
        let page = parse_feed(&feed_xml(&[], None)).unwrap();
        assert!(page.entries.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_feed_title_does_not_leak_into_entries() {
        let page = parse_feed(&feed_xml(&[("9", "Entry title")], None)).unwrap();
        assert_eq!(page.entries[0].title, "Entry title");
    }

    #[test]
    fn test_serialize_entry_layout() {
        let draft = EntryDraft {
            title: "Title".to_string(),
            content: "Body".to_string(),
            content_type: ContentType::Markdown,
            author: Some("user".to_string()),
            categories: vec!["a".to_string(), "b".to_string()],
            is_draft: false,
            custom_url: None,
            updated: Some("2024-01-01T00:00:00Z".to_string()),
        };
        let xml = serialize_entry(&draft);

        let title = xml.find("<title>").unwrap();
        let author = xml.find("<author>").unwrap();
        let content = xml.find("<content").unwrap();
        let updated = xml.find("<updated>").unwrap();
        let category = xml.find("<category").unwrap();
        let control = xml.find("<app:control>").unwrap();
        assert!(title < author && author < content && content < updated);
        assert!(updated < category && category < control);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("xmlns=\"http://www.w3.org/2005/Atom\""));
        assert!(xml.contains("xmlns:app=\"http://www.w3.org/2007/app\""));
        assert!(xml.contains("<content type=\"text/x-markdown\">Body</content>"));
        assert!(xml.contains("<category term=\"a\" />"));
    }

    #[test]
    fn test_draft_flag_is_always_emitted() {
        let mut draft = EntryDraft::new("T", "C");
        draft.is_draft = true;
        assert!(serialize_entry(&draft).contains("<app:draft>yes</app:draft>"));

        draft.is_draft = false;
        assert!(serialize_entry(&draft).contains("<app:draft>no</app:draft>"));
    }

    #[test]
    fn test_custom_url_omitted_when_unset() {
        let xml = serialize_entry(&EntryDraft::new("T", "C"));
        assert!(!xml.contains("custom-url"));
        assert!(!xml.contains("hatenablog"));
    }

    #[test]
    fn test_custom_url_emitted_when_set() {
        let mut draft = EntryDraft::new("T", "C");
        draft.custom_url = Some("my-post".to_string());
        let xml = serialize_entry(&draft);
        assert!(xml.contains(
            "xmlns:hatenablog=\"http://www.hatena.ne.jp/info/xmlns#hatenablog\""
        ));
        assert!(xml.contains("<hatenablog:custom-url>my-post</hatenablog:custom-url>"));
    }

    #[test]
    fn test_escape_xml_table() {
        assert_eq!(
            escape_xml(r#"a & b < c > d " e ' f"#),
            "a &amp; b &lt; c &gt; d &quot; e &#39; f"
        );
    }

    #[test]
    fn test_round_trip_special_characters() {
        let draft = EntryDraft {
            title: r#"Tom & Jerry's <"show">"#.to_string(),
            content: "<p>5 > 3 && 'quoted' \"text\"</p>\n  indented".to_string(),
            content_type: ContentType::Html,
            author: Some("o'neil".to_string()),
            categories: vec!["R&D".to_string(), "<tag>".to_string(), "\"q\"".to_string()],
            is_draft: true,
            custom_url: Some("a&b".to_string()),
            updated: Some("2024-01-01T00:00:00Z".to_string()),
        };

        let parsed = parse_draft(&serialize_entry(&draft)).unwrap();
        assert_eq!(parsed, draft);
    }

    #[test]
    fn test_round_trip_preserves_category_order() {
        let mut draft = EntryDraft::new("T", "C");
        draft.categories = vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()];
        let parsed = parse_draft(&serialize_entry(&draft)).unwrap();
        assert_eq!(parsed.categories, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_cdata_content() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom"><id>urn:x/3</id><link rel="edit" href="e"/><content type="text/html"><![CDATA[<b>raw</b>]]></content></entry>"#;
        assert_eq!(parse_entry(xml).unwrap().content, "<b>raw</b>");
    }

    #[test]
    fn test_entry_id_from_atom_id() {
        assert_eq!(
            entry_id_from_atom_id(
                "tag:blog.hatena.ne.jp,2013:blog-some-user-8454420450081234567-13574176438012345678"
            ),
            "13574176438012345678"
        );
        assert_eq!(
            entry_id_from_atom_id("https://blog.hatena.ne.jp/u/d/atom/entry/123"),
            "123"
        );
        assert_eq!(entry_id_from_atom_id("plain"), "plain");
    }

    #[test]
    fn test_cursor_from_next_link() {
        assert_eq!(
            cursor_from_next_link("https://blog.hatena.ne.jp/u/d/atom/entry?page=1700000000"),
            Some("1700000000".to_string())
        );
        assert_eq!(
            cursor_from_next_link("https://x/atom/entry?foo=1&page=abc"),
            Some("abc".to_string())
        );
        assert_eq!(cursor_from_next_link("https://x/atom/entry"), None);
        assert_eq!(cursor_from_next_link("https://x/atom/entry?page="), None);
    }
}
