//! Hatena Blog AtomPub client
//!
//! [`HatenaBlogClient`] turns the five entry operations into single HTTP
//! round trips. The wire is abstracted behind [`Transport`] so the client can
//! be driven by `reqwest` in production and by mocks in tests.
//!
//! The client never retries. Each call validates credentials, sends exactly
//! one request, classifies the status and parses the body.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use hatena_core::codec::{parse_created_entry, parse_entry, parse_feed, serialize_entry};
use hatena_core::endpoint::{
    collection_uri, member_uri, service_document_uri, validate_base_url, DEFAULT_BASE_URL,
};
use hatena_core::error::check_status;
use hatena_core::wsse::{basic_auth_header, format_created, wsse_header, NONCE_LEN, WSSE_HEADER};
use hatena_core::{AuthScheme, BlogCredentials, Entry, EntryDraft, FeedPage, HatenaError, Operation};
use rand::RngCore;

use crate::config::BlogConfig;

/// Content type sent with entry payloads
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::CreateEntry => Method::Post,
            Operation::UpdateEntry => Method::Put,
            Operation::DeleteEntry => Method::Delete,
            _ => Method::Get,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// `Location` header, present on 201 Created
    pub location: Option<String>,
    pub body: String,
}

/// Sends one request and returns the raw response.
///
/// Implementations report connection, DNS and timeout failures as
/// [`HatenaError::Network`]; every HTTP status, including errors, is a
/// successful return.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        operation: Operation,
        request: HttpRequest,
    ) -> Result<HttpResponse, HatenaError>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HatenaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hatena/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HatenaError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        operation: Operation,
        request: HttpRequest,
    ) -> Result<HttpResponse, HatenaError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out"
            } else if e.is_connect() {
                "connection failed"
            } else {
                "request failed"
            };
            HatenaError::network(operation, format!("{reason}: {e}"))
        })?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            HatenaError::network(operation, format!("Failed to read response body: {e}"))
        })?;

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

/// Client for one blog's AtomPub endpoints
pub struct HatenaBlogClient<T = ReqwestTransport> {
    credentials: BlogCredentials,
    transport: T,
    auth: AuthScheme,
    base_url: String,
}

impl HatenaBlogClient<ReqwestTransport> {
    /// Build a `reqwest`-backed client from resolved configuration
    pub fn from_config(config: &BlogConfig) -> Result<Self, HatenaError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(HatenaBlogClient::new(config.credentials.clone(), transport)
            .with_auth(config.auth)
            .with_base_url(&config.base_url))
    }
}

impl<T: Transport> HatenaBlogClient<T> {
    pub fn new(credentials: BlogCredentials, transport: T) -> Self {
        Self {
            credentials,
            transport,
            auth: AuthScheme::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn credentials(&self) -> &BlogCredentials {
        &self.credentials
    }

    pub fn auth(&self) -> AuthScheme {
        self.auth
    }

    pub fn service_document_url(&self) -> String {
        service_document_uri(&self.base_url, &self.credentials)
    }

    /// Fresh authentication header for one request
    fn auth_header(&self) -> (String, String) {
        let BlogCredentials {
            hatena_id, api_key, ..
        } = &self.credentials;

        match self.auth {
            AuthScheme::Basic => (
                "Authorization".to_string(),
                basic_auth_header(hatena_id, api_key),
            ),
            AuthScheme::Wsse => {
                let mut nonce = [0u8; NONCE_LEN];
                rand::thread_rng().fill_bytes(&mut nonce);
                let created = format_created(chrono::Utc::now());
                (
                    WSSE_HEADER.to_string(),
                    wsse_header(hatena_id, api_key, &nonce, &created),
                )
            }
        }
    }

    /// Send one request and classify its status
    async fn execute(
        &self,
        operation: Operation,
        url: String,
        body: Option<String>,
    ) -> Result<HttpResponse, HatenaError> {
        validate_base_url(&self.base_url)?;

        let mut headers = vec![self.auth_header()];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), XML_CONTENT_TYPE.to_string()));
        }

        let method = Method::for_operation(operation);
        log::debug!("{operation}: {} {url}", operation.method());

        let response = self
            .transport
            .send(
                operation,
                HttpRequest {
                    method,
                    url,
                    headers,
                    body,
                },
            )
            .await?;

        log::debug!("{operation}: HTTP {}", response.status);

        if let Err(err) = check_status(operation, response.status, &response.body) {
            log::warn!("{err}");
            return Err(err);
        }

        Ok(response)
    }

    fn prepare_draft(&self, operation: Operation, draft: &EntryDraft) -> Result<String, HatenaError> {
        draft.validate(operation)?;

        let mut draft = draft.clone();
        if draft.author.is_none() {
            draft.author = Some(self.credentials.hatena_id.clone());
        }

        Ok(serialize_entry(&draft))
    }

    fn check_entry_id(operation: Operation, entry_id: &str) -> Result<(), HatenaError> {
        if entry_id.trim().is_empty() || entry_id.contains('/') {
            return Err(HatenaError::validation(
                operation,
                format!("invalid entry id: {entry_id:?}"),
            ));
        }
        Ok(())
    }

    /// GET the service document; succeeds when the credentials are accepted
    pub async fn verify(&self) -> Result<(), HatenaError> {
        self.credentials.validate()?;

        let url = self.service_document_url();
        self.execute(Operation::ServiceDocument, url, None).await?;
        Ok(())
    }

    /// Fetch one page of the entry collection
    pub async fn list_entries(&self, cursor: Option<&str>) -> Result<FeedPage, HatenaError> {
        self.credentials.validate()?;

        let operation = Operation::ListEntries;
        let url = collection_uri(&self.base_url, &self.credentials, cursor);
        let response = self.execute(operation, url, None).await?;

        parse_feed(&response.body)
            .map_err(|e| e.into_hatena_error(operation, response.status, &response.body))
    }

    /// Follow `next` cursors until the last page.
    ///
    /// Entries keep server order; an entry seen on an earlier page is not
    /// repeated. `delay` is slept between requests.
    pub async fn list_all_entries(
        &self,
        delay: Duration,
        max_pages: Option<usize>,
    ) -> Result<Vec<Entry>, HatenaError> {
        let mut entries = Vec::new();
        let mut seen_entries = HashSet::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.list_entries(cursor.as_deref()).await?;
            pages += 1;

            for entry in page.entries {
                if seen_entries.insert(entry.entry_id.clone()) {
                    entries.push(entry);
                }
            }

            let next = match page.next_cursor {
                Some(next) if seen_cursors.insert(next.clone()) => next,
                Some(next) => {
                    log::warn!("Cursor {next} was already visited, stopping pagination");
                    break;
                }
                None => break,
            };

            if max_pages.is_some_and(|max| pages >= max) {
                log::debug!("Stopping after {pages} page(s)");
                break;
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            cursor = Some(next);
        }

        Ok(entries)
    }

    /// POST a new entry; success is 201 Created
    pub async fn create_entry(&self, draft: &EntryDraft) -> Result<Entry, HatenaError> {
        self.credentials.validate()?;

        let operation = Operation::CreateEntry;
        let body = self.prepare_draft(operation, draft)?;
        let url = collection_uri(&self.base_url, &self.credentials, None);
        let response = self.execute(operation, url, Some(body)).await?;

        parse_created_entry(&response.body, response.location.as_deref())
            .map_err(|e| e.into_hatena_error(operation, response.status, &response.body))
    }

    pub async fn get_entry(&self, entry_id: &str) -> Result<Entry, HatenaError> {
        self.credentials.validate()?;

        let operation = Operation::GetEntry;
        Self::check_entry_id(operation, entry_id)?;
        let url = member_uri(&self.base_url, &self.credentials, entry_id);
        let response = self.execute(operation, url, None).await?;

        parse_entry(&response.body)
            .map_err(|e| e.into_hatena_error(operation, response.status, &response.body))
    }

    /// PUT a full replacement; fields absent from `draft` are not kept
    pub async fn update_entry(&self, entry_id: &str, draft: &EntryDraft) -> Result<Entry, HatenaError> {
        self.credentials.validate()?;

        let operation = Operation::UpdateEntry;
        Self::check_entry_id(operation, entry_id)?;
        let body = self.prepare_draft(operation, draft)?;
        let url = member_uri(&self.base_url, &self.credentials, entry_id);
        let response = self.execute(operation, url, Some(body)).await?;

        parse_entry(&response.body)
            .map_err(|e| e.into_hatena_error(operation, response.status, &response.body))
    }

    /// DELETE an entry; 200 and 204 both count as success
    pub async fn delete_entry(&self, entry_id: &str) -> Result<(), HatenaError> {
        self.credentials.validate()?;

        let operation = Operation::DeleteEntry;
        Self::check_entry_id(operation, entry_id)?;
        let url = member_uri(&self.base_url, &self.credentials, entry_id);
        self.execute(operation, url, None).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-in for the Hatena AtomPub server

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use hatena_core::codec::{escape_xml, parse_draft};

    use super::*;

    pub const BASE_URL: &str = "https://blog.hatena.ne.jp";

    pub fn credentials() -> BlogCredentials {
        BlogCredentials::new("user", "user.hatenablog.com", "secret")
    }

    pub fn entry_xml(id: &str, draft: &EntryDraft) -> String {
        let mut xml = format!(
            r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">
  <id>tag:blog.hatena.ne.jp,2013:blog-user-8454420450081234567-{id}</id>
  <link rel="edit" href="{BASE_URL}/user/user.hatenablog.com/atom/entry/{id}"/>
"#
        );
        if !draft.is_draft {
            xml.push_str(&format!(
                "  <link rel=\"alternate\" type=\"text/html\" href=\"https://user.hatenablog.com/entry/{id}\"/>\n"
            ));
        }
        xml.push_str(&format!(
            "  <title>{}</title>\n  <published>2024-01-01T00:00:00+09:00</published>\n  <updated>2024-01-01T00:00:00+09:00</updated>\n  <content type=\"{}\">{}</content>\n",
            escape_xml(&draft.title),
            draft.content_type.mime(),
            escape_xml(&draft.content)
        ));
        if let Some(author) = &draft.author {
            xml.push_str(&format!("  <author><name>{}</name></author>\n", escape_xml(author)));
        }
        for category in &draft.categories {
            xml.push_str(&format!("  <category term=\"{}\" />\n", escape_xml(category)));
        }
        if let Some(custom_url) = &draft.custom_url {
            xml.push_str(&format!(
                "  <hatenablog:custom-url xmlns:hatenablog=\"http://www.hatena.ne.jp/info/xmlns#hatenablog\">{}</hatenablog:custom-url>\n",
                escape_xml(custom_url)
            ));
        }
        xml.push_str(&format!(
            "  <app:control><app:draft>{}</app:draft></app:control>\n</entry>\n",
            if draft.is_draft { "yes" } else { "no" }
        ));
        xml
    }

    pub fn feed_xml(entries: &[String], next_cursor: Option<&str>) -> String {
        let mut xml = String::from(
            "<feed xmlns=\"http://www.w3.org/2005/Atom\" xmlns:app=\"http://www.w3.org/2007/app\">\n  <title>Blog</title>\n",
        );
        if let Some(cursor) = next_cursor {
            xml.push_str(&format!(
                "  <link rel=\"next\" href=\"{BASE_URL}/user/user.hatenablog.com/atom/entry?page={cursor}\"/>\n"
            ));
        }
        for entry in entries {
            xml.push_str(entry);
        }
        xml.push_str("</feed>\n");
        xml
    }

    fn response(status: u16, body: impl Into<String>) -> HttpResponse {
        HttpResponse {
            status,
            location: None,
            body: body.into(),
        }
    }

    /// Fake server that stores entries in memory
    #[derive(Default)]
    pub struct FakeHatena {
        entries: Mutex<BTreeMap<u64, EntryDraft>>,
        next_id: AtomicUsize,
        pub requests: AtomicUsize,
    }

    impl FakeHatena {
        pub fn with_entries(drafts: Vec<EntryDraft>) -> Self {
            let fake = FakeHatena::default();
            {
                let mut entries = fake.entries.lock().unwrap();
                for draft in drafts {
                    let id = fake.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
                    entries.insert(id, draft);
                }
            }
            fake
        }

        fn handle(&self, request: HttpRequest) -> HttpResponse {
            let collection = format!("{BASE_URL}/user/user.hatenablog.com/atom/entry");

            let expected = basic_auth_header("user", "secret");
            if request.header("Authorization") != Some(expected.as_str()) {
                return response(401, "Unauthorized");
            }

            let path = match request.url.strip_prefix(&collection) {
                Some(path) => path.split('?').next().unwrap_or_default().to_string(),
                None => return response(404, "Blog not found"),
            };

            let mut entries = self.entries.lock().unwrap();

            if path.is_empty() {
                return match request.method {
                    Method::Get => {
                        let items: Vec<String> = entries
                            .iter()
                            .rev()
                            .map(|(id, draft)| entry_xml(&id.to_string(), draft))
                            .collect();
                        response(200, feed_xml(&items, None))
                    }
                    Method::Post => match parse_draft(request.body.as_deref().unwrap_or_default()) {
                        Ok(draft) => {
                            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
                            let xml = entry_xml(&id.to_string(), &draft);
                            entries.insert(id, draft);
                            HttpResponse {
                                status: 201,
                                location: Some(format!("{collection}/{id}")),
                                body: xml,
                            }
                        }
                        Err(e) => response(400, e.to_string()),
                    },
                    _ => response(405, "Method Not Allowed"),
                };
            }

            let id: u64 = match path.trim_start_matches('/').parse() {
                Ok(id) => id,
                Err(_) => return response(404, "Entry not found"),
            };

            if !entries.contains_key(&id) {
                return response(404, "Entry not found");
            }

            match request.method {
                Method::Get => response(200, entry_xml(&id.to_string(), &entries[&id])),
                Method::Put => match parse_draft(request.body.as_deref().unwrap_or_default()) {
                    Ok(draft) => {
                        let xml = entry_xml(&id.to_string(), &draft);
                        entries.insert(id, draft);
                        response(200, xml)
                    }
                    Err(e) => response(400, e.to_string()),
                },
                Method::Delete => {
                    entries.remove(&id);
                    response(200, "")
                }
                Method::Post => response(405, "Method Not Allowed"),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeHatena {
        async fn send(
            &self,
            _operation: Operation,
            request: HttpRequest,
        ) -> Result<HttpResponse, HatenaError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.handle(request))
        }
    }

    pub fn fake_client(fake: FakeHatena) -> HatenaBlogClient<FakeHatena> {
        HatenaBlogClient::new(credentials(), fake).with_base_url(BASE_URL)
    }

    impl HatenaBlogClient<FakeHatena> {
        /// Requests the fake has answered so far
        pub fn request_count(&self) -> usize {
            self.transport.requests.load(Ordering::SeqCst)
        }
    }
}
