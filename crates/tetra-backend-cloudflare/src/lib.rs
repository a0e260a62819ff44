// # Cloudflare DNS Backend
//
// This crate provides a Cloudflare backend for the Tetra DNS manager.
//
// ## Behaviour
//
// - ✅ Zone ID taken from configuration or looked up once by domain name
// - ✅ Paginated listing, 1000 records per page
// - ✅ Only records whose comment carries the ownership prefix are returned
// - ✅ Updates, then deletes, then creates; one request per record
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ❌ NO routing lines (Cloudflare has none; a record with a line is an error)
// - ❌ NO retry logic (a failure aborts the run)
// - ❌ NO proxying (every record is written with `proxied: false`)
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - Backend MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?per_page=1000&page=n`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tetra_core::config::BackendConfig;
use tetra_core::reconcile::{ChangeSet, Progress};
use tetra_core::record::{APEX, DnsRecord, RecordType};
use tetra_core::traits::{DnsBackend, DnsBackendFactory};
use tetra_core::validate::check_record;
use tetra_core::{Error, Result};
use tokio::sync::OnceCell;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per listing page
const PAGE_SIZE: u32 = 1000;

/// Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CfRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    ttl: u32,
    comment: Option<String>,
}

/// Cloudflare DNS backend for one zone
///
/// # Trust Level: Untrusted
///
/// This backend is isolated and sequential. Deciding what to change is owned
/// by the reconciler.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareBackend {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone name, e.g. `example.com`
    domain: String,

    /// Comment prefix of owned records
    prefix: String,

    /// Zone ID, configured or discovered on first use
    zone_id: OnceCell<String>,

    /// API base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareBackend")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("prefix", &self.prefix)
            .field("zone_id", &self.zone_id.get())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareBackend {
    /// Create a new Cloudflare backend
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Optional zone ID (looked up by `domain` otherwise)
    /// - `domain`: Zone name
    /// - `prefix`: Ownership prefix of the records this backend may touch
    ///
    /// # Security
    ///
    /// The API token will NEVER be logged or displayed in error messages.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: Option<String>,
        domain: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            domain: domain.into(),
            prefix: prefix.into(),
            zone_id: OnceCell::new_with(zone_id),
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the backend at another API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Zone ID, looked up on first use when not configured
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn zone_id(&self) -> Result<&str> {
        let id = self
            .zone_id
            .get_or_try_init(|| async {
                tracing::debug!("Looking up zone ID for domain: {}", self.domain);

                let url = format!("{}/zones", self.base_url);
                let request = self
                    .client
                    .get(&url)
                    .query(&[("name", self.domain.as_str())]);
                let envelope: Envelope<Vec<ZoneInfo>> = self.send(request, "Zone lookup").await?;

                let mut zones = envelope.result.unwrap_or_default();
                if zones.len() != 1 {
                    return Err(Error::not_found(format!(
                        "Zone {} not found (matched {} zones)",
                        self.domain,
                        zones.len()
                    )));
                }
                let zone = zones.remove(0);
                tracing::debug!("Found zone ID: {}", zone.id);
                Ok(zone.id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// Send an authenticated request and unwrap the response envelope
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => Error::auth(format!(
                    "Invalid API token or insufficient permissions. Status: {}",
                    status
                )),
                404 => Error::not_found(format!("{} failed: {} - {}", action, status, error_text)),
                409 => Error::provider(
                    "cloudflare",
                    format!("Conflict during {}. Status: {} - {}", action, status, error_text),
                ),
                429 => Error::provider(
                    "cloudflare",
                    format!("Rate limit exceeded. Please retry later. Status: {}", status),
                ),
                500..=599 => Error::provider(
                    "cloudflare",
                    format!("Cloudflare server error: {} - {}", status, error_text),
                ),
                _ => Error::provider(
                    "cloudflare",
                    format!("{} failed: {} - {}", action, status, error_text),
                ),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            let messages: Vec<String> = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            return Err(Error::provider(
                "cloudflare",
                format!("{} failed: {}", action, messages.join("; ")),
            ));
        }

        Ok(envelope)
    }

    /// Relative name for a fully qualified one
    fn relative_name(&self, name: &str) -> String {
        if name == self.domain {
            return APEX.to_string();
        }
        name.strip_suffix(&format!(".{}", self.domain))
            .unwrap_or(name)
            .to_string()
    }

    /// Fully qualified name for a relative one
    fn absolute_name(&self, name: &str) -> String {
        if name == APEX {
            self.domain.clone()
        } else {
            format!("{}.{}", name, self.domain)
        }
    }

    fn payload(&self, record: &DnsRecord) -> Result<serde_json::Value> {
        if let Some(line) = &record.line {
            return Err(Error::provider(
                "cloudflare",
                format!("Routing lines are not supported ({}): {}", line, record.summary()),
            ));
        }
        Ok(serde_json::json!({
            "name": self.absolute_name(&record.name),
            "type": record.record_type.as_str(),
            "content": record.content,
            "ttl": record.ttl,
            "comment": record.comment,
            "proxied": false,
        }))
    }

    fn record_url(&self, zone_id: &str, record: &DnsRecord) -> Result<String> {
        let id = record.id.as_deref().ok_or_else(|| {
            Error::provider("cloudflare", format!("Record has no id: {}", record.summary()))
        })?;
        Ok(format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, id))
    }
}

#[async_trait]
impl DnsBackend for CloudflareBackend {
    async fn get_records(&self) -> Result<Vec<DnsRecord>> {
        let zone_id = self.zone_id().await?;
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);

        let mut listed = Vec::new();
        let mut page = 1u32;
        loop {
            let request = self
                .client
                .get(&url)
                .query(&[("per_page", PAGE_SIZE), ("page", page)]);
            let envelope: Envelope<Vec<CfRecord>> = self.send(request, "Record listing").await?;

            listed.extend(envelope.result.unwrap_or_default());
            let total_pages = envelope.result_info.map(|info| info.total_pages).unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        let mut owned = Vec::new();
        for record in &listed {
            let Some(comment) = record.comment.as_deref() else {
                continue;
            };
            if !comment.contains(&self.prefix) {
                continue;
            }

            let record_type: RecordType = record.record_type.parse()?;
            let mut content = record.content.clone();
            if record_type == RecordType::Cname && !content.ends_with('.') {
                content.push('.');
            }
            let normalised = DnsRecord::new(
                self.relative_name(&record.name),
                record_type,
                content,
                record.ttl,
                comment,
            )
            .with_id(record.id.clone());
            check_record(&normalised)?;
            owned.push(normalised);
        }

        tracing::info!(
            "Got {} records in total {} records from Cloudflare",
            owned.len(),
            listed.len()
        );
        Ok(owned)
    }

    async fn update_records(&self, changes: &ChangeSet) -> Result<()> {
        let zone_id = self.zone_id().await?;
        let mut progress = Progress::new(changes);

        for record in &changes.updating {
            tracing::debug!("Updating {}", record.summary());
            let request = self
                .client
                .put(self.record_url(zone_id, record)?)
                .json(&self.payload(record)?);
            self.send::<serde_json::Value>(request, "Record update").await?;
            progress.advance(1);
        }

        for record in &changes.deleting {
            tracing::debug!("Deleting {}", record.summary());
            let request = self.client.delete(self.record_url(zone_id, record)?);
            self.send::<serde_json::Value>(request, "Record deletion").await?;
            progress.advance(1);
        }

        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        for record in &changes.adding {
            tracing::debug!("Creating {}", record.summary());
            let request = self.client.post(&url).json(&self.payload(record)?);
            self.send::<serde_json::Value>(request, "Record creation").await?;
            progress.advance(1);
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Factory for creating Cloudflare backends
pub struct CloudflareFactory;

impl DnsBackendFactory for CloudflareFactory {
    fn create(
        &self,
        domain: &str,
        ownership_prefix: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn DnsBackend>> {
        match config {
            BackendConfig::Cloudflare { api_token, zone_id } => Ok(Box::new(
                CloudflareBackend::new(api_token.clone(), zone_id.clone(), domain, ownership_prefix)?,
            )),
            _ => Err(Error::config("Invalid config for Cloudflare backend")),
        }
    }
}

/// Register the Cloudflare backend with a registry
///
/// # Example
///
/// ```rust
/// use tetra_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// tetra_backend_cloudflare::register(&registry);
/// assert!(registry.has_backend("cloudflare"));
/// ```
pub fn register(registry: &tetra_core::BackendRegistry) {
    registry.register_backend("cloudflare", Box::new(CloudflareFactory));
}
