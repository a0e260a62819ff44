// # DNSPod DNS Backend
//
// This crate provides a DNSPod (Tencent Cloud API 3.0) backend for the Tetra
// DNS manager.
//
// ## Behaviour
//
// - ✅ Every request signed with TC3-HMAC-SHA256
// - ✅ Paged listing by `Offset`/`Limit` up to `RecordCountInfo.TotalCount`
// - ✅ Routing lines; the provider default line `默认` maps to `None`
// - ✅ Updates one by one, one batched delete, then creates one by one
// - ❌ NO batched create (CreateRecordBatch drops the remark, which carries
//   the ownership tag)
// - ❌ NO retry logic (a failure aborts the run)
//
// ## Security Requirements
//
// - SecretKey NEVER appears in logs
//
// ## API Reference
//
// - Endpoint: POST https://dnspod.tencentcloudapi.com/, version 2021-03-23
// - Actions: DescribeRecordList, ModifyRecord, DeleteRecordBatch, CreateRecord

mod sign;
mod types;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tetra_core::config::BackendConfig;
use tetra_core::reconcile::{ChangeSet, Progress};
use tetra_core::record::{DnsRecord, RecordType};
use tetra_core::traits::{DnsBackend, DnsBackendFactory};
use tetra_core::validate::check_record;
use tetra_core::{Error, Result};

use sign::{CONTENT_TYPE, Signer};
use types::{
    DeleteRecordBatchRequest, DescribeRecordListRequest, Empty, RecordListResponse, RecordRequest,
    TencentResponse,
};

/// DNSPod API host
const DNSPOD_API_HOST: &str = "dnspod.tencentcloudapi.com";

/// Service name used in the credential scope
const DNSPOD_SERVICE: &str = "dnspod";

/// API version
const DNSPOD_VERSION: &str = "2021-03-23";

/// Name of the provider's default routing line
pub const DEFAULT_LINE: &str = "默认";

/// Records requested per listing page
const PAGE_SIZE: u32 = 3000;

/// Error code returned by DescribeRecordList for a zone without records
const NO_RECORDS_CODE: &str = "ResourceNotFound.NoDataOfRecord";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// DNSPod DNS backend for one domain
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the SecretKey.
pub struct DnspodBackend {
    secret_id: String,

    /// ⚠️ NEVER log this value
    secret_key: String,

    domain: String,

    /// Comment prefix of owned records
    prefix: String,

    /// Endpoint URL and the host it is signed for
    endpoint: String,
    host: String,

    client: reqwest::Client,
}

impl std::fmt::Debug for DnspodBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnspodBackend")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl DnspodBackend {
    /// Create a new DNSPod backend
    ///
    /// # Parameters
    ///
    /// - `secret_id` / `secret_key`: Tencent Cloud API credentials
    /// - `domain`: Zone name
    /// - `prefix`: Ownership prefix of the records this backend may touch
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        domain: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        if secret_id.is_empty() || secret_key.is_empty() {
            return Err(Error::config("DNSPod secret_id and secret_key are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            secret_id,
            secret_key,
            domain: domain.into(),
            prefix: prefix.into(),
            endpoint: format!("https://{}", DNSPOD_API_HOST),
            host: DNSPOD_API_HOST.to_string(),
            client,
        })
    }

    /// Point the backend at another API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| Error::config(format!("Invalid endpoint {}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::config(format!("Endpoint {} has no host", endpoint)))?;

        self.host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Execute one signed Tencent Cloud API action
    async fn request<T: DeserializeOwned, B: Serialize>(&self, action: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_string(body)?;
        tracing::debug!("{} request body: {}", action, payload);

        let timestamp = Utc::now().timestamp();
        let signer = Signer {
            secret_id: &self.secret_id,
            secret_key: &self.secret_key,
            host: &self.host,
            service: DNSPOD_SERVICE,
        };
        let authorization = signer.authorization(action, &payload, timestamp);

        let response = self
            .client
            .post(format!("{}/", self.endpoint))
            .header("Content-Type", CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Version", DNSPOD_VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("Authorization", authorization)
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", action, e)))?;
        if !status.is_success() {
            return Err(Error::provider(
                "dnspod",
                format!("{} failed: {} - {}", action, status, text),
            ));
        }

        let envelope: TencentResponse<T> = serde_json::from_str(&text).map_err(|e| {
            Error::provider("dnspod", format!("Failed to parse {} response: {}", action, e))
        })?;
        let body = envelope.response;

        if let Some(error) = body.error {
            tracing::debug!(
                "{} failed with {} (request {})",
                action,
                error.code,
                body.request_id.as_deref().unwrap_or("-")
            );
            return Err(if error.code.starts_with("AuthFailure") {
                Error::auth(format!("{}: {}", error.code, error.message))
            } else if error.code == NO_RECORDS_CODE {
                Error::not_found(format!("{}: {}", error.code, error.message))
            } else {
                Error::provider("dnspod", format!("{} failed: {} - {}", action, error.code, error.message))
            });
        }

        Ok(body.data)
    }

    fn record_request<'a>(&'a self, record: &'a DnsRecord, record_id: Option<u64>) -> RecordRequest<'a> {
        RecordRequest {
            domain: &self.domain,
            record_id,
            sub_domain: &record.name,
            record_type: record.record_type.as_str(),
            record_line: record.line.as_deref().unwrap_or(DEFAULT_LINE),
            value: &record.content,
            ttl: record.ttl,
            remark: &record.comment,
        }
    }
}

/// Numeric DNSPod id of a fetched record
fn record_id(record: &DnsRecord) -> Result<u64> {
    record
        .id
        .as_deref()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| {
            Error::provider("dnspod", format!("Record has no numeric id: {}", record.summary()))
        })
}

#[async_trait]
impl DnsBackend for DnspodBackend {
    async fn get_records(&self) -> Result<Vec<DnsRecord>> {
        let mut listed = Vec::new();
        let mut offset = 0u32;

        loop {
            let request = DescribeRecordListRequest {
                domain: &self.domain,
                offset,
                limit: PAGE_SIZE,
            };
            let page: RecordListResponse = match self.request("DescribeRecordList", &request).await {
                Ok(page) => page,
                Err(Error::NotFound(_)) => break,
                Err(e) => return Err(e),
            };

            let total = page
                .record_count_info
                .and_then(|info| info.total_count)
                .unwrap_or(0);
            let records = page.record_list.unwrap_or_default();
            if records.is_empty() {
                break;
            }
            offset += records.len() as u32;
            listed.extend(records);
            if offset >= total {
                break;
            }
        }

        let mut owned = Vec::new();
        for record in &listed {
            let Some(remark) = record.remark.as_deref() else {
                continue;
            };
            if !remark.contains(&self.prefix) {
                continue;
            }

            let record_type: RecordType = record.record_type.parse()?;
            let mut content = record.value.clone();
            if record_type == RecordType::Cname && !content.ends_with('.') {
                content.push('.');
            }
            let line = (record.line != DEFAULT_LINE).then(|| record.line.clone());
            let normalised = DnsRecord::new(record.name.clone(), record_type, content, record.ttl, remark)
                .with_line(line)
                .with_id(record.record_id.to_string());
            check_record(&normalised)?;
            owned.push(normalised);
        }

        tracing::info!(
            "Got {} records in total {} records from DNSPod",
            owned.len(),
            listed.len()
        );
        Ok(owned)
    }

    async fn update_records(&self, changes: &ChangeSet) -> Result<()> {
        let mut progress = Progress::new(changes);

        for record in &changes.updating {
            tracing::debug!("Updating {}", record.summary());
            let request = self.record_request(record, Some(record_id(record)?));
            self.request::<Empty, _>("ModifyRecord", &request).await?;
            progress.advance(1);
        }

        if !changes.deleting.is_empty() {
            let request = DeleteRecordBatchRequest {
                record_id_list: changes
                    .deleting
                    .iter()
                    .map(record_id)
                    .collect::<Result<Vec<_>>>()?,
            };
            tracing::debug!("Deleting {} record(s)", request.record_id_list.len());
            self.request::<Empty, _>("DeleteRecordBatch", &request).await?;
            progress.advance(request.record_id_list.len());
        }

        for record in &changes.adding {
            tracing::debug!("Creating {}", record.summary());
            let request = self.record_request(record, None);
            self.request::<Empty, _>("CreateRecord", &request).await?;
            progress.advance(1);
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "dnspod"
    }
}

/// Factory for creating DNSPod backends
pub struct DnspodFactory;

impl DnsBackendFactory for DnspodFactory {
    fn create(
        &self,
        domain: &str,
        ownership_prefix: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn DnsBackend>> {
        match config {
            BackendConfig::Dnspod {
                secret_id,
                secret_key,
            } => Ok(Box::new(DnspodBackend::new(
                secret_id.clone(),
                secret_key.clone(),
                domain,
                ownership_prefix,
            )?)),
            _ => Err(Error::config("Invalid config for DNSPod backend")),
        }
    }
}

/// Register the DNSPod backend with a registry
pub fn register(registry: &tetra_core::BackendRegistry) {
    registry.register_backend("dnspod", Box::new(DnspodFactory));
}
