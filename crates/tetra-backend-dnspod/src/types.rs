//! Tencent Cloud API 3.0 request and response shapes used by the backend

use serde::{Deserialize, Serialize};

/// Generic Tencent Cloud response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct TencentResponse<T> {
    #[serde(rename = "Response")]
    pub response: TencentBody<T>,
}

/// Body of the envelope: an optional error beside the action's payload
///
/// Every payload type is deserialisable from an empty map, so error
/// responses still parse.
#[derive(Debug, Deserialize)]
pub(crate) struct TencentBody<T> {
    #[serde(rename = "Error")]
    pub error: Option<TencentError>,
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Error payload nested inside Tencent Cloud responses
#[derive(Debug, Deserialize)]
pub(crate) struct TencentError {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

/// Payload of actions whose response carries nothing we use
#[derive(Debug, Deserialize)]
pub(crate) struct Empty {}

// ============ DescribeRecordList ============

#[derive(Debug, Serialize)]
pub(crate) struct DescribeRecordListRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "Offset")]
    pub offset: u32,
    #[serde(rename = "Limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordListResponse {
    #[serde(rename = "RecordList")]
    pub record_list: Option<Vec<DnspodRecord>>,
    #[serde(rename = "RecordCountInfo")]
    pub record_count_info: Option<RecordCountInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordCountInfo {
    #[serde(rename = "TotalCount")]
    pub total_count: Option<u32>,
}

/// Record item as listed by DNSPod
#[derive(Debug, Deserialize)]
pub(crate) struct DnspodRecord {
    #[serde(rename = "RecordId")]
    pub record_id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "Remark", default)]
    pub remark: Option<String>,
}

// ============ Record mutations ============

/// Body shared by CreateRecord and ModifyRecord
#[derive(Debug, Serialize)]
pub(crate) struct RecordRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
    #[serde(rename = "RecordId", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<u64>,
    #[serde(rename = "SubDomain")]
    pub sub_domain: &'a str,
    #[serde(rename = "RecordType")]
    pub record_type: &'a str,
    #[serde(rename = "RecordLine")]
    pub record_line: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "Remark")]
    pub remark: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRecordBatchRequest {
    #[serde(rename = "RecordIdList")]
    pub record_id_list: Vec<u64>,
}
