//! Uploaded bill model matching the frontend UploadedBill interface.
//!
//! Only file metadata is kept; the file body itself is never stored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBill {
    pub id: String,
    pub name: String,
    /// MIME type reported by the uploader
    #[serde(rename = "type")]
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub name: String,
    #[serde(default, rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}
