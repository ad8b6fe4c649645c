use crate::config::GatewayConfig;
use crate::core::retry::{retry_with_backoff, RetryPolicy};
use crate::core::{SplitFile, Uploader};
use crate::domain::model::{Cid, UploadReceipt};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Body of a successful `/api/v0/add` call.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash", default)]
    hash: String,
}

/// Remote pinning-gateway backend (IPFS HTTP API `add`).
pub struct GatewayUploader {
    client: Client,
    config: GatewayConfig,
    retry: RetryPolicy,
}

impl GatewayUploader {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            retry: config.retry_policy(),
            config,
        })
    }

    async fn post_once(&self, file: &SplitFile) -> Result<Cid> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(credentials) = &self.config.credentials {
            request = request.basic_auth(&credentials.project_id, Some(&credentials.project_secret));
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Gateway response status for {}: {}", file.file_name, status);

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::GatewayStatusError {
                status: status.as_u16(),
                body,
            });
        }

        // 200 但內容不對不重試，直接視為該筆失敗
        let text = response.text().await?;
        let body: AddResponse =
            serde_json::from_str(&text).map_err(|e| EtlError::MissingCidError {
                message: format!("unparseable gateway response: {}", e),
            })?;

        Cid::parse(&body.hash).ok_or_else(|| EtlError::MissingCidError {
            message: format!("response has no Hash field: {}", text),
        })
    }
}

#[async_trait]
impl Uploader for GatewayUploader {
    fn backend_name(&self) -> &'static str {
        "gateway"
    }

    async fn upload(&self, file: &SplitFile) -> Result<UploadReceipt> {
        let cid = retry_with_backoff(&self.retry, &file.file_name, |_| self.post_once(file)).await?;
        Ok(UploadReceipt::new(cid))
    }
}
