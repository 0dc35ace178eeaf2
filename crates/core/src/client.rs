//! Analysis service client.
//!
//! The service is opaque to the rest of the crate: [`AnalysisService`] takes
//! an image and a roast level and yields a result or a user-facing failure.
//! Response parsing lives in [`parse_response`] so it can be tested without a
//! server.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::model::{AnalysisRequest, AnalysisResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use url::Url;

/// Anything that can turn an [`AnalysisRequest`] into an [`AnalysisResult`].
///
/// Failures must be [`AppError::RequestFailed`] carrying the message to show.
pub trait AnalysisService {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult>> + Send;
}

/// Multipart HTTP client for the orchestrator's analyze endpoint.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpAnalysisClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("judgy-buddy/client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.api_url.clone(),
        })
    }

    fn build_form(request: &AnalysisRequest) -> Result<Form> {
        let image = request.image();
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.content_type())
            .map_err(|e| AppError::invalid_input(format!("Invalid content type: {}", e)))?;

        Ok(Form::new()
            .part("image", part)
            .text("roast_level", request.roast_level().as_str()))
    }
}

impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let form = Self::build_form(&request).map_err(|e| {
            tracing::warn!(error = %e, "could not build multipart body");
            AppError::generic_failure()
        })?;

        tracing::info!(
            endpoint = %self.endpoint,
            image = request.image().name(),
            bytes = request.image().len(),
            level = %request.roast_level(),
            "sending analysis request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "analysis request failed in transport");
                AppError::generic_failure()
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::warn!(status, error = %e, "failed to read analysis response body");
            AppError::generic_failure()
        })?;

        parse_response(status, &body)
    }
}

/// Error body shape of the service (`{"detail": "..."}`).
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Interprets a raw HTTP response.
///
/// Success needs a 2xx status and a body matching [`AnalysisResult`]. On
/// failure the message is the body's `detail` when it is a string, else the
/// generic fallback.
pub fn parse_response(status: u16, body: &str) -> Result<AnalysisResult> {
    if (200..300).contains(&status) {
        return serde_json::from_str::<AnalysisResult>(body).map_err(|e| {
            tracing::warn!(status, error = %e, "unexpected success payload");
            AppError::generic_failure()
        });
    }

    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_string))
        .filter(|d| !d.trim().is_empty());

    tracing::warn!(status, detail = detail.as_deref(), "analysis request rejected");

    Err(match detail {
        Some(message) => AppError::request_failed(message),
        None => AppError::generic_failure(),
    })
}
