//! HTTP client for the external catalog API.

use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use super::models::{CatalogPage, CatalogQuery, LookupResponse, Product};

/// Errors that can occur while talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: StatusCode, message: String },
}

/// Thin wrapper over the catalog endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    url: String,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Looks up a product by its exact code.
    ///
    /// A non-success status or a transport failure is reported as "not
    /// found" so callers only deal with the presence of a product.
    pub async fn find_product(&self, product_code: &str) -> Option<Product> {
        let response = match self
            .http
            .post(&self.url)
            .json(&json!({ "productCode": product_code }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, product_code, "error calling catalog API");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), product_code, "catalog lookup miss");
            return None;
        }

        match response.json::<LookupResponse>().await {
            Ok(body) => body.product,
            Err(e) => {
                tracing::error!(error = %e, product_code, "unreadable catalog lookup response");
                None
            }
        }
    }

    /// Browses the catalog with optional search/category/paging filters.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        let response = self.http.get(&self.url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"))
                .to_string();
            return Err(CatalogError::Status { status, message });
        }

        Ok(response.json::<CatalogPage>().await?)
    }
}
