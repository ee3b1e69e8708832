//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    agent::{ChatModel, OpenAiChatModel},
    auth::CibaClient,
    cart::CartCache,
    catalog::CatalogClient,
    config::Config,
};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,

    /// In-memory carts keyed by user id.
    pub carts: CartCache,

    pub catalog: CatalogClient,

    /// Connection pool reused by every outbound request.
    pub http: reqwest::Client,

    pub model: Arc<dyn ChatModel>,

    /// `None` when the identity provider is not configured.
    pub ciba: Option<CibaClient>,
}

impl AppState {
    /// Builds the state with the OpenAI chat model from `config`.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let model = Arc::new(OpenAiChatModel::new(http.clone(), &config.model));
        Self::with_model(config, http, model)
    }

    /// Builds the state around an explicit chat model.
    pub fn with_model(config: Config, http: reqwest::Client, model: Arc<dyn ChatModel>) -> Self {
        let catalog = CatalogClient::new(http.clone(), config.catalog_api_url.clone());
        let ciba = config
            .ciba
            .clone()
            .map(|ciba| CibaClient::new(http.clone(), ciba));

        tracing::info!(
            catalog = %config.catalog_api_url,
            shop_api = config.shop_api_url.as_deref().unwrap_or("(mock orders)"),
            ciba_enabled = ciba.is_some(),
            provider = model.provider_name(),
            model = model.model_name(),
            "application state ready"
        );

        Self {
            config,
            carts: CartCache::new(),
            catalog,
            http,
            model,
            ciba,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
