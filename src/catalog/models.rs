//! Catalog Wire Models

use serde::{Deserialize, Serialize};

/// A product as returned by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product code, also used as the cart item id
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Unit price
    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub in_stock: Option<bool>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Filters accepted by the catalog browse endpoint. Absent fields are not
/// sent as query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub offset: Option<u32>,
}

/// One page of browse results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub pagination: Pagination,
}

/// Envelope of the lookup-by-code response.
#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub product: Option<Product>,
}
