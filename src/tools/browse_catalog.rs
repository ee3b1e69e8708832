//! `browse_catalog` tool: searches the external catalog.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{failure, object_args, Tool, ToolContext, ToolError};
use crate::catalog::{CatalogClient, CatalogPage, CatalogQuery, Product};

pub const NAME: &str = "browse_catalog";

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 20;

const DESCRIPTION: &str = "Browse and search the product catalog. This tool helps users discover products before adding them to cart. \
Optional arguments: search (term matched against product id or category), \
category (e.g. \"Produce\", \"Dairy\", \"Seafood\"), \
limit (number of products to return, default 10, max 20), \
offset (number of products to skip for pagination, default 0). \
Pass {} to list all products. This tool does not require authentication.";

pub struct BrowseCatalogTool {
    catalog: CatalogClient,
}

impl BrowseCatalogTool {
    pub fn new(catalog: CatalogClient) -> Self {
        Self { catalog }
    }
}

fn parse_query(args: &Value) -> CatalogQuery {
    let text = |key: &str| {
        args.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let number = |key: &str| args.get(key).and_then(Value::as_u64);

    CatalogQuery {
        search: text("search"),
        category: text("category"),
        limit: Some(
            number("limit")
                .map(|l| l.clamp(1, u64::from(MAX_LIMIT)) as u32)
                .unwrap_or(DEFAULT_LIMIT),
        ),
        offset: number("offset")
            .filter(|o| *o > 0)
            .map(|o| o.min(u64::from(u32::MAX)) as u32),
    }
}

fn summarize(product: &Product) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "price": format!("${}", product.price),
        "category": product.category,
        "inStock": product.in_stock,
        "description": product.description,
    })
}

/// Formats a browse result for the model.
pub fn format_page(query: &CatalogQuery, page: &CatalogPage) -> Value {
    let mut message = format!("Found {} products", page.products.len());
    if let Some(search) = &query.search {
        message.push_str(&format!(" matching \"{}\"", search));
    }
    if let Some(category) = &query.category {
        message.push_str(&format!(" in {} category", category));
    }
    message.push_str(". Here are the products available:");

    json!({
        "success": true,
        "message": message,
        "products": page.products.iter().map(summarize).collect::<Vec<_>>(),
        "totalProducts": page.pagination.total,
        "completed": true,
    })
}

#[async_trait]
impl Tool for BrowseCatalogTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": { "type": "string" },
                "category": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIMIT },
                "offset": { "type": "integer", "minimum": 0 }
            }
        })
    }

    async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
        let args = match object_args(args) {
            Ok(args) => args,
            Err(ToolError::InvalidParameters(msg)) => return Ok(failure(msg)),
            Err(e) => return Err(e),
        };
        let query = parse_query(&args);
        tracing::debug!(tool = NAME, ?query, "browsing catalog");

        match self.catalog.browse(&query).await {
            Ok(page) => {
                tracing::info!(tool = NAME, found = page.products.len(), "catalog browsed");
                Ok(format_page(&query, &page).to_string())
            }
            Err(e) => {
                tracing::error!(tool = NAME, error = %e, "error browsing catalog");
                Ok(failure(format!("Failed to browse catalog: {}", e)))
            }
        }
    }
}
