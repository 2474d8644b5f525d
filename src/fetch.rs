use std::collections::HashSet;

use crate::api::{CatalogRecord, InventoryRecord, PricingRecord, VendorClient};
use crate::error::ApiError;
use crate::row::{OutputRow, RowKey, categories_from_crumbs};

/// What became of one input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Row(OutputRow),
    /// Already in the report for the current date; no calls after the
    /// catalog lookup were made.
    Skipped { product_code: String },
    /// Unusable path, or the catalog lookup failed or had no product id.
    Dropped { reason: String },
}

/// Strips the query string and one leading `base_url`, returning the
/// relative path the catalog endpoint expects. `None` for a blank path.
pub fn normalize_path(path: &str, base_url: &str) -> Option<String> {
    let path = path.trim();
    let without_query = path.split('?').next().unwrap_or_default();
    let canonical = without_query
        .strip_prefix(base_url)
        .unwrap_or(without_query);
    if canonical.is_empty() {
        None
    } else {
        Some(canonical.to_string())
    }
}

/// Resolves one product path into an [`OutputRow`].
///
/// Only the catalog lookup is load-bearing. The SKU, price and inventory
/// lookups run concurrently and each failure nulls only its own fields.
pub async fn fetch_product(
    client: &VendorClient,
    base_url: &str,
    path: &str,
    current_date: &str,
    existing_keys: Option<&HashSet<RowKey>>,
) -> FetchOutcome {
    let Some(canonical) = normalize_path(path, base_url) else {
        return FetchOutcome::Dropped {
            reason: "blank path".to_string(),
        };
    };

    let catalog = match client.catalog(&canonical).await {
        Ok(payload) => payload.into_record(),
        Err(e) => {
            log_call_failure("catalog", path, &e);
            return FetchOutcome::Dropped {
                reason: format!("catalog lookup failed: {e}"),
            };
        }
    };
    let Some(CatalogRecord {
        product_id,
        product_name,
        title,
        bread_crumbs,
    }) = catalog
    else {
        tracing::warn!(path, "no product id in catalog response");
        return FetchOutcome::Dropped {
            reason: "no product id".to_string(),
        };
    };

    if let (Some(keys), Some(code)) = (existing_keys, product_name.as_ref()) {
        if keys.contains(&(code.clone(), current_date.to_string())) {
            tracing::debug!(path, product_code = %code, "already recorded today");
            return FetchOutcome::Skipped {
                product_code: code.clone(),
            };
        }
    }

    let categories = categories_from_crumbs(&bread_crumbs);

    let (vendor_sku, pricing, inventory) = tokio::join!(
        lookup_sku(client, path, product_name.as_deref()),
        lookup_price(client, path, &product_id),
        lookup_inventory(client, path, &product_id),
    );

    FetchOutcome::Row(OutputRow {
        date_listed: current_date.to_string(),
        link: format!("{base_url}{canonical}"),
        hidden_id: product_id,
        product_code: product_name,
        vendor_sku,
        title,
        list_price: pricing.unit_list_price_display,
        per: pricing.unit_of_measure,
        status: inventory.status,
        categories,
    })
}

async fn lookup_sku(client: &VendorClient, path: &str, product_name: Option<&str>) -> Option<String> {
    let product_name = product_name?;
    match client.manufacturer_sku(product_name).await {
        Ok(payload) => payload.manufacturer_item(),
        Err(e) => {
            log_call_failure("product", path, &e);
            None
        }
    }
}

async fn lookup_price(client: &VendorClient, path: &str, product_id: &str) -> PricingRecord {
    match client.price(product_id).await {
        Ok(payload) => payload.into_record().unwrap_or_default(),
        Err(e) => {
            log_call_failure("price", path, &e);
            PricingRecord::default()
        }
    }
}

async fn lookup_inventory(client: &VendorClient, path: &str, product_id: &str) -> InventoryRecord {
    match client.inventory(product_id).await {
        Ok(payload) => payload.into_record().unwrap_or_default(),
        Err(e) => {
            log_call_failure("inventory", path, &e);
            InventoryRecord::default()
        }
    }
}

fn log_call_failure(endpoint: &str, path: &str, err: &ApiError) {
    if err.is_unauthorized() {
        tracing::warn!(endpoint, path, "vendor rejected the access token; it may have expired");
    } else {
        tracing::warn!(endpoint, path, error = %err, "vendor call failed");
    }
}
