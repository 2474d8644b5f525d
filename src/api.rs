//! Vendor REST API: response payloads, their mapping to domain records, and
//! the authenticated client that issues the four per-item calls.
//!
//! Every payload field is optional. Anything missing or mistyped degrades to
//! `None` in the mapped record instead of failing the call.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AccessToken;
use crate::config::Config;
use crate::error::ApiError;

/// Characters left literal in the catalog `path` parameter.
const PATH_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':')
    .remove(b'?')
    .remove(b'=');

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogPayload {
    product_id: Option<Value>,
    product_name: Option<Value>,
    title: Option<Value>,
    bread_crumbs: Option<Vec<BreadCrumbPayload>>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BreadCrumbPayload {
    text: Option<Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductsPayload {
    products: Option<Vec<ProductPayloadItem>>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPayloadItem {
    manufacturer_item: Option<Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingPayload {
    real_time_pricing_results: Option<Vec<PricingPayloadItem>>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingPayloadItem {
    unit_list_price_display: Option<Value>,
    additional_results: Option<AdditionalResults>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryPayload {
    real_time_inventory_results: Option<Vec<InventoryPayloadItem>>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryPayloadItem {
    additional_results: Option<AdditionalResults>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalResults {
    unit_of_measure: Option<Value>,
    sub_message_type: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceRequest<'a> {
    product_price_parameters: [PriceParameter<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceParameter<'a> {
    product_id: &'a str,
    unit_of_measure: &'a str,
    qty_ordered: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryRequest<'a> {
    product_ids: [&'a str; 1],
}

/// Result of resolving one product path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub product_id: String,
    pub product_name: Option<String>,
    pub title: Option<String>,
    pub bread_crumbs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingRecord {
    pub unit_list_price_display: Option<String>,
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryRecord {
    pub status: Option<String>,
}

/// Renders a scalar JSON value as text. `null`, empty strings and
/// containers yield `None`.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl CatalogPayload {
    /// `None` when the payload carries no usable product id.
    pub fn into_record(self) -> Option<CatalogRecord> {
        let product_id = scalar_text(self.product_id.as_ref())?;
        let bread_crumbs = self
            .bread_crumbs
            .unwrap_or_default()
            .into_iter()
            .map(|bc| scalar_text(bc.text.as_ref()).unwrap_or_default())
            .collect();
        Some(CatalogRecord {
            product_id,
            product_name: scalar_text(self.product_name.as_ref()),
            title: scalar_text(self.title.as_ref()),
            bread_crumbs,
        })
    }
}

impl ProductsPayload {
    pub fn manufacturer_item(&self) -> Option<String> {
        let first = self.products.as_ref()?.first()?;
        scalar_text(first.manufacturer_item.as_ref())
    }
}

impl PricingPayload {
    /// `None` when the result list is missing or empty.
    pub fn into_record(self) -> Option<PricingRecord> {
        let first = self.real_time_pricing_results?.into_iter().next()?;
        let additional = first.additional_results.unwrap_or_default();
        Some(PricingRecord {
            unit_list_price_display: scalar_text(first.unit_list_price_display.as_ref()),
            unit_of_measure: scalar_text(additional.unit_of_measure.as_ref()),
        })
    }
}

impl InventoryPayload {
    pub fn into_record(self) -> Option<InventoryRecord> {
        let first = self.real_time_inventory_results?.into_iter().next()?;
        let additional = first.additional_results.unwrap_or_default();
        Some(InventoryRecord {
            status: scalar_text(additional.sub_message_type.as_ref()),
        })
    }
}

/// Authenticated client for the catalog, product, price and inventory
/// endpoints. Cheap to share behind an `Arc`; holds no mutable state.
pub struct VendorClient {
    http: reqwest::Client,
    token: AccessToken,
    catalog_url: String,
    product_url: String,
    price_url: String,
    inventory_url: String,
}

impl VendorClient {
    pub fn new(http: reqwest::Client, config: &Config, token: AccessToken) -> Self {
        Self {
            http,
            token,
            catalog_url: config.catalog_url(),
            product_url: config.product_url(),
            price_url: config.price_url(),
            inventory_url: config.inventory_url(),
        }
    }

    pub fn catalog_request_url(&self, canonical_path: &str) -> String {
        format!(
            "{}?path={}",
            self.catalog_url,
            utf8_percent_encode(canonical_path, PATH_PARAM)
        )
    }

    pub async fn catalog(&self, canonical_path: &str) -> Result<CatalogPayload, ApiError> {
        let request = self.http.get(self.catalog_request_url(canonical_path));
        self.send_json(request).await
    }

    pub async fn manufacturer_sku(&self, product_name: &str) -> Result<ProductsPayload, ApiError> {
        let request = self
            .http
            .get(&self.product_url)
            .query(&[("productNumbers", product_name)]);
        self.send_json(request).await
    }

    pub async fn price(&self, product_id: &str) -> Result<PricingPayload, ApiError> {
        let body = PriceRequest {
            product_price_parameters: [PriceParameter {
                product_id,
                unit_of_measure: "",
                qty_ordered: 1,
            }],
        };
        let request = self.http.post(&self.price_url).json(&body);
        self.send_json(request).await
    }

    pub async fn inventory(&self, product_id: &str) -> Result<InventoryPayload, ApiError> {
        let body = InventoryRequest {
            product_ids: [product_id],
        };
        let request = self.http.post(&self.inventory_url).json(&body);
        self.send_json(request).await
    }

    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.bearer_auth(self.token.secret()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }
}
