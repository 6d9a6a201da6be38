//! Print-fulfillment order API (Gelato).

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PosterError;

pub const GELATO_ORDERS_URL: &str = "https://order.gelatoapis.com/v4/orders";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Order,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub order_reference_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_reference_id: Option<String>,
    pub currency: String,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_method_uid: Option<String>,
    pub shipping_address: ShippingAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_address: Option<ReturnAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,
}

impl Order {
    /// Fill in a fresh reference id if the caller left it blank.
    pub fn with_reference_id(mut self) -> Self {
        if self.order_reference_id.trim().is_empty() {
            self.order_reference_id = uuid::Uuid::new_v4().to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_reference_id: String,
    pub product_uid: String,
    pub files: Vec<PrintFile>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub city: String,
    pub post_code: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub state: String,
    pub city: String,
    pub post_code: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// Places and looks up print orders.
#[async_trait]
pub trait Fulfillment: Send + Sync {
    async fn create_order(&self, order: &Order) -> Result<Value, PosterError>;

    async fn get_order(&self, order_id: &str) -> Result<Value, PosterError>;
}

pub struct GelatoClient {
    http: reqwest::Client,
    api_key: String,
    orders_url: String,
}

impl GelatoClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PosterError> {
        Self::with_url(api_key, GELATO_ORDERS_URL)
    }

    pub fn with_url(api_key: impl Into<String>, orders_url: impl Into<String>) -> Result<Self, PosterError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mapposter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PosterError::Upstream(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            orders_url: orders_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Order resource URL. The id is pushed as one escaped path segment.
    pub fn order_url(&self, order_id: &str) -> Result<Url, PosterError> {
        if matches!(order_id, "" | "." | "..") {
            return Err(PosterError::Upstream(format!("invalid order id '{}'", order_id)));
        }
        let mut url = Url::parse(&self.orders_url)
            .map_err(|e| PosterError::Upstream(format!("invalid URL {}: {}", self.orders_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| PosterError::Upstream(format!("cannot-be-a-base URL: {}", self.orders_url)))?
            .push(order_id);
        Ok(url)
    }
}

#[async_trait]
impl Fulfillment for GelatoClient {
    async fn create_order(&self, order: &Order) -> Result<Value, PosterError> {
        info!(
            "Creating order {} ({} item(s))",
            order.order_reference_id,
            order.items.len()
        );

        let response = self
            .http
            .post(&self.orders_url)
            .header("X-API-KEY", &self.api_key)
            .json(order)
            .send()
            .await
            .map_err(|e| PosterError::Upstream(format!("order request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = rejection(status.as_u16(), &text);
            warn!("Fulfillment API rejected order: {}", err);
            return Err(err);
        }

        response
            .json()
            .await
            .map_err(|e| PosterError::Upstream(format!("invalid order response: {}", e)))
    }

    async fn get_order(&self, order_id: &str) -> Result<Value, PosterError> {
        let url = self.order_url(order_id)?;
        let response = self
            .http
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| PosterError::Upstream(format!("order lookup failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Order lookup {} failed with {}", order_id, response.status());
            return Err(PosterError::Upstream("Failed to get order".into()));
        }

        response
            .json()
            .await
            .map_err(|e| PosterError::Upstream(format!("invalid order response: {}", e)))
    }
}

/// Turn an error body into a `Rejected` error, JSON or not.
fn rejection(status: u16, body: &str) -> PosterError {
    let details: Value = serde_json::from_str(body).unwrap_or_else(|_| {
        let message = if body.is_empty() { "Failed to create order" } else { body };
        serde_json::json!({ "message": message })
    });
    let message = ["message", "error"]
        .iter()
        .find_map(|k| details.get(*k).and_then(Value::as_str))
        .unwrap_or("Failed to create order")
        .to_string();
    PosterError::Rejected {
        status,
        message,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ORDER_JSON: &str = r#"{
        "orderType": "order",
        "orderReferenceId": "",
        "currency": "USD",
        "items": [{
            "itemReferenceId": "item-1",
            "productUid": "flat_300x400-mm-12x16-inch_200-gsm-80lb-uncoated_4-0_ver",
            "files": [{"type": "default", "url": "https://example.com/poster.pdf"}],
            "quantity": 1
        }],
        "shippingAddress": {
            "firstName": "Ana",
            "lastName": "Silva",
            "addressLine1": "1 Main St",
            "city": "Portland",
            "postCode": "97201",
            "country": "US",
            "email": "ana@example.com",
            "phone": "555-0100"
        }
    }"#;

    #[test]
    fn test_order_deserializes_camel_case() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.order_type, OrderType::Order);
        assert_eq!(order.items[0].files[0].kind, "default");
        assert_eq!(order.shipping_address.post_code, "97201");
        assert_eq!(order.return_address, None);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("metadata").is_none());
        assert!(value["shippingAddress"].get("companyName").is_none());
        assert_eq!(value["items"][0]["files"][0]["type"], "default");
    }

    #[test]
    fn test_reference_id_generated_once() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let order = order.with_reference_id();
        assert_eq!(order.order_reference_id.len(), 36);

        let kept = order.clone().with_reference_id();
        assert_eq!(kept.order_reference_id, order.order_reference_id);
    }

    #[test]
    fn test_rejection_parsing() {
        match rejection(422, r#"{"message":"Invalid product"}"#) {
            PosterError::Rejected { status, message, .. } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid product");
            }
            other => panic!("unexpected {:?}", other),
        }
        match rejection(502, "Bad gateway") {
            PosterError::Rejected { message, details, .. } => {
                assert_eq!(message, "Bad gateway");
                assert_eq!(details["message"], "Bad gateway");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_order_url() {
        let client = GelatoClient::new("key").unwrap();
        assert_eq!(
            client.order_url("abc").unwrap().as_str(),
            "https://order.gelatoapis.com/v4/orders/abc"
        );
    }

    #[test]
    fn test_order_url_escapes_id() {
        let client = GelatoClient::new("key").unwrap();
        assert_eq!(
            client.order_url("a/../b").unwrap().as_str(),
            "https://order.gelatoapis.com/v4/orders/a%2F..%2Fb"
        );
        assert_eq!(
            client.order_url("a b?c#d").unwrap().as_str(),
            "https://order.gelatoapis.com/v4/orders/a%20b%3Fc%23d"
        );
        for bad in ["", ".", ".."] {
            assert!(client.order_url(bad).is_err(), "{:?}", bad);
        }
    }
}
