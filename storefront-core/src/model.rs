use serde::{Deserialize, Serialize};

/// A sellable product as served by the catalog service.
///
/// The wire format uses `_id` and `image`; plain `id` is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub cost: f64,
    pub rating: f64,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
}

/// A raw `(productId, qty)` pair held by the cart service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: String,
    pub qty: u32,
}

impl CartEntry {
    pub fn new(product_id: impl Into<String>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A cart entry joined with its product's display fields.
///
/// Only the reconciler builds these. There is no public constructor and no
/// setter: a new list is derived from entries and catalog on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    #[serde(flatten)]
    product: Product,
    qty: u32,
}

impl CartItem {
    pub(crate) fn new(product: Product, qty: u32) -> Self {
        Self { product, qty }
    }

    pub fn id(&self) -> &str {
        &self.product.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// `cost * qty` for this line.
    pub fn line_total(&self) -> f64 {
        self.product.cost * f64::from(self.qty)
    }
}

/// Bearer token of an authenticated user.
///
/// An empty string is not a token; use [`AuthToken::from_optional`] to turn
/// whatever the token store returned into `Option<AuthToken>`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn from_optional(token: Option<String>) -> Option<Self> {
        token.and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Error envelope returned by the service: `{ "success": false, "message": ... }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceReply {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_reads_wire_names() {
        let json = r#"{
            "name": "iPhone XR",
            "category": "Phones",
            "cost": 100,
            "rating": 4,
            "image": "https://i.imgur.com/lulqWzW.jpg",
            "_id": "v4sLtEcMpzabRyfx"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "v4sLtEcMpzabRyfx");
        assert_eq!(product.cost, 100.0);
        assert_eq!(product.image_url, "https://i.imgur.com/lulqWzW.jpg");
    }

    #[test]
    fn cart_entry_uses_camel_case() {
        let entry: CartEntry = serde_json::from_str(r#"{"productId":"p1","qty":3}"#).unwrap();
        assert_eq!(entry, CartEntry::new("p1", 3));
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["productId"], "p1");
    }

    #[test]
    fn cart_item_serializes_flat() {
        let product = Product {
            id: "1".into(),
            name: "Basketball".into(),
            category: "Sports".into(),
            cost: 50.0,
            rating: 5.0,
            image_url: "img".into(),
        };
        let item = CartItem::new(product, 2);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["_id"], "1");
        assert_eq!(value["qty"], 2);
        assert_eq!(item.line_total(), 100.0);
    }

    #[test]
    fn blank_token_is_no_token() {
        assert!(AuthToken::new("").is_none());
        assert!(AuthToken::new("   ").is_none());
        assert!(AuthToken::from_optional(None).is_none());
        assert_eq!(AuthToken::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("secret").unwrap();
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
    }
}
