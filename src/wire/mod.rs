use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::DEFAULT_PRIMARY_COLOR;

/// ========================================
/// Requests consumed by the generator
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub app_name: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_context: Option<StoreContext>,
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRequest {
    /// Stored config as-is; it is repaired before use, so missing or
    /// invalid fields do not reject the request.
    pub current_config: Value,
    pub modification_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_context: Option<StoreContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreContext {
    pub shop_name: String,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub collection_count: u64,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_products: Vec<SampleProduct>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_collections: Vec<SampleCollection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleProduct {
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCollection {
    pub title: String,
    #[serde(default)]
    pub products_count: u64,
}

/// What a provider is asked to do: one prompt, optionally constrained to a
/// response schema.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

/// ========================================
/// Persisted Shopify store data
/// ========================================

/// The store data blob saved when a Shopify store is connected or synced.
/// Only the fields the prompt uses are read; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub store: Option<SnapshotStore>,
    #[serde(default)]
    pub products: Vec<SnapshotProduct>,
    #[serde(default)]
    pub collections: Vec<SnapshotCollection>,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_collections: u64,
    #[serde(default)]
    pub total_orders: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotStore {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotProduct {
    pub title: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub variants: Vec<SnapshotVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotVariant {
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotCollection {
    pub title: String,
    #[serde(default)]
    pub products_count: u64,
}

impl StoreContext {
    /// Build prompt context from a store snapshot. Samples are copied whole;
    /// the prompt builder decides how many to show.
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let shop_name = snapshot
            .store
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        Self {
            shop_name,
            product_count: snapshot.total_products,
            collection_count: snapshot.total_collections,
            order_count: snapshot.total_orders,
            sample_products: snapshot
                .products
                .iter()
                .map(|p| SampleProduct {
                    title: p.title.clone(),
                    price: p.variants.first().map(|v| v.price.clone()).unwrap_or_default(),
                    vendor: p.vendor.clone(),
                    product_type: p.product_type.clone(),
                })
                .collect(),
            sample_collections: snapshot
                .collections
                .iter()
                .map(|c| SampleCollection { title: c.title.clone(), products_count: c.products_count })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generation_request_defaults_color_and_context() {
        let req: GenerationRequest =
            serde_json::from_value(json!({ "prompt": "clothing store", "appName": "Acme" })).unwrap();
        assert_eq!(req.primary_color, "#4F46E5");
        assert!(req.store_context.is_none());
    }

    #[test]
    fn modification_request_accepts_partial_stored_config() {
        let req: ModificationRequest = serde_json::from_value(json!({
            "currentConfig": { "appName": "Acme", "features": { "reviews": false } },
            "modificationPrompt": "dark theme"
        }))
        .unwrap();
        assert_eq!(req.current_config["appName"], json!("Acme"));
        assert!(req.store_context.is_none());
    }

    #[test]
    fn store_context_reads_sample_shapes() {
        let ctx: StoreContext = serde_json::from_value(json!({
            "shopName": "Acme Outfitters",
            "productCount": 120,
            "collectionCount": 6,
            "orderCount": 900,
            "sampleProducts": [{ "title": "Rain Jacket", "price": "89.00", "vendor": "Acme", "type": "Outerwear" }],
            "sampleCollections": [{ "title": "Summer", "productsCount": 14 }]
        }))
        .unwrap();
        assert_eq!(ctx.sample_products[0].product_type, "Outerwear");
        assert_eq!(ctx.sample_collections[0].products_count, 14);
    }

    #[test]
    fn snapshot_converts_to_context() {
        let snapshot: StoreSnapshot = serde_json::from_value(json!({
            "store": { "id": "1", "name": "Acme Outfitters", "currency": "USD" },
            "products": [
                {
                    "id": "10", "title": "Rain Jacket", "vendor": "Acme", "product_type": "Outerwear",
                    "variants": [{ "id": "a", "price": "89.00" }, { "id": "b", "price": "99.00" }]
                },
                { "id": "11", "title": "Gift Card", "vendor": "Acme", "product_type": "", "variants": [] }
            ],
            "collections": [{ "id": "5", "title": "Summer", "products_count": 14 }],
            "totalProducts": 2,
            "totalCollections": 1,
            "totalOrders": 37
        }))
        .unwrap();

        let ctx = StoreContext::from_snapshot(&snapshot);
        assert_eq!(ctx.shop_name, "Acme Outfitters");
        assert_eq!(ctx.order_count, 37);
        assert_eq!(ctx.sample_products[0].price, "89.00");
        assert_eq!(ctx.sample_products[1].price, "");
        assert_eq!(ctx.sample_collections[0].products_count, 14);
    }
}
