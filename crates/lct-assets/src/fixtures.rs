//! Shared test schema and asset builders.

use serde_json::{json, Value};

use crate::schema::{AssetProp, AssetType, Schema};

/// `person`, `book` (references a person), `secret` (private) and `node`
/// (references other nodes, for graph tests).
pub(crate) fn library_schema() -> Schema {
    Schema::builder()
        .asset_type(
            AssetType::new("person")
                .label("Person")
                .prop(AssetProp::new("id", "string").key())
                .prop(AssetProp::new("name", "string").required())
                .prop(AssetProp::new("height", "number")),
        )
        .asset_type(
            AssetType::new("book")
                .label("Book")
                .prop(AssetProp::new("title", "string").key())
                .prop(AssetProp::new("author", "string").key())
                .prop(AssetProp::new("currentTenant", "->person"))
                .prop(AssetProp::new("genres", "[]string")),
        )
        .asset_type(
            AssetType::new("secret")
                .prop(AssetProp::new("id", "string").key())
                .prop(AssetProp::new("value", "string"))
                .reader("org1MSP"),
        )
        .asset_type(
            AssetType::new("node")
                .prop(AssetProp::new("id", "string").key())
                .prop(AssetProp::new("next", "->node"))
                .prop(AssetProp::new("children", "[]->node")),
        )
        .build()
        .unwrap()
}

pub(crate) fn person_value(id: &str, name: &str) -> Value {
    json!({"@assetType": "person", "id": id, "name": name})
}

pub(crate) fn book_value(title: &str, author: &str, tenant: Option<&str>) -> Value {
    let mut value = json!({
        "@assetType": "book",
        "title": title,
        "author": author,
        "genres": ["sci-fi"],
    });
    if let Some(id) = tenant {
        value["currentTenant"] = json!({"@assetType": "person", "id": id});
    }
    value
}

pub(crate) fn node_value(id: &str, next: Option<&str>, children: &[&str]) -> Value {
    let mut value = json!({"@assetType": "node", "id": id});
    if let Some(next) = next {
        value["next"] = json!({"@assetType": "node", "id": next});
    }
    if !children.is_empty() {
        value["children"] = children
            .iter()
            .map(|c| json!({"@assetType": "node", "id": c}))
            .collect();
    }
    value
}
