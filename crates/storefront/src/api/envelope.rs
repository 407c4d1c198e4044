//! Response normalization boundary.
//!
//! The catalog API is inconsistent about wrapping: the same endpoint may
//! answer `{"products": [...]}` or a bare `[...]`, and single entities come
//! back as `{"product": {...}}` or the bare document. Every endpoint routes
//! its payload through [`collection`] or [`entity`] so that ambiguity is
//! resolved here and nowhere else.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// Resolve a collection payload.
///
/// 1. An object carrying `key` yields that member (an empty list if the
///    member is not an array).
/// 2. A bare array is the collection itself.
/// 3. Anything else is an empty collection.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the array's elements do not decode as `T`.
pub fn collection<T: DeserializeOwned>(payload: Value, key: &str) -> Result<Vec<T>, ApiError> {
    let items = match payload {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::debug!(key, kind = value_kind(&other), "wrapper member is not an array");
                Vec::new()
            }
            None => {
                tracing::debug!(key, "payload object has no wrapper member");
                Vec::new()
            }
        },
        Value::Array(items) => items,
        other => {
            tracing::debug!(key, kind = value_kind(&other), "unexpected collection payload");
            Vec::new()
        }
    };

    Ok(serde_json::from_value(Value::Array(items))?)
}

/// Resolve a single-entity payload.
///
/// An object carrying `key` as an object yields that member; otherwise an
/// object that looks like a document (has `_id`) is the entity itself.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedPayload` when neither shape matches, or
/// `ApiError::Parse` if the document does not decode as `T`.
pub fn entity<T: DeserializeOwned>(payload: Value, key: &str) -> Result<T, ApiError> {
    match payload {
        Value::Object(mut map) => {
            if let Some(inner @ Value::Object(_)) = map.remove(key) {
                return Ok(serde_json::from_value(inner)?);
            }
            if map.contains_key("_id") {
                return Ok(serde_json::from_value(Value::Object(map))?);
            }
            Err(ApiError::UnexpectedPayload(format!(
                "expected `{key}` or a document with `_id`"
            )))
        }
        other => Err(ApiError::UnexpectedPayload(format!(
            "expected an object for `{key}`, got {}",
            value_kind(&other)
        ))),
    }
}

/// Resolve a settings-style payload: the object itself, no wrapper, no id.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedPayload` for non-objects, or
/// `ApiError::Parse` if the object does not decode as `T`.
pub fn document<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    match payload {
        object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
        other => Err(ApiError::UnexpectedPayload(format!(
            "expected an object, got {}",
            value_kind(&other)
        ))),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use taiyuan_core::{Category, Product, Transport};

    use super::*;

    #[test]
    fn test_collection_wrapped() {
        let products: Vec<Product> =
            collection(json!({ "products": [{ "_id": "p1" }, { "_id": "p2" }] }), "products")
                .unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_collection_bare_array() {
        let transports: Vec<Transport> =
            collection(json!([{ "_id": "t1", "name": "Post", "fee": 60 }]), "transports").unwrap();
        assert_eq!(transports.len(), 1);
        assert_eq!(transports[0].name, "Post");
    }

    #[test]
    fn test_collection_wrapper_not_array_is_empty() {
        let products: Vec<Product> =
            collection(json!({ "products": { "_id": "p1" } }), "products").unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_collection_other_shapes_are_empty() {
        let from_string: Vec<Product> = collection(json!("oops"), "products").unwrap();
        let from_null: Vec<Product> = collection(Value::Null, "products").unwrap();
        let from_other_key: Vec<Product> =
            collection(json!({ "items": [{ "_id": "p1" }] }), "products").unwrap();
        assert!(from_string.is_empty());
        assert!(from_null.is_empty());
        assert!(from_other_key.is_empty());
    }

    #[test]
    fn test_collection_malformed_element_is_parse_error() {
        let result: Result<Vec<Product>, _> = collection(json!([{ "name": "no id" }]), "products");
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_collection_categories_with_bare_product_ids() {
        let categories: Vec<Category> = collection(
            json!({ "categories": [
                { "_id": "c1", "products": ["p1", "p2"] },
                { "_id": "c2", "products": [{ "_id": "p3", "name": "Oolong" }] },
                { "_id": "c3", "products": [] }
            ] }),
            "categories",
        )
        .unwrap();

        assert_eq!(categories.len(), 3);
        let ids: Vec<&str> = categories
            .iter()
            .flat_map(|c| c.products.iter().map(|p| p.id().as_str()))
            .collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[test]
    fn test_entity_wrapped_and_bare() {
        let wrapped: Product =
            entity(json!({ "product": { "_id": "p1", "name": "Oolong" } }), "product").unwrap();
        let bare: Product = entity(json!({ "_id": "p2", "name": "Jasmine" }), "product").unwrap();
        assert_eq!(wrapped.name, "Oolong");
        assert_eq!(bare.name, "Jasmine");
    }

    #[test]
    fn test_entity_unexpected_shape() {
        let result: Result<Product, _> = entity(json!({ "message": "ok" }), "product");
        assert!(matches!(result, Err(ApiError::UnexpectedPayload(_))));

        let result: Result<Product, _> = entity(json!([]), "product");
        assert!(matches!(result, Err(ApiError::UnexpectedPayload(_))));
    }

    #[test]
    fn test_document_requires_object() {
        let result: Result<taiyuan_core::StoreSettings, _> = document(json!(null));
        assert!(matches!(result, Err(ApiError::UnexpectedPayload(_))));

        let settings: taiyuan_core::StoreSettings =
            document(json!({ "storeName": "Taiyuan" })).unwrap();
        assert_eq!(settings.store_name.as_deref(), Some("Taiyuan"));
    }
}
