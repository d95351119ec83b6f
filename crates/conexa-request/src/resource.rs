//! Resource model
//!
//! API payloads become explicit snake_case key/value maps. Case conversion
//! happens once, here on the way in and in the transport on the way out.

use serde_json::{Map, Value};

use crate::case::{snake_keys, to_snake};
use crate::classify::Payload;

/// One API object, e.g. a customer or a charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: String,
    attributes: Map<String, Value>,
}

impl Resource {
    /// Build from a decoded value. Non-object values land under `value`.
    pub fn from_value(kind: impl Into<String>, value: Value) -> Self {
        let attributes = match snake_keys(value) {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_string(), other)]),
        };
        Self {
            kind: kind.into(),
            attributes,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Look up an attribute by snake_case or camelCase name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .get(key)
            .or_else(|| self.attributes.get(&to_snake(key)))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.attributes.insert(to_snake(key), value);
    }

    /// `<kind>_id` when present, else `id`.
    pub fn id(&self) -> Option<&Value> {
        let primary = format!("{}_id", to_snake(&self.kind));
        self.attributes
            .get(&primary)
            .or_else(|| self.attributes.get("id"))
            .filter(|v| !v.is_null())
    }

    /// Attributes as call params; the transport camel-cases them.
    pub fn into_params(self) -> Map<String, Value> {
        self.attributes
    }
}

/// Result of `Pipeline::call`: a single object or a page of objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Single(Resource),
    List {
        items: Vec<Resource>,
        pagination: Option<Value>,
    },
}

impl Object {
    pub fn from_payload(resource_hint: &str, payload: Payload) -> Self {
        match payload.data {
            Value::Array(items) => Object::List {
                items: items
                    .into_iter()
                    .map(|item| Resource::from_value(resource_hint, item))
                    .collect(),
                pagination: payload.pagination,
            },
            other => Object::Single(Resource::from_value(resource_hint, other)),
        }
    }

    pub fn single(self) -> Option<Resource> {
        match self {
            Object::Single(resource) => Some(resource),
            Object::List { .. } => None,
        }
    }

    pub fn items(&self) -> &[Resource] {
        match self {
            Object::Single(resource) => std::slice::from_ref(resource),
            Object::List { items, .. } => items,
        }
    }

    pub fn pagination(&self) -> Option<&Value> {
        match self {
            Object::List { pagination, .. } => pagination.as_ref(),
            Object::Single(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn payload(data: Value, pagination: Option<Value>) -> Payload {
        Payload {
            status: StatusCode::OK,
            data,
            pagination,
        }
    }

    #[test]
    fn attributes_are_snake_cased_and_reachable_both_ways() {
        let r = Resource::from_value("customer", json!({"companyId": 3, "isActive": true}));
        assert_eq!(r.get_i64("company_id"), Some(3));
        assert_eq!(r.get_i64("companyId"), Some(3));
        assert_eq!(r.get_bool("is_active"), Some(true));
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn id_prefers_kind_primary_key() {
        let r = Resource::from_value("recurring_sale", json!({"recurringSaleId": 5, "id": 1}));
        assert_eq!(r.id(), Some(&json!(5)));

        let plain = Resource::from_value("charge", json!({"id": 11}));
        assert_eq!(plain.id(), Some(&json!(11)));

        let none = Resource::from_value("charge", json!({"chargeId": null}));
        assert!(none.id().is_none());
    }

    #[test]
    fn list_payload_keeps_pagination_untouched() {
        let object = Object::from_payload(
            "customer",
            payload(
                json!([{"customerId": 1}, {"customerId": 2}]),
                Some(json!({"currentPage": 1, "totalPages": 4})),
            ),
        );
        assert_eq!(object.items().len(), 2);
        assert_eq!(object.items()[1].id(), Some(&json!(2)));
        assert_eq!(
            object.pagination(),
            Some(&json!({"currentPage": 1, "totalPages": 4}))
        );
        assert!(object.single().is_none());
    }

    #[test]
    fn empty_result_is_an_empty_single() {
        let object = Object::from_payload("customer", payload(json!({}), None));
        let resource = object.single().unwrap();
        assert!(resource.is_empty());
        assert_eq!(resource.kind(), "customer");
    }

    #[test]
    fn set_normalizes_key_and_round_trips_to_params() {
        let mut r = Resource::from_value("customer", json!({"name": "A"}));
        r.set("tradeName", json!("ACME"));
        let params = r.into_params();
        assert_eq!(params["trade_name"], "ACME");
        assert_eq!(params["name"], "A");
    }
}
