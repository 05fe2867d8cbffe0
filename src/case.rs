//! Key case conversion at the HTTP edge: storage and DTOs use snake_case, clients see camelCase.

use serde_json::{Map, Value};

/// `region_ids` -> `regionIds`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        match c {
            '_' => upper = true,
            c if upper => {
                out.extend(c.to_uppercase());
                upper = false;
            }
            c => out.push(c),
        }
    }
    out
}

/// `regionIds` -> `region_ids`; already snake_case input is returned unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn rename_keys(map: &mut Map<String, Value>, convert: fn(&str) -> String) {
    let renamed = std::mem::take(map)
        .into_iter()
        .map(|(k, v)| (convert(&k), v))
        .collect();
    *map = renamed;
}

/// camelCase every object key at any depth (nested collections included).
pub fn value_keys_to_camel_case_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            rename_keys(map, to_camel_case);
            map.values_mut().for_each(value_keys_to_camel_case_recursive);
        }
        Value::Array(items) => items.iter_mut().for_each(value_keys_to_camel_case_recursive),
        _ => {}
    }
}

/// snake_case the top-level keys of a request body; other values are left alone.
pub fn value_keys_to_snake_case(value: &mut Value) {
    if let Value::Object(map) = value {
        rename_keys(map, to_snake_case);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_identifiers() {
        assert_eq!(to_camel_case("quantity_per_period"), "quantityPerPeriod");
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_snake_case("insuranceEnabledFor"), "insurance_enabled_for");
        assert_eq!(to_snake_case("region_ids"), "region_ids");
    }

    #[test]
    fn camel_case_reaches_nested_collections() {
        let mut v = json!({"entitlement_ids": [1], "entitlements": [{"resource_ids": [], "resources": [{"accepts_insurance": true}]}]});
        value_keys_to_camel_case_recursive(&mut v);
        assert_eq!(
            v,
            json!({"entitlementIds": [1], "entitlements": [{"resourceIds": [], "resources": [{"acceptsInsurance": true}]}]})
        );
    }

    #[test]
    fn snake_case_is_top_level_only() {
        let mut v = json!({"regionIds": [1], "meta": {"someKey": 1}});
        value_keys_to_snake_case(&mut v);
        assert_eq!(v, json!({"region_ids": [1], "meta": {"someKey": 1}}));
    }
}
