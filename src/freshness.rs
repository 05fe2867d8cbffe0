//! Latest-modification time over a hydrated tree, for the `Last-Modified` header.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Maximum of `field` over every object in `value`, at any depth.
///
/// Accepts a single node, a list of nodes, or a `[list, count]` pair: arrays are walked element
/// by element and non-object scalars (such as the count) are ignored. Objects contribute their
/// own `field` and recurse into every array-valued member (child collections). Values that are
/// not RFC 3339 timestamps are skipped. Returns `None` when nothing was found.
pub fn max_timestamp(value: &Value, field: &str) -> Option<DateTime<Utc>> {
    match value {
        Value::Array(items) => items.iter().filter_map(|v| max_timestamp(v, field)).max(),
        Value::Object(map) => {
            let own = map.get(field).and_then(parse_timestamp);
            let nested = map
                .iter()
                .filter(|(k, _)| k.as_str() != field)
                .filter_map(|(_, v)| match v {
                    Value::Array(_) => max_timestamp(v, field),
                    _ => None,
                })
                .max();
            own.max(nested)
        }
        _ => None,
    }
}

/// [`max_timestamp`] over several top-level values.
pub fn max_timestamp_of<'a>(values: impl IntoIterator<Item = &'a Value>, field: &str) -> Option<DateTime<Utc>> {
    values.into_iter().filter_map(|v| max_timestamp(v, field)).max()
}

fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    v.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// IMF-fixdate as used by HTTP date headers: `Wed, 21 Oct 2015 07:28:00 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const T: &str = "2024-03-01T10:00:00Z";
    const T1: &str = "2024-03-01T10:00:01Z";

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn empty_page_has_no_value() {
        assert_eq!(max_timestamp(&json!([[], 0]), "updated_at"), None);
        assert_eq!(max_timestamp(&json!([]), "updated_at"), None);
    }

    #[test]
    fn child_newer_than_parent_wins() {
        let node = json!({"id": 1, "updated_at": T, "entitlements": [{"id": 2, "updated_at": T1}]});
        assert_eq!(max_timestamp(&node, "updated_at"), Some(at(T1)));
    }

    #[test]
    fn walks_paged_lists_and_deep_levels() {
        let page = json!([[
            {"updated_at": "2023-01-01T00:00:00Z", "entitlements": [
                {"updated_at": "2023-01-02T00:00:00Z", "resources": [{"updated_at": "2023-06-30T12:00:00+02:00"}]}
            ]},
            {"updated_at": "2023-05-01T00:00:00Z", "entitlements": []}
        ], 2]);
        assert_eq!(max_timestamp(&page, "updated_at"), Some(at("2023-06-30T10:00:00Z")));
    }

    #[test]
    fn missing_field_yields_none_and_is_idempotent() {
        let node = json!({"id": 1, "name": "no stamps", "region_ids": [1, 2]});
        assert_eq!(max_timestamp(&node, "updated_at"), None);
        let with = json!({"updated_at": T});
        assert_eq!(max_timestamp(&with, "updated_at"), max_timestamp(&with, "updated_at"));
    }

    #[test]
    fn over_several_values() {
        let items = [json!({"updated_at": T1}), json!({"updated_at": T})];
        assert_eq!(max_timestamp_of(&items, "updated_at"), Some(at(T1)));
        assert_eq!(max_timestamp_of(std::iter::empty(), "updated_at"), None);
    }

    #[test]
    fn formats_http_date() {
        let d = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(http_date(d), "Wed, 21 Oct 2015 07:28:00 GMT");
    }
}
