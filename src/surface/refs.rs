//! `$ref` pointer collection for API schemas.
use serde_json::Value;
use std::collections::BTreeSet;

/// Collect every model name referenced through `$ref` at any depth.
pub fn schema_refs(schema: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_refs(schema, &mut names);
    names
}

fn collect_refs(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    if let Some(name) = child.as_str().and_then(ref_target_name) {
                        names.insert(name);
                    }
                    continue;
                }
                collect_refs(child, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, names);
            }
        }
        _ => {}
    }
}

/// Reduce a pointer such as `#/components/schemas/User` to `User`.
pub fn ref_target_name(pointer: &str) -> Option<String> {
    let last = pointer
        .trim()
        .rsplit(|ch: char| ch == '/' || ch == '#')
        .find(|segment| !segment.is_empty())?;
    let name = last
        .strip_suffix(".json")
        .or_else(|| last.strip_suffix(".yaml"))
        .or_else(|| last.strip_suffix(".yml"))
        .unwrap_or(last);
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_forms_reduce_to_model_names() {
        assert_eq!(
            ref_target_name("#/components/schemas/User").as_deref(),
            Some("User")
        );
        assert_eq!(ref_target_name("#/definitions/Order").as_deref(), Some("Order"));
        assert_eq!(ref_target_name("models/Invoice.json").as_deref(), Some("Invoice"));
        assert_eq!(ref_target_name("Plain").as_deref(), Some("Plain"));
        assert_eq!(ref_target_name("#/"), None);
    }

    #[test]
    fn nested_refs_are_collected_once() {
        let schema = json!({
            "type": "object",
            "properties": {
                "owner": {"$ref": "#/components/schemas/User"},
                "items": {
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/LineItem"}
                },
                "history": {
                    "oneOf": [
                        {"$ref": "#/components/schemas/User"},
                        {"type": "null"}
                    ]
                }
            }
        });
        let names: Vec<_> = schema_refs(&schema).into_iter().collect();
        assert_eq!(names, vec!["LineItem".to_string(), "User".to_string()]);
    }
}
