//! Implicit cross-resource reference resolution and result normalization.
//!
//! A string attribute carrying [`IMPLICIT_REF_PREFIX`] denotes "the value at
//! a dotted attribute path inside another resource": the prefix is followed by
//! `<resourceID>.<dotted.path>`. References are resolved lazily at execution
//! time against the operation's context index, on a deep copy of the
//! attributes, so the canonical desired configuration is never mutated.

use serde_json::{Map, Value};

use crate::error::{NodeError, NodeResult};
use crate::resource::ResourceIndex;

/// Reserved marker prefix for implicit cross-resource references.
pub const IMPLICIT_REF_PREFIX: &str = "$xstack_path.";

/// Resolve every implicit reference inside `attributes` against `ctx`,
/// returning a new attribute tree. The input is left untouched.
pub fn resolve_implicit_refs(
    attributes: &Map<String, Value>,
    ctx: &ResourceIndex,
) -> NodeResult<Map<String, Value>> {
    let mut resolved = attributes.clone();
    for value in resolved.values_mut() {
        resolve_value(value, ctx)?;
    }
    Ok(resolved)
}

fn resolve_value(value: &mut Value, ctx: &ResourceIndex) -> NodeResult<()> {
    match value {
        Value::String(s) => {
            if let Some(reference) = s.strip_prefix(IMPLICIT_REF_PREFIX) {
                *value = lookup_ref(reference, ctx)?;
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                resolve_value(v, ctx)?;
            }
        }
        Value::Array(seq) => {
            for v in seq.iter_mut() {
                resolve_value(v, ctx)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Navigate `<resourceID>.<dotted.path>` through the context index. Path
/// traversal steps only through nested mappings; any unresolved segment is an
/// illegal-manifest error naming the referenced resource and the full
/// reference.
fn lookup_ref(reference: &str, ctx: &ResourceIndex) -> NodeResult<Value> {
    let (resource_id, path) = reference
        .split_once('.')
        .ok_or_else(|| NodeError::MalformedRef(reference.to_string()))?;
    let illegal = || NodeError::IllegalManifest {
        resource: resource_id.to_string(),
        reference: reference.to_string(),
    };

    let resource = ctx.get(resource_id).ok_or_else(illegal)?;

    let mut segments = path.split('.');
    let first = segments.next().ok_or_else(illegal)?;
    let mut current = resource.attributes.get(first).ok_or_else(illegal)?;
    for segment in segments {
        current = current
            .as_object()
            .and_then(|m| m.get(segment))
            .ok_or_else(illegal)?;
    }
    Ok(current.clone())
}

/// Remove the value at `path` from `obj`, descending through nested mappings
/// and through every mapping element of intervening sequences.
pub fn remove_nested_field(obj: &mut Map<String, Value>, path: &[&str]) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        obj.remove(*key);
        return;
    }
    match obj.get_mut(*key) {
        Some(Value::Object(inner)) => remove_nested_field(inner, rest),
        Some(Value::Array(items)) => {
            for item in items {
                if let Value::Object(inner) = item {
                    remove_nested_field(inner, rest);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{index_resources, Resource};
    use serde_json::json;

    fn jack() -> Resource {
        let mut r = Resource::new("jack", "kubernetes");
        r.attributes
            .insert("a".into(), json!({"b": "c"}));
        r
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_resolve_round_trip() {
        let ctx = index_resources(&[jack()]);
        let attributes = attrs(json!({"a": format!("{IMPLICIT_REF_PREFIX}jack.a.b")}));

        let resolved = resolve_implicit_refs(&attributes, &ctx).unwrap();
        assert_eq!(resolved["a"], json!("c"));
    }

    #[test]
    fn test_resolve_inside_nested_maps_and_sequences() {
        let ctx = index_resources(&[jack()]);
        let attributes = attrs(json!({
            "outer": {"inner": format!("{IMPLICIT_REF_PREFIX}jack.a.b")},
            "list": [format!("{IMPLICIT_REF_PREFIX}jack.a"), "plain"]
        }));

        let resolved = resolve_implicit_refs(&attributes, &ctx).unwrap();
        assert_eq!(resolved["outer"]["inner"], json!("c"));
        assert_eq!(resolved["list"], json!([{"b": "c"}, "plain"]));
    }

    #[test]
    fn test_resolve_missing_path_is_illegal_manifest() {
        let ctx = index_resources(&[jack()]);
        let attributes = attrs(json!({"a": format!("{IMPLICIT_REF_PREFIX}jack.notExist")}));

        let err = resolve_implicit_refs(&attributes, &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "can't find specified value in resource:jack by ref:jack.notExist"
        );
    }

    #[test]
    fn test_resolve_missing_resource_is_illegal_manifest() {
        let ctx = ResourceIndex::new();
        let attributes = attrs(json!({"a": format!("{IMPLICIT_REF_PREFIX}ghost.a")}));

        let err = resolve_implicit_refs(&attributes, &ctx).unwrap_err();
        assert_eq!(
            err,
            NodeError::IllegalManifest {
                resource: "ghost".into(),
                reference: "ghost.a".into()
            }
        );
    }

    #[test]
    fn test_resolve_through_scalar_is_illegal_manifest() {
        // a.b is a scalar; asking for a.b.c must fail, not panic.
        let ctx = index_resources(&[jack()]);
        let attributes = attrs(json!({"a": format!("{IMPLICIT_REF_PREFIX}jack.a.b.c")}));
        assert!(resolve_implicit_refs(&attributes, &ctx).is_err());
    }

    #[test]
    fn test_resolve_without_path_is_malformed() {
        let ctx = index_resources(&[jack()]);
        let attributes = attrs(json!({"a": format!("{IMPLICIT_REF_PREFIX}jack")}));
        assert_eq!(
            resolve_implicit_refs(&attributes, &ctx).unwrap_err(),
            NodeError::MalformedRef("jack".into())
        );
    }

    #[test]
    fn test_resolve_does_not_mutate_input() {
        let ctx = index_resources(&[jack()]);
        let reference = format!("{IMPLICIT_REF_PREFIX}jack.a.b");
        let attributes = attrs(json!({"a": reference.clone()}));

        let _ = resolve_implicit_refs(&attributes, &ctx).unwrap();
        assert_eq!(attributes["a"], json!(reference));
    }

    #[test]
    fn test_remove_nested_field_matrix() {
        let mut obj = attrs(json!({
            "a": {
                "b": 1,
                "c": [
                    {"d": "d1", "e": [{"f": "f1", "g": "g1"}]},
                    {"d": "d2", "e": [{"f": "f2", "g": "g2"}]}
                ]
            }
        }));

        remove_nested_field(&mut obj, &["a", "c", "e", "f"]);
        assert_eq!(obj["a"]["c"][0]["e"][0].as_object().unwrap().len(), 1);
        assert_eq!(obj["a"]["c"][1]["e"][0].as_object().unwrap().len(), 1);

        remove_nested_field(&mut obj, &["a", "c", "e", "g"]);
        assert!(obj["a"]["c"][0]["e"][0].as_object().unwrap().is_empty());

        remove_nested_field(&mut obj, &["a", "c", "e"]);
        assert_eq!(obj["a"]["c"][0].as_object().unwrap().len(), 1);

        remove_nested_field(&mut obj, &["a", "c", "d"]);
        assert!(obj["a"]["c"][0].as_object().unwrap().is_empty());

        remove_nested_field(&mut obj, &["a", "c"]);
        assert_eq!(obj["a"].as_object().unwrap().len(), 1);

        remove_nested_field(&mut obj, &["a", "b"]);
        assert!(obj["a"].as_object().unwrap().is_empty());

        remove_nested_field(&mut obj, &["a"]);
        assert!(obj.is_empty());
    }

    #[test]
    fn test_remove_nested_field_service_ports() {
        let mut obj = attrs(json!({
            "spec": {
                "clusterIP": "172.16.128.40",
                "ports": [
                    {"port": 80, "protocol": "TCP", "targetPort": 80}
                ]
            }
        }));

        remove_nested_field(&mut obj, &["spec", "ports", "targetPort"]);
        let port = obj["spec"]["ports"][0].as_object().unwrap();
        assert_eq!(port.len(), 2);
        assert!(port.contains_key("port"));
        assert!(port.contains_key("protocol"));
    }

    #[test]
    fn test_remove_nested_field_missing_path_is_noop() {
        let mut obj = attrs(json!({"a": {"b": 1}}));
        remove_nested_field(&mut obj, &["a", "x", "y"]);
        remove_nested_field(&mut obj, &["not_exist_field"]);
        assert_eq!(obj["a"]["b"], json!(1));
    }
}
