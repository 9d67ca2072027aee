use std::collections::BTreeMap;

use serde_json::Value;
use user_config_sdk::TagsInput;

use super::error::DomainError;

/// Normalize loosely-typed tag input into the canonical `key -> value` mapping.
///
/// Non-string values are rendered as JSON text (`null` becomes an empty
/// string). With the list form a later duplicate key replaces an earlier one.
pub fn normalize_tags(
    input: &TagsInput,
    max_tags: usize,
) -> Result<BTreeMap<String, String>, DomainError> {
    let mut tags = BTreeMap::new();

    match input {
        TagsInput::Map(map) => {
            for (key, value) in map {
                insert_tag(&mut tags, key, value)?;
            }
        }
        TagsInput::Pairs(pairs) => {
            for pair in pairs {
                insert_tag(&mut tags, &pair.key, &pair.value)?;
            }
        }
    }

    if tags.len() > max_tags {
        return Err(DomainError::validation(
            "tags",
            format!("too many tags: {} (max: {max_tags})", tags.len()),
        ));
    }

    Ok(tags)
}

fn insert_tag(
    tags: &mut BTreeMap<String, String>,
    key: &str,
    value: &Value,
) -> Result<(), DomainError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(DomainError::validation("tags", "tag key cannot be empty"));
    }
    tags.insert(key.to_owned(), tag_value(value));
    Ok(())
}

fn tag_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> TagsInput {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_mapping_input() {
        let tags = normalize_tags(&parse(json!({"env": "prod", "tier": 2})), 10).unwrap();
        assert_eq!(tags["env"], "prod");
        assert_eq!(tags["tier"], "2");
    }

    #[test]
    fn test_pairs_input_last_duplicate_wins() {
        let input = parse(json!([
            {"key": "env", "value": "dev"},
            {"key": "owner"},
            {"key": "env", "value": "prod"}
        ]));
        let tags = normalize_tags(&input, 10).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["env"], "prod");
        assert_eq!(tags["owner"], "");
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = normalize_tags(&parse(json!({" ": "x"})), 10).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_tag_limit() {
        let err = normalize_tags(&parse(json!({"a": "1", "b": "2"})), 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
