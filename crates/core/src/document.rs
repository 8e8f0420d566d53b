use crate::error::{KyozaiError, Result};
use serde_yaml::{Mapping, Value};

/// Decodes document text into its top-level YAML mapping.
///
/// A leading byte-order mark is ignored. An empty (or comment-only) document
/// decodes to an empty mapping so that every field falls back to its default.
/// Key order is preserved, which the lesson-plan flow relies on.
pub fn load_document(input: &str) -> Result<Mapping> {
    let source = strip_bom(input);
    if source.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = serde_yaml::from_str(source).map_err(|err| KyozaiError::parse(&err))?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(KyozaiError::InvalidRoot {
                found: value_kind(&other),
            }),
        },
        other => Err(KyozaiError::InvalidRoot {
            found: value_kind(&other),
        }),
    }
}

/// Human-readable name of a YAML value's shape, used in diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_empty_mapping() {
        assert!(load_document("").unwrap().is_empty());
        assert!(load_document("   \n\n").unwrap().is_empty());
        assert!(load_document("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn parses_basic_mapping() {
        let doc = load_document("タイトル: 期末考査\n試験時間: 50\n").unwrap();
        assert_eq!(
            doc.get("タイトル").and_then(Value::as_str),
            Some("期末考査")
        );
        assert_eq!(doc.get("試験時間").and_then(Value::as_u64), Some(50));
    }

    #[test]
    fn preserves_key_order() {
        let doc = load_document("導入: 1\n展開: 2\nまとめ: 3\n").unwrap();
        let keys: Vec<_> = doc.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["導入", "展開", "まとめ"]);
    }

    #[test]
    fn strips_bom() {
        let doc = load_document("\u{feff}title: x\n").unwrap();
        assert_eq!(doc.get("title").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let err = load_document("invalid: [unterminated\n").unwrap_err();
        assert!(matches!(err, KyozaiError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn errors_on_non_mapping_root() {
        let err = load_document("- a\n- b\n").unwrap_err();
        assert!(
            matches!(err, KyozaiError::InvalidRoot { found: "sequence" }),
            "{err:?}"
        );
        let err = load_document("just text").unwrap_err();
        assert!(matches!(err, KyozaiError::InvalidRoot { found: "string" }));
    }
}
