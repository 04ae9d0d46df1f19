//! Append-only log fields and legacy-shape normalization.
//!
//! The error-history field evolved from a single string to an array in the
//! original store. Rather than branching on shape throughout the core, the
//! serde boundary normalizes once: a bare string deserializes as a
//! one-element log, a missing field as an empty log, and a sequence as-is.

use serde::{Deserialize, Deserializer};

/// Deserialize a log field that may be a legacy scalar string, a sequence of
/// strings, or absent/null.
pub fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LogShape {
        Scalar(String),
        Seq(Vec<String>),
    }

    match Option::<LogShape>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(LogShape::Scalar(entry)) => Ok(vec![entry]),
        Some(LogShape::Seq(entries)) => Ok(entries),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::string_or_seq")]
        log: Vec<String>,
    }

    #[test]
    fn legacy_scalar_becomes_single_entry_log() {
        let h: Holder = serde_json::from_str(r#"{"log": "boom"}"#).unwrap();
        assert_eq!(h.log, vec!["boom".to_string()]);
    }

    #[test]
    fn sequence_passes_through() {
        let h: Holder = serde_json::from_str(r#"{"log": ["a", "b"]}"#).unwrap();
        assert_eq!(h.log, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn missing_and_null_become_empty() {
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(h.log.is_empty());
        let h: Holder = serde_json::from_str(r#"{"log": null}"#).unwrap();
        assert!(h.log.is_empty());
    }

    mod proptest_tests {
        use super::Holder;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_sequence_passes_through(
                entries in proptest::collection::vec("[a-z0-9 ]{0,12}", 0..8)
            ) {
                let doc = serde_json::json!({ "log": entries });
                let h: Holder = serde_json::from_value(doc).unwrap();
                prop_assert_eq!(h.log, entries);
            }

            #[test]
            fn any_scalar_becomes_a_singleton(entry in "[a-z0-9 ]{0,20}") {
                let doc = serde_json::json!({ "log": entry });
                let h: Holder = serde_json::from_value(doc).unwrap();
                prop_assert_eq!(h.log, vec![entry]);
            }
        }
    }
}
