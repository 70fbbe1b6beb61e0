// SPDX-License-Identifier: MIT

//! `ReadElements` reply entries: a handle index into the reply's attached fd
//! list (spec §4.1 step 6; `original_source/src/reportd-daemon.c` calls
//! `g_variant_get_handle` on every entry unconditionally).

use serde_json::Value;

use reportd_core::CacheError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    Handle(usize),
}

pub fn parse_element_value(name: &str, value: &Value) -> Result<ElementValue, CacheError> {
    match value {
        Value::Number(n) => {
            let index = n
                .as_u64()
                .ok_or_else(|| CacheError::Store(format!("non-integer handle index for `{name}`")))?;
            Ok(ElementValue::Handle(index as usize))
        }
        other => Err(CacheError::Store(format!(
            "element `{name}` has unexpected ReadElements reply shape: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_value_is_a_handle_index() {
        assert_eq!(parse_element_value("backtrace", &json!(3)).unwrap(), ElementValue::Handle(3));
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(parse_element_value("x", &json!(null)).is_err());
        assert!(parse_element_value("x", &json!("7")).is_err());
    }
}
