//! Deserializers for fields that clients send either as native JSON or as
//! a JSON-encoded string (multipart forms can only carry strings).

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

fn decode<T: DeserializeOwned, E: serde::de::Error>(value: Value) -> Result<T, E> {
    match value {
        Value::String(text) => serde_json::from_str(&text).map_err(E::custom),
        value => serde_json::from_value(value).map_err(E::custom),
    }
}

pub fn json_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(value) => decode(value).map(Some),
    }
}

pub fn json_object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Value::Object(Default::default())),
        Some(Value::String(text)) if text.trim().is_empty() => {
            Ok(Value::Object(Default::default()))
        }
        Some(value) => match decode::<Value, D::Error>(value)? {
            object @ Value::Object(_) => Ok(object),
            _ => Err(serde::de::Error::custom("expected a JSON object")),
        },
    }
}

/// Array of strings, a JSON-encoded array, or a comma separated list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => match serde_json::from_str::<Vec<String>>(&text) {
            Ok(list) => Ok(list),
            Err(_) => Ok(split_list(&text)),
        },
        Some(value) => serde_json::from_value(value).map_err(serde::de::Error::custom),
    }
}

pub fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => string_list(value).map(Some).map_err(serde::de::Error::custom),
    }
}

pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "super::string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "super::json_or_string")]
        coordinates: Option<Vec<f64>>,
        #[serde(default = "empty", deserialize_with = "super::json_object")]
        metadata: serde_json::Value,
    }

    fn empty() -> serde_json::Value {
        serde_json::json!({})
    }

    #[test]
    fn test_accepts_stringified_fields() {
        let form: Form = serde_json::from_str(
            r#"{"tags": "[\"patrol\",\"night\"]", "coordinates": "[-122.4, 37.7]", "metadata": "{\"creator\":\"PD\"}"}"#,
        )
        .unwrap();
        assert_eq!(form.tags, vec!["patrol", "night"]);
        assert_eq!(form.coordinates, Some(vec![-122.4, 37.7]));
        assert_eq!(form.metadata["creator"], "PD");
    }

    #[test]
    fn test_accepts_native_fields() {
        let form: Form =
            serde_json::from_str(r#"{"tags": ["a"], "coordinates": [1.0, 2.0], "metadata": {"k": 1}}"#)
                .unwrap();
        assert_eq!(form.tags, vec!["a"]);
        assert_eq!(form.coordinates, Some(vec![1.0, 2.0]));
        assert_eq!(form.metadata["k"], 1);
    }

    #[test]
    fn test_comma_separated_tags() {
        let form: Form = serde_json::from_str(r#"{"tags": "roads, patrol ,"}"#).unwrap();
        assert_eq!(form.tags, vec!["roads", "patrol"]);
        assert!(form.metadata.as_object().unwrap().is_empty());
    }
}
