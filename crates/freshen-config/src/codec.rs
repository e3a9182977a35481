use std::error::Error as StdError;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A text format for configuration files.
pub trait Codec {
    /// File extension, without the dot.
    const EXTENSION: &'static str;
    /// Format name, used in report categories such as `configLoadJSON`.
    const NAME: &'static str;

    type Error: StdError + Send + Sync + 'static;

    fn decode<T: DeserializeOwned>(text: &str) -> Result<T, Self::Error>;

    fn encode<T: Serialize>(value: &T) -> Result<String, Self::Error>;
}

/// Compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    const EXTENSION: &'static str = "json";
    const NAME: &'static str = "JSON";

    type Error = serde_json::Error;

    fn decode<T: DeserializeOwned>(text: &str) -> Result<T, Self::Error> {
        serde_json::from_str(text)
    }

    fn encode<T: Serialize>(value: &T) -> Result<String, Self::Error> {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_is_compact() {
        let value = BTreeMap::from([("a", vec![1, 2]), ("b", vec![])]);
        assert_eq!(JsonCodec::encode(&value).unwrap(), r#"{"a":[1,2],"b":[]}"#);
        let back: BTreeMap<String, Vec<u8>> = JsonCodec::decode(r#"{"a": [1, 2], "b": []}"#).unwrap();
        assert_eq!(back["a"], vec![1, 2]);
    }
}
