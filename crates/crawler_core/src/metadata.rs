use serde_json::Value;
use thiserror::Error;

use crate::container::PostContainer;
use crate::post::Metadata;

#[derive(Debug, Error)]
pub enum MetadataParseError {
    #[error("unable to parse post metadata in `{attribute}`: {source}")]
    Malformed {
        attribute: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("post metadata in `{attribute}` is a JSON {found}, expected an object")]
    NotAnObject {
        attribute: String,
        found: &'static str,
    },
}

/// Decode the JSON metadata blob stored in `attribute` of `container`.
///
/// A missing or empty attribute yields an empty mapping. Anything present that
/// is not a JSON object is an error: it means the page no longer looks the way
/// the crawler expects.
pub fn decode_metadata(
    container: &PostContainer,
    attribute: &str,
) -> Result<Metadata, MetadataParseError> {
    let raw = match container.attr(attribute) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Metadata::new()),
    };

    let value: Value =
        serde_json::from_str(raw).map_err(|source| MetadataParseError::Malformed {
            attribute: attribute.to_string(),
            source,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(MetadataParseError::NotAnObject {
            attribute: attribute.to_string(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
