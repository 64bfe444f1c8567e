//! source manifests
//!
//! a manifest is either a bare array or `{"datasets": [...]}`. each item is a url string or an
//! object with a `url` and optional `format`/`type` and `label`/`name`
use {
    crate::data::SourceFormat,
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// a remote dataset to load
///
/// when read from config, a missing format is guessed from the url and a missing label is the
/// url itself
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(from = "RawDescriptor")]
pub struct SourceDescriptor {
    /// where to fetch the dataset from, absolute or relative to the base url
    pub url: String,
    /// the document format
    pub format: SourceFormat,
    /// human readable label
    pub label: String,
}

/// a source as written in a config file
#[derive(Deserialize, JsonSchema)]
struct RawDescriptor {
    /// where to fetch the dataset from
    url: String,
    /// the document format
    #[serde(default, alias = "type")]
    format: Option<SourceFormat>,
    /// human readable label
    #[serde(default, alias = "name")]
    label: Option<String>,
}

impl From<RawDescriptor> for SourceDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        let guessed = Self::from_url(raw.url);
        Self {
            format: raw.format.unwrap_or(guessed.format),
            label: raw.label.unwrap_or(guessed.label),
            url: guessed.url,
        }
    }
}

impl SourceDescriptor {
    /// describe a source by url alone, guessing the format from its extension
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            format: SourceFormat::guess(&url),
            label: url.clone(),
            url,
        }
    }
}

/// read a string field from a manifest object
fn str_field<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// normalize one manifest item
fn item_to_source(item: &Value) -> Option<SourceDescriptor> {
    match item {
        Value::String(url) if !url.is_empty() => Some(SourceDescriptor::from_url(url.as_str())),
        Value::Object(obj) => {
            let url = str_field(obj, "url").filter(|u| !u.is_empty())?;
            let format = str_field(obj, "format")
                .or_else(|| str_field(obj, "type"))
                .map(|name| SourceFormat::from_name(name).unwrap_or(SourceFormat::Json))
                .unwrap_or_else(|| SourceFormat::guess(url));
            let label = str_field(obj, "label")
                .or_else(|| str_field(obj, "name"))
                .unwrap_or(url);

            Some(SourceDescriptor {
                url: url.to_string(),
                format,
                label: label.to_string(),
            })
        }
        _ => None,
    }
}

/// turn a manifest document into a list of sources
///
/// anything that doesn't look like a source is ignored
pub fn parse_manifest(doc: &Value) -> Vec<SourceDescriptor> {
    let items = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj
            .get("datasets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items.iter().filter_map(item_to_source).collect()
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_bare_array() {
        let sources = parse_manifest(&json!(["/tags.csv", "/extra.json", "", 4]));
        assert_eq!(
            sources,
            [
                SourceDescriptor {
                    url: "/tags.csv".into(),
                    format: SourceFormat::Csv,
                    label: "/tags.csv".into(),
                },
                SourceDescriptor {
                    url: "/extra.json".into(),
                    format: SourceFormat::Json,
                    label: "/extra.json".into(),
                },
            ]
        );
    }

    #[test]
    fn test_datasets_object() {
        let sources = parse_manifest(&json!({
            "datasets": [
                {"url": "/a", "type": "CSV", "name": "Danbooru"},
                {"url": "/b.csv", "format": "json", "label": "Forced json"},
                {"url": "/c.csv"},
                {"label": "no url"},
                {"url": "/d", "format": "xml"}
            ]
        }));

        let summary: Vec<_> = sources
            .iter()
            .map(|s| (s.url.as_str(), s.format, s.label.as_str()))
            .collect();

        assert_eq!(
            summary,
            [
                ("/a", SourceFormat::Csv, "Danbooru"),
                ("/b.csv", SourceFormat::Json, "Forced json"),
                ("/c.csv", SourceFormat::Csv, "/c.csv"),
                ("/d", SourceFormat::Json, "/d"),
            ]
        );
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(parse_manifest(&json!({"other": []})).is_empty());
        assert!(parse_manifest(&json!("nope")).is_empty());
        assert!(parse_manifest(&Value::Null).is_empty());
    }
}
