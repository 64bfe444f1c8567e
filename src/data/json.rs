//! json tag datasets
use {
    super::record::{Category, RawEntry, RecordFields},
    crate::{
        bail,
        error::{Result, TcError},
    },
    serde_json::Value,
    tracing::debug,
};

/// read the category of an entry, which may be a name or a numeric code
fn category_of(value: Option<&Value>) -> Option<Category> {
    match value? {
        Value::String(s) => Category::from_code(s.trim()),
        Value::Number(n) => Category::from_code(&n.to_string()),
        _ => None,
    }
}

/// turn one array item into an entry
///
/// the tag comes from `tag`, falling back to `name` only when `tag` is missing. items without a
/// usable tag are dropped
fn item_to_entry(item: &Value) -> Option<RawEntry> {
    let obj = item.as_object()?;
    let tag = obj
        .get("tag")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("name"))
        .and_then(Value::as_str)
        .filter(|tag| !tag.trim().is_empty())?;

    let aliases = obj
        .get("aliases")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(RawEntry {
        tag: tag.to_string(),
        fields: RecordFields {
            aliases,
            category: category_of(obj.get("category")),
            description,
        },
    })
}

/// parse an already decoded json document into entries
pub fn entries_from_value(source_id: &str, doc: &Value) -> Result<Vec<RawEntry>> {
    let Some(items) = doc.as_array() else {
        bail!(TcError::parse(source_id, "tag data is not an array"));
    };

    let entries: Vec<RawEntry> = items.iter().filter_map(item_to_entry).collect();

    if entries.len() < items.len() {
        debug!(
            source = source_id,
            dropped = items.len() - entries.len(),
            "dropped json entries without a tag"
        );
    }

    Ok(entries)
}

/// parse json text into entries
///
/// fails if the text isn't json or the document isn't an array
pub fn parse_json(source_id: &str, text: &str) -> Result<Vec<RawEntry>> {
    let doc: Value =
        serde_json::from_str(text).map_err(|e| TcError::parse(source_id, e))?;
    entries_from_value(source_id, &doc)
}
