//! Download link normalization
//!
//! Admin clients have submitted download links in several shapes over the
//! lifetime of the catalog: a JSON-encoded string (multipart forms), a plain
//! array of link objects, and an older map keyed by quality. [`normalize`]
//! accepts all of them and always produces one flat, ordered
//! `Vec<DownloadLink>`. It never fails: unusable input yields fewer links or
//! none at all.

use serde_json::{Map, Value};

use crate::model::DownloadLink;

/// The shapes a `download_links` payload can arrive in
#[derive(Debug)]
enum LinkPayload<'a> {
    /// Absent, `null`, or a scalar that cannot hold links
    Empty,
    /// JSON text that still has to be decoded
    Encoded(&'a str),
    /// `[{"label": .., "url": ..}, ..]`
    List(&'a [Value]),
    /// `{"720p": [{..}], "1080p": "https://.."}`
    ByQuality(&'a Map<String, Value>),
}

impl<'a> LinkPayload<'a> {
    fn detect(raw: Option<&'a Value>) -> Self {
        match raw {
            Some(Value::String(s)) => LinkPayload::Encoded(s),
            Some(Value::Array(items)) => LinkPayload::List(items),
            Some(Value::Object(map)) => LinkPayload::ByQuality(map),
            _ => LinkPayload::Empty,
        }
    }
}

/// Normalizes a raw `download_links` value into canonical links
///
/// Elements without a label or url (after trimming) are dropped; everything
/// else keeps its input order, duplicates included.
pub fn normalize(raw: Option<&Value>) -> Vec<DownloadLink> {
    match LinkPayload::detect(raw) {
        LinkPayload::Empty => Vec::new(),
        LinkPayload::Encoded(text) => match serde_json::from_str::<Value>(text) {
            // Decoded text is never treated as text again.
            Ok(decoded @ (Value::Array(_) | Value::Object(_))) => normalize(Some(&decoded)),
            Ok(_) => Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed download_links payload");
                Vec::new()
            }
        },
        LinkPayload::List(items) => items
            .iter()
            .filter_map(|item| link_from_value(item, None))
            .collect(),
        LinkPayload::ByQuality(groups) => groups
            .iter()
            .flat_map(|(quality, group)| links_for_quality(quality, group))
            .collect(),
    }
}

fn links_for_quality(quality: &str, group: &Value) -> Vec<DownloadLink> {
    match group {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| link_from_value(item, Some(quality)))
            .collect(),
        Value::Object(_) => link_from_value(group, Some(quality)).into_iter().collect(),
        Value::String(url) => {
            let bare = serde_json::json!({ "label": quality, "url": url });
            link_from_value(&bare, Some(quality)).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

fn link_from_value(item: &Value, default_quality: Option<&str>) -> Option<DownloadLink> {
    let obj = item.as_object()?;
    let label = trimmed(obj.get("label"))?;
    let url = trimmed(obj.get("url"))?;

    let quality = trimmed(obj.get("quality")).or_else(|| {
        default_quality
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from)
    });

    let click_count = obj
        .get("click_count")
        .or_else(|| obj.get("clickCount"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Some(DownloadLink {
        label,
        url,
        size: trimmed(obj.get("size")),
        quality,
        click_count,
    })
}

fn trimmed(value: Option<&Value>) -> Option<String> {
    let trimmed = value?.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
