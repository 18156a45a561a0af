//! Dataview dialect: `[key:: value]` inline fields.
//!
//! ```text
//! - [ ] [Title](url) #github [created:: 2024-01-02] [gh-id:: 123] [gh-kind:: issue] [gh-number:: 12]
//! ```
//!
//! Only the `gh-*`, `created` and `completion` fields are read back. Any other
//! inline field a user adds by hand (`[priority:: high]`, `[due:: ...]`) is
//! dropped when the line is re-rendered; tags are the only hand edits kept.

use super::{Decoded, LineStyle, Metadata, scan};
use crate::model::TaskRecord;
use crate::util::time::{format_date, parse_date};
use regex::Regex;
use std::sync::LazyLock;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([A-Za-z][\w-]*)::\s*([^\]]*?)\s*\]").expect("inline field pattern is valid")
});

pub(super) fn decode(rest: &str) -> Option<Decoded> {
    let mut decoded = Decoded::default();
    let mut meta = Metadata::default();
    let mut id = None;

    for caps in FIELD_RE.captures_iter(rest) {
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let value = value.as_str();
        match key.as_str() {
            "gh-id" => id = value.parse::<u64>().ok(),
            "gh-kind" => meta.kind = value.parse().unwrap_or_default(),
            "gh-repo" => meta.repository = scan::decode_value(value),
            "gh-number" => meta.number = value.parse().unwrap_or(0),
            "gh-labels" => meta.labels = scan::decode_list(value),
            "gh-repotag" => meta.repo_tag = value == "true",
            "created" => decoded.created_at = parse_date(value),
            "completion" => decoded.closed_at = parse_date(value),
            _ => {}
        }
    }
    meta.id = id?;

    decoded.meta = meta;
    decoded.remainder = FIELD_RE.replace_all(rest, " ").into_owned();
    Some(decoded)
}

pub(super) fn render_tail(line: &mut String, record: &TaskRecord, style: &LineStyle) {
    if style.show_created_at {
        if let Some(created) = record.created_at {
            line.push_str(&format!(" [created:: {}]", format_date(created)));
        }
    }
    if style.show_completed_at && record.is_completed() {
        if let Some(closed) = record.closed_at {
            line.push_str(&format!(" [completion:: {}]", format_date(closed)));
        }
    }

    line.push_str(&format!(
        " [gh-id:: {}] [gh-kind:: {}] [gh-number:: {}]",
        record.id, record.kind, record.number
    ));
    if !record.repository.is_empty() {
        line.push_str(&format!(
            " [gh-repo:: {}]",
            scan::encode_value(&record.repository)
        ));
    }
    if super::repo_tag(record, style).is_some() {
        line.push_str(" [gh-repotag:: true]");
    }
    let labels = super::encoded_labels(record, style);
    if !labels.is_empty() {
        line.push_str(&format!(" [gh-labels:: {}]", scan::encode_list(labels)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use chrono::NaiveDate;

    #[test]
    fn decodes_inline_fields() {
        let decoded = decode(
            " #github #x [gh-repo:: o/r] [gh-id:: 55] [gh-kind:: pr] [completion:: 2024-05-06]",
        )
        .unwrap();
        assert_eq!(decoded.meta.id, 55);
        assert_eq!(decoded.meta.kind, ItemKind::PullRequest);
        assert_eq!(decoded.meta.repository, "o/r");
        assert_eq!(decoded.closed_at, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(
            decoded.remainder.split_whitespace().collect::<Vec<_>>(),
            vec!["#github", "#x"]
        );
    }

    #[test]
    fn user_fields_are_stripped_from_remainder() {
        let decoded = decode(" [priority:: high] #p [gh-id:: 1]").unwrap();
        assert!(!decoded.remainder.contains("priority"));
        assert!(decoded.remainder.contains("#p"));
    }

    #[test]
    fn requires_gh_id() {
        assert!(decode(" [created:: 2024-01-01]").is_none());
        assert!(decode(" [gh-id:: twelve]").is_none());
    }
}
