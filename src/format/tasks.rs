//! Tasks-plugin dialect: `➕ date`, `✅ date` and a trailing metadata comment.
//!
//! ```text
//! - [ ] [Title](url) #github ➕ 2024-01-02 <!-- gh id=123 kind=issue repo=o/r number=12 -->
//! ```
//!
//! Only the created and done dates are read back. Other Tasks emoji a user
//! adds by hand (`📅 due`, `⏳ scheduled`, `⏫` priority, `🔁` recurrence) are
//! dropped when the line is re-rendered; tags are the only hand edits kept.

use super::{Decoded, LineStyle, Metadata, scan};
use crate::model::TaskRecord;
use crate::util::time::{format_date, parse_date};
use regex::Regex;
use std::sync::LazyLock;

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*gh\s+(.*?)\s*-->").expect("metadata pattern is valid"));

static CREATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"➕\s*(\d{4}-\d{2}-\d{2})").expect("created pattern is valid")
});

static DONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"✅\s*(\d{4}-\d{2}-\d{2})").expect("done pattern is valid")
});

pub(super) fn decode(rest: &str) -> Option<Decoded> {
    let caps = META_RE.captures(rest)?;
    let body = caps.get(1)?.as_str();

    let mut meta = Metadata::default();
    let mut id = None;
    for pair in body.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "id" => id = value.parse::<u64>().ok(),
            "kind" => meta.kind = value.parse().unwrap_or_default(),
            "repo" => meta.repository = scan::decode_value(value),
            "number" => meta.number = value.parse().unwrap_or(0),
            "labels" => meta.labels = scan::decode_list(value),
            "repotag" => meta.repo_tag = value == "1",
            _ => {}
        }
    }
    meta.id = id?;

    let created_at = CREATED_RE
        .captures(rest)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_date(m.as_str()));
    let closed_at = DONE_RE
        .captures(rest)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_date(m.as_str()));

    let remainder = META_RE.replace_all(rest, " ");
    let remainder = CREATED_RE.replace_all(&remainder, " ");
    let remainder = DONE_RE.replace_all(&remainder, " ").into_owned();

    Some(Decoded {
        meta,
        created_at,
        closed_at,
        remainder,
    })
}

pub(super) fn render_tail(line: &mut String, record: &TaskRecord, style: &LineStyle) {
    if style.show_created_at {
        if let Some(created) = record.created_at {
            line.push_str(&format!(" ➕ {}", format_date(created)));
        }
    }
    if style.show_completed_at && record.is_completed() {
        if let Some(closed) = record.closed_at {
            line.push_str(&format!(" ✅ {}", format_date(closed)));
        }
    }

    line.push_str(&format!(" <!-- gh id={} kind={}", record.id, record.kind));
    if !record.repository.is_empty() {
        line.push_str(&format!(" repo={}", scan::encode_value(&record.repository)));
    }
    if super::repo_tag(record, style).is_some() {
        line.push_str(" repotag=1");
    }
    line.push_str(&format!(" number={}", record.number));
    let labels = super::encoded_labels(record, style);
    if !labels.is_empty() {
        line.push_str(&format!(" labels={}", scan::encode_list(labels)));
    }
    line.push_str(" -->");
}
