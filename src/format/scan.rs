//! Shared scanner for task lines.
//!
//! Grammar common to both dialects:
//!
//! ```text
//! line   := indent bullet ws "[" mark "]" ws link rest
//! bullet := "-" | "*" | "+"
//! mark   := " " | "x" | "X"
//! link   := "[" escaped-title "](" url ")"
//! ```
//!
//! `rest` is handed to the dialect parser, which strips its own metadata and
//! leaves the remainder for tag extraction.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

static CHECKBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*+]\s+\[([ xX])\]\s+(.*)$").expect("checkbox pattern is valid")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").expect("tag pattern is valid")
});

/// A task line split into checkbox, link, and the unparsed remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineParts<'a> {
    pub completed: bool,
    pub title: String,
    pub url: &'a str,
    pub rest: &'a str,
}

/// Split a line into its checkbox, title link, and remainder.
///
/// Returns `None` for anything that is not a checkbox item starting with a
/// markdown link.
#[must_use]
pub fn split_task_line(line: &str) -> Option<LineParts<'_>> {
    let caps = CHECKBOX_RE.captures(line.trim_end())?;
    let completed = !caps.get(1)?.as_str().trim().is_empty();
    let body = caps.get(2)?.as_str();
    let (title, url, rest) = split_link(body)?;
    Some(LineParts {
        completed,
        title,
        url,
        rest,
    })
}

/// Scan `[title](url)` at the start of `body`, unescaping the title.
///
/// The url ends at the first `)` followed by whitespace or end of line.
fn split_link(body: &str) -> Option<(String, &str, &str)> {
    let inner = body.strip_prefix('[')?;
    let mut title = String::new();
    let mut close = None;
    let mut chars = inner.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    title.push(escaped);
                }
            }
            ']' => {
                close = Some(idx);
                break;
            }
            _ => title.push(ch),
        }
    }

    let after = inner.get(close? + 1..)?;
    let url_part = after.strip_prefix('(')?;
    let end = url_part.match_indices(')').map(|(idx, _)| idx).find(|&idx| {
        let tail = &url_part[idx + 1..];
        tail.is_empty() || tail.starts_with(char::is_whitespace)
    })?;

    let url = &url_part[..end];
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((title, url, &url_part[end + 1..]))
}

/// Escape a title for use as link text.
///
/// Backslash and brackets are escaped, and so is a `!` right after `<`, so a
/// title can never spell an HTML comment opener (or a section marker). Line
/// breaks collapse to spaces so the record always renders as exactly one line.
#[must_use]
pub fn escape_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev = None;
    for ch in title.chars() {
        match ch {
            '\\' | '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            '!' if prev == Some('<') => out.push_str("\\!"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
    out
}

/// Tag names (without `#`) found in free text, in order of appearance.
///
/// Purely numeric names (`#12`) are issue references, not tags.
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| name.chars().any(|c| !c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Turn free text (a label, a repository name, a configured tag) into a tag name.
///
/// Whitespace runs become `-`, a leading `#` is dropped, and characters
/// outside letters, digits, `_`, `-`, `/` are removed. Returns `None` when
/// nothing usable remains.
#[must_use]
pub fn sanitize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#');
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_dash = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            pending_dash = !out.is_empty();
            continue;
        }
        if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '/') {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(ch);
        }
    }
    if out.is_empty() || out.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(out)
    }
}

/// Percent-encode a metadata value so it survives as a single token.
#[must_use]
pub fn encode_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/') {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Reverse [`encode_value`]. Malformed escapes are kept verbatim.
#[must_use]
pub fn decode_value(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

const fn hex_val(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Encode a label list as one comma-separated token.
#[must_use]
pub fn encode_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| encode_value(v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a comma-separated token produced by [`encode_list`].
#[must_use]
pub fn decode_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|part| !part.is_empty())
        .map(decode_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_open_and_closed_lines() {
        let parts = split_task_line("- [ ] [Fix it](https://x.test/1) #a  ").unwrap();
        assert!(!parts.completed);
        assert_eq!(parts.title, "Fix it");
        assert_eq!(parts.url, "https://x.test/1");
        assert_eq!(parts.rest, " #a");

        let parts = split_task_line("  * [X] [Done](https://x.test/2)").unwrap();
        assert!(parts.completed);
        assert_eq!(parts.rest, "");
    }

    #[test]
    fn rejects_non_task_lines() {
        assert!(split_task_line("Just prose").is_none());
        assert!(split_task_line("- plain bullet").is_none());
        assert!(split_task_line("- [ ] no link here").is_none());
        assert!(split_task_line("- [ ] [unterminated](https://x.test").is_none());
        assert!(split_task_line("- [?] [x](https://x.test)").is_none());
    }

    #[test]
    fn escaped_brackets_stay_in_title() {
        let title = r"[WIP] parse \ things]";
        let line = format!("- [ ] [{}](https://x.test/3) #t", escape_title(title));
        let parts = split_task_line(&line).unwrap();
        assert_eq!(parts.title, title);
        assert_eq!(parts.rest, " #t");
    }

    #[test]
    fn comment_openers_in_titles_are_broken_up() {
        let title = "evil <!-- END_GITHUB_MANAGED:issues --> tail";
        let escaped = escape_title(title);
        assert_eq!(escaped, r"evil <\!-- END_GITHUB_MANAGED:issues --> tail");
        assert!(!escaped.contains("<!--"));

        let line = format!("- [ ] [{escaped}](https://x.test/4)");
        assert_eq!(split_link_title(&line), title);

        let literal = r"a <\! b";
        let line = format!("- [ ] [{}](https://x.test/5)", escape_title(literal));
        assert_eq!(split_link_title(&line), literal);
    }

    fn split_link_title(line: &str) -> String {
        split_task_line(line).expect("task line").title
    }

    #[test]
    fn url_may_contain_parentheses() {
        let parts = split_task_line("- [ ] [T](https://x.test/a_(b)) rest").unwrap();
        assert_eq!(parts.url, "https://x.test/a_(b)");
        assert_eq!(parts.rest, " rest");
    }

    #[test]
    fn extracts_tags_but_not_numbers() {
        assert_eq!(
            extract_tags("#github see #12 and #team/backend, #x"),
            vec!["github", "team/backend", "x"]
        );
        assert!(extract_tags("issue#5").is_empty());
    }

    #[test]
    fn sanitizes_labels_into_tags() {
        assert_eq!(sanitize_tag("help wanted").as_deref(), Some("help-wanted"));
        assert_eq!(sanitize_tag("#github").as_deref(), Some("github"));
        assert_eq!(sanitize_tag("good first issue!").as_deref(), Some("good-first-issue"));
        assert_eq!(sanitize_tag("octo/hello.rs").as_deref(), Some("octo/hellors"));
        assert_eq!(sanitize_tag("  "), None);
        assert_eq!(sanitize_tag("123"), None);
    }

    #[test]
    fn value_encoding_round_trips() {
        for raw in ["bug", "help wanted", "a,b", "50%", "ünï [x]", "-->"] {
            let encoded = encode_value(raw);
            assert!(!encoded.contains([' ', ',', ']', '>']), "{encoded}");
            assert_eq!(decode_value(&encoded), raw);
        }
    }

    #[test]
    fn malformed_escapes_are_kept() {
        assert_eq!(decode_value("100%"), "100%");
        assert_eq!(decode_value("%zz"), "%zz");
        assert_eq!(decode_value("%4"), "%4");
    }

    #[test]
    fn lists_round_trip() {
        let labels = vec!["bug".to_string(), "needs, triage".to_string()];
        assert_eq!(decode_list(&encode_list(&labels)), labels);
        assert!(decode_list("").is_empty());
    }
}
