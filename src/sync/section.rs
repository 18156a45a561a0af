//! Managed-section editor.
//!
//! A managed section is a machine-owned block delimited by HTML comment
//! markers derived from a stable section id:
//!
//! ```text
//! ## GitHub: Open Issues
//! <!-- BEGIN_GITHUB_MANAGED:issues -->
//! - [ ] ...
//! <!-- END_GITHUB_MANAGED:issues -->
//! ```
//!
//! Everything outside the markers belongs to the user and is never touched.

use tracing::{debug, warn};

const BEGIN_PREFIX: &str = "<!-- BEGIN_GITHUB_MANAGED:";
const END_PREFIX: &str = "<!-- END_GITHUB_MANAGED:";
const MARKER_SUFFIX: &str = " -->";

/// Begin marker for a section id.
#[must_use]
pub fn begin_marker(section_id: &str) -> String {
    format!("{BEGIN_PREFIX}{section_id}{MARKER_SUFFIX}")
}

/// End marker for a section id.
#[must_use]
pub fn end_marker(section_id: &str) -> String {
    format!("{END_PREFIX}{section_id}{MARKER_SUFFIX}")
}

/// Where the markers for one section id stand in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerScan {
    /// Neither marker occurs.
    Absent,
    /// A replaceable span, byte range covering both markers.
    Span { start: usize, end: usize },
    /// A begin marker with no end marker after it.
    Unterminated { begin: usize },
    /// An end marker with no begin marker before it.
    Orphaned { end: usize },
}

impl MarkerScan {
    /// Locate the markers for `section_id`.
    ///
    /// The first end marker that has a begin marker before it is paired with
    /// the nearest such begin marker. In a well-formed document this is the
    /// first-begin-to-first-end span; with a dangling begin earlier in the
    /// document the dangling marker and the prose after it stay outside the
    /// span.
    #[must_use]
    pub fn locate(document: &str, section_id: &str) -> Self {
        let begin = begin_marker(section_id);
        let end = end_marker(section_id);

        for (end_at, _) in document.match_indices(&end) {
            if let Some(begin_at) = document[..end_at].rfind(&begin) {
                return Self::Span {
                    start: begin_at,
                    end: end_at + end.len(),
                };
            }
        }

        if let Some(begin_at) = document.find(&begin) {
            Self::Unterminated { begin: begin_at }
        } else if let Some(end_at) = document.find(&end) {
            Self::Orphaned { end: end_at }
        } else {
            Self::Absent
        }
    }
}

/// One managed section with its fresh inner content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedSection<'a> {
    pub id: &'a str,
    pub header_label: &'a str,
    pub inner: &'a str,
}

impl ManagedSection<'_> {
    /// `begin\ninner\nend`.
    #[must_use]
    pub fn block(&self) -> String {
        format!(
            "{}\n{}\n{}",
            begin_marker(self.id),
            self.inner,
            end_marker(self.id)
        )
    }

    /// Splice this section into `document`.
    ///
    /// 1. Replace an existing marker span, markers included.
    /// 2. Otherwise insert right after a `## {header_label}` heading line.
    /// 3. Otherwise append a blank line, the heading and the block.
    ///
    /// Malformed markers are left where they are and handled as absent.
    #[must_use]
    pub fn apply(&self, document: &str) -> String {
        match MarkerScan::locate(document, self.id) {
            MarkerScan::Span { start, end } => {
                debug!(section = self.id, start, end, "Replacing managed span");
                return format!("{}{}{}", &document[..start], self.block(), &document[end..]);
            }
            MarkerScan::Unterminated { begin } => {
                warn!(
                    section = self.id,
                    offset = begin,
                    "Begin marker without end marker; leaving it untouched"
                );
            }
            MarkerScan::Orphaned { end } => {
                warn!(
                    section = self.id,
                    offset = end,
                    "End marker without begin marker; leaving it untouched"
                );
            }
            MarkerScan::Absent => {}
        }

        if let Some(heading_end) = find_heading(document, self.header_label) {
            debug!(section = self.id, "Inserting managed block after heading");
            return format!(
                "{}\n{}{}",
                &document[..heading_end],
                self.block(),
                &document[heading_end..]
            );
        }

        debug!(section = self.id, "Appending managed section");
        let mut out = document.to_string();
        if !document.trim().is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str("## ");
        out.push_str(self.header_label.trim());
        out.push('\n');
        out.push_str(&self.block());
        out.push('\n');
        out
    }
}

/// Insert or replace the managed block for `section_id`.
///
/// After the call the document holds exactly one well-formed block for the
/// id; calling again with the same `inner` is a no-op.
#[must_use]
pub fn upsert_section(document: &str, section_id: &str, header_label: &str, inner: &str) -> String {
    ManagedSection {
        id: section_id,
        header_label,
        inner,
    }
    .apply(document)
}

/// Inner content of a well-formed block, if present.
#[must_use]
pub fn section_content<'a>(document: &'a str, section_id: &str) -> Option<&'a str> {
    match MarkerScan::locate(document, section_id) {
        MarkerScan::Span { start, end } => {
            let begin_len = begin_marker(section_id).len();
            let end_len = end_marker(section_id).len();
            let inner = &document[start + begin_len..end - end_len];
            let inner = inner.strip_prefix('\n').unwrap_or(inner);
            Some(inner.strip_suffix('\n').unwrap_or(inner))
        }
        _ => None,
    }
}

/// Byte offset of the end of the first `## {label}` heading line, excluding
/// its line break.
///
/// The heading level is fixed: `###` does not match. The label is compared
/// verbatim after trimming surrounding whitespace.
fn find_heading(document: &str, label: &str) -> Option<usize> {
    let wanted = label.trim();
    let mut offset = 0;
    for line in document.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(rest) = content.strip_prefix("##") {
            if rest.starts_with([' ', '\t']) && rest.trim() == wanted {
                return Some(offset + content.len());
            }
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "issues";
    const HEADER: &str = "GitHub: Open Issues";

    #[test]
    fn markers_are_derived_from_id() {
        assert_eq!(begin_marker("prs"), "<!-- BEGIN_GITHUB_MANAGED:prs -->");
        assert_eq!(end_marker("prs"), "<!-- END_GITHUB_MANAGED:prs -->");
    }

    #[test]
    fn appends_to_empty_document() {
        let out = upsert_section("", ID, HEADER, "X");
        assert_eq!(
            out,
            "## GitHub: Open Issues\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nX\n<!-- END_GITHUB_MANAGED:issues -->\n"
        );
    }

    #[test]
    fn appends_after_blank_line() {
        let out = upsert_section("# Notes\nhello", ID, HEADER, "X");
        assert!(out.starts_with("# Notes\nhello\n\n## GitHub: Open Issues\n"));

        let out = upsert_section("   \n", ID, HEADER, "X");
        assert!(out.starts_with("   \n## GitHub: Open Issues\n"));
    }

    #[test]
    fn inserts_after_existing_heading() {
        let doc = "# Repo\n\n## GitHub: Open Issues\nLater prose\n";
        let out = upsert_section(doc, ID, HEADER, "X");
        assert_eq!(
            out,
            "# Repo\n\n## GitHub: Open Issues\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nX\n<!-- END_GITHUB_MANAGED:issues -->\nLater prose\n"
        );
    }

    #[test]
    fn heading_match_is_exact() {
        assert_eq!(find_heading("### GitHub: Open Issues\n", HEADER), None);
        assert_eq!(find_heading("##GitHub: Open Issues\n", HEADER), None);
        assert_eq!(find_heading("## GitHub: Open Issues (old)\n", HEADER), None);
        assert_eq!(find_heading("##  GitHub: Open Issues  \r\n", HEADER), Some(25));
    }

    #[test]
    fn replaces_only_between_markers() {
        let doc = "intro\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nold\n<!-- END_GITHUB_MANAGED:issues -->\noutro";
        let out = upsert_section(doc, ID, HEADER, "new");
        assert_eq!(
            out,
            "intro\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nnew\n<!-- END_GITHUB_MANAGED:issues -->\noutro"
        );
    }

    #[test]
    fn upsert_is_idempotent() {
        for doc in ["", "prose", "## GitHub: Open Issues\n", "a\n\n## Other\nb\n"] {
            let once = upsert_section(doc, ID, HEADER, "- [ ] x");
            let twice = upsert_section(&once, ID, HEADER, "- [ ] x");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn sections_do_not_interfere() {
        let doc = upsert_section("", "issues", HEADER, "I");
        let doc = upsert_section(&doc, "assigned-issues", "GitHub: Issues", "A");
        let doc = upsert_section(&doc, "issues", HEADER, "I2");
        assert_eq!(section_content(&doc, "issues"), Some("I2"));
        assert_eq!(section_content(&doc, "assigned-issues"), Some("A"));
        assert_eq!(doc.matches("BEGIN_GITHUB_MANAGED:issues").count(), 1);
    }

    #[test]
    fn unterminated_begin_is_left_alone() {
        let doc = "## GitHub: Open Issues\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nuser notes\n";
        assert_eq!(
            MarkerScan::locate(doc, ID),
            MarkerScan::Unterminated { begin: 23 }
        );
        let out = upsert_section(doc, ID, HEADER, "X");
        assert!(out.ends_with("<!-- BEGIN_GITHUB_MANAGED:issues -->\nuser notes\n"));
        assert_eq!(section_content(&out, ID), Some("X"));

        let again = upsert_section(&out, ID, HEADER, "Y");
        assert!(again.ends_with("<!-- BEGIN_GITHUB_MANAGED:issues -->\nuser notes\n"));
        assert_eq!(section_content(&again, ID), Some("Y"));
    }

    #[test]
    fn dangling_begin_before_block_is_not_swallowed() {
        let doc = "<!-- BEGIN_GITHUB_MANAGED:issues -->\nkeep me\n<!-- BEGIN_GITHUB_MANAGED:issues -->\nold\n<!-- END_GITHUB_MANAGED:issues -->\n";
        let out = upsert_section(doc, ID, HEADER, "new");
        assert!(out.starts_with("<!-- BEGIN_GITHUB_MANAGED:issues -->\nkeep me\n"));
        assert_eq!(section_content(&out, ID), Some("new"));
    }

    #[test]
    fn orphaned_end_is_left_alone() {
        let doc = "text\n<!-- END_GITHUB_MANAGED:issues -->\n";
        assert_eq!(MarkerScan::locate(doc, ID), MarkerScan::Orphaned { end: 5 });
        let out = upsert_section(doc, ID, HEADER, "X");
        assert!(out.starts_with(doc));
        let again = upsert_section(&out, ID, HEADER, "X");
        assert_eq!(out, again);
    }

    #[test]
    fn end_before_begin_is_not_a_span() {
        let doc = "<!-- END_GITHUB_MANAGED:issues -->\n<!-- BEGIN_GITHUB_MANAGED:issues -->\n";
        assert!(matches!(
            MarkerScan::locate(doc, ID),
            MarkerScan::Unterminated { .. }
        ));
    }

    #[test]
    fn section_content_reads_inner_text() {
        assert_eq!(section_content("nothing", ID), None);
        let doc = upsert_section("", ID, HEADER, "a\nb");
        assert_eq!(section_content(&doc, ID), Some("a\nb"));
    }
}
