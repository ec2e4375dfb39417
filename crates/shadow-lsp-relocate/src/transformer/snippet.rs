//! Snippet expansion and splicing for descriptor templates.

use tracing::debug;

use crate::constants::{CLOSING_PLUGIN_TAG, LANGUAGE_ID_PLACEHOLDER, SNIPPET_INDENT};

/// Expand `template` once per language ID, in the given order.
///
/// Each copy has `$LANGUAGE_ID$` replaced, is re-indented to four spaces and
/// ends with a newline. No language IDs yield an empty block.
pub fn expand_snippet<S: AsRef<str>>(template: &str, language_ids: &[S]) -> String {
    let mut block = String::new();
    for language_id in language_ids {
        let copy = template.replace(LANGUAGE_ID_PLACEHOLDER, language_id.as_ref());
        block.push_str(&replace_indent(&copy, SNIPPET_INDENT));
        block.push('\n');
    }
    block
}

/// Insert `block` in front of the first `</idea-plugin>` of `main`.
///
/// The block is followed by a newline. A non-empty block that would otherwise
/// continue the previous line starts on a line of its own. The result is
/// trimmed.
pub fn splice_before_closing_tag(main: &str, block: &str) -> String {
    let Some(at) = main.find(CLOSING_PLUGIN_TAG) else {
        debug!("descriptor has no {CLOSING_PLUGIN_TAG}, snippet not inserted");
        return main.trim().to_string();
    };

    let (head, tail) = main.split_at(at);
    let mut patched = String::with_capacity(main.len() + block.len() + 2);
    patched.push_str(head);
    if !block.is_empty() && !head.ends_with('\n') {
        patched.push('\n');
    }
    patched.push_str(block);
    patched.push('\n');
    patched.push_str(tail);

    patched.trim().to_string()
}

/// Remove the common leading indent of all non-blank lines and prefix every
/// line with `indent`. Blank first and last lines are dropped.
pub fn replace_indent(text: &str, indent: &str) -> String {
    let lines = split_lines(text);
    let common = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);
    let last = lines.len() - 1;

    lines
        .iter()
        .enumerate()
        .filter(|(index, line)| !((*index == 0 || *index == last) && is_blank(line)))
        .map(|(_, line)| format!("{indent}{}", drop_chars(line, common)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);

    lines
}

fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn drop_chars(line: &str, n: usize) -> &str {
    line.char_indices().nth(n).map_or("", |(i, _)| &line[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_without_language_ids_is_empty() {
        assert_eq!(expand_snippet::<&str>(r#"<ext id="$LANGUAGE_ID$"/>"#, &[]), "");
    }

    #[test]
    fn test_expand_keeps_caller_order() {
        let block = expand_snippet(r#"<ext id="$LANGUAGE_ID$"/>"#, &["python", "go"]);
        assert_eq!(block, "    <ext id=\"python\"/>\n    <ext id=\"go\"/>\n");
    }

    #[test]
    fn test_expand_replaces_every_placeholder() {
        let block = expand_snippet("<a lang=\"$LANGUAGE_ID$\" key=\"$LANGUAGE_ID$.x\"/>", &["rust"]);
        assert_eq!(block, "    <a lang=\"rust\" key=\"rust.x\"/>\n");
    }

    #[test]
    fn test_expand_reindents_multiline_templates() {
        let template = "\n        <extensions>\n            <ext id=\"$LANGUAGE_ID$\"/>\n        </extensions>\n";
        assert_eq!(
            expand_snippet(template, &["go"]),
            "    <extensions>\n        <ext id=\"go\"/>\n    </extensions>\n"
        );
    }

    #[test]
    fn test_replace_indent_handles_blank_middle_lines_and_crlf() {
        assert_eq!(replace_indent("  a\r\n\r\n    b", "--"), "--a\n--\n--  b");
    }

    #[test]
    fn test_replace_indent_of_empty_text() {
        assert_eq!(replace_indent("", "    "), "");
        assert_eq!(replace_indent("   \n  ", "    "), "");
    }

    #[test]
    fn test_splice_concrete_descriptor() {
        let block = expand_snippet(r#"<ext id="$LANGUAGE_ID$"/>"#, &["rust"]);
        assert_eq!(
            splice_before_closing_tag("<idea-plugin>X</idea-plugin>", &block),
            "<idea-plugin>X\n    <ext id=\"rust\"/>\n\n</idea-plugin>"
        );
    }

    #[test]
    fn test_splice_after_existing_newline_adds_no_blank_line_before() {
        let main = "<idea-plugin>\n    <depends>a</depends>\n</idea-plugin>\n";
        assert_eq!(
            splice_before_closing_tag(main, "    <ext id=\"go\"/>\n"),
            "<idea-plugin>\n    <depends>a</depends>\n    <ext id=\"go\"/>\n\n</idea-plugin>"
        );
    }

    #[test]
    fn test_splice_targets_first_closing_tag_only() {
        let main = "<idea-plugin>A</idea-plugin><!-- </idea-plugin> -->";
        assert_eq!(
            splice_before_closing_tag(main, "    B\n"),
            "<idea-plugin>A\n    B\n\n</idea-plugin><!-- </idea-plugin> -->"
        );
    }

    #[test]
    fn test_splice_empty_block_inserts_newline() {
        assert_eq!(
            splice_before_closing_tag("  <idea-plugin>X</idea-plugin>\n", ""),
            "<idea-plugin>X\n</idea-plugin>"
        );
    }

    #[test]
    fn test_splice_without_closing_tag_only_trims() {
        assert_eq!(splice_before_closing_tag("  <idea-plugin/>\n", "    B\n"), "<idea-plugin/>");
    }
}
