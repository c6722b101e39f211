//! Markdown rendering for page previews.
//!
//! Page content is untrusted. The renderer parses it into a small block/inline
//! tree and serializes that tree, escaping every piece of literal text on the
//! way out, so the only tags in the result are the ones [`html`] writes.
//!
//! Supported syntax, in precedence order:
//!
//! - fenced code blocks (```` ```lang ````), taken verbatim; the closing
//!   ```` ``` ```` may end the last code line
//! - `#`..`######` headings, `---`/`***` rules, `> ` quotes
//! - `* `/`- ` and `N. ` list items
//! - `` `code` ``, `![alt](url)`, `[text](url)`
//! - `***x***` `___x___` `**x**` `__x__` `*x*` `_x_` `~~x~~`
//! - blank-line separated paragraphs, single newlines become `<br>`
//!
//! Every contiguous run of list items is wrapped in its own container:
//! `<ul>` for bullet items and `<ol>` for numbered items. Blank lines
//! between items of the same kind do not split a run.

mod block;
mod html;
mod inline;

/// Rendered in place of empty page content.
pub const EMPTY_PLACEHOLDER: &str =
    r#"<p class="text-muted-foreground">No content yet. Click Edit to add content.</p>"#;

/// Render Markdown to HTML. Never fails; empty input yields [`EMPTY_PLACEHOLDER`].
pub fn render(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    let out = html::to_html(&block::parse_blocks(markdown));
    if out.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        out
    }
}

/// Same as [`render`] for content that may be missing altogether.
pub fn render_opt(markdown: Option<&str>) -> String {
    render(markdown.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_renders_placeholder() {
        assert_eq!(render(""), EMPTY_PLACEHOLDER);
        assert_eq!(render("  \n\n \t"), EMPTY_PLACEHOLDER);
        assert_eq!(render_opt(None), EMPTY_PLACEHOLDER);
    }

    #[test]
    fn test_plain_text_is_one_escaped_paragraph() {
        assert_eq!(render("Just some words here"), "<p>Just some words here</p>");
        assert_eq!(
            render(r#"Tom & Jerry's "show""#),
            "<p>Tom &amp; Jerry&#39;s &quot;show&quot;</p>"
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(render("# Hi"), "<h1>Hi</h1>");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            render("**bold** and *italic*"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_emphasis_around_strong_and_strike() {
        assert_eq!(render("*a **b** c*"), "<p><em>a <strong>b</strong> c</em></p>");
        assert_eq!(render("~~a **b** c~~"), "<p><del>a <strong>b</strong> c</del></p>");
        assert_eq!(render("_a *b* c_"), "<p><em>a <em>b</em> c</em></p>");
    }

    #[test]
    fn test_fence_closed_on_content_line() {
        assert_eq!(render("```\ncode```"), r#"<pre><code class="language-text">code</code></pre>"#);
    }

    #[test]
    fn test_script_is_escaped() {
        let out = render("<script>alert(1)</script>");
        assert_eq!(out, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");
        assert!(!out.contains("<script"));
    }

    #[test]
    fn test_mixed_document() {
        let md = "# Trip\n\nPack **light**.\nBring:\n\n- socks\n- `charger`\n\n> mind the gap\n\n---\n\n1. book\n2. go";
        let expected = [
            "<h1>Trip</h1>",
            "<p>Pack <strong>light</strong>.<br>Bring:</p>",
            "<ul><li>socks</li><li><code>charger</code></li></ul>",
            "<blockquote>mind the gap</blockquote>",
            "<hr>",
            "<ol><li>book</li><li>go</li></ol>",
        ]
        .join("\n");
        assert_eq!(render(md), expected);
    }

    #[test]
    fn test_every_list_run_is_wrapped() {
        assert_eq!(
            render("- a\n- b\n\ntext\n\n* c"),
            "<ul><li>a</li><li>b</li></ul>\n<p>text</p>\n<ul><li>c</li></ul>"
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(render("a\r\nb"), "<p>a<br>b</p>");
    }
}
