use super::block::{Block, ListKind};
use super::inline::Inline;

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

pub(crate) fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

/// Only http(s), mailto and scheme-less URLs survive; anything else is
/// replaced by `#`. Browsers ignore embedded whitespace and control
/// characters when reading a scheme, so those are dropped before the check.
pub(crate) fn sanitize_url(url: &str) -> &str {
    let compact: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let scheme_end = compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if compact[idx..].starts_with(':') => {
            let scheme = compact[..idx].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                url.trim()
            } else {
                "#"
            }
        }
        _ => url.trim(),
    }
}

fn inlines(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => escape(text, out),
            Inline::StrongEmphasis(children) => {
                out.push_str("<strong><em>");
                inlines(children, out);
                out.push_str("</em></strong>");
            }
            Inline::Strong(children) => wrap("strong", children, out),
            Inline::Emphasis(children) => wrap("em", children, out),
            Inline::Strike(children) => wrap("del", children, out),
            Inline::Code(code) => {
                out.push_str("<code>");
                escape(code, out);
                out.push_str("</code>");
            }
            Inline::Image { alt, url } => {
                out.push_str("<img src=\"");
                escape(sanitize_url(url), out);
                out.push_str("\" alt=\"");
                escape(alt, out);
                out.push_str("\" class=\"my-2 max-w-full\">");
            }
            Inline::Link { url, content } => {
                out.push_str("<a href=\"");
                escape(sanitize_url(url), out);
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                inlines(content, out);
                out.push_str("</a>");
            }
        }
    }
}

fn wrap(tag: &str, children: &[Inline], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    inlines(children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{level}>"));
            inlines(content, out);
            out.push_str(&format!("</h{level}>"));
        }
        Block::Rule => out.push_str("<hr>"),
        Block::List { kind, items } => {
            let tag = match kind {
                ListKind::Bullet => "ul",
                ListKind::Numbered => "ol",
            };
            out.push_str(&format!("<{tag}>"));
            for item in items {
                wrap("li", item, out);
            }
            out.push_str(&format!("</{tag}>"));
        }
        Block::Quote(content) => wrap("blockquote", content, out),
        Block::Code { lang, text } => {
            out.push_str("<pre><code class=\"language-");
            escape(lang.as_deref().unwrap_or("text"), out);
            out.push_str("\">");
            escape(text, out);
            out.push_str("</code></pre>");
        }
        Block::Paragraph(lines) => {
            out.push_str("<p>");
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push_str("<br>");
                }
                inlines(line, out);
            }
            out.push_str("</p>");
        }
    }
}

pub(crate) fn to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (i, b) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        block(b, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::render;
    use super::*;

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("https://example.com/a?b=1"), "https://example.com/a?b=1");
        assert_eq!(sanitize_url("mailto:me@example.com"), "mailto:me@example.com");
        assert_eq!(sanitize_url("/pages/1"), "/pages/1");
        assert_eq!(sanitize_url("#top"), "#top");
        assert_eq!(sanitize_url("javascript:alert(1)"), "#");
        assert_eq!(sanitize_url("JavaScript:alert(1)"), "#");
        assert_eq!(sanitize_url("java\tscript:alert(1)"), "#");
        assert_eq!(sanitize_url("data:text/html,hi"), "#");
        assert_eq!(sanitize_url("./a:b"), "./a:b");
    }

    #[test]
    fn test_script_link_is_neutralized() {
        assert_eq!(
            render("[x](javascript:alert(1))"),
            r##"<p><a href="#" target="_blank" rel="noopener noreferrer">x</a>)</p>"##
        );
    }

    #[test]
    fn test_link_markup() {
        assert_eq!(
            render("[docs](https://example.com)"),
            r#"<p><a href="https://example.com" target="_blank" rel="noopener noreferrer">docs</a></p>"#
        );
    }

    #[test]
    fn test_image_markup_escapes_alt() {
        assert_eq!(
            render(r#"![a"b](x.png)"#),
            r#"<p><img src="x.png" alt="a&quot;b" class="my-2 max-w-full"></p>"#
        );
    }

    #[test]
    fn test_code_block_markup() {
        assert_eq!(
            render("```rust\nif a < b {}\n```"),
            r#"<pre><code class="language-rust">if a &lt; b {}</code></pre>"#
        );
        assert_eq!(
            render("```\nplain\n```"),
            r#"<pre><code class="language-text">plain</code></pre>"#
        );
    }

    #[test]
    fn test_strong_emphasis_and_strike() {
        assert_eq!(
            render("***a*** ~~b~~"),
            "<p><strong><em>a</em></strong> <del>b</del></p>"
        );
    }
}
