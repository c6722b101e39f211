use super::inline::{parse_inlines, Inline};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Rule,
    List { kind: ListKind, items: Vec<Vec<Inline>> },
    Quote(Vec<Inline>),
    Code { lang: Option<String>, text: String },
    /// One entry per source line; lines are joined with `<br>`.
    Paragraph(Vec<Vec<Inline>>),
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Fence(Option<&'a str>),
    Heading(u8, &'a str),
    Rule,
    Item(ListKind, &'a str),
    Quote(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    if let Some(rest) = line.strip_prefix("```") {
        let lang = rest.trim();
        if lang.is_empty() {
            return Line::Fence(None);
        }
        if lang.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '+') {
            return Line::Fence(Some(lang));
        }
    }

    if let Some((level, rest)) = heading(line) {
        return Line::Heading(level, rest.trim_end());
    }

    // Rules come before list items so `***` is never read as emphasis.
    let trimmed = line.trim_end();
    if trimmed == "---" || trimmed == "***" {
        return Line::Rule;
    }

    if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return Line::Item(ListKind::Bullet, rest.trim_end());
    }

    if let Some(rest) = numbered_item(line) {
        return Line::Item(ListKind::Numbered, rest.trim_end());
    }

    if let Some(rest) = line.strip_prefix("> ") {
        return Line::Quote(rest.trim_end());
    }

    Line::Text(line)
}

/// 1-6 `#` followed by a space. Counting the whole run first means
/// `####### x` is rejected instead of matching as a level-6 heading.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    line[hashes..]
        .strip_prefix(' ')
        .map(|rest| (hashes as u8, rest))
}

fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

/// The first line that is exactly ```` ``` ````, or a content line ending in
/// one. For the latter the text before the marker is returned as the last
/// code line.
fn find_fence_close<'a>(lines: &[&'a str], from: usize) -> Option<(usize, Option<&'a str>)> {
    lines.get(from..)?.iter().enumerate().find_map(|(p, line)| {
        let line = line.trim_end();
        if line == "```" {
            Some((from + p, None))
        } else {
            line.strip_suffix("```").map(|body| (from + p, Some(body)))
        }
    })
}

/// Code body with leading and trailing blank lines dropped. The remaining
/// lines are kept as written.
fn code_text(lines: &[&str]) -> String {
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(start);
    lines[start..=end].join("\n")
}

fn flush_paragraph(paragraph: &mut Vec<Vec<Inline>>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(std::mem::take(paragraph)));
    }
}

/// Blank lines between items do not end a list; any other block does.
fn push_item(blocks: &mut Vec<Block>, kind: ListKind, item: Vec<Inline>) {
    if let Some(Block::List { kind: last, items }) = blocks.last_mut() {
        if *last == kind {
            items.push(item);
            return;
        }
    }
    blocks.push(Block::List {
        kind,
        items: vec![item],
    });
}

pub(crate) fn parse_blocks(input: &str) -> Vec<Block> {
    let normalized = input.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let mut blocks: Vec<Block> = Vec::new();
    let mut paragraph: Vec<Vec<Inline>> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        match classify(line) {
            Line::Fence(lang) => match find_fence_close(&lines, i + 1) {
                Some((close, tail)) => {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    let mut body: Vec<&str> = lines[i + 1..close].to_vec();
                    body.extend(tail);
                    blocks.push(Block::Code {
                        lang: lang.map(str::to_string),
                        text: code_text(&body),
                    });
                    i = close + 1;
                    continue;
                }
                // Unterminated fence: plain text.
                None => paragraph.push(parse_inlines(line)),
            },
            Line::Blank => flush_paragraph(&mut paragraph, &mut blocks),
            Line::Text(text) => paragraph.push(parse_inlines(text)),
            Line::Heading(level, rest) => {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Heading {
                    level,
                    content: parse_inlines(rest),
                });
            }
            Line::Rule => {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Rule);
            }
            Line::Item(kind, rest) => {
                flush_paragraph(&mut paragraph, &mut blocks);
                push_item(&mut blocks, kind, parse_inlines(rest));
            }
            Line::Quote(rest) => {
                flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Quote(parse_inlines(rest)));
            }
        }
        i += 1;
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::Text(s.to_string())]
    }

    #[test]
    fn test_classify_headings() {
        assert_eq!(classify("# a"), Line::Heading(1, "a"));
        assert_eq!(classify("###### deep"), Line::Heading(6, "deep"));
        assert_eq!(classify("####### too deep"), Line::Text("####### too deep"));
        assert_eq!(classify("#nospace"), Line::Text("#nospace"));
        assert_eq!(classify("# "), Line::Heading(1, ""));
    }

    #[test]
    fn test_classify_markers_without_text() {
        assert_eq!(classify("- "), Line::Item(ListKind::Bullet, ""));
        assert_eq!(classify("3. "), Line::Item(ListKind::Numbered, ""));
        assert_eq!(classify("> "), Line::Quote(""));
        assert_eq!(classify("-"), Line::Text("-"));
    }

    #[test]
    fn test_classify_rules_before_items() {
        assert_eq!(classify("***"), Line::Rule);
        assert_eq!(classify("---  "), Line::Rule);
        assert_eq!(classify("* * *"), Line::Item(ListKind::Bullet, "* *"));
    }

    #[test]
    fn test_fenced_code_trims_blank_lines_only() {
        let blocks = parse_blocks("```rust\n\n    let x = *y*;\n\n```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lang: Some("rust".to_string()),
                text: "    let x = *y*;".to_string(),
            }]
        );
    }

    #[test]
    fn test_fenced_code_keeps_trailing_spaces() {
        let blocks = parse_blocks("```\nline one  \n\tline two\t\n```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lang: None,
                text: "line one  \n\tline two\t".to_string(),
            }]
        );
    }

    #[test]
    fn test_fence_closes_at_end_of_content_line() {
        let blocks = parse_blocks("```\ncode```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Code {
                    lang: None,
                    text: "code".to_string(),
                },
                Block::Paragraph(vec![text("after")]),
            ]
        );

        let blocks = parse_blocks("```py\na = 1\nb = 2```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lang: Some("py".to_string()),
                text: "a = 1\nb = 2".to_string(),
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_is_text() {
        let blocks = parse_blocks("```js\nconsole.log(1)");
        assert!(matches!(blocks.as_slice(), [Block::Paragraph(lines)] if lines.len() == 2));
    }

    #[test]
    fn test_blank_line_keeps_list_run() {
        let blocks = parse_blocks("- a\n\n- b\n1. c");
        assert_eq!(
            blocks,
            vec![
                Block::List {
                    kind: ListKind::Bullet,
                    items: vec![text("a"), text("b")],
                },
                Block::List {
                    kind: ListKind::Numbered,
                    items: vec![text("c")],
                },
            ]
        );
    }

    #[test]
    fn test_paragraph_lines() {
        let blocks = parse_blocks("one\ntwo\n\nthree");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("one"), text("two")]),
                Block::Paragraph(vec![text("three")]),
            ]
        );
    }
}
