//! Inline spans.
//!
//! Atoms (code spans, images, links) are cut out of the raw line first and
//! replaced by placeholder characters, so their verbatim parts (code text,
//! URLs) are never touched by emphasis. Each delimiter rule then makes one
//! pass over the whole line, longest marker first, and turns every match
//! into a placeholder of its own. A placeholder counts as content for the
//! rules after it, so `*a **b** c*` and `*see [a](b)*` both nest, while a
//! span can never be split by a later marker.

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Inline {
    Text(String),
    StrongEmphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strike(Vec<Inline>),
    Code(String),
    Image { alt: String, url: String },
    Link { url: String, content: Vec<Inline> },
}

#[derive(Clone, Copy, Debug)]
enum Wrap {
    StrongEmphasis,
    Strong,
    Emphasis,
    Strike,
}

impl Wrap {
    fn apply(self, children: Vec<Inline>) -> Inline {
        match self {
            Wrap::StrongEmphasis => Inline::StrongEmphasis(children),
            Wrap::Strong => Inline::Strong(children),
            Wrap::Emphasis => Inline::Emphasis(children),
            Wrap::Strike => Inline::Strike(children),
        }
    }
}

const DELIMITERS: [(&str, Wrap); 7] = [
    ("***", Wrap::StrongEmphasis),
    ("___", Wrap::StrongEmphasis),
    ("**", Wrap::Strong),
    ("__", Wrap::Strong),
    ("*", Wrap::Emphasis),
    ("_", Wrap::Emphasis),
    ("~~", Wrap::Strike),
];

// Placeholders live in Supplementary Private Use Area-A.
const ATOM_BASE: u32 = 0xF0000;
const MAX_ATOMS: usize = 0xFFFD;

fn atom_index(c: char) -> Option<usize> {
    let v = c as u32;
    if (ATOM_BASE..ATOM_BASE + MAX_ATOMS as u32).contains(&v) {
        Some((v - ATOM_BASE) as usize)
    } else {
        None
    }
}

fn atom_char(index: usize) -> char {
    char::from_u32(ATOM_BASE + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// What a placeholder stands for. A span's content is itself a skeleton,
/// so later rules still run inside it.
enum Node {
    Atom(Inline),
    Span(Wrap, String),
}

pub(crate) fn parse_inlines(line: &str) -> Vec<Inline> {
    if line.is_empty() {
        return Vec::new();
    }

    // Placeholder characters typed by the user would alias real atoms.
    let line: String = line
        .chars()
        .map(|c| {
            if atom_index(c).is_some() {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect();

    let mut nodes: Vec<Option<Node>> = Vec::new();
    let mut skeleton = extract_atoms(&line, &mut nodes);

    for &(marker, wrap) in DELIMITERS.iter() {
        // Spans from earlier rules are scanned too. Spans made by this rule
        // are not rescanned by it.
        for index in 0..nodes.len() {
            let inner = match &mut nodes[index] {
                Some(Node::Span(_, inner)) => std::mem::take(inner),
                _ => continue,
            };
            let inner = delimit(&inner, marker, wrap, &mut nodes);
            if let Some(Node::Span(_, slot)) = &mut nodes[index] {
                *slot = inner;
            }
        }
        skeleton = delimit(&skeleton, marker, wrap, &mut nodes);
    }

    expand(&skeleton, &mut nodes)
}

fn extract_atoms(line: &str, nodes: &mut Vec<Option<Node>>) -> String {
    let mut skeleton = String::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        let rest = &line[i..];
        if nodes.len() < MAX_ATOMS {
            if let Some((atom, consumed)) = match_atom(rest) {
                skeleton.push(atom_char(nodes.len()));
                nodes.push(Some(Node::Atom(atom)));
                i += consumed;
                continue;
            }
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        skeleton.push(c);
        i += c.len_utf8();
    }
    skeleton
}

/// Code span, then image, then link.
fn match_atom(rest: &str) -> Option<(Inline, usize)> {
    match rest.as_bytes().first()? {
        b'`' => {
            let (inner, consumed) = enclosed(rest, "`")?;
            Some((Inline::Code(inner.to_string()), consumed))
        }
        b'!' => {
            let (alt, url, consumed) = bracketed(&rest[1..])?;
            Some((
                Inline::Image {
                    alt: alt.to_string(),
                    url: url.to_string(),
                },
                consumed + 1,
            ))
        }
        b'[' => {
            let (label, url, consumed) = bracketed(rest)?;
            Some((
                Inline::Link {
                    url: url.to_string(),
                    content: parse_inlines(label),
                },
                consumed,
            ))
        }
        _ => None,
    }
}

/// One rule over one skeleton: every `{marker}..{marker}` becomes a span
/// placeholder. Placeholders already present are plain content.
fn delimit(text: &str, marker: &str, wrap: Wrap, nodes: &mut Vec<Option<Node>>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if nodes.len() < MAX_ATOMS && rest.starts_with(marker) {
            if let Some((inner, consumed)) = enclosed(rest, marker) {
                out.push(atom_char(nodes.len()));
                nodes.push(Some(Node::Span(wrap, inner.to_string())));
                i += consumed;
                continue;
            }
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        out.push(c);
        i += c.len_utf8();
    }
    out
}

/// `{marker}content{marker}` with non-empty content and the nearest closing
/// marker. Returns the content and the byte length of the whole span.
fn enclosed<'a>(rest: &'a str, marker: &str) -> Option<(&'a str, usize)> {
    let body = rest.strip_prefix(marker)?;
    let first = body.chars().next()?.len_utf8();
    let close = body[first..].find(marker)? + first;
    Some((&body[..close], marker.len() * 2 + close))
}

/// `[label](target)`, both parts non-empty and shortest.
fn bracketed(rest: &str) -> Option<(&str, &str, usize)> {
    let body = rest.strip_prefix('[')?;
    let first = body.chars().next()?.len_utf8();
    let label_end = body[first..].find("](")? + first;

    let tail = &body[label_end + 2..];
    let first = tail.chars().next()?.len_utf8();
    let target_end = tail[first..].find(')')? + first;

    Some((
        &body[..label_end],
        &tail[..target_end],
        1 + label_end + 2 + target_end + 1,
    ))
}

/// Put atoms and spans back where their placeholders ended up.
fn expand(skeleton: &str, nodes: &mut [Option<Node>]) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for c in skeleton.chars() {
        let Some(index) = atom_index(c) else {
            buf.push(c);
            continue;
        };
        let Some(node) = nodes.get_mut(index).and_then(Option::take) else {
            continue;
        };
        if !buf.is_empty() {
            out.push(Inline::Text(std::mem::take(&mut buf)));
        }
        out.push(match node {
            Node::Atom(inline) => inline,
            Node::Span(wrap, inner) => wrap.apply(expand(&inner, nodes)),
        });
    }
    if !buf.is_empty() {
        out.push(Inline::Text(buf));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn link(url: &str, content: Vec<Inline>) -> Inline {
        Inline::Link {
            url: url.to_string(),
            content,
        }
    }

    #[test]
    fn test_longest_marker_wins() {
        assert_eq!(
            parse_inlines("***both***"),
            vec![Inline::StrongEmphasis(vec![t("both")])]
        );
        assert_eq!(
            parse_inlines("___both___"),
            vec![Inline::StrongEmphasis(vec![t("both")])]
        );
        assert_eq!(parse_inlines("__b__"), vec![Inline::Strong(vec![t("b")])]);
    }

    #[test]
    fn test_nested_emphasis_inside_strong() {
        assert_eq!(
            parse_inlines("**a *b* c**"),
            vec![Inline::Strong(vec![
                t("a "),
                Inline::Emphasis(vec![t("b")]),
                t(" c"),
            ])]
        );
    }

    #[test]
    fn test_later_rules_wrap_earlier_spans() {
        assert_eq!(
            parse_inlines("*a **b** c*"),
            vec![Inline::Emphasis(vec![
                t("a "),
                Inline::Strong(vec![t("b")]),
                t(" c"),
            ])]
        );
        assert_eq!(
            parse_inlines("~~a **b** c~~"),
            vec![Inline::Strike(vec![
                t("a "),
                Inline::Strong(vec![t("b")]),
                t(" c"),
            ])]
        );
        assert_eq!(
            parse_inlines("_a *b* c_"),
            vec![Inline::Emphasis(vec![
                t("a "),
                Inline::Emphasis(vec![t("b")]),
                t(" c"),
            ])]
        );
    }

    #[test]
    fn test_nesting_inside_and_around_in_one_line() {
        assert_eq!(
            parse_inlines("**a ~~b~~ c** and ~~x *y* z~~"),
            vec![
                Inline::Strong(vec![t("a "), Inline::Strike(vec![t("b")]), t(" c")]),
                t(" and "),
                Inline::Strike(vec![t("x "), Inline::Emphasis(vec![t("y")]), t(" z")]),
            ]
        );
    }

    #[test]
    fn test_later_marker_cannot_split_a_span() {
        // The `*` pair straddles the strong span, so it stays literal.
        assert_eq!(
            parse_inlines("*a **b* c**"),
            vec![t("*a "), Inline::Strong(vec![t("b* c")])]
        );
    }

    #[test]
    fn test_unterminated_markers_stay_literal() {
        assert_eq!(parse_inlines("2 * 3"), vec![t("2 * 3")]);
        assert_eq!(parse_inlines("**open"), vec![t("**open")]);
        assert_eq!(parse_inlines("~single~"), vec![t("~single~")]);
        assert_eq!(parse_inlines("[x](nope"), vec![t("[x](nope")]);
        assert_eq!(parse_inlines("``"), vec![t("``")]);
    }

    #[test]
    fn test_strike_and_code() {
        assert_eq!(
            parse_inlines("~~gone~~ `x < y`"),
            vec![
                Inline::Strike(vec![t("gone")]),
                t(" "),
                Inline::Code("x < y".to_string()),
            ]
        );
    }

    #[test]
    fn test_code_span_is_verbatim() {
        assert_eq!(
            parse_inlines("`*not em*`"),
            vec![Inline::Code("*not em*".to_string())]
        );
    }

    #[test]
    fn test_image_before_link() {
        assert_eq!(
            parse_inlines("see ![logo](img.png) and [docs](/help)"),
            vec![
                t("see "),
                Inline::Image {
                    alt: "logo".to_string(),
                    url: "img.png".to_string(),
                },
                t(" and "),
                link("/help", vec![t("docs")]),
            ]
        );
    }

    #[test]
    fn test_link_label_gets_emphasis_and_url_does_not() {
        assert_eq!(
            parse_inlines("[*x*](/a_b_c)"),
            vec![link("/a_b_c", vec![Inline::Emphasis(vec![t("x")])])]
        );
    }

    #[test]
    fn test_emphasis_wraps_atoms() {
        assert_eq!(
            parse_inlines("*see [a](b)*"),
            vec![Inline::Emphasis(vec![t("see "), link("b", vec![t("a")])])]
        );
        assert_eq!(
            parse_inlines("**`x`**"),
            vec![Inline::Strong(vec![Inline::Code("x".to_string())])]
        );
    }

    #[test]
    fn test_placeholder_chars_in_input_are_replaced() {
        let raw = format!("a{}b", atom_char(0));
        assert_eq!(parse_inlines(&raw), vec![t("a\u{FFFD}b")]);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            parse_inlines("héllo *wörld* ✓"),
            vec![t("héllo "), Inline::Emphasis(vec![t("wörld")]), t(" ✓")]
        );
    }
}
