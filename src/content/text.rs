use scraper::{ElementRef, Html, Node};

use super::{is_back_matter, is_clutter, section_heading};

/// Flatten article HTML into wrapped-friendly plain text.
///
/// Paragraph-level elements are separated by a blank line, list items get a
/// bullet, and runs of whitespace collapse to one space.
pub fn to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    collect(fragment.root_element(), &mut raw);
    tidy(&raw)
}

fn collect(parent: ElementRef<'_>, out: &mut String) {
    let mut in_back_matter = false;

    for child in parent.children() {
        match child.value() {
            Node::Text(text) if !in_back_matter => {
                let text: &str = text;
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                if let Some(heading) = section_heading(element) {
                    in_back_matter = is_back_matter(&heading);
                }
                if in_back_matter || is_clutter(element) {
                    continue;
                }

                let name = element.value().name();
                match name {
                    "script" | "style" | "noscript" => continue,
                    "br" => {
                        out.push('\n');
                        continue;
                    }
                    _ => {}
                }

                let paragraph = is_paragraph(name);
                let line = paragraph || is_line(name);
                if line {
                    break_line(out, paragraph);
                }
                if name == "li" {
                    out.push_str("• ");
                }
                collect(element, out);
                if line {
                    break_line(out, paragraph);
                }
            }
            _ => {}
        }
    }
}

fn is_paragraph(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "dl" | "table" | "blockquote"
            | "figure" | "pre"
    )
}

fn is_line(name: &str) -> bool {
    matches!(
        name,
        "li" | "div" | "tr" | "dt" | "dd" | "figcaption" | "section" | "caption"
    )
}

fn break_line(out: &mut String, blank: bool) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
    if blank {
        out.push('\n');
    }
}

fn tidy(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(collapsed);
    }

    lines.join("\n")
}
