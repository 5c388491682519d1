//! Article markup handling.
//!
//! [`ContentRewriter`] cleans upstream HTML and retargets its links;
//! [`to_plain_text`] flattens it for the terminal. Both walk the parsed tree
//! and share the same notion of what is clutter.

pub mod rewrite;
pub mod text;

use scraper::ElementRef;

pub use rewrite::ContentRewriter;
pub use text::to_plain_text;

/// Section headings whose section is dropped entirely.
pub const BACK_MATTER: &[&str] = &[
    "References",
    "Notes",
    "Citations",
    "Sources",
    "Bibliography",
    "Further reading",
    "External links",
];

pub fn is_back_matter(title: &str) -> bool {
    let title = title.trim();
    BACK_MATTER.iter().any(|b| b.eq_ignore_ascii_case(title))
}

/// Citation markers, reference lists, navigation boxes, sidebars and
/// edit links.
pub(crate) fn is_clutter(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let has_class = |class: &str| value.classes().any(|c| c == class);

    match value.name() {
        "sup" => has_class("reference") || has_class("noprint") || is_citation_needed(element),
        "span" => has_class("mw-editsection"),
        "div" | "ol" => {
            has_class("reflist")
                || has_class("references")
                || has_class("mw-references-wrap")
                || has_class("navbox")
        }
        "table" => has_class("navbox") || has_class("vertical-navbox") || has_class("sidebar"),
        _ => false,
    }
}

fn is_citation_needed(element: ElementRef<'_>) -> bool {
    let text: String = element.text().collect();
    text.trim().eq_ignore_ascii_case("[citation needed]")
}

/// Text of a top-level section heading: an `h2`, or the `mw-heading2`
/// wrapper newer markup puts around it.
pub(crate) fn section_heading(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    let heading = match value.name() {
        "h2" => element,
        "div" if value.classes().any(|c| c == "mw-heading2") => element
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "h2")?,
        _ => return None,
    };

    let mut text = String::new();
    visible_text(heading, &mut text);
    Some(text.trim().to_string())
}

fn visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !is_clutter(child) {
                visible_text(child, out);
            }
        }
    }
}
