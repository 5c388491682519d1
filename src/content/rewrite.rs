use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};
use url::Url;

use super::{is_back_matter, is_clutter, section_heading};
use crate::domain::ArticleSection;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Debug, PartialEq, Eq)]
enum Link {
    Internal(String),
    External(String),
    Anchor(String),
    Keep,
}

/// Rewrites article HTML for display inside the app.
///
/// Same-site article links become `/article/<title>` with
/// `data-internal="true"`, other absolute links open in a new context,
/// in-page anchors are neutralised, clutter and back-matter sections are
/// dropped. Rewriting already rewritten markup changes nothing.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    site_base: String,
    site_host: Option<String>,
}

impl ContentRewriter {
    pub fn new(site_base: &str) -> Self {
        let site_base = site_base.trim_end_matches('/').to_string();
        let site_host = Url::parse(&site_base)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        Self {
            site_base,
            site_host,
        }
    }

    pub fn rewrite(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        self.write_children(fragment.root_element(), &mut out);
        out
    }

    /// Drop back-matter sections and rewrite the rest.
    pub fn rewrite_sections(&self, sections: &[ArticleSection]) -> Vec<ArticleSection> {
        sections
            .iter()
            .filter(|s| !is_back_matter(&s.title))
            .map(|s| ArticleSection {
                content: self.rewrite(&s.content),
                ..s.clone()
            })
            .collect()
    }

    fn write_children(&self, parent: ElementRef<'_>, out: &mut String) {
        let raw_text = matches!(parent.value().name(), "script" | "style");
        let mut in_back_matter = false;

        for child in parent.children() {
            match child.value() {
                Node::Text(text) if !in_back_matter => {
                    let text: &str = text;
                    if raw_text {
                        out.push_str(text);
                    } else {
                        out.push_str(&encode_text(text));
                    }
                }
                Node::Comment(comment) if !in_back_matter => {
                    let comment: &str = comment;
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
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
                    self.write_element(element, out);
                }
                _ => {}
            }
        }
    }

    fn write_element(&self, element: ElementRef<'_>, out: &mut String) {
        let name = element.value().name();

        out.push('<');
        out.push_str(name);
        for (attr, value) in self.attributes(element) {
            out.push(' ');
            out.push_str(&attr);
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(&value));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        self.write_children(element, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn attributes(&self, element: ElementRef<'_>) -> Vec<(String, String)> {
        let value = element.value();
        let mut attrs: Vec<(String, String)> = value
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        for (attr, v) in attrs.iter_mut() {
            if matches!(attr.as_str(), "src" | "href") && v.starts_with("//") {
                *v = format!("https:{}", v);
            }
        }

        if value.name() == "a" {
            let href = attrs
                .iter()
                .find(|(k, _)| k == "href")
                .map(|(_, v)| v.clone());
            if let Some(href) = href {
                match self.classify(&href) {
                    Link::Internal(title) => {
                        set_attr(&mut attrs, "href", format!("/article/{}", title));
                        set_attr(&mut attrs, "data-internal", "true".to_string());
                    }
                    Link::External(url) => {
                        set_attr(&mut attrs, "href", url);
                        set_attr(&mut attrs, "target", "_blank".to_string());
                        set_attr(&mut attrs, "rel", "noopener noreferrer".to_string());
                    }
                    Link::Anchor(fragment) => {
                        set_attr(&mut attrs, "href", "javascript:void(0)".to_string());
                        set_attr(&mut attrs, "data-ref", fragment);
                    }
                    Link::Keep => {}
                }
            }
        }

        // Attribute maps are unordered; sort for stable output.
        attrs.sort();
        attrs
    }

    fn classify(&self, href: &str) -> Link {
        if let Some(title) = href.strip_prefix("./") {
            return Link::Internal(title.to_string());
        }
        if let Some(title) = href.strip_prefix("/wiki/") {
            return Link::Internal(title.to_string());
        }
        if href.starts_with("/w/") {
            return Link::External(format!("{}{}", self.site_base, href));
        }
        if let Some(fragment) = href.strip_prefix('#') {
            return Link::Anchor(fragment.to_string());
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return match Url::parse(href) {
                Ok(url) if self.is_site(&url) && url.path().starts_with("/wiki/") => {
                    let title = &url.path()["/wiki/".len()..];
                    Link::Internal(title.to_string())
                }
                _ => Link::External(href.to_string()),
            };
        }
        Link::Keep
    }

    fn is_site(&self, url: &Url) -> bool {
        match (&self.site_host, url.host_str()) {
            (Some(site), Some(host)) => site.eq_ignore_ascii_case(host),
            _ => false,
        }
    }
}

fn set_attr(attrs: &mut Vec<(String, String)>, name: &str, value: String) {
    match attrs.iter_mut().find(|(k, _)| k == name) {
        Some((_, v)) => *v = value,
        None => attrs.push((name.to_string(), value)),
    }
}
