use html_escape::decode_html_entities;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::app::{Result, SwipediaError};
use crate::domain::title::encode_route;
use crate::domain::{ArticleSection, ArticleSummary, Thumbnail};

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    pageid: Option<u64>,
    title: String,
    #[serde(default)]
    extract: String,
    thumbnail: Option<ThumbnailResponse>,
    content_urls: Option<ContentUrls>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    source: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    lead: Option<LeadResponse>,
    remaining: Option<RemainingResponse>,
}

#[derive(Debug, Deserialize)]
struct LeadResponse {
    text: Option<String>,
    #[serde(default)]
    sections: Vec<SectionResponse>,
}

#[derive(Debug, Deserialize)]
struct RemainingResponse {
    #[serde(default)]
    sections: Vec<SectionResponse>,
}

#[derive(Debug, Deserialize)]
struct SectionResponse {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    line: String,
    #[serde(default)]
    toclevel: u8,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParseBody>,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    text: Option<ParseText>,
}

#[derive(Debug, Deserialize)]
struct ParseText {
    #[serde(rename = "*")]
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    #[serde(default)]
    pages: Vec<serde_json::Value>,
}

/// Turns upstream JSON documents into domain values.
#[derive(Debug, Clone)]
pub struct Normalizer {
    site_base: String,
}

impl Normalizer {
    pub fn new(site_base: impl Into<String>) -> Self {
        Self {
            site_base: site_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn summary(&self, body: &[u8]) -> Result<ArticleSummary> {
        let response: SummaryResponse = parse_json(body)?;
        self.transform_summary(response)
    }

    /// Structured sections: the lead first, then every non-blank section in
    /// source order with its level shifted one below the toc level.
    pub fn sections(&self, body: &[u8]) -> Result<Vec<ArticleSection>> {
        let response: SectionsResponse = parse_json(body)?;
        let mut sections = Vec::new();

        if let Some(lead) = response.lead {
            let text = lead
                .text
                .or_else(|| lead.sections.into_iter().next().map(|s| s.text))
                .unwrap_or_default();
            if !text.trim().is_empty() {
                sections.push(ArticleSection {
                    id: "lead".to_string(),
                    title: "Introduction".to_string(),
                    content: text,
                    level: 1,
                });
            }
        }

        if let Some(remaining) = response.remaining {
            for section in remaining.sections {
                if section.text.trim().is_empty() {
                    continue;
                }
                sections.push(ArticleSection {
                    id: section.id.to_string(),
                    title: decode_html_entities(&section.line).to_string(),
                    content: section.text,
                    level: section.toclevel.saturating_add(1),
                });
            }
        }

        Ok(sections)
    }

    /// The whole rendered body as a single synthetic section.
    pub fn raw_content(&self, body: &[u8]) -> Result<Vec<ArticleSection>> {
        let response: ParseResponse = parse_json(body)?;
        let html = response
            .parse
            .and_then(|p| p.text)
            .and_then(|t| t.html)
            .unwrap_or_default();

        if html.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![ArticleSection {
            id: "main".to_string(),
            title: "Article Content".to_string(),
            content: html,
            level: 1,
        }])
    }

    /// Related pages, capped at `limit`. Entries that do not parse are skipped.
    pub fn related(&self, body: &[u8], limit: usize) -> Result<Vec<ArticleSummary>> {
        let response: RelatedResponse = parse_json(body)?;

        let related = response
            .pages
            .into_iter()
            .filter_map(|page| {
                serde_json::from_value::<SummaryResponse>(page)
                    .ok()
                    .and_then(|s| self.transform_summary(s).ok())
            })
            .take(limit)
            .collect();

        Ok(related)
    }

    fn transform_summary(&self, response: SummaryResponse) -> Result<ArticleSummary> {
        let pageid = response.pageid.ok_or_else(|| {
            SwipediaError::ContentParse(format!("summary for '{}' has no page id", response.title))
        })?;

        let title = decode_html_entities(&response.title).to_string();
        let page_url = response
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page)
            .filter(|page| !page.is_empty())
            .unwrap_or_else(|| self.fallback_page_url(&title));

        Ok(ArticleSummary {
            id: pageid.to_string(),
            extract: decode_html_entities(&response.extract).to_string(),
            thumbnail: response.thumbnail.map(|t| Thumbnail {
                url: t.source,
                width: t.width,
                height: t.height,
            }),
            page_url,
            timestamp: response.timestamp,
            title,
        })
    }

    pub fn fallback_page_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.site_base, encode_route(title))
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| SwipediaError::ContentParse(e.to_string()))
}
