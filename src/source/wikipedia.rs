use async_trait::async_trait;
use tracing::warn;
use url::Url;

use crate::app::{Result, SwipediaError};
use crate::domain::title::to_path_form;
use crate::domain::{ArticleSection, ArticleSummary};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::source::{ContentSource, SourceConfig, MAX_RELATED};

/// Wikipedia REST API with an action-API fallback for article bodies.
pub struct WikipediaSource<F> {
    fetcher: F,
    normalizer: Normalizer,
    api_base: Url,
    action_api: Url,
}

impl<F: Fetcher + Send + Sync> WikipediaSource<F> {
    pub fn new(fetcher: F, config: &SourceConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base)?;
        let action_api = Url::parse(&config.action_api)?;

        if api_base.cannot_be_a_base() {
            return Err(SwipediaError::Config(format!(
                "API base is not a hierarchical URL: {}",
                config.api_base
            )));
        }

        Ok(Self {
            fetcher,
            normalizer: Normalizer::new(config.site_base.clone()),
            api_base,
            action_api,
        })
    }

    fn rest_url(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SwipediaError::Config(format!("Invalid API base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn title_url(&self, endpoint: &str, title: &str) -> Result<String> {
        let path_title = to_path_form(title);
        self.rest_url(&["page", endpoint, &path_title])
    }

    fn parse_url(&self, title: &str) -> String {
        let mut url = self.action_api.clone();
        url.query_pairs_mut()
            .append_pair("action", "parse")
            .append_pair("page", &to_path_form(title))
            .append_pair("prop", "text|sections")
            .append_pair("format", "json")
            .append_pair("origin", "*");
        url.into()
    }
}

#[async_trait]
impl<F: Fetcher + Send + Sync> ContentSource for WikipediaSource<F> {
    async fn fetch_random_summary(&self) -> Result<ArticleSummary> {
        let url = self.rest_url(&["page", "random", "summary"])?;
        let body = self.fetcher.fetch(&url).await?;
        self.normalizer.summary(&body)
    }

    async fn fetch_summary_by_title(&self, title: &str) -> Result<ArticleSummary> {
        let url = self.title_url("summary", title)?;
        let body = self.fetcher.fetch(&url).await?;
        self.normalizer.summary(&body)
    }

    async fn fetch_sections(&self, title: &str) -> Result<Vec<ArticleSection>> {
        let url = self.title_url("mobile-sections", title)?;
        let body = self.fetcher.fetch(&url).await?;
        self.normalizer.sections(&body)
    }

    async fn fetch_raw_content(&self, title: &str) -> Result<Vec<ArticleSection>> {
        let body = self.fetcher.fetch(&self.parse_url(title)).await?;
        self.normalizer.raw_content(&body)
    }

    async fn fetch_related(&self, title: &str) -> Vec<ArticleSummary> {
        let result = async {
            let url = self.title_url("related", title)?;
            let body = self.fetcher.fetch(&url).await?;
            self.normalizer.related(&body, MAX_RELATED)
        }
        .await;

        match result {
            Ok(related) => related,
            Err(e) => {
                warn!("Failed to fetch related articles for '{}': {}", title, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ErrorKind;
    use crate::testing::FakeFetcher;

    const API: &str = "https://en.wikipedia.org/api/rest_v1";

    fn summary_json(id: u64, title: &str) -> String {
        format!(
            r#"{{ "pageid": {}, "title": "{}", "extract": "About {}." }}"#,
            id, title, title
        )
    }

    fn source(fetcher: FakeFetcher) -> WikipediaSource<FakeFetcher> {
        WikipediaSource::new(fetcher, &SourceConfig::default()).unwrap()
    }

    fn parse_url(title: &str) -> String {
        format!(
            "https://en.wikipedia.org/w/api.php?action=parse&page={}&prop=text%7Csections&format=json&origin=*",
            title
        )
    }

    #[tokio::test]
    async fn test_random_summary() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(
            &format!("{}/page/random/summary", API),
            &summary_json(7, "Random page"),
        );
        let source = source(fetcher);

        let summary = source.fetch_random_summary().await.unwrap();
        assert_eq!(summary.id, "7");
        assert_eq!(summary.title, "Random page");
    }

    #[tokio::test]
    async fn test_title_is_encoded_as_path_segment() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(
            &format!("{}/page/summary/AC%2FDC_live", API),
            &summary_json(1, "AC/DC live"),
        );
        let source = source(fetcher);

        let summary = source.fetch_summary_by_title("AC/DC live").await.unwrap();
        assert_eq!(summary.title, "AC/DC live");
    }

    #[tokio::test]
    async fn test_summary_not_found() {
        let fetcher = FakeFetcher::new();
        fetcher.not_found(&format!("{}/page/summary/Missing", API));
        let source = source(fetcher);

        let err = source.fetch_summary_by_title("Missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_full_article_with_structured_sections() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(&format!("{}/page/summary/Rust", API), &summary_json(3, "Rust"));
        fetcher.respond(
            &format!("{}/page/mobile-sections/Rust", API),
            r#"{ "lead": { "text": "<p>Lead</p>" }, "remaining": { "sections": [] } }"#,
        );
        fetcher.respond(
            &format!("{}/page/related/Rust", API),
            &format!(r#"{{ "pages": [{}] }}"#, summary_json(4, "Iron")),
        );
        let source = source(fetcher);

        let article = source.fetch_full_article("Rust").await.unwrap();
        assert_eq!(article.id(), "3");
        assert_eq!(article.sections.len(), 1);
        assert_eq!(article.sections[0].id, "lead");
        assert_eq!(article.related.len(), 1);
        assert!(article.fast_facts.is_none());
        assert!(article.categories.is_none());
        assert!(!source.fetcher.requested().contains(&parse_url("Rust")));
    }

    #[tokio::test]
    async fn test_zero_sections_falls_back_to_raw_content() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(&format!("{}/page/summary/Stub", API), &summary_json(5, "Stub"));
        fetcher.respond(&format!("{}/page/mobile-sections/Stub", API), "{}");
        fetcher.respond(
            &parse_url("Stub"),
            r#"{ "parse": { "text": { "*": "<p>Whole body</p>" } } }"#,
        );
        let source = source(fetcher);

        let article = source.fetch_full_article("Stub").await.unwrap();
        assert_eq!(article.sections.len(), 1);
        assert_eq!(article.sections[0].id, "main");
        assert_eq!(article.sections[0].title, "Article Content");
        assert!(article.related.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sections_fall_back_to_raw_content() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(&format!("{}/page/summary/Stub", API), &summary_json(5, "Stub"));
        fetcher.fail(&format!("{}/page/mobile-sections/Stub", API));
        fetcher.respond(
            &parse_url("Stub"),
            r#"{ "parse": { "text": { "*": "<p>Whole body</p>" } } }"#,
        );
        let source = source(fetcher);

        let article = source.fetch_full_article("Stub").await.unwrap();
        assert_eq!(article.sections[0].id, "main");
    }

    #[tokio::test]
    async fn test_no_sections_anywhere_still_succeeds() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(&format!("{}/page/summary/Stub", API), &summary_json(5, "Stub"));
        fetcher.respond(&format!("{}/page/mobile-sections/Stub", API), "{}");
        fetcher.respond(&parse_url("Stub"), "{}");
        let source = source(fetcher);

        let article = source.fetch_full_article("Stub").await.unwrap();
        assert!(article.sections.is_empty());
        assert!(article.related.is_empty());
    }

    #[tokio::test]
    async fn test_summary_failure_is_fatal() {
        let fetcher = FakeFetcher::new();
        fetcher.fail(&format!("{}/page/summary/Down", API));
        let source = source(fetcher);

        let err = source.fetch_full_article("Down").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_related_failure_is_empty() {
        let fetcher = FakeFetcher::new();
        fetcher.fail(&format!("{}/page/related/Anything", API));
        let source = source(fetcher);

        assert!(source.fetch_related("Anything").await.is_empty());
    }

    #[test]
    fn test_rejects_invalid_api_base() {
        let config = SourceConfig {
            api_base: "not a url".to_string(),
            ..SourceConfig::default()
        };
        assert!(WikipediaSource::new(FakeFetcher::new(), &config).is_err());
    }
}
