use std::sync::OnceLock;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{PerformanceSource, ResourceSource};
use crate::domain::probes::{NavigationTiming, PageFetch, PerformanceProbe, ResourceEntry, ResourceProbe};

/// Performance source for setups without a browser; always reports
/// itself as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackPerformanceSource;

#[async_trait]
impl PerformanceSource for FallbackPerformanceSource {
    async fn audit(&self, _url: &str) -> anyhow::Result<PerformanceProbe> {
        Ok(PerformanceProbe::Unavailable)
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Lists the resources a page references in its markup.
///
/// Nothing is downloaded, so sub-resource sizes are 0 and navigation
/// timing is unknown; only the document itself has a size.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupResourceSource;

impl MarkupResourceSource {
    pub fn scan(page: &PageFetch) -> ResourceProbe {
        static SCRIPTS: OnceLock<Selector> = OnceLock::new();
        static STYLESHEETS: OnceLock<Selector> = OnceLock::new();
        static IMAGES: OnceLock<Selector> = OnceLock::new();
        let scripts = SCRIPTS.get_or_init(|| Selector::parse("script[src]").unwrap());
        let stylesheets =
            STYLESHEETS.get_or_init(|| Selector::parse(r#"link[rel="stylesheet"][href]"#).unwrap());
        let images = IMAGES.get_or_init(|| Selector::parse("img[src]").unwrap());

        let html = Html::parse_document(&page.body);
        let document_size = page.body.len() as u64;

        let mut entries = vec![ResourceEntry {
            url: page.final_url.clone(),
            resource_type: Some("document".to_string()),
            content_type: page
                .headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            status_code: Some(page.status_code),
            byte_size: document_size,
        }];

        let referenced = [
            (scripts, "src", "script"),
            (stylesheets, "href", "stylesheet"),
            (images, "src", "image"),
        ];
        for (selector, attr, kind) in referenced {
            for element in html.select(selector) {
                if let Some(target) = element.value().attr(attr) {
                    entries.push(ResourceEntry {
                        url: resolve(&page.final_url, target),
                        resource_type: Some(kind.to_string()),
                        content_type: None,
                        status_code: None,
                        byte_size: 0,
                    });
                }
            }
        }

        ResourceProbe {
            entries,
            timing: NavigationTiming::default(),
            document_size,
        }
    }
}

fn resolve(base: &str, target: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(target))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| target.to_string())
}

#[async_trait]
impl ResourceSource for MarkupResourceSource {
    async fn collect(&self, page: &PageFetch) -> anyhow::Result<ResourceProbe> {
        Ok(Self::scan(page))
    }

    fn name(&self) -> &'static str {
        "markup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    #[test]
    fn test_scan_lists_referenced_resources() {
        let page = fixtures::page_fetch(
            "https://example.com/blog/",
            r#"<html><head>
                <script src="/app.js"></script>
                <script>inline()</script>
                <link rel="stylesheet" href="style.css">
                <link rel="icon" href="/favicon.ico">
            </head><body><img src="https://cdn.example.com/a.png"><img></body></html>"#,
        );

        let probe = MarkupResourceSource::scan(&page);
        let kinds: Vec<_> = probe
            .entries
            .iter()
            .map(|e| e.resource_type.as_deref().unwrap_or(""))
            .collect();

        assert_eq!(kinds, vec!["document", "script", "stylesheet", "image"]);
        assert_eq!(probe.entries[1].url, "https://example.com/app.js");
        assert_eq!(probe.entries[2].url, "https://example.com/blog/style.css");
        assert_eq!(probe.document_size, page.body.len() as u64);
        assert_eq!(probe.timing, NavigationTiming::default());
    }

    #[tokio::test]
    async fn test_fallback_source_is_unavailable() {
        let probe = FallbackPerformanceSource.audit("https://example.com").await.unwrap();
        assert!(matches!(probe, PerformanceProbe::Unavailable));
    }
}
