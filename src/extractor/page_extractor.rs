use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::domain::models::{
    ContentReport, HeadingCounts, ImageStats, LinkStats, MediaCounts, MetaInfo, ResponsiveDesign,
    SeoReport, StructureCounts, TextStats,
};

/// Pure DOM metrics over an already parsed document.
pub struct PageExtractor;

impl PageExtractor {
    pub fn extract_seo(html: &Html, page_url: &str) -> SeoReport {
        SeoReport {
            meta: Self::extract_meta_info(html),
            headings: Self::count_headings(html),
            images: Self::analyze_images(html),
            links: Self::count_links(html, page_url),
        }
    }

    pub fn extract_content(html: &Html) -> ContentReport {
        static P: OnceLock<Selector> = OnceLock::new();
        static LISTS: OnceLock<Selector> = OnceLock::new();
        static TABLES: OnceLock<Selector> = OnceLock::new();
        static IMAGES: OnceLock<Selector> = OnceLock::new();
        static VIDEOS: OnceLock<Selector> = OnceLock::new();
        let p = P.get_or_init(|| Selector::parse("p").unwrap());
        let lists = LISTS.get_or_init(|| Selector::parse("ul, ol").unwrap());
        let tables = TABLES.get_or_init(|| Selector::parse("table").unwrap());
        let images = IMAGES.get_or_init(|| Selector::parse("img").unwrap());
        let videos = VIDEOS.get_or_init(|| {
            Selector::parse(r#"video, iframe[src*="youtube"], iframe[src*="vimeo"]"#).unwrap()
        });

        let text = Self::extract_body_text(html);
        let word_count = Self::count_words(&text);
        let character_count = text.chars().count();
        let average_word_length = if word_count > 0 {
            (character_count as f64 / word_count as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };
        let paragraphs = html.select(p).count();

        ContentReport {
            text_stats: TextStats {
                word_count,
                character_count,
                average_word_length,
                paragraph_count: paragraphs,
            },
            media: MediaCounts {
                images: html.select(images).count(),
                videos: html.select(videos).count(),
            },
            structure: StructureCounts {
                paragraphs,
                lists: html.select(lists).count(),
                tables: html.select(tables).count(),
            },
            responsive_design: Self::detect_responsive_design(html),
        }
    }

    /// Viewport meta tag plus any `@media` rule in an inline `<style>` block.
    pub fn detect_responsive_design(html: &Html) -> ResponsiveDesign {
        static STYLES: OnceLock<Selector> = OnceLock::new();
        let styles = STYLES.get_or_init(|| Selector::parse("style").unwrap());

        let viewport_meta = Self::has_meta(html, "viewport");
        let media_queries = html.select(styles).any(|style| {
            style
                .text()
                .any(|css| css.to_ascii_lowercase().contains("@media"))
        });
        ResponsiveDesign::new(viewport_meta, media_queries)
    }

    /// Number of elements in the document, `html`/`head`/`body` included.
    pub fn count_elements(html: &Html) -> usize {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("*").unwrap());
        html.select(selector).count()
    }

    fn extract_meta_info(html: &Html) -> MetaInfo {
        let title = Self::extract_title(html);
        let description = Self::extract_meta(html, "description");
        let keywords = Self::extract_meta(html, "keywords");

        MetaInfo {
            title_length: title.chars().count(),
            description_length: description.chars().count(),
            title,
            description,
            keywords,
        }
    }

    /// Text of the first `<title>`, untrimmed; empty when absent.
    pub fn extract_title(html: &Html) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("title").unwrap());
        html.select(selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    /// `content` of the first `meta[name=<name>]`; empty when absent.
    pub fn extract_meta(html: &Html, name: &str) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name]").unwrap());
        html.select(selector)
            .find(|el| el.value().attr("name") == Some(name))
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn has_meta(html: &Html, name: &str) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name]").unwrap());
        html.select(selector).any(|el| {
            el.value()
                .attr("name")
                .is_some_and(|value| value.eq_ignore_ascii_case(name))
        })
    }

    pub fn count_headings(html: &Html) -> HeadingCounts {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector =
            SELECTOR.get_or_init(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

        let mut counts = HeadingCounts::default();
        for element in html.select(selector) {
            match element.value().name() {
                "h1" => counts.h1 += 1,
                "h2" => counts.h2 += 1,
                "h3" => counts.h3 += 1,
                "h4" => counts.h4 += 1,
                "h5" => counts.h5 += 1,
                "h6" => counts.h6 += 1,
                _ => {}
            }
        }
        counts
    }

    /// An image "has alt" when the attribute is present, even if empty.
    pub fn analyze_images(html: &Html) -> ImageStats {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        let mut total = 0;
        let mut with_alt = 0;
        for img in html.select(selector) {
            total += 1;
            if img.value().attr("alt").is_some() {
                with_alt += 1;
            }
        }
        ImageStats::new(total, with_alt)
    }

    /// Prefix-based classification on the raw `href`:
    /// internal = `/...` or the analyzed URL itself, external = any other `http...`.
    pub fn count_links(html: &Html, page_url: &str) -> LinkStats {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

        let mut internal = 0;
        let mut external = 0;
        for anchor in html.select(selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            if href.starts_with('/') || href.starts_with(page_url) {
                internal += 1;
            } else if href.starts_with("http") {
                external += 1;
            }
        }
        LinkStats::new(internal, external)
    }

    /// Visible body text with every whitespace run collapsed to one space.
    pub fn extract_body_text(html: &Html) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("body").unwrap());
        let raw = html
            .select(selector)
            .next()
            .map(|body| body.text().collect::<String>())
            .unwrap_or_default();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Splitting an empty text still yields one (empty) token, so a page
    /// without body text reports 1 word. Stored history depends on this count.
    pub fn count_words(collapsed_text: &str) -> usize {
        collapsed_text.split(' ').count()
    }
}
