use crate::models::{
    AccessibilityStats, BodyStyles, CssStats, HtmlStats, JavascriptStats, LoadTiming, MetaTags,
    OpenGraph, PageInfo, PageStructure, ReportRecord, ScrollOffset, SemanticElements,
    SeoIndicators, SeoReport, TwitterCard, Viewport,
};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const H1_TEXT_LIMIT: usize = 50;
const H1_SEPARATOR: &str = " | ";

lazy_static! {
    static ref HTML_WHITESPACE: Regex = Regex::new(r"[ \t\n\r\x0C]+").unwrap();
    static ref JQUERY_SRC: Regex = Regex::new(r"(?i)\bjquery\b").unwrap();
    static ref REACT_SRC: Regex = Regex::new(r"(?i)\breact(-dom)?\b").unwrap();
    static ref VUE_SRC: Regex = Regex::new(r"(?i)\bvue\b").unwrap();
    static ref ANGULAR_SRC: Regex = Regex::new(r"(?i)\bangular(js)?\b").unwrap();
}

/// Library globals probed in the live page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LibraryFlags {
    pub jquery: bool,
    pub react: bool,
    pub vue: bool,
    pub angular: bool,
}

/// Values only a live page can provide. Every field is optional: an
/// inspector that cannot observe one leaves it `None`.
#[derive(Debug, Clone, Default)]
pub struct LiveSignals {
    pub title: Option<String>,
    pub viewport: Option<Viewport>,
    pub scroll: Option<ScrollOffset>,
    pub stylesheets: Option<usize>,
    pub body_styles: Option<BodyStyles>,
    pub libraries: Option<LibraryFlags>,
    pub timing: Option<LoadTiming>,
}

/// Read-only structural analysis of a parsed document.
pub struct DomAnalyzer;

impl DomAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the full record. Never fails: unmatched selectors simply
    /// produce zero counts or absent values.
    pub fn analyze(
        &self,
        html: &str,
        page_url: &Url,
        live: LiveSignals,
        timestamp: String,
    ) -> ReportRecord {
        let document = Html::parse_document(html);

        let title = live
            .title
            .clone()
            .unwrap_or_else(|| self.extract_title(&document));

        let libraries = live
            .libraries
            .unwrap_or_else(|| self.guess_libraries(&document));

        let seo = self.extract_seo(&document, page_url, &title);

        let record = ReportRecord {
            timestamp,
            page: PageInfo {
                title,
                url: page_url.to_string(),
                viewport: live.viewport,
                scroll_position: live.scroll,
            },
            html: self.extract_html_stats(&document),
            css: CssStats {
                stylesheets: live
                    .stylesheets
                    .unwrap_or_else(|| count(&document, "link[rel~='stylesheet'], style")),
                inline_styles: count(&document, "[style]"),
                body_styles: live.body_styles,
            },
            javascript: JavascriptStats {
                scripts: count(&document, "script"),
                has_jquery: libraries.jquery,
                has_react: libraries.react,
                has_vue: libraries.vue,
                has_angular: libraries.angular,
            },
            accessibility: self.extract_accessibility(&document),
            seo,
            performance: live.timing,
        };

        debug!(
            "Analyzed {}: {} elements, {} h1",
            record.page.url, record.html.total_elements, record.seo.structure.h1_count
        );

        record
    }

    fn extract_html_stats(&self, document: &Html) -> HtmlStats {
        HtmlStats {
            total_elements: count(document, "*"),
            forms: count(document, "form"),
            buttons: count(document, "button"),
            inputs: count(document, "input"),
            images: count(document, "img"),
            links: count(document, "a[href], area[href]"),
            semantic_elements: SemanticElements {
                headers: count(document, "h1, h2, h3, h4, h5, h6"),
                sections: count(document, "section"),
                articles: count(document, "article"),
                navs: count(document, "nav"),
            },
        }
    }

    fn extract_accessibility(&self, document: &Html) -> AccessibilityStats {
        let missing_alt = select_all(document, "img")
            .filter(|img| img.value().attr("alt").is_none())
            .count();

        let empty_links = select_all(document, "a")
            .filter(|a| a.value().attr("href").map_or(true, str::is_empty))
            .count();

        // aria-label counts as a label; <label for> is deliberately not consulted.
        let missing_labels = select_all(document, "input")
            .filter(|input| {
                let kind = input.value().attr("type").unwrap_or("");
                !kind.eq_ignore_ascii_case("submit")
                    && !kind.eq_ignore_ascii_case("button")
                    && input.value().attr("aria-label").is_none()
            })
            .count();

        AccessibilityStats {
            missing_alt,
            empty_links,
            missing_labels,
        }
    }

    fn extract_seo(&self, document: &Html, page_url: &Url, title: &str) -> SeoReport {
        let description = meta_content(document, "meta[name='description']");
        let meta_desc_length = description.as_deref().map_or(0, |d| d.chars().count());

        let h1s: Vec<ElementRef> = select_all(document, "h1").collect();
        let h1_text = h1s
            .iter()
            .map(|h1| {
                let text: String = h1.text().collect();
                text.trim().chars().take(H1_TEXT_LIMIT).collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(H1_SEPARATOR);

        let favicon = link_href(document, "link[rel='icon']", page_url)
            .or_else(|| link_href(document, "link[rel='shortcut icon']", page_url));

        let language = document
            .root_element()
            .value()
            .attr("lang")
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);

        let schema_count = count(document, "script[type='application/ld+json']");

        SeoReport {
            meta: MetaTags {
                keywords: meta_content(document, "meta[name='keywords']"),
                author: meta_content(document, "meta[name='author']"),
                viewport: meta_content(document, "meta[name='viewport']"),
                robots: meta_content(document, "meta[name='robots']"),
                description,
            },
            og: OpenGraph {
                title: meta_content(document, "meta[property='og:title']"),
                description: meta_content(document, "meta[property='og:description']"),
                image: meta_content(document, "meta[property='og:image']"),
                url: meta_content(document, "meta[property='og:url']"),
                kind: meta_content(document, "meta[property='og:type']"),
            },
            twitter: TwitterCard {
                card: meta_content(document, "meta[name='twitter:card']"),
                title: meta_content(document, "meta[name='twitter:title']"),
                description: meta_content(document, "meta[name='twitter:description']"),
                image: meta_content(document, "meta[name='twitter:image']"),
            },
            structure: PageStructure {
                h1_count: h1s.len(),
                h1_text: Some(h1_text).filter(|text| !text.is_empty()),
                canonical: link_href(document, "link[rel='canonical']", page_url),
                favicon,
                language,
            },
            performance: SeoIndicators {
                title_length: title.chars().count(),
                meta_desc_length,
                has_schema_org: schema_count > 0,
                schema_count,
            },
        }
    }

    /// Mirrors `document.title`: first `<title>`, whitespace collapsed.
    fn extract_title(&self, document: &Html) -> String {
        select_all(document, "title")
            .next()
            .map(|element| {
                let raw: String = element.text().collect();
                HTML_WHITESPACE.replace_all(raw.trim(), " ").to_string()
            })
            .unwrap_or_default()
    }

    /// Static fallback for the global probe: look at script URLs.
    fn guess_libraries(&self, document: &Html) -> LibraryFlags {
        let mut flags = LibraryFlags::default();

        for script in select_all(document, "script[src]") {
            let Some(src) = script.value().attr("src") else {
                continue;
            };
            flags.jquery |= JQUERY_SRC.is_match(src);
            flags.react |= REACT_SRC.is_match(src);
            flags.vue |= VUE_SRC.is_match(src);
            flags.angular |= ANGULAR_SRC.is_match(src);
        }

        flags
    }
}

impl Default for DomAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches as `querySelectorAll` sees them: serialized `<template>` content
/// is parsed back as children here, but is not part of the live tree.
fn select_all<'a>(document: &'a Html, selector: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let selector = Selector::parse(selector).ok();
    let elements: Vec<ElementRef<'a>> = match selector {
        Some(ref selector) => document
            .select(selector)
            .filter(|element| !inside_template(element))
            .collect(),
        None => Vec::new(),
    };
    elements.into_iter()
}

fn inside_template(element: &ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map_or(false, |ancestor| ancestor.name() == "template")
    })
}

fn count(document: &Html, selector: &str) -> usize {
    select_all(document, selector).count()
}

/// `content` of the first match; an empty attribute counts as absent.
fn meta_content(document: &Html, selector: &str) -> Option<String> {
    select_all(document, selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

/// `href` of the first match, resolved against the page like the DOM
/// `href` property.
fn link_href(document: &Html, selector: &str, base: &Url) -> Option<String> {
    let href = select_all(document, selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())?;

    Some(
        base.join(href)
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|_| href.to_string()),
    )
}
