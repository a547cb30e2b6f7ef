use serde::{Deserialize, Serialize};
use std::fmt;

/// One-shot snapshot of everything the inspector read from a page.
///
/// Absent values are `None` throughout; display placeholders are only
/// substituted when the record is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub timestamp: String,
    pub page: PageInfo,
    pub html: HtmlStats,
    pub css: CssStats,
    pub javascript: JavascriptStats,
    pub accessibility: AccessibilityStats,
    pub seo: SeoReport,
    pub performance: Option<LoadTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    pub url: String,
    pub viewport: Option<Viewport>,
    pub scroll_position: Option<ScrollOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for ScrollOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {}, Y: {}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlStats {
    pub total_elements: usize,
    pub forms: usize,
    pub buttons: usize,
    pub inputs: usize,
    pub images: usize,
    pub links: usize,
    pub semantic_elements: SemanticElements,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticElements {
    pub headers: usize,
    pub sections: usize,
    pub articles: usize,
    pub navs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssStats {
    pub stylesheets: usize,
    pub inline_styles: usize,
    pub body_styles: Option<BodyStyles>,
}

/// Computed style of `document.body` at inspection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyStyles {
    pub color: String,
    pub background_color: String,
    pub font_size: String,
    pub font_family: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavascriptStats {
    pub scripts: usize,
    #[serde(rename = "hasJQuery")]
    pub has_jquery: bool,
    pub has_react: bool,
    pub has_vue: bool,
    pub has_angular: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityStats {
    pub missing_alt: usize,
    pub empty_links: usize,
    pub missing_labels: usize,
}

impl AccessibilityStats {
    /// Issue total shown in the stats summary. Missing labels are reported
    /// separately and not part of this figure.
    pub fn issue_count(&self) -> usize {
        self.missing_alt + self.empty_links
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub meta: MetaTags,
    pub og: OpenGraph,
    pub twitter: TwitterCard,
    pub structure: PageStructure,
    pub performance: SeoIndicators,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTags {
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub viewport: Option<String>,
    pub robots: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl OpenGraph {
    /// Title, description and image are the tags social previews need.
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.description.is_some() && self.image.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterCard {
    pub card: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructure {
    pub h1_count: usize,
    pub h1_text: Option<String>,
    pub canonical: Option<String>,
    pub favicon: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoIndicators {
    pub title_length: usize,
    pub meta_desc_length: usize,
    pub has_schema_org: bool,
    pub schema_count: usize,
}

/// Navigation timing deltas in milliseconds, relative to navigation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTiming {
    pub page_load_time: i64,
    pub dom_content_loaded: i64,
    pub dom_interactive: i64,
}
