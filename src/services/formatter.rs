use crate::models::{ReportRecord, SeoReport};
use crate::services::advisor::{self, DESCRIPTION_LENGTH, TITLE_LENGTH};

pub const NOT_SET: &str = "not set";
pub const DEFAULT_ROBOTS: &str = "default";
pub const NO_H1: &str = "none";
pub const UNAVAILABLE: &str = "unavailable";
pub const TIMING_UNAVAILABLE: &str = "Performance timing data unavailable";

const SET: &str = "set";
const OK: &str = "✅";
const MISSING: &str = "❌";
const WARN: &str = "⚠️";

/// Turns a [`ReportRecord`] into the Markdown report. Pure: the same record
/// always renders to the same bytes.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, record: &ReportRecord) -> String {
        let sections = [
            self.header(record),
            self.page_section(record),
            self.html_section(record),
            self.css_section(record),
            self.javascript_section(record),
            self.accessibility_section(record),
            self.seo_section(&record.seo),
            self.timing_section(record),
            self.tips_section(),
            self.footer(),
        ];

        sections.join("\n---\n\n")
    }

    fn header(&self, record: &ReportRecord) -> String {
        format!(
            "# Web Page Debug Report\n\n**Generated**: {}  \n**Page URL**: {}\n",
            record.timestamp, record.page.url
        )
    }

    fn page_section(&self, record: &ReportRecord) -> String {
        let page = &record.page;
        let viewport = page
            .viewport
            .map(|v| v.to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        let scroll = page
            .scroll_position
            .map(|s| s.to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string());

        let mut out = String::from("## 📄 Page Info\n\n| Property | Value |\n|------|-----|\n");
        out.push_str(&format!("| Title | {} |\n", cell(&page.title)));
        out.push_str(&format!("| Viewport | {} |\n", viewport));
        out.push_str(&format!("| Scroll position | {} |\n", scroll));
        out
    }

    fn html_section(&self, record: &ReportRecord) -> String {
        let html = &record.html;
        let semantic = &html.semantic_elements;

        let mut out = String::from("## 🏗️ HTML Structure\n\n");
        out.push_str(&format!("- **Total elements**: {}\n", html.total_elements));
        out.push_str(&format!("- **Forms**: {}\n", html.forms));
        out.push_str(&format!("- **Buttons**: {}\n", html.buttons));
        out.push_str(&format!("- **Inputs**: {}\n", html.inputs));
        out.push_str(&format!("- **Images**: {}\n", html.images));
        out.push_str(&format!("- **Links**: {}\n", html.links));
        out.push_str("\n### Semantic elements\n");
        out.push_str(&format!("- Headings (h1-h6): {}\n", semantic.headers));
        out.push_str(&format!("- Section: {}\n", semantic.sections));
        out.push_str(&format!("- Article: {}\n", semantic.articles));
        out.push_str(&format!("- Nav: {}\n", semantic.navs));
        out
    }

    fn css_section(&self, record: &ReportRecord) -> String {
        let css = &record.css;

        let mut out = String::from("## 🎨 CSS\n\n");
        out.push_str(&format!("- **Stylesheets**: {}\n", css.stylesheets));
        out.push_str(&format!("- **Elements with inline styles**: {}\n", css.inline_styles));
        out.push_str("\n### Computed body style\n```css\n");
        match css.body_styles {
            Some(ref styles) => {
                out.push_str(&format!("color: {};\n", styles.color));
                out.push_str(&format!("background-color: {};\n", styles.background_color));
                out.push_str(&format!("font-size: {};\n", styles.font_size));
                out.push_str(&format!("font-family: {};\n", styles.font_family));
            }
            None => out.push_str("/* computed styles unavailable */\n"),
        }
        out.push_str("```\n");
        out
    }

    fn javascript_section(&self, record: &ReportRecord) -> String {
        let js = &record.javascript;

        let mut out = String::from("## ⚡ JavaScript\n\n");
        out.push_str(&format!("- **Scripts**: {}\n", js.scripts));
        out.push_str("- **Detected libraries**:\n");
        for (name, present) in [
            ("jQuery", js.has_jquery),
            ("React", js.has_react),
            ("Vue", js.has_vue),
            ("Angular", js.has_angular),
        ] {
            out.push_str(&format!("  - {}: {}\n", name, if present { OK } else { MISSING }));
        }
        out
    }

    fn accessibility_section(&self, record: &ReportRecord) -> String {
        let a11y = &record.accessibility;

        let mut out = String::from("## ♿ Accessibility\n\n");
        out.push_str(&format!("{} **Issues to review**:\n", WARN));
        out.push_str(&format!("- Images missing alt attribute: **{}**\n", a11y.missing_alt));
        out.push_str(&format!("- Empty links: **{}**\n", a11y.empty_links));
        out.push_str(&format!("- Inputs possibly missing a label: **{}**\n", a11y.missing_labels));
        out
    }

    fn seo_section(&self, seo: &SeoReport) -> String {
        let meta = &seo.meta;
        let og = &seo.og;
        let twitter = &seo.twitter;
        let structure = &seo.structure;
        let perf = &seo.performance;

        let mut out = String::from("## 🔍 SEO\n\n");

        out.push_str("### Meta tags\n| Tag | Content | Status |\n|------|------|------|\n");
        out.push_str(&row("Description", clipped(&meta.description, 50), mark(&meta.description, MISSING)));
        out.push_str(&row("Keywords", clipped(&meta.keywords, 50), mark(&meta.keywords, WARN)));
        out.push_str(&row("Author", shown(&meta.author), mark(&meta.author, WARN)));
        out.push_str(&row("Viewport", shown(&meta.viewport), mark(&meta.viewport, MISSING)));
        out.push_str(&row(
            "Robots",
            cell(meta.robots.as_deref().unwrap_or(DEFAULT_ROBOTS)),
            OK,
        ));

        out.push_str("\n### Open Graph\n| Property | Content | Status |\n|------|------|------|\n");
        out.push_str(&row("og:title", clipped(&og.title, 40), mark(&og.title, MISSING)));
        out.push_str(&row("og:description", clipped(&og.description, 40), mark(&og.description, MISSING)));
        out.push_str(&row("og:image", presence(&og.image), mark(&og.image, MISSING)));
        out.push_str(&row("og:url", presence(&og.url), mark(&og.url, WARN)));
        out.push_str(&row("og:type", shown(&og.kind), mark(&og.kind, WARN)));

        out.push_str("\n### Twitter Card\n| Property | Content | Status |\n|------|------|------|\n");
        out.push_str(&row("twitter:card", shown(&twitter.card), mark(&twitter.card, MISSING)));
        out.push_str(&row("twitter:title", clipped(&twitter.title, 40), mark(&twitter.title, MISSING)));
        out.push_str(&row(
            "twitter:description",
            clipped(&twitter.description, 40),
            mark(&twitter.description, WARN),
        ));
        out.push_str(&row("twitter:image", presence(&twitter.image), mark(&twitter.image, MISSING)));

        let h1_status = match structure.h1_count {
            1 => OK.to_string(),
            0 => format!("{} missing H1", MISSING),
            _ => format!("{} multiple H1", WARN),
        };
        out.push_str("\n### Page structure\n");
        out.push_str(&format!("- **H1 count**: {} {}\n", structure.h1_count, h1_status));
        out.push_str(&format!(
            "- **H1 text**: {}\n",
            structure.h1_text.as_deref().unwrap_or(NO_H1)
        ));
        out.push_str(&format!("- **Canonical URL**: {}\n", flagged(&structure.canonical)));
        out.push_str(&format!("- **Favicon**: {}\n", flagged(&structure.favicon)));
        out.push_str(&format!(
            "- **Language**: {}\n",
            match structure.language {
                Some(ref lang) => lang.clone(),
                None => format!("{} {}", MISSING, NOT_SET),
            }
        ));

        out.push_str("\n### SEO indicators\n");
        out.push_str(&format!(
            "- **Title length**: {} characters {}\n",
            perf.title_length,
            in_range(TITLE_LENGTH.contains(&perf.title_length))
        ));
        out.push_str(&format!(
            "- **Description length**: {} characters {}\n",
            perf.meta_desc_length,
            in_range(DESCRIPTION_LENGTH.contains(&perf.meta_desc_length))
        ));
        out.push_str(&format!(
            "- **Structured data**: {} ({} blocks)\n",
            if perf.has_schema_org {
                format!("{} present", OK)
            } else {
                format!("{} missing", MISSING)
            },
            perf.schema_count
        ));

        out.push_str("\n### 💡 SEO suggestions\n");
        out.push_str(&self.findings_list(seo));
        out
    }

    fn findings_list(&self, seo: &SeoReport) -> String {
        advisor::findings(seo)
            .iter()
            .map(|finding| format!("- {} {}\n", finding.severity().icon(), finding))
            .collect()
    }

    fn timing_section(&self, record: &ReportRecord) -> String {
        let mut out = String::from("## ⏱️ Performance\n\n");
        match record.performance {
            Some(timing) => {
                out.push_str(&format!("- Page load time: {}ms\n", timing.page_load_time));
                out.push_str(&format!("- DOM content loaded: {}ms\n", timing.dom_content_loaded));
                out.push_str(&format!("- DOM interactive: {}ms\n", timing.dom_interactive));
            }
            None => {
                out.push_str(TIMING_UNAVAILABLE);
                out.push('\n');
            }
        }
        out
    }

    fn tips_section(&self) -> String {
        String::from(
            "## 💡 How to use this report\n\n\
             Paste this report into your AI assistant and describe the problem you are seeing:\n\
             - Styling: \"this CSS property has no effect...\"\n\
             - Interaction: \"clicking the button does nothing...\"\n\
             - Performance: \"the page loads too slowly...\"\n\
             - SEO: \"the page ranks poorly...\"\n\
             - Layout: \"the mobile layout is broken...\"\n\n\
             The structured data above lets the assistant pinpoint the cause quickly.\n",
        )
    }

    fn footer(&self) -> String {
        format!(
            "*Generated by {} v{}*\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn row(label: &str, content: String, status: &str) -> String {
    format!("| {} | {} | {} |\n", label, content, status)
}

/// Keeps a value inside one table cell.
fn cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

fn shown(value: &Option<String>) -> String {
    cell(value.as_deref().unwrap_or(NOT_SET))
}

fn clipped(value: &Option<String>, limit: usize) -> String {
    match value {
        Some(text) if text.chars().count() > limit => {
            let head: String = text.chars().take(limit).collect();
            format!("{}...", cell(&head))
        }
        Some(text) => cell(text),
        None => NOT_SET.to_string(),
    }
}

fn presence(value: &Option<String>) -> String {
    let text = if value.is_some() { SET } else { NOT_SET };
    text.to_string()
}

fn mark<'a>(value: &Option<String>, when_missing: &'a str) -> &'a str {
    if value.is_some() {
        OK
    } else {
        when_missing
    }
}

fn flagged(value: &Option<String>) -> String {
    if value.is_some() {
        format!("{} {}", OK, SET)
    } else {
        format!("{} {}", MISSING, NOT_SET)
    }
}

fn in_range(good: bool) -> &'static str {
    if good {
        OK
    } else {
        WARN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadTiming;
    use crate::services::testing::sample_record;
    use pretty_assertions::assert_eq;

    #[test]
    fn rendering_is_deterministic() {
        let record = sample_record();
        let formatter = ReportFormatter::new();
        assert_eq!(formatter.render(&record), formatter.render(&record));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let report = ReportFormatter::new().render(&sample_record());
        let headings = [
            "# Web Page Debug Report",
            "## 📄 Page Info",
            "## 🏗️ HTML Structure",
            "## 🎨 CSS",
            "## ⚡ JavaScript",
            "## ♿ Accessibility",
            "## 🔍 SEO",
            "### Meta tags",
            "### Open Graph",
            "### Twitter Card",
            "### Page structure",
            "### SEO indicators",
            "### 💡 SEO suggestions",
            "## ⏱️ Performance",
            "## 💡 How to use this report",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| report.find(h).unwrap_or_else(|| panic!("missing {}", h)))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn timestamp_is_carried_verbatim() {
        let mut record = sample_record();
        record.timestamp = "2026/10/19 08:15:02".into();
        let report = ReportFormatter::new().render(&record);
        assert!(report.contains("**Generated**: 2026/10/19 08:15:02"));
    }

    #[test]
    fn absent_values_render_sentinels() {
        let mut record = sample_record();
        record.seo.meta.robots = None;
        record.seo.meta.viewport = None;
        record.seo.structure.h1_text = None;
        record.seo.structure.h1_count = 0;
        record.page.viewport = None;
        record.css.body_styles = None;

        let report = ReportFormatter::new().render(&record);
        assert!(report.contains("| Robots | default | ✅ |"));
        assert!(report.contains("| Viewport | not set | ❌ |"));
        assert!(report.contains("- **H1 text**: none"));
        assert!(report.contains("- **H1 count**: 0 ❌ missing H1"));
        assert!(report.contains("| Viewport | unavailable |"));
        assert!(report.contains("/* computed styles unavailable */"));
    }

    #[test]
    fn timing_block_or_unavailable_text() {
        let mut record = sample_record();
        record.performance = None;
        let report = ReportFormatter::new().render(&record);
        assert!(report.contains(TIMING_UNAVAILABLE));

        record.performance = Some(LoadTiming {
            page_load_time: 1234,
            dom_content_loaded: 800,
            dom_interactive: 650,
        });
        let report = ReportFormatter::new().render(&record);
        assert!(!report.contains(TIMING_UNAVAILABLE));
        assert!(report.contains("- Page load time: 1234ms"));
        assert!(report.contains("- DOM interactive: 650ms"));
    }

    #[test]
    fn long_cells_are_clipped_and_pipes_escaped() {
        let mut record = sample_record();
        record.seo.meta.description = Some(format!("a|b{}", "c".repeat(80)));
        let report = ReportFormatter::new().render(&record);
        let expected = format!("| Description | a\\|b{}... | ✅ |", "c".repeat(47));
        assert!(report.contains(&expected), "{}", report);
    }

    #[test]
    fn suggestions_list_embeds_findings() {
        let mut record = sample_record();
        record.seo.structure.h1_count = 3;
        let report = ReportFormatter::new().render(&record);
        assert!(report.contains("- ⚠️ **Multiple H1 headings**: use a single H1 per page, found 3"));
    }

    #[test]
    fn healthy_record_reports_no_issues() {
        let report = ReportFormatter::new().render(&sample_record());
        assert!(report.contains("- ✅ SEO setup looks good, no obvious issues found"));
    }
}
