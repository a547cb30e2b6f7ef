//! SEO advisory findings derived from the `seo` group of a report.

use crate::models::SeoReport;
use std::fmt;
use std::ops::RangeInclusive;

pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 50..=160;
pub const TITLE_LENGTH: RangeInclusive<usize> = 10..=60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Blocking,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Blocking => "❌",
            Severity::Warning => "⚠️",
            Severity::Info => "✅",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    MissingDescription,
    DescriptionTooShort(usize),
    DescriptionTooLong(usize),
    TitleTooShort(usize),
    TitleTooLong(usize),
    MissingH1,
    MultipleH1(usize),
    MissingCanonical,
    IncompleteOpenGraph,
    NoStructuredData,
    MissingLanguage,
    NoIssues,
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::MissingDescription | Finding::MissingH1 => Severity::Blocking,
            Finding::NoIssues => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = (DESCRIPTION_LENGTH.start(), DESCRIPTION_LENGTH.end());
        let (tlo, thi) = (TITLE_LENGTH.start(), TITLE_LENGTH.end());
        match self {
            Finding::MissingDescription => write!(
                f,
                "**Missing meta description**: search engines cannot show a proper page summary"
            ),
            Finding::DescriptionTooShort(len) => write!(
                f,
                "**Meta description too short**: aim for {}-{} characters, currently only {}",
                lo, hi, len
            ),
            Finding::DescriptionTooLong(len) => write!(
                f,
                "**Meta description too long**: aim for {}-{} characters, {} may be truncated",
                lo, hi, len
            ),
            Finding::TitleTooShort(len) => write!(
                f,
                "**Title too short**: aim for {}-{} characters, currently only {}",
                tlo, thi, len
            ),
            Finding::TitleTooLong(len) => write!(
                f,
                "**Title too long**: aim for {}-{} characters, {} may be truncated",
                tlo, thi, len
            ),
            Finding::MissingH1 => write!(
                f,
                "**Missing H1**: every page should have exactly one H1 heading"
            ),
            Finding::MultipleH1(count) => write!(
                f,
                "**Multiple H1 headings**: use a single H1 per page, found {}",
                count
            ),
            Finding::MissingCanonical => write!(
                f,
                "**Missing canonical URL**: add one to avoid duplicate-content issues"
            ),
            Finding::IncompleteOpenGraph => write!(
                f,
                "**Incomplete Open Graph tags**: og:title, og:description and og:image drive social previews"
            ),
            Finding::NoStructuredData => write!(
                f,
                "**No structured data**: add Schema.org JSON-LD for richer search results"
            ),
            Finding::MissingLanguage => write!(
                f,
                "**Page language not set**: add a lang attribute to the <html> element"
            ),
            Finding::NoIssues => write!(f, "SEO setup looks good, no obvious issues found"),
        }
    }
}

/// Evaluates the rules in their fixed order. Never returns an empty list.
pub fn findings(seo: &SeoReport) -> Vec<Finding> {
    let mut out = Vec::new();

    let desc_len = seo.performance.meta_desc_length;
    if seo.meta.description.is_none() {
        out.push(Finding::MissingDescription);
    } else if desc_len < *DESCRIPTION_LENGTH.start() {
        out.push(Finding::DescriptionTooShort(desc_len));
    } else if desc_len > *DESCRIPTION_LENGTH.end() {
        out.push(Finding::DescriptionTooLong(desc_len));
    }

    let title_len = seo.performance.title_length;
    if title_len < *TITLE_LENGTH.start() {
        out.push(Finding::TitleTooShort(title_len));
    } else if title_len > *TITLE_LENGTH.end() {
        out.push(Finding::TitleTooLong(title_len));
    }

    match seo.structure.h1_count {
        0 => out.push(Finding::MissingH1),
        1 => {}
        n => out.push(Finding::MultipleH1(n)),
    }

    if seo.structure.canonical.is_none() {
        out.push(Finding::MissingCanonical);
    }

    if !seo.og.is_complete() {
        out.push(Finding::IncompleteOpenGraph);
    }

    if !seo.performance.has_schema_org {
        out.push(Finding::NoStructuredData);
    }

    if seo.structure.language.is_none() {
        out.push(Finding::MissingLanguage);
    }

    if out.is_empty() {
        out.push(Finding::NoIssues);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetaTags, OpenGraph, PageStructure, SeoIndicators};
    use pretty_assertions::assert_eq;

    fn healthy() -> SeoReport {
        SeoReport {
            meta: MetaTags {
                description: Some("d".repeat(100)),
                ..Default::default()
            },
            og: OpenGraph {
                title: Some("Title".into()),
                description: Some("Description".into()),
                image: Some("https://example.com/og.png".into()),
                ..Default::default()
            },
            structure: PageStructure {
                h1_count: 1,
                h1_text: Some("Heading".into()),
                canonical: Some("https://example.com/".into()),
                favicon: None,
                language: Some("en".into()),
            },
            performance: SeoIndicators {
                title_length: 30,
                meta_desc_length: 100,
                has_schema_org: true,
                schema_count: 1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn healthy_page_yields_single_no_issues_item() {
        assert_eq!(findings(&healthy()), vec![Finding::NoIssues]);
        assert_eq!(Finding::NoIssues.severity(), Severity::Info);
    }

    #[test]
    fn absent_description_is_blocking_not_length_warning() {
        let mut seo = healthy();
        seo.meta.description = None;
        seo.performance.meta_desc_length = 0;

        let found = findings(&seo);
        assert_eq!(found, vec![Finding::MissingDescription]);
        assert_eq!(found[0].severity(), Severity::Blocking);
    }

    #[test]
    fn description_length_boundaries() {
        let cases = [
            (49, Some(Finding::DescriptionTooShort(49))),
            (50, None),
            (160, None),
            (161, Some(Finding::DescriptionTooLong(161))),
        ];
        for (len, expected) in cases {
            let mut seo = healthy();
            seo.meta.description = Some("d".repeat(len));
            seo.performance.meta_desc_length = len;
            let expected = expected.map(|f| vec![f]).unwrap_or_else(|| vec![Finding::NoIssues]);
            assert_eq!(findings(&seo), expected, "description length {}", len);
        }
    }

    #[test]
    fn title_length_boundaries() {
        let cases = [
            (9, Some(Finding::TitleTooShort(9))),
            (10, None),
            (60, None),
            (61, Some(Finding::TitleTooLong(61))),
        ];
        for (len, expected) in cases {
            let mut seo = healthy();
            seo.performance.title_length = len;
            let expected = expected.map(|f| vec![f]).unwrap_or_else(|| vec![Finding::NoIssues]);
            assert_eq!(findings(&seo), expected, "title length {}", len);
        }
    }

    #[test]
    fn several_h1_is_a_warning_never_missing() {
        let mut seo = healthy();
        seo.structure.h1_count = 3;
        let found = findings(&seo);
        assert_eq!(found, vec![Finding::MultipleH1(3)]);
        assert_eq!(found[0].severity(), Severity::Warning);
        assert!(!found.contains(&Finding::MissingH1));
    }

    #[test]
    fn zero_h1_is_blocking() {
        let mut seo = healthy();
        seo.structure.h1_count = 0;
        assert_eq!(findings(&seo), vec![Finding::MissingH1]);
    }

    #[test]
    fn open_graph_gaps_collapse_into_one_finding() {
        let mut seo = healthy();
        seo.og = OpenGraph::default();
        assert_eq!(findings(&seo), vec![Finding::IncompleteOpenGraph]);

        let mut seo = healthy();
        seo.og.image = None;
        assert_eq!(findings(&seo), vec![Finding::IncompleteOpenGraph]);
    }

    #[test]
    fn og_url_and_type_are_not_required() {
        let seo = healthy();
        assert!(seo.og.url.is_none() && seo.og.kind.is_none());
        assert_eq!(findings(&seo), vec![Finding::NoIssues]);
    }

    #[test]
    fn empty_page_fires_every_rule_in_order() {
        let seo = SeoReport::default();
        assert_eq!(
            findings(&seo),
            vec![
                Finding::MissingDescription,
                Finding::TitleTooShort(0),
                Finding::MissingH1,
                Finding::MissingCanonical,
                Finding::IncompleteOpenGraph,
                Finding::NoStructuredData,
                Finding::MissingLanguage,
            ]
        );
    }

    #[test]
    fn messages_carry_the_measured_value() {
        assert!(Finding::DescriptionTooShort(12).to_string().contains("only 12"));
        assert!(Finding::MultipleH1(4).to_string().ends_with("found 4"));
        assert!(Finding::TitleTooLong(75).to_string().contains("10-60"));
    }
}
