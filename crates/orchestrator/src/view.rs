//! Presentation of an [`OrchestratorState`].
//!
//! Everything here is a pure function of its input: the display values in
//! [`ResultView`] and the plain-text rendering used by the CLI.

use common::{AnalysisResult, Comparison, MarketAnalysis, Source};
use std::fmt::Write;

use crate::state::OrchestratorState;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNTITLED_SOURCE: &str = "Untitled Source";
pub const ACCURATE_LABEL: &str = "Accurate";
pub const OUTSIDE_RANGE_LABEL: &str = "Outside Range";
pub const WAIT_HINT: &str = "This may take up to 2 minutes";

/// `$X.XX`.
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// `$X.XX`, or `N/A` when the value is absent.
pub fn format_optional_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format_price(v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketStatsView {
    pub min_price: String,
    pub max_price: String,
    pub average_price: String,
    pub total_sources: u64,
}

impl From<&MarketAnalysis> for MarketStatsView {
    fn from(m: &MarketAnalysis) -> Self {
        Self {
            min_price: format_optional_price(m.min_price),
            max_price: format_optional_price(m.max_price),
            average_price: format_optional_price(m.average_price),
            total_sources: m.total_sources,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub title: String,
    pub url: String,
    pub price_badges: Vec<String>,
}

impl From<&Source> for SourceView {
    fn from(s: &Source) -> Self {
        let title = s
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_SOURCE);

        Self {
            title: title.to_string(),
            url: s.url.clone(),
            price_badges: s.prices.iter().copied().map(format_price).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub accuracy_label: &'static str,
    /// `$D above/below market average`; absent when there is no difference.
    pub difference_line: Option<String>,
}

impl From<&Comparison> for ComparisonView {
    fn from(c: &Comparison) -> Self {
        let accuracy_label = if c.is_within_range() {
            ACCURATE_LABEL
        } else {
            OUTSIDE_RANGE_LABEL
        };

        let difference_line = c
            .prediction_vs_market
            .filter(|d| d.is_finite() && *d != 0.0)
            .map(|d| {
                let direction = if d > 0.0 { "above" } else { "below" };
                format!("{} {} market average", format_price(d.abs()), direction)
            });

        Self {
            accuracy_label,
            difference_line,
        }
    }
}

/// Display values for a successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub description: String,
    pub predicted_price: String,
    pub market_price: String,
    pub stats: MarketStatsView,
    pub sources: Vec<SourceView>,
    pub comparison: Option<ComparisonView>,
}

impl From<&AnalysisResult> for ResultView {
    fn from(r: &AnalysisResult) -> Self {
        Self {
            description: r.description.clone(),
            predicted_price: r.predicted_price.clone(),
            market_price: r.market_price.clone(),
            stats: MarketStatsView::from(&r.market_analysis),
            sources: r.sources.iter().map(SourceView::from).collect(),
            comparison: r.comparison.as_ref().map(ComparisonView::from),
        }
    }
}

/// Caller-owned presentation toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Expand the collapsible sources panel.
    pub show_sources: bool,
}

/// Render any state as plain text. `Idle` renders as an empty string.
pub fn render_state(state: &OrchestratorState, options: RenderOptions) -> String {
    match state {
        OrchestratorState::Idle => String::new(),
        OrchestratorState::InFlight { progress_label } => {
            format!("Analyzing... {} ({})", progress_label, WAIT_HINT)
        }
        OrchestratorState::Failed { message } => format!("Error: {}", message),
        OrchestratorState::Succeeded { result } => {
            render_result(&ResultView::from(result), options)
        }
    }
}

pub fn render_result(view: &ResultView, options: RenderOptions) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();

    let _ = writeln!(out, "Price Analysis");
    let _ = writeln!(out, "  {}", view.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "  AI Prediction:   {}", view.predicted_price);
    let _ = writeln!(out, "  Market Average:  {}", view.market_price);
    let _ = writeln!(out);

    let _ = writeln!(out, "Market Analysis");
    let _ = writeln!(
        out,
        "  Min Price: {}  |  Max Price: {}  |  Average: {}  |  Sources: {}",
        view.stats.min_price,
        view.stats.max_price,
        view.stats.average_price,
        view.stats.total_sources
    );

    if !view.sources.is_empty() {
        let _ = writeln!(out);
        if options.show_sources {
            let _ = writeln!(out, "Price Sources ({}) [-]", view.sources.len());
            for (idx, source) in view.sources.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", idx + 1, source.title);
                if !source.price_badges.is_empty() {
                    let _ = writeln!(out, "     {}", source.price_badges.join("  "));
                }
                let _ = writeln!(out, "     {}", source.url);
            }
        } else {
            let _ = writeln!(out, "Price Sources ({}) [+]", view.sources.len());
        }
    }

    if let Some(comparison) = &view.comparison {
        let _ = writeln!(out);
        let _ = writeln!(out, "Prediction Accuracy");
        let _ = writeln!(out, "  Assessment: {}", comparison.accuracy_label);
        if let Some(line) = &comparison.difference_line {
            let _ = writeln!(out, "  Difference: {}", line);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProgressLabel;

    fn sample_result() -> AnalysisResult {
        serde_json::from_str(
            r#"{
                "description": "X",
                "predicted_price": "$100",
                "market_price": "$90",
                "market_analysis": {"min_price": 50, "max_price": 150, "average_price": 90, "total_sources": 3},
                "sources": [{"title": "A", "url": "http://a", "prices": [80, 100]}],
                "comparison": {"accuracy_assessment": "within_range", "prediction_vs_market": 10}
            }"#,
        )
        .expect("fixture should parse")
    }

    #[test]
    fn test_result_view_matches_expected_display_values() {
        let view = ResultView::from(&sample_result());

        assert_eq!(view.predicted_price, "$100");
        assert_eq!(view.market_price, "$90");
        assert_eq!(view.stats.min_price, "$50.00");
        assert_eq!(view.stats.max_price, "$150.00");
        assert_eq!(view.stats.average_price, "$90.00");
        assert_eq!(view.stats.total_sources, 3);
        assert_eq!(view.sources.len(), 1);
        assert_eq!(view.sources[0].price_badges, vec!["$80.00", "$100.00"]);

        let comparison = view.comparison.expect("comparison present");
        assert_eq!(comparison.accuracy_label, "Accurate");
        assert_eq!(
            comparison.difference_line.as_deref(),
            Some("$10.00 above market average")
        );
    }

    #[test]
    fn test_absent_min_price_renders_na() {
        let mut result = sample_result();
        result.market_analysis.min_price = None;

        let view = ResultView::from(&result);
        assert_eq!(view.stats.min_price, "N/A");
        assert!(render_result(&view, RenderOptions::default()).contains("Min Price: N/A"));
    }

    #[test]
    fn test_null_statistics_from_wire_render_na() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "description": "No market pricing data was found online.",
                "predicted_price": "$75.00",
                "market_price": "No market data found",
                "market_analysis": {"min_price": null, "max_price": null, "average_price": null, "total_sources": 0},
                "sources": [],
                "comparison": {"accuracy_assessment": "outside_range", "prediction_vs_market": null}
            }"#,
        )
        .unwrap();

        let view = ResultView::from(&result);
        assert_eq!(view.stats.min_price, NOT_AVAILABLE);
        assert_eq!(view.stats.max_price, NOT_AVAILABLE);
        assert_eq!(view.stats.average_price, NOT_AVAILABLE);

        let comparison = view.comparison.unwrap();
        assert_eq!(comparison.accuracy_label, "Outside Range");
        assert!(comparison.difference_line.is_none());
    }

    #[test]
    fn test_negative_difference_reads_below() {
        let c = Comparison {
            accuracy_assessment: "outside_range".into(),
            prediction_vs_market: Some(-62.5),
        };
        let view = ComparisonView::from(&c);
        assert_eq!(
            view.difference_line.as_deref(),
            Some("$62.50 below market average")
        );
    }

    #[test]
    fn test_source_defaults() {
        let source = Source {
            title: None,
            url: "https://www.ebay.com/itm/1".into(),
            prices: vec![],
        };
        let view = SourceView::from(&source);
        assert_eq!(view.title, UNTITLED_SOURCE);
        assert!(view.price_badges.is_empty());
    }

    #[test]
    fn test_sources_panel_collapsed_by_default() {
        let view = ResultView::from(&sample_result());

        let collapsed = render_result(&view, RenderOptions::default());
        assert!(collapsed.contains("Price Sources (1) [+]"));
        assert!(!collapsed.contains("http://a"));

        let expanded = render_result(&view, RenderOptions { show_sources: true });
        assert!(expanded.contains("Price Sources (1) [-]"));
        assert!(expanded.contains("$80.00  $100.00"));
        assert!(expanded.contains("http://a"));
    }

    #[test]
    fn test_render_state_variants() {
        let opts = RenderOptions::default();
        assert_eq!(render_state(&OrchestratorState::Idle, opts), "");

        let in_flight = OrchestratorState::InFlight {
            progress_label: ProgressLabel::ScrapingPrices,
        };
        assert_eq!(
            render_state(&in_flight, opts),
            "Analyzing... Scraping price data... (This may take up to 2 minutes)"
        );

        let failed = OrchestratorState::Failed {
            message: "rate limited".into(),
        };
        assert_eq!(render_state(&failed, opts), "Error: rate limited");
    }
}
