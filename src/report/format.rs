//! Formatted terminal output.
//!
//! Formatting lives in one place so the fitting code stays free of
//! presentation concerns and output changes stay localized.

use crate::domain::date_from_year_index;
use crate::report::{AnalysisReport, ModelSummary};

/// Format the full analysis: data window, models, candidates, forecasts.
pub fn format_analysis(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("=== growth - price growth curves ===\n");
    out.push_str(&format!("Source: {}\n", report.source));
    out.push_str(&format!(
        "Window: {} .. {} ({} days) | points={}",
        report.first_date, report.last_date, report.training_days, report.n_points
    ));
    if report.skipped_rows > 0 {
        out.push_str(&format!(" | skipped rows={}", report.skipped_rows));
    }
    out.push('\n');
    out.push_str(&format!("Last price: {:.4}\n", report.last_price));

    out.push_str("\nModels:\n");
    out.push_str(&format_model_line(&report.exponential));
    out.push_str(&format_model_line(&report.composite));

    out.push_str("\nComposite candidates (log prices):\n");
    out.push_str(&format_candidates(&report.candidates, report.selected.is_some()));
    out.push_str(&format!("Slope at end: {:.4} per year\n", report.slope_at_end));

    if !report.forecasts.is_empty() {
        out.push_str("\nForecasts:\n");
        out.push_str(&format_forecasts(report));
    }

    out
}

fn format_model_line(m: &ModelSummary) -> String {
    let rmse = m.rmse.map(|v| format!(" RMSE={v:.4}")).unwrap_or_default();
    format!(
        "- {:<12} R²={:.6}{rmse} weight={:.4e}\n    {}\n",
        m.variant.display_name(),
        m.r_squared,
        m.weight,
        m.equation
    )
}

fn format_candidates(candidates: &[ModelSummary], has_selection: bool) -> String {
    let mut out = String::new();
    out.push_str(format!("  {:<12} {:>12} {}\n", "model", "R²", "params").trim_end());
    out.push('\n');
    out.push_str(format!("  {:-<12} {:-<12} {:-<6}\n", "", "", "").trim_end());
    out.push('\n');

    for (i, c) in candidates.iter().enumerate() {
        // Candidates are ranked, so the selected one is always first.
        let chosen = if has_selection && i == 0 { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<12} {:>12.9} {}\n",
            truncate(c.variant.display_name(), 12),
            c.r_squared,
            fmt_vec(c.parameters.as_slice())
        ));
    }
    out
}

fn format_forecasts(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:>7} {:>10} {:>14} {:>10} {:>8} {:>8}\n",
            "years", "date", "price", "change", "w_exp", "w_comp"
        )
        .trim_end(),
    );
    out.push('\n');
    for f in &report.forecasts {
        let date = date_from_year_index(f.target_time)
            .map(|d| d.to_string())
            .unwrap_or_else(|_| format!("{:.3}", f.target_time));
        out.push_str(&format!(
            "  {:>7.2} {:>10} {:>14.4} {:>9.2}% {:>8.4} {:>8.4}\n",
            f.horizon_years, date, f.absolute, f.percent, f.weights[0], f.weights[1]
        ));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecast, ModelParameters, ModelVariant};
    use chrono::NaiveDate;

    fn summary(variant: ModelVariant, r2: f64) -> ModelSummary {
        ModelSummary {
            variant,
            equation: format!("y(t) = ... [R²={r2}]"),
            r_squared: r2,
            weight: 1.0,
            parameters: ModelParameters(vec![1.0, 2.0]),
            rmse: None,
        }
    }

    fn report() -> AnalysisReport {
        AnalysisReport {
            source: "prices.csv".to_string(),
            first_date: NaiveDate::from_ymd_opt(2015, 1, 2).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            n_points: 500,
            skipped_rows: 2,
            training_days: 3651,
            last_price: 123.45,
            exponential: ModelSummary {
                rmse: Some(1.25),
                ..summary(ModelVariant::Exponential, 0.9)
            },
            composite: summary(ModelVariant::CompositeLog, 0.95),
            candidates: vec![
                summary(ModelVariant::Linear, 0.97),
                summary(ModelVariant::LogOffset, 0.96),
                summary(ModelVariant::Exponential, 0.5),
            ],
            selected: Some(ModelVariant::Linear),
            slope_at_end: 8.5,
            forecasts: vec![Forecast {
                horizon_years: 1.0,
                target_time: 2026.0,
                absolute: 130.0,
                percent: 5.3,
                weights: [0.25, 0.75],
            }],
        }
    }

    #[test]
    fn marks_selected_candidate() {
        let text = format_analysis(&report());
        let marked: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("Linear"));
        assert!(text.contains("skipped rows=2"));
        assert!(text.contains("Forecasts:"));
        assert!(text.contains("5.30%"));
        assert!(text.contains("2026-01-01"));
        assert!(text.contains("RMSE=1.2500"));
    }

    #[test]
    fn omits_empty_sections() {
        let mut r = report();
        r.forecasts.clear();
        r.skipped_rows = 0;
        let text = format_analysis(&r);
        assert!(!text.contains("Forecasts:"));
        assert!(!text.contains("skipped"));
    }

    #[test]
    fn report_serializes_to_json() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["selected"], "linear");
        assert_eq!(json["candidates"][1]["variant"], "log-offset");
        assert_eq!(json["forecasts"][0]["weights"][1], 0.75);
        assert_eq!(json["last_date"], "2024-12-31");
        assert_eq!(json["exponential"]["rmse"], 1.25);
        assert!(json["composite"].get("rmse").is_none());
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Exponential", 12), "Exponential");
        assert_eq!(truncate("Exponential", 5), "Expo.");
    }
}
