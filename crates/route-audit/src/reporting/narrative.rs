//! Plain-text and Markdown renderings of the audit findings.
//!
//! Both renderings carry the same facts. Neither includes a timestamp, so
//! identical inputs always render identical bytes.

use super::findings::AuditFindings;
use crate::utils::{fmt_int, fmt_pct, fmt_ratio};

/// Threshold as written in the criteria text: `3.0`, `2.5`, `2.25`.
fn fmt_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Render the findings for pasting into a written report.
pub fn render_text(findings: &AuditFindings) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("AUDIT FINDINGS – NUMERIC SUMMARY (AUTO-GENERATED)".to_string());
    lines.push("------------------------------------------------".to_string());
    lines.push(format!(
        "- Reporting route universe (unique ORIGIN-DEST pairs): {}",
        fmt_int(findings.reporting_routes)
    ));
    lines.push(format!(
        "- Marketing route universe (unique ORIGIN-DEST pairs): {}",
        fmt_int(findings.marketing_routes)
    ));
    lines.push(format!(
        "- Coverage: Reporting includes {} of {} marketing routes ({} coverage).",
        fmt_int(findings.shared_routes),
        fmt_int(findings.marketing_routes),
        fmt_pct(findings.coverage)
    ));
    lines.push(format!(
        "- Exceptions (Marketing-only routes): {} ({} of marketing route universe).",
        fmt_int(findings.marketing_only_routes),
        fmt_pct(findings.marketing_only_share)
    ));
    lines.push(format!(
        "- Exceptions (Airports only present in Marketing view): {} airport IDs.",
        fmt_int(findings.airports_only_in_marketing)
    ));

    match (findings.flag_ratio_median, findings.flag_ratio_max) {
        (Some(median), Some(max)) if findings.flagged_routes > 0 => {
            lines.push(format!(
                "- Potential population definition/overcounting flags: {} routes \
                 (criteria: reporting_count >= {} and marketing/reporting ratio >= {}).",
                fmt_int(findings.flagged_routes),
                findings.rule.min_reporting_count,
                fmt_threshold(findings.rule.min_ratio)
            ));
            lines.push(format!(
                "- Flagged routes ratio stats: median={}, max={}",
                fmt_ratio(median),
                fmt_ratio(max)
            ));
        }
        _ => lines.push(
            "- Potential population definition/overcounting flags: 0 routes matched the defined criteria."
                .to_string(),
        ),
    }

    lines.push(String::new());
    lines.push(format!(
        "SAMPLE – Marketing-only routes (first {} unique ORIGIN-DEST pairs):",
        findings.sample_size
    ));
    if findings.sample_marketing_only.is_empty() {
        lines.push("  - None".to_string());
    } else {
        for key in &findings.sample_marketing_only {
            lines.push(format!("  - {}", key));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "SAMPLE – Top {} overcounting flags (if any):",
        findings.sample_size
    ));
    if findings.sample_flags.is_empty() {
        lines.push("  - None".to_string());
    } else {
        for flag in &findings.sample_flags {
            lines.push(format!("  - {}", flag));
        }
    }

    lines.join("\n")
}

/// Render the findings as Markdown.
pub fn render_markdown(findings: &AuditFindings) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Audit Findings – Numeric Summary (Auto-generated)".to_string());
    lines.push(String::new());
    lines.push("## Coverage & Exceptions".to_string());
    lines.push(format!(
        "- Reporting unique routes: **{}**",
        fmt_int(findings.reporting_routes)
    ));
    lines.push(format!(
        "- Marketing unique routes: **{}**",
        fmt_int(findings.marketing_routes)
    ));
    lines.push(format!(
        "- Reporting coverage of marketing route universe: **{} / {} ({})**",
        fmt_int(findings.shared_routes),
        fmt_int(findings.marketing_routes),
        fmt_pct(findings.coverage)
    ));
    lines.push(format!(
        "- Marketing-only routes (exceptions): **{} ({})**",
        fmt_int(findings.marketing_only_routes),
        fmt_pct(findings.marketing_only_share)
    ));
    lines.push(format!(
        "- Airports only in Marketing view: **{}**",
        fmt_int(findings.airports_only_in_marketing)
    ));

    lines.push(String::new());
    lines.push("## Overcounting / Population Definition Flags".to_string());
    match (findings.flag_ratio_median, findings.flag_ratio_max) {
        (Some(median), Some(max)) if findings.flagged_routes > 0 => {
            lines.push(format!(
                "- Flagged routes: **{}** (rep_count ≥ {} and ratio ≥ {})",
                fmt_int(findings.flagged_routes),
                findings.rule.min_reporting_count,
                fmt_threshold(findings.rule.min_ratio)
            ));
            lines.push(format!(
                "- Ratio stats: median **{}**, max **{}**",
                fmt_ratio(median),
                fmt_ratio(max)
            ));
        }
        _ => lines.push("- No routes matched the overcounting flag criteria.".to_string()),
    }

    lines.push(String::new());
    lines.push("## Samples".to_string());
    lines.push(format!(
        "**Marketing-only routes (first {}):**",
        findings.sample_size
    ));
    if findings.sample_marketing_only.is_empty() {
        lines.push("- None".to_string());
    } else {
        for key in &findings.sample_marketing_only {
            lines.push(format!("- {}", key));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "**Top {} overcounting flags:**",
        findings.sample_size
    ));
    if findings.sample_flags.is_empty() {
        lines.push("- None".to_string());
    } else {
        for flag in &findings.sample_flags {
            lines.push(format!("- {}", flag));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::OvercountRule;
    use crate::types::{OvercountFlag, RouteKey};
    use pretty_assertions::assert_eq;

    fn example_findings() -> AuditFindings {
        AuditFindings {
            reporting_routes: 2,
            marketing_routes: 3,
            shared_routes: 2,
            coverage: 2.0 / 3.0,
            marketing_only_routes: 1,
            marketing_only_share: 1.0 / 3.0,
            airports_only_in_marketing: 2,
            flagged_routes: 1,
            flag_ratio_median: Some(3.2),
            flag_ratio_max: Some(3.2),
            rule: OvercountRule::default(),
            sample_size: 5,
            sample_marketing_only: vec![RouteKey::new(5, 6)],
            sample_flags: vec![OvercountFlag {
                key: RouteKey::new(1, 2),
                reporting_count: 25,
                marketing_count: 80,
                ratio: 3.2,
            }],
        }
    }

    #[test]
    fn test_render_text_example() {
        let expected = "\
AUDIT FINDINGS – NUMERIC SUMMARY (AUTO-GENERATED)
------------------------------------------------
- Reporting route universe (unique ORIGIN-DEST pairs): 2
- Marketing route universe (unique ORIGIN-DEST pairs): 3
- Coverage: Reporting includes 2 of 3 marketing routes (66.7% coverage).
- Exceptions (Marketing-only routes): 1 (33.3% of marketing route universe).
- Exceptions (Airports only present in Marketing view): 2 airport IDs.
- Potential population definition/overcounting flags: 1 routes (criteria: reporting_count >= 20 and marketing/reporting ratio >= 3.0).
- Flagged routes ratio stats: median=3.20, max=3.20

SAMPLE – Marketing-only routes (first 5 unique ORIGIN-DEST pairs):
  - ORIGIN=5, DEST=6

SAMPLE – Top 5 overcounting flags (if any):
  - ORIGIN=1, DEST=2 | rep=25, mkt=80, ratio=3.20";

        assert_eq!(render_text(&example_findings()), expected);
    }

    #[test]
    fn test_render_markdown_example() {
        let md = render_markdown(&example_findings());
        assert!(md.starts_with("# Audit Findings – Numeric Summary (Auto-generated)\n"));
        assert!(md.contains("- Reporting coverage of marketing route universe: **2 / 3 (66.7%)**"));
        assert!(md.contains("- Flagged routes: **1** (rep_count ≥ 20 and ratio ≥ 3.0)"));
        assert!(md.contains("- Ratio stats: median **3.20**, max **3.20**"));
        assert!(md.ends_with("- ORIGIN=1, DEST=2 | rep=25, mkt=80, ratio=3.20"));
    }

    #[test]
    fn test_render_without_flags_or_exceptions() {
        let findings = AuditFindings {
            marketing_only_routes: 0,
            marketing_only_share: 0.0,
            flagged_routes: 0,
            flag_ratio_median: None,
            flag_ratio_max: None,
            sample_marketing_only: Vec::new(),
            sample_flags: Vec::new(),
            ..example_findings()
        };

        let text = render_text(&findings);
        assert!(text.contains("0 routes matched the defined criteria."));
        assert_eq!(text.matches("  - None").count(), 2);

        let md = render_markdown(&findings);
        assert!(md.contains("- No routes matched the overcounting flag criteria."));
        assert_eq!(md.matches("\n- None").count(), 2);
    }

    #[test]
    fn test_large_numbers_use_thousands_separators() {
        let findings = AuditFindings {
            reporting_routes: 6_543,
            marketing_routes: 12_345,
            ..example_findings()
        };
        let text = render_text(&findings);
        assert!(text.contains("(unique ORIGIN-DEST pairs): 6,543"));
        assert!(text.contains("(unique ORIGIN-DEST pairs): 12,345"));
    }

    #[test]
    fn test_criteria_reflect_configured_rule() {
        let findings = AuditFindings {
            rule: OvercountRule {
                min_reporting_count: 50,
                min_ratio: 2.5,
            },
            ..example_findings()
        };
        assert!(render_text(&findings).contains("reporting_count >= 50 and marketing/reporting ratio >= 2.5"));
    }
}
