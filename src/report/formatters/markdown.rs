use crate::defaults::DefaultSource;
use crate::report::types::YieldReport;

/// Markdown formatter for yield reports
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format report as markdown
    pub fn format(report: &YieldReport) -> String {
        let mut md = String::with_capacity(1024);

        md.push_str("# 🌱 Crop Yield Report\n\n");

        // Field summary
        md.push_str("## 📝 Field Input Summary\n\n");
        md.push_str(&format!("**Crop**: {}  \n", report.context.crop));
        md.push_str(&format!("**Region**: {}  \n", report.context.region));
        md.push_str(&format!("**Soil Type**: {}\n\n", report.context.soil));

        for row in &report.features {
            md.push_str(&format!(
                "- {} – {} ({}: {:.2}): {:.2}\n",
                row.key,
                row.description,
                row.provenance.display_text(),
                row.default,
                row.value
            ));
        }
        md.push('\n');

        let source_note = match report.default_source {
            DefaultSource::ContextMatch => {
                "Defaults are averages of historical records for this crop, region and soil."
            }
            DefaultSource::GlobalFallback => {
                "No historical records match this combination; defaults are dataset-wide averages."
            }
        };
        md.push_str(&format!("*{}*\n\n", source_note));

        // Rejected inputs
        if !report.warnings.is_empty() {
            md.push_str("## ⚠️ Input Warnings\n\n");
            for warning in &report.warnings {
                md.push_str(&format!("- {}\n", warning));
            }
            md.push('\n');
        }

        md.push_str(&format!(
            "## 🌾 Estimated Crop Yield: {:.2} {}\n\n",
            report.predicted_yield, report.unit
        ));

        md.push_str("## 📌 Agronomic Suggestions\n\n");
        for suggestion in &report.suggestions {
            md.push_str(&format!("- {} {}\n", suggestion.icon, suggestion.message));
        }
        md.push('\n');

        md.push_str(&format!(
            "*Generated {}*\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn test_format_markdown() {
        let md = MarkdownFormatter::format(&sample_report());

        assert!(md.contains("**Crop**: Wheat"));
        assert!(md.contains("**Soil Type**: Loam"));
        assert!(md.contains("- Rain_Sum – Total rainfall during season (mm) (User Provided: 400.00): 350.00"));
        assert!(md.contains("- Temp_Avg – Average temperature (°C) (Default: 27.46): 27.46"));
        assert!(md.contains("## 🌾 Estimated Crop Yield: 3.14 tons/hectare"));
        assert!(md.contains("Invalid value for Temp_Avg. Default (27.46) will be used."));
        assert!(md.contains("- 💧 Low rainfall"));
        assert!(md.contains("- ⏳ Late peak growth"));
    }

    #[test]
    fn test_suggestions_keep_rule_order() {
        let md = MarkdownFormatter::format(&sample_report());
        let rain = md.find("Low rainfall").unwrap();
        let peak = md.find("Late peak growth").unwrap();
        assert!(rain < peak);
    }

    #[test]
    fn test_warnings_section_omitted_when_clean() {
        let mut report = sample_report();
        report.warnings.clear();
        let md = MarkdownFormatter::format(&report);
        assert!(!md.contains("Input Warnings"));
    }
}
