use pulldown_cmark::{html::push_html, Options, Parser};

use crate::report::formatters::MarkdownFormatter;
use crate::report::types::YieldReport;

/// HTML formatter for yield reports
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Format report as standalone HTML with embedded CSS
    ///
    /// The body is the markdown report rendered through pulldown-cmark, so
    /// both exports always carry the same content.
    pub fn format(report: &YieldReport) -> String {
        let markdown = MarkdownFormatter::format(report);
        let mut body = String::with_capacity(markdown.len() * 2);
        push_html(&mut body, Parser::new_ext(&markdown, Options::empty()));

        let mut html = String::with_capacity(body.len() + 1024);

        // HTML header with CSS
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "<title>Crop Yield Report - {}</title>\n",
            escape(&report.context.to_string())
        ));
        html.push_str("<style>\n");
        html.push_str("body { font-family: system-ui, sans-serif; max-width: 800px; margin: 40px auto; padding: 20px; line-height: 1.6; }\n");
        html.push_str("h1 { color: #2c3e50; margin-bottom: 10px; }\n");
        html.push_str("h2 { color: #34495e; border-bottom: 2px solid #ecf0f1; padding-bottom: 5px; margin-top: 30px; }\n");
        html.push_str("ul { padding-left: 20px; }\n");
        html.push_str("li { margin: 4px 0; }\n");
        html.push_str("em { color: #6c757d; }\n");
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&body);

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Minimal escaping for text placed outside the rendered markdown
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
