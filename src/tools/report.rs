// HTML report formatter tool
//
// Wraps the memo markdown in a styled HTML shell and saves it as a
// report artifact.

use async_trait::async_trait;
use pulldown_cmark::{html, Parser};
use tera::{Context, Tera};

use crate::artifacts::ArtifactStore;

use super::{AnalysisTool, ToolContext, ToolOutcome};

const TOOL_NAME: &str = "generate_html_report";

const REPORT_TEMPLATE: &str = r#"<html>
<head><style>body{font-family:sans-serif; line-height:1.6; color:#333; max-width:800px; margin:auto; padding:20px;}
h1{color:#2c3e50; border-bottom:2px solid #2c3e50;}</style></head>
<body><h1>Investment Intelligence Report</h1>{{ body | safe }}</body>
</html>
"#;

/// Render memo markdown into the report shell
fn render_report(markdown: &str) -> Result<String, String> {
    let parser = Parser::new(markdown);
    let mut body = String::new();
    html::push_html(&mut body, parser);

    let mut context = Context::new();
    context.insert("body", &body);

    Tera::one_off(REPORT_TEMPLATE, &context, true)
        .map_err(|e| format!("report render failed: {}", e))
}

/// Formats the memo text as a styled standalone HTML report
pub struct HtmlReportTool;

#[async_trait]
impl AnalysisTool for HtmlReportTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    async fn run(&self, stage_output: &str, ctx: &ToolContext) -> ToolOutcome {
        log::info!("Generating HTML report");

        let html_content = match render_report(stage_output) {
            Ok(html_content) => html_content,
            Err(e) => return ToolOutcome::error(TOOL_NAME, e),
        };

        let name = ArtifactStore::report_name();
        match ctx.artifacts.save_text(&name, &html_content) {
            Ok(_) => ToolOutcome::success(TOOL_NAME, name),
            Err(e) => ToolOutcome::error(TOOL_NAME, e),
        }
    }
}
