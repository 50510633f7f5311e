// The standard six-stage analysis sequence
//
// Instruction templates are tera; `research` is the raw evidence from
// deep research and `outputs.<key>` exposes earlier stage results.

use std::sync::Arc;

use crate::tools::{FinancialChartTool, HtmlReportTool, InfographicTool};

use super::PipelineStage;

const FINANCIAL_MODEL_INSTRUCTION: &str = r#"You are a financial analyst building a revenue model.

Evidence gathered so far:
{{ research }}

Build a three-scenario ARR model for the primary company in the evidence.
State your assumptions, then end your answer with a single JSON object on
its own lines in exactly this form so the charting tool can read it:

{"companyName": "<name>", "currentArr": <number in $M>, "bearRates": "<comma-separated yearly growth multipliers>", "baseRates": "<comma-separated>", "bullRates": "<comma-separated>"}
"#;

const MARKET_ANALYSIS_INSTRUCTION: &str = r#"You are a market analyst.

Evidence:
{{ research }}

Financial model:
{{ outputs.financial_model }}

Size the addressable market, map the competitive landscape and identify
the two strongest expansion levers. Be concrete and cite the evidence.
"#;

const RISK_ASSESSMENT_INSTRUCTION: &str = r#"You are a risk officer reviewing an investment target.

Market analysis:
{{ outputs.market_analysis }}

Financial model:
{{ outputs.financial_model }}

List the top risks (execution, market, key-person, regulatory) with
severity and a one-line mitigation each.
"#;

const MEMO_INSTRUCTION: &str = r#"You are the investment partner. Write the final strategic memo
in markdown with a Contact Table.

Evidence:
{{ research }}

Financial model:
{{ outputs.financial_model }}

Market analysis:
{{ outputs.market_analysis }}

Risk assessment:
{{ outputs.risk_assessment }}

The memo must cover: thesis, scenario summary, risks, recommended next
steps, and a Contact Table of founders/owners with any emails found.
"#;

const HTML_REPORT_INSTRUCTION: &str = r#"Polish this memo for publication. Keep it markdown, tighten the
language, keep every table. Return only the polished memo.

{{ outputs.memo }}
"#;

const INFOGRAPHIC_INSTRUCTION: &str = r#"Condense the memo below into a short visual brief: one headline,
three key numbers and a one-line verdict. Plain text only.

{{ outputs.memo }}
"#;

/// The full analysis sequence: modeling, market, risk, memo synthesis,
/// HTML formatting, infographic
pub fn standard_stages(model: &str) -> Vec<PipelineStage> {
    vec![
        PipelineStage {
            key: "financial_model",
            name: "Financial Modeling",
            model: model.to_string(),
            instruction: FINANCIAL_MODEL_INSTRUCTION,
            tool: Some(Arc::new(FinancialChartTool)),
        },
        PipelineStage {
            key: "market_analysis",
            name: "Market Analysis",
            model: model.to_string(),
            instruction: MARKET_ANALYSIS_INSTRUCTION,
            tool: None,
        },
        PipelineStage {
            key: "risk_assessment",
            name: "Risk Assessment",
            model: model.to_string(),
            instruction: RISK_ASSESSMENT_INSTRUCTION,
            tool: None,
        },
        PipelineStage {
            key: "memo",
            name: "Memo Synthesis",
            model: model.to_string(),
            instruction: MEMO_INSTRUCTION,
            tool: None,
        },
        PipelineStage {
            key: "infographic",
            name: "Infographic",
            model: model.to_string(),
            instruction: INFOGRAPHIC_INSTRUCTION,
            tool: Some(Arc::new(InfographicTool)),
        },
        // Last on purpose: the pipeline's final text is the memo the
        // caller stores, so the polishing stage closes the sequence
        PipelineStage {
            key: "html_report",
            name: "Report Formatting",
            model: model.to_string(),
            instruction: HTML_REPORT_INSTRUCTION,
            tool: Some(Arc::new(HtmlReportTool)),
        },
    ]
}
