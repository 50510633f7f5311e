// Financial projection chart tool
//
// The financial-modeling stage is instructed to emit a JSON directive
// with the company name, current ARR and bear/base/bull growth
// multipliers. The tool computes the projection series itself and renders
// them as an SVG line chart; actual plotting engines stay out of this
// crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::artifacts::ArtifactStore;

use super::{AnalysisTool, ToolContext, ToolOutcome};

const TOOL_NAME: &str = "generate_financial_chart";

const SCENARIO_COLORS: [(&str, &str); 3] = [
    ("Bear", "#e74c3c"),
    ("Base", "#2c3e50"),
    ("Bull", "#27ae60"),
];

const FIRST_YEAR: u32 = 2025;

// Plot geometry inside the 800x480 viewbox
const PLOT_LEFT: f64 = 70.0;
const PLOT_TOP: f64 = 48.0;
const PLOT_RIGHT: f64 = 730.0;
const PLOT_BOTTOM: f64 = 410.0;

const CHART_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 480" font-family="sans-serif">
  <rect width="800" height="480" fill="#ffffff"/>
  <text x="400" y="28" text-anchor="middle" font-size="18" fill="#2c3e50">{{ title }}</text>
  {% for tick in y_ticks %}
  <line x1="70" y1="{{ tick.pos }}" x2="730" y2="{{ tick.pos }}" stroke="#dddddd"/>
  <text x="62" y="{{ tick.pos + 4 }}" text-anchor="end" font-size="11" fill="#555555">{{ tick.label }}</text>
  {% endfor %}
  {% for tick in x_ticks %}
  <text x="{{ tick.pos }}" y="430" text-anchor="middle" font-size="11" fill="#555555">{{ tick.label }}</text>
  {% endfor %}
  <text x="18" y="230" transform="rotate(-90 18 230)" text-anchor="middle" font-size="12" fill="#555555">{{ y_label }}</text>
  {% for s in series %}
  <polyline points="{{ s.points }}" fill="none" stroke="{{ s.color }}" stroke-width="2.5"/>
  {% endfor %}
  {% for s in series %}
  <rect x="640" y="{{ 44 + loop.index0 * 20 }}" width="12" height="12" fill="{{ s.color }}"/>
  <text x="658" y="{{ 54 + loop.index0 * 20 }}" font-size="12" fill="#333333">{{ s.name }}</text>
  {% endfor %}
</svg>
"##;

/// Directive the financial-modeling stage embeds in its output
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartDirective {
    company_name: String,
    current_arr: f64,
    bear_rates: String,
    base_rates: String,
    bull_rates: String,
}

#[derive(Serialize)]
struct SeriesView {
    name: &'static str,
    color: &'static str,
    points: String,
}

#[derive(Serialize)]
struct TickView {
    pos: f64,
    label: String,
}

/// Parse a comma-separated list of growth multipliers
pub fn parse_rates(raw: &str) -> Result<Vec<f64>, String> {
    let rates: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect();

    let rates = rates.map_err(|e| format!("invalid rate list '{}': {}", raw, e))?;
    if rates.is_empty() {
        return Err("rate list is empty".to_string());
    }
    Ok(rates)
}

/// Project ARR forward: each year multiplies the previous value by its rate
pub fn project(start: f64, rates: &[f64]) -> Vec<f64> {
    let mut values = Vec::with_capacity(rates.len() + 1);
    values.push(start);
    for rate in rates {
        values.push(values.last().copied().unwrap_or(start) * rate);
    }
    values
}

/// Pull the JSON directive out of free-form stage output
fn extract_directive(stage_output: &str) -> Result<ChartDirective, String> {
    let start = stage_output
        .find('{')
        .ok_or_else(|| "no chart directive found in stage output".to_string())?;
    let end = stage_output
        .rfind('}')
        .ok_or_else(|| "no chart directive found in stage output".to_string())?;

    serde_json::from_str(&stage_output[start..=end])
        .map_err(|e| format!("could not parse chart directive: {}", e))
}

fn render_chart(directive: &ChartDirective) -> Result<String, String> {
    let bear = parse_rates(&directive.bear_rates)?;
    let base = parse_rates(&directive.base_rates)?;
    let bull = parse_rates(&directive.bull_rates)?;

    if bear.len() != base.len() || bull.len() != base.len() {
        return Err("bear/base/bull rate lists must have equal length".to_string());
    }

    let projections = [
        project(directive.current_arr, &bear),
        project(directive.current_arr, &base),
        project(directive.current_arr, &bull),
    ];

    let y_max = projections
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v))
        .max(1.0)
        * 1.1;

    let point_count = base.len() + 1;
    let x_step = (PLOT_RIGHT - PLOT_LEFT) / (point_count - 1).max(1) as f64;
    let height = PLOT_BOTTOM - PLOT_TOP;

    let series: Vec<SeriesView> = SCENARIO_COLORS
        .iter()
        .zip(projections.iter())
        .map(|(&(name, color), values)| {
            let points = values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let x = PLOT_LEFT + i as f64 * x_step;
                    let y = PLOT_BOTTOM - (v / y_max) * height;
                    format!("{:.1},{:.1}", x, y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            SeriesView {
                name,
                color,
                points,
            }
        })
        .collect();

    let x_ticks: Vec<TickView> = (0..point_count)
        .map(|i| TickView {
            pos: PLOT_LEFT + i as f64 * x_step,
            label: (FIRST_YEAR + i as u32).to_string(),
        })
        .collect();

    let y_ticks: Vec<TickView> = (0..=4)
        .map(|i| {
            let value = y_max * i as f64 / 4.0;
            TickView {
                pos: PLOT_BOTTOM - (value / y_max) * height,
                label: format!("{:.0}", value),
            }
        })
        .collect();

    let mut context = Context::new();
    context.insert("title", &format!("{} Revenue Analysis", directive.company_name));
    context.insert("y_label", "ARR ($M)");
    context.insert("series", &series);
    context.insert("x_ticks", &x_ticks);
    context.insert("y_ticks", &y_ticks);

    Tera::one_off(CHART_TEMPLATE, &context, true).map_err(|e| format!("chart render failed: {}", e))
}

/// Renders bear/base/bull ARR projections from the stage's JSON directive
pub struct FinancialChartTool;

#[async_trait]
impl AnalysisTool for FinancialChartTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    async fn run(&self, stage_output: &str, ctx: &ToolContext) -> ToolOutcome {
        let directive = match extract_directive(stage_output) {
            Ok(directive) => directive,
            Err(e) => return ToolOutcome::error(TOOL_NAME, e),
        };

        log::info!("Generating chart for {}", directive.company_name);

        let svg = match render_chart(&directive) {
            Ok(svg) => svg,
            Err(e) => {
                log::error!("Chart generation failed: {}", e);
                return ToolOutcome::error(TOOL_NAME, e);
            }
        };

        let name = ArtifactStore::chart_name();
        match ctx.artifacts.save_text(&name, &svg) {
            Ok(_) => ToolOutcome::success(TOOL_NAME, name),
            Err(e) => ToolOutcome::error(TOOL_NAME, e),
        }
    }
}
