// Numbered-list parsing for generated research plans

use regex::Regex;
use std::sync::OnceLock;

use crate::models::PlanTask;

static TASK_HEAD_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Start of a numbered plan line: optional leading whitespace, digits,
/// one of `.` `)` `-`, optional trailing whitespace.
fn task_head_pattern() -> &'static Regex {
    TASK_HEAD_PATTERN.get_or_init(|| Regex::new(r"(?m)^[ \t]*(\d+)[.)\-][ \t]*").unwrap())
}

/// Parse a plan text blob into its numbered tasks.
///
/// A task's description spans from the end of its number marker up to (but
/// not including) the next numbered-line start, the first blank line, or
/// the end of the text, whichever comes first. Task numbers are kept
/// verbatim and ordering follows the source text. Text without numbered
/// lines yields an empty list.
pub fn parse_tasks(text: &str) -> Vec<PlanTask> {
    let pattern = task_head_pattern();

    let heads: Vec<(usize, usize, &str)> = pattern
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let number = caps.get(1).unwrap().as_str();
            (whole.start(), whole.end(), number)
        })
        .collect();

    let mut tasks = Vec::with_capacity(heads.len());

    for (i, &(_, content_start, number)) in heads.iter().enumerate() {
        let hard_end = heads
            .get(i + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(text.len());

        let mut content = &text[content_start..hard_end];
        if let Some(blank) = content.find("\n\n") {
            content = &content[..blank];
        }

        let description = content.trim();
        if description.is_empty() {
            continue;
        }

        tasks.push(PlanTask::new(number, description));
    }

    tasks
}
