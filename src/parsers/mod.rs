// Parsers for provider output
//
// - tasks: numbered research-plan lines -> PlanTask list
// - extract: duck-shaped interaction payloads -> plain text

mod extract;
mod tasks;

pub use extract::extract_text;
pub use tasks::parse_tasks;
