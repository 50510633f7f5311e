// Instruction templates for the planning and research calls

/// How many steps the planning call is asked for
pub const PLAN_STEPS: usize = 6;

/// Fixed planning instruction embedding the user's target
pub fn plan_instruction(target: &str) -> String {
    format!(
        "Create a {}-step research plan for: {}. Find owner emails.",
        PLAN_STEPS, target
    )
}

/// Deep-research instruction over the selected task lines
pub fn research_instruction(task_lines: &str) -> String {
    format!("Find founder details for:\n{}", task_lines)
}
