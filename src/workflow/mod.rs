// Workflow orchestrator
//
// Sequences the three external calls (plan, deep research, analysis)
// over a session's stage machine. Every transition validates the stage
// first and mutates the session only after its external call succeeded,
// so a failed call always leaves the session exactly where it was and
// the user retries by re-issuing the action.

pub mod prompts;

use std::sync::Arc;

use serde_json::json;

use crate::artifacts::ArtifactStore;
use crate::config::AppConfig;
use crate::error::{Result, WorkflowError};
use crate::models::{transition_stage, WorkflowSession, WorkflowStage};
use crate::parsers::{extract_text, parse_tasks};
use crate::pipeline::{standard_stages, AnalysisPipeline};
use crate::provider::{poll_until_terminal, InteractionClient, InteractionRequest, InteractionStatus};
use crate::server::EventBroadcaster;
use crate::tools::ToolContext;

/// Shared dependencies for every workflow operation
pub struct WorkflowContext {
    pub config: Arc<AppConfig>,
    pub client: Arc<dyn InteractionClient>,
    pub artifacts: Arc<ArtifactStore>,
    pub broadcaster: Arc<EventBroadcaster>,
}

impl WorkflowContext {
    fn tool_ctx(&self) -> ToolContext {
        ToolContext {
            artifacts: self.artifacts.clone(),
            client: self.client.clone(),
        }
    }
}

/// Generate a research plan for a free-text target.
///
/// Advances `Idle -> Planned` (re-planning from `Planned` replaces the
/// existing plan). A plan without numbered tasks raises a soft warning
/// and leaves the session where it was.
pub async fn generate_plan(
    ctx: &WorkflowContext,
    session: &mut WorkflowSession,
    target: &str,
) -> Result<()> {
    let target = target.trim();
    if target.is_empty() {
        return Err(WorkflowError::EmptyTarget);
    }

    let next = transition_stage(session.stage, WorkflowStage::Planned)?;

    let request = InteractionRequest::for_model(
        &ctx.config.planning_model,
        prompts::plan_instruction(target),
    );
    let interaction = ctx.client.create_interaction(request).await?;

    let text = extract_text(Some(&interaction.outputs));
    let tasks = parse_tasks(&text);

    if tasks.is_empty() {
        log::warn!(
            "Planning interaction {} produced no numbered tasks",
            interaction.id
        );
        session.warning = Some("The plan contained no numbered tasks; try again".to_string());
        session.touch();
        return Ok(());
    }

    log::info!(
        "Plan {} created with {} tasks",
        interaction.id,
        tasks.len()
    );

    session.plan_interaction_id = Some(interaction.id.clone());
    session.tasks = tasks;
    session.research_text = None;
    session.selected_task_count = None;
    session.final_memo = None;
    session.warning = None;
    session.stage = next;
    session.touch();

    ctx.broadcaster.broadcast(
        "workflow:planned",
        json!({
            "sessionId": session.id,
            "interactionId": interaction.id,
            "taskCount": session.tasks.len(),
        }),
    );

    Ok(())
}

/// Tick/untick plan tasks by their verbatim numbers
pub fn select_tasks(session: &mut WorkflowSession, numbers: &[String]) -> Result<()> {
    if session.tasks.is_empty() {
        return Err(WorkflowError::MissingPlan);
    }

    for task in &mut session.tasks {
        task.selected = numbers.contains(&task.number);
    }
    session.touch();

    Ok(())
}

/// Run deep research over the selected tasks.
///
/// Submits a background interaction chained to the plan, polls it to a
/// terminal status, then advances `Planned -> Researched`. An explicit
/// `failed` status is an error; a degenerate (too short) result is a
/// soft warning that leaves the stage unchanged.
pub async fn start_research(ctx: &WorkflowContext, session: &mut WorkflowSession) -> Result<()> {
    let next = transition_stage(session.stage, WorkflowStage::Researched)?;

    let plan_id = session
        .plan_interaction_id
        .clone()
        .ok_or(WorkflowError::MissingPlan)?;

    let (task_lines, selected_count) = {
        let selected = session.selected_tasks();
        if selected.is_empty() {
            return Err(WorkflowError::NoTasksSelected);
        }
        let lines = selected
            .iter()
            .map(|t| t.as_line())
            .collect::<Vec<_>>()
            .join("\n");
        (lines, selected.len())
    };

    let request = InteractionRequest::for_agent(
        &ctx.config.research_agent,
        prompts::research_instruction(&task_lines),
    )
    .with_previous(plan_id)
    .in_background();

    let created = ctx.client.create_interaction(request).await?;

    log::info!(
        "Deep research interaction {} started for {} tasks",
        created.id,
        selected_count
    );

    ctx.broadcaster.broadcast(
        "workflow:research_started",
        json!({
            "sessionId": session.id,
            "interactionId": created.id,
            "taskCount": selected_count,
        }),
    );

    let finished = poll_until_terminal(ctx.client.as_ref(), &created.id, &ctx.config.poll).await?;

    if finished.status == InteractionStatus::Failed {
        return Err(WorkflowError::ResearchFailed {
            id: finished.id.clone(),
            message: finished.failure_message(),
        });
    }

    let text = extract_text(Some(&finished.outputs));
    if text.trim().len() < ctx.config.min_result_chars {
        log::warn!(
            "Research interaction {} returned a degenerate result ({} chars)",
            finished.id,
            text.trim().len()
        );
        session.warning = Some("Research returned almost no content; try again".to_string());
        session.touch();
        return Ok(());
    }

    session.research_text = Some(text);
    session.selected_task_count = Some(selected_count);
    session.warning = None;
    session.stage = next;
    session.touch();

    ctx.broadcaster.broadcast(
        "workflow:researched",
        json!({
            "sessionId": session.id,
            "interactionId": finished.id,
        }),
    );

    Ok(())
}

/// Run the multi-stage analysis pipeline over the research record.
///
/// The memo is the last stage's text; non-success tool outcomes surface
/// as a warning without blocking the transition.
pub async fn run_analysis(ctx: &WorkflowContext, session: &mut WorkflowSession) -> Result<()> {
    let next = transition_stage(session.stage, WorkflowStage::Analyzed)?;

    let research_text = session
        .research_text
        .clone()
        .ok_or(WorkflowError::MissingResearch)?;

    let pipeline = AnalysisPipeline::new(
        standard_stages(&ctx.config.analysis_model),
        ctx.client.clone(),
        ctx.tool_ctx(),
        ctx.broadcaster.clone(),
    );

    let run = pipeline.run(session.id, &research_text).await?;

    if run.final_text.trim().len() < ctx.config.min_result_chars {
        log::warn!(
            "Analysis pipeline returned a degenerate memo ({} chars)",
            run.final_text.trim().len()
        );
        session.warning = Some("Analysis produced almost no content; try again".to_string());
        session.touch();
        return Ok(());
    }

    let tool_failures: Vec<String> = run
        .tool_outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| {
            format!(
                "{}: {}",
                o.tool,
                o.message.as_deref().unwrap_or("did not succeed")
            )
        })
        .collect();

    session.final_memo = Some(run.final_text);
    session.warning = if tool_failures.is_empty() {
        None
    } else {
        Some(tool_failures.join("; "))
    };
    session.stage = next;
    session.touch();

    ctx.broadcaster.broadcast(
        "workflow:analyzed",
        json!({
            "sessionId": session.id,
            "toolOutcomes": run.tool_outcomes,
        }),
    );

    Ok(())
}

/// Clear all workflow fields and return the session to idle.
///
/// Authentication is server-level and deliberately survives a reset.
pub fn reset(ctx: &WorkflowContext, session: &mut WorkflowSession) {
    session.reset();

    ctx.broadcaster
        .broadcast("workflow:reset", json!({ "sessionId": session.id }));
}
