// Integration tests for the workflow orchestrator against a scripted
// provider. Polling runs on tokio's paused clock, so the research tests
// cover minutes of simulated waiting in milliseconds.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use dealdesk::artifacts::ArtifactStore;
use dealdesk::config::AppConfig;
use dealdesk::provider::{
    poll_until_terminal, Interaction, InteractionClient, InteractionRequest, InteractionStatus,
    PollConfig, ProviderError,
};
use dealdesk::server::EventBroadcaster;
use dealdesk::workflow::{self, WorkflowContext};
use dealdesk::{WorkflowError, WorkflowSession, WorkflowStage};

// ============================================================================
// Scripted provider
// ============================================================================

/// Provider double that replays scripted interactions and records every
/// create request for assertions
struct MockClient {
    create_responses: Mutex<VecDeque<Interaction>>,
    get_responses: Mutex<VecDeque<Interaction>>,
    create_requests: Mutex<Vec<InteractionRequest>>,
    get_count: Mutex<usize>,
}

impl MockClient {
    fn new() -> Self {
        Self {
            create_responses: Mutex::new(VecDeque::new()),
            get_responses: Mutex::new(VecDeque::new()),
            create_requests: Mutex::new(Vec::new()),
            get_count: Mutex::new(0),
        }
    }

    fn script_create(&self, interaction: Interaction) {
        self.create_responses.lock().unwrap().push_back(interaction);
    }

    fn script_get(&self, interaction: Interaction) {
        self.get_responses.lock().unwrap().push_back(interaction);
    }

    fn create_requests(&self) -> Vec<InteractionRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    fn get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl InteractionClient for MockClient {
    async fn create_interaction(
        &self,
        request: InteractionRequest,
    ) -> Result<Interaction, ProviderError> {
        self.create_requests.lock().unwrap().push(request);
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Request("scripted: no create response".to_string()))
    }

    async fn get_interaction(&self, _id: &str) -> Result<Interaction, ProviderError> {
        *self.get_count.lock().unwrap() += 1;

        // The last scripted status repeats forever, so an `in_progress`
        // tail simulates a stuck remote job
        let mut responses = self.get_responses.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.pop_front().unwrap())
        } else {
            responses
                .front()
                .cloned()
                .ok_or_else(|| ProviderError::Request("scripted: no get response".to_string()))
        }
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }
}

fn interaction(id: &str, status: InteractionStatus, text: &str) -> Interaction {
    Interaction {
        id: id.to_string(),
        status,
        outputs: json!([{ "text": text }]),
        error: None,
    }
}

fn test_context(client: Arc<MockClient>, dir: &TempDir) -> WorkflowContext {
    let config = AppConfig {
        api_key: "test-key".to_string(),
        ..AppConfig::default()
    };

    WorkflowContext {
        config: Arc::new(config),
        client,
        artifacts: Arc::new(ArtifactStore::open(dir.path()).unwrap()),
        broadcaster: Arc::new(EventBroadcaster::new()),
    }
}

const PLAN_TEXT: &str = "1. Find founders\n2. Analyze market\n3. Check financials";

const RESEARCH_TEXT: &str = "Founder: Jane Doe (jane@acme.example). Acme Cremation runs \
three Phoenix locations at roughly $12M ARR with strong repeat business.";

/// Drive a session to `Planned` with the standard three-task plan
async fn planned_session(ctx: &WorkflowContext, client: &MockClient) -> WorkflowSession {
    client.script_create(interaction("plan-1", InteractionStatus::Completed, PLAN_TEXT));

    let mut session = WorkflowSession::new();
    workflow::generate_plan(ctx, &mut session, "Pet cremation in Phoenix, AZ")
        .await
        .unwrap();
    session
}

// ============================================================================
// Planning
// ============================================================================

#[tokio::test]
async fn test_generate_plan_parses_tasks_and_advances() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let session = planned_session(&ctx, &client).await;

    assert_eq!(session.stage, WorkflowStage::Planned);
    assert_eq!(session.plan_interaction_id.as_deref(), Some("plan-1"));
    assert_eq!(session.tasks.len(), 3);
    assert!(session.tasks.iter().all(|t| t.selected));
    assert!(session.warning.is_none());

    let requests = client.create_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].input.contains("Pet cremation in Phoenix, AZ"));
    assert!(requests[0].store);
    assert!(!requests[0].background);
}

#[tokio::test]
async fn test_generate_plan_rejects_empty_target() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = WorkflowSession::new();
    let result = workflow::generate_plan(&ctx, &mut session, "   ").await;

    assert!(matches!(result, Err(WorkflowError::EmptyTarget)));
    assert_eq!(session.stage, WorkflowStage::Idle);
    assert!(client.create_requests().is_empty());
}

#[tokio::test]
async fn test_provider_failure_leaves_session_unchanged() {
    let client = Arc::new(MockClient::new()); // nothing scripted -> create fails
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = WorkflowSession::new();
    let result = workflow::generate_plan(&ctx, &mut session, "Pet cremation").await;

    assert!(matches!(result, Err(WorkflowError::Provider(_))));
    assert_eq!(session.stage, WorkflowStage::Idle);
    assert!(session.tasks.is_empty());
    assert!(session.plan_interaction_id.is_none());
}

#[tokio::test]
async fn test_plan_without_numbered_tasks_is_a_soft_warning() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    client.script_create(interaction(
        "plan-1",
        InteractionStatus::Completed,
        "I could not produce a plan for that target.",
    ));

    let mut session = WorkflowSession::new();
    workflow::generate_plan(&ctx, &mut session, "Pet cremation")
        .await
        .unwrap();

    assert_eq!(session.stage, WorkflowStage::Idle);
    assert!(session.tasks.is_empty());
    assert!(session.warning.is_some());
}

// ============================================================================
// Research
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_research_submits_selected_tasks_and_polls_to_completion() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = planned_session(&ctx, &client).await;

    // Tick tasks 1 and 3 only
    workflow::select_tasks(&mut session, &["1".to_string(), "3".to_string()]).unwrap();

    client.script_create(interaction(
        "research-1",
        InteractionStatus::InProgress,
        "",
    ));
    client.script_get(interaction("research-1", InteractionStatus::InProgress, ""));
    client.script_get(interaction("research-1", InteractionStatus::InProgress, ""));
    client.script_get(interaction(
        "research-1",
        InteractionStatus::Completed,
        RESEARCH_TEXT,
    ));

    workflow::start_research(&ctx, &mut session).await.unwrap();

    assert_eq!(session.stage, WorkflowStage::Researched);
    assert_eq!(session.research_text.as_deref(), Some(RESEARCH_TEXT));
    assert_eq!(session.selected_task_count, Some(2));

    // Exactly the two selected tasks, "<num>. <text>" newline-joined
    let requests = client.create_requests();
    let research_request = &requests[1];
    assert_eq!(
        research_request.input,
        "Find founder details for:\n1. Find founders\n3. Check financials"
    );
    assert_eq!(
        research_request.previous_interaction_id.as_deref(),
        Some("plan-1")
    );
    assert!(research_request.background);
    assert!(research_request.agent.is_some());

    // Two in_progress polls before the terminal fetch
    assert_eq!(client.get_count(), 3);
}

#[tokio::test]
async fn test_research_requires_a_selected_task() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = planned_session(&ctx, &client).await;
    workflow::select_tasks(&mut session, &[]).unwrap();

    let result = workflow::start_research(&ctx, &mut session).await;

    assert!(matches!(result, Err(WorkflowError::NoTasksSelected)));
    assert_eq!(session.stage, WorkflowStage::Planned);
}

#[tokio::test]
async fn test_research_before_plan_is_a_stage_error() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = WorkflowSession::new();
    let result = workflow::start_research(&ctx, &mut session).await;

    assert!(matches!(result, Err(WorkflowError::Stage(_))));
    assert_eq!(session.stage, WorkflowStage::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failed_research_is_an_error_not_a_result() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = planned_session(&ctx, &client).await;

    client.script_create(interaction(
        "research-1",
        InteractionStatus::InProgress,
        "",
    ));
    client.script_get(interaction("research-1", InteractionStatus::InProgress, ""));
    client.script_get(Interaction {
        id: "research-1".to_string(),
        status: InteractionStatus::Failed,
        outputs: serde_json::Value::Null,
        error: Some("agent crashed".to_string()),
    });

    let result = workflow::start_research(&ctx, &mut session).await;

    match result {
        Err(WorkflowError::ResearchFailed { id, message }) => {
            assert_eq!(id, "research-1");
            assert_eq!(message, "agent crashed");
        }
        other => panic!("expected ResearchFailed, got {:?}", other.map(|_| ())),
    }
    assert_eq!(session.stage, WorkflowStage::Planned);
    assert!(session.research_text.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_degenerate_research_warns_without_advancing() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = planned_session(&ctx, &client).await;

    client.script_create(interaction(
        "research-1",
        InteractionStatus::InProgress,
        "",
    ));
    client.script_get(interaction("research-1", InteractionStatus::Completed, "ok"));

    workflow::start_research(&ctx, &mut session).await.unwrap();

    assert_eq!(session.stage, WorkflowStage::Planned);
    assert!(session.research_text.is_none());
    assert!(session.warning.is_some());
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_poll_returns_once_status_leaves_in_progress() {
    let client = MockClient::new();
    client.script_get(interaction("int-1", InteractionStatus::InProgress, ""));
    client.script_get(interaction("int-1", InteractionStatus::InProgress, ""));
    client.script_get(interaction("int-1", InteractionStatus::InProgress, ""));
    client.script_get(interaction("int-1", InteractionStatus::Completed, "done"));

    let config = PollConfig::default();
    let result = poll_until_terminal(&client, "int-1", &config).await.unwrap();

    assert_eq!(result.status, InteractionStatus::Completed);
    assert_eq!(client.get_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_poll_keeps_waiting_while_in_progress_then_times_out() {
    let client = MockClient::new();
    // Single scripted status repeats forever: a stuck remote job
    client.script_get(interaction("int-1", InteractionStatus::InProgress, ""));

    let config = PollConfig {
        interval: Duration::from_secs(5),
        max_wait: Duration::from_secs(600),
    };
    let result = poll_until_terminal(&client, "int-1", &config).await;

    match result {
        Err(WorkflowError::PollTimeout { waited_secs, .. }) => {
            assert_eq!(waited_secs, 600);
        }
        other => panic!("expected PollTimeout, got {:?}", other.map(|_| ())),
    }

    // It kept fetching the whole time instead of giving up early
    assert!(client.get_count() > 100);
}

// ============================================================================
// Analysis
// ============================================================================

async fn researched_session(ctx: &WorkflowContext, client: &MockClient) -> WorkflowSession {
    let mut session = planned_session(ctx, client).await;
    session.stage = WorkflowStage::Researched;
    session.research_text = Some(RESEARCH_TEXT.to_string());
    session.selected_task_count = Some(3);
    session
}

const CHART_DIRECTIVE_OUTPUT: &str = r#"Model assumptions attached.
{"companyName": "Acme Cremation", "currentArr": 12.0, "bearRates": "1.1,1.2", "baseRates": "1.3,1.4", "bullRates": "1.5,1.7"}"#;

const FINAL_MEMO: &str = "## Strategic Memo\n\nAcme Cremation is a buy at the right multiple. \
Scenario analysis, risks and the contact table follow below in full detail.";

fn script_analysis_stages(client: &MockClient) {
    client.script_create(interaction(
        "a-1",
        InteractionStatus::Completed,
        CHART_DIRECTIVE_OUTPUT,
    ));
    client.script_create(interaction(
        "a-2",
        InteractionStatus::Completed,
        "Market: fragmented, $2B TAM, two regional consolidators.",
    ));
    client.script_create(interaction(
        "a-3",
        InteractionStatus::Completed,
        "Risks: key-person dependency (high), licensing (medium).",
    ));
    client.script_create(interaction(
        "a-4",
        InteractionStatus::Completed,
        "Draft memo with contact table and scenario summary.",
    ));
    client.script_create(interaction(
        "a-5",
        InteractionStatus::Completed,
        "Headline: $12M ARR, 3 scenarios, verdict: pursue.",
    ));
    client.script_create(interaction("a-6", InteractionStatus::Completed, FINAL_MEMO));
}

#[tokio::test]
async fn test_analysis_runs_stages_in_order_and_takes_last_text() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = researched_session(&ctx, &client).await;
    script_analysis_stages(&client);

    let mut events = ctx.broadcaster.subscribe();

    workflow::run_analysis(&ctx, &mut session).await.unwrap();

    assert_eq!(session.stage, WorkflowStage::Analyzed);
    assert_eq!(session.final_memo.as_deref(), Some(FINAL_MEMO));
    assert!(session.warning.is_none());

    // One create per stage, after the single planning call
    let requests = client.create_requests();
    assert_eq!(requests.len(), 1 + 6);

    // Later stages see earlier outputs by key
    let memo_instruction = &requests[4].input;
    assert!(memo_instruction.contains(CHART_DIRECTIVE_OUTPUT));
    assert!(memo_instruction.contains("fragmented"));
    assert!(memo_instruction.contains("key-person"));

    // Stage lifecycle events arrived in order
    let mut started = Vec::new();
    while let Ok(event) = events.try_recv() {
        if event.event == "analysis:stage_started" {
            started.push(event.payload["stage"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(
        started,
        vec![
            "financial_model",
            "market_analysis",
            "risk_assessment",
            "memo",
            "infographic",
            "html_report"
        ]
    );
}

#[tokio::test]
async fn test_analysis_writes_chart_report_and_infographic_artifacts() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = researched_session(&ctx, &client).await;
    script_analysis_stages(&client);

    workflow::run_analysis(&ctx, &mut session).await.unwrap();

    let names = ctx.artifacts.list().unwrap();
    assert!(names.iter().any(|n| n.starts_with("chart_") && n.ends_with(".svg")));
    assert!(names.iter().any(|n| n.starts_with("report_") && n.ends_with(".html")));
    assert!(names
        .iter()
        .any(|n| n.starts_with("infographic_") && n.ends_with(".png")));
}

#[tokio::test]
async fn test_tool_failure_is_a_warning_not_an_error() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = researched_session(&ctx, &client).await;

    // Financial stage forgets the chart directive; everything else is fine
    client.script_create(interaction(
        "a-1",
        InteractionStatus::Completed,
        "Model discussed in prose only.",
    ));
    client.script_create(interaction("a-2", InteractionStatus::Completed, "Market."));
    client.script_create(interaction("a-3", InteractionStatus::Completed, "Risks."));
    client.script_create(interaction("a-4", InteractionStatus::Completed, "Memo."));
    client.script_create(interaction("a-5", InteractionStatus::Completed, "Brief."));
    client.script_create(interaction("a-6", InteractionStatus::Completed, FINAL_MEMO));

    workflow::run_analysis(&ctx, &mut session).await.unwrap();

    assert_eq!(session.stage, WorkflowStage::Analyzed);
    let warning = session.warning.expect("tool failure should surface");
    assert!(warning.contains("generate_financial_chart"));
}

#[tokio::test]
async fn test_analysis_before_research_is_a_stage_error() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = planned_session(&ctx, &client).await;
    let result = workflow::run_analysis(&ctx, &mut session).await;

    assert!(matches!(result, Err(WorkflowError::Stage(_))));
    assert_eq!(session.stage, WorkflowStage::Planned);
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn test_reset_clears_workflow_fields_from_any_stage() {
    let client = Arc::new(MockClient::new());
    let dir = TempDir::new().unwrap();
    let ctx = test_context(client.clone(), &dir);

    let mut session = researched_session(&ctx, &client).await;
    session.final_memo = Some("memo".to_string());

    workflow::reset(&ctx, &mut session);

    assert_eq!(session.stage, WorkflowStage::Idle);
    assert!(session.plan_interaction_id.is_none());
    assert!(session.tasks.is_empty());
    assert!(session.research_text.is_none());
    assert!(session.selected_task_count.is_none());
    assert!(session.final_memo.is_none());
}
