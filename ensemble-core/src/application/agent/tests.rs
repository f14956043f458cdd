use super::*;
use crate::application::tooling::{
    AgentDescriptor, AgentDispatcher, ToolDescriptor, ToolInvokeError, ToolRegistry,
};
use crate::constants::RESPONSE_CORRECTION_PROMPT;
use crate::domain::context::CallContext;
use crate::domain::history::{TaskHistory, TaskStatus};
use crate::domain::types::{AgentInput, MessageRole, TokenStats};
use crate::model::{GenerateRequest, GenerateResponse, ModelError, ModelProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

enum Step {
    Reply(String),
    Compute(fn(&GenerateRequest) -> String),
}

#[derive(Clone)]
struct ScriptedProvider {
    steps: Arc<Mutex<Vec<Step>>>,
    recordings: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<&str>) -> Self {
        Self::from_steps(
            responses
                .into_iter()
                .map(|text| Step::Reply(text.to_string()))
                .collect(),
        )
    }

    fn from_steps(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<GenerateRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _ctx: &CallContext,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ModelError> {
        let mut steps = self.steps.lock().await;
        if steps.is_empty() {
            return Err(ModelError::backend("scripted", "script exhausted"));
        }
        let text = match steps.remove(0) {
            Step::Reply(text) => text,
            Step::Compute(build) => build(&request),
        };
        self.recordings.lock().await.push(request);
        Ok(GenerateResponse::new(
            text,
            TokenStats {
                input_token_count: 10,
                output_token_count: 5,
                total_token_count: 15,
            },
        ))
    }
}

fn registry() -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::with_inbuilt_tools().expect("inbuilt tools"))
}

fn agent_with(definition: AgentDefinition, provider: &ScriptedProvider) -> Agent {
    Agent::new(&definition, Arc::new(provider.clone()), registry(), None).expect("agent builds")
}

fn final_reply(text: &str) -> String {
    format!("<thinking>ok</thinking><response>{text}</response><task_status>completed</task_status>")
}

fn time_call() -> &'static str {
    r#"<tool_call><tool_name>get_current_time</tool_name><parameters>{"location":"UTC"}</parameters></tool_call>"#
}

#[tokio::test]
async fn plain_response_completes_the_task() {
    let provider = ScriptedProvider::new(vec![&*final_reply("Hello there")]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "Hello there");
    assert_eq!(output.stats.total_token_count, 15);
    assert_eq!(history.status, Some(TaskStatus::Completed));
    assert_eq!(history.stats.total_token_count, 15);

    let turns = history.contents();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, MessageRole::User);
    assert_eq!(turns[0].content, "<user_input>hi</user_input>");
    assert_eq!(turns[1].role, MessageRole::Assistant);

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input.text, "<user_input>hi</user_input>");
    assert!(requests[0].history.is_empty());
    assert!(!requests[0].system_prompt.contains("<tool_call>"));
}

#[tokio::test]
async fn single_tool_call_feeds_back_before_finishing() {
    let provider = ScriptedProvider::new(vec![time_call(), &*final_reply("done")]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_tool("get_current_time"),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    agent
        .run(&CallContext::new(), &mut history, AgentInput::text("time?"))
        .await
        .expect("run succeeds");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests[0].system_prompt.contains(r#""name":"get_current_time""#));

    let second = &requests[1];
    assert!(second.input.text.is_empty());
    assert_eq!(second.history.len(), 3);
    assert_eq!(second.history[1].role, MessageRole::Assistant);
    assert_eq!(second.history[1].content, time_call());
    assert_eq!(second.history[2].role, MessageRole::User);
    assert!(second.history[2].content.starts_with("<tool_result>["));
    assert!(second.history[2].content.ends_with("]</tool_result>"));

    assert_eq!(history.contents().len(), 4);
}

#[tokio::test]
async fn time_scenario_embeds_tool_output_in_final_response() {
    fn answer_with_time(request: &GenerateRequest) -> String {
        let feedback = request
            .history
            .last()
            .map(|turn| turn.content.clone())
            .unwrap_or_default();
        let payload = codec::extract_tag(&feedback, "tool_result");
        let outcomes: Value = serde_json::from_str(&payload).unwrap_or(Value::Null);
        let output: Value = outcomes[0]["output"]
            .as_str()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or(Value::Null);
        let time = output["currentTime"].as_str().unwrap_or("unknown");
        final_reply(&format!("It is {time} in UTC."))
    }

    let provider = ScriptedProvider::from_steps(vec![
        Step::Reply(time_call().to_string()),
        Step::Compute(answer_with_time),
    ]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_tool("get_current_time"),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(
            &CallContext::new(),
            &mut history,
            AgentInput::text("What's the time in UTC?"),
        )
        .await
        .expect("run succeeds");

    assert_eq!(provider.requests().await.len(), 2);
    assert_eq!(history.status, Some(TaskStatus::Completed));
    let time = output
        .text
        .strip_prefix("It is ")
        .and_then(|rest| rest.strip_suffix(" in UTC."))
        .expect("timestamp in response");
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "{time}");
    assert!(time.ends_with('Z'));
}

#[tokio::test]
async fn failing_tool_output_is_the_error_message() {
    let remote = ToolDescriptor {
        name: "lookup".into(),
        service_name: "search-service".into(),
        description: "remote lookup".into(),
        parameters: serde_json::json!({"type": "object"}),
        inbuilt: false,
    };
    let provider = ScriptedProvider::new(vec![
        r#"<tool_call><tool_name>lookup</tool_name><parameters>{"q":"x"}</parameters></tool_call>"#,
        &*final_reply("sorry"),
    ]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_remote_tool(remote),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    agent
        .run(&CallContext::new(), &mut history, AgentInput::text("find x"))
        .await
        .expect("run proceeds past tool failure");

    let expected = ToolInvokeError::RemoteUnavailable {
        tool: "lookup".into(),
        service: "search-service".into(),
    }
    .to_string();
    let feedback = &history.contents()[2].content;
    let outcomes: Value =
        serde_json::from_str(&codec::extract_tag(feedback, "tool_result")).expect("json");
    assert_eq!(outcomes[0]["name"], "lookup");
    assert_eq!(outcomes[0]["output"], expected.as_str());
}

#[tokio::test]
async fn unknown_tool_is_reported_back_to_the_model() {
    let provider = ScriptedProvider::new(vec![
        r#"<tool_call><tool_name>teleport</tool_name><parameters>{}</parameters></tool_call>"#,
        &*final_reply("cannot"),
    ]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    agent
        .run(&CallContext::new(), &mut history, AgentInput::text("go"))
        .await
        .expect("run succeeds");

    assert_eq!(
        history.contents()[2].content,
        r#"<tool_result>[{"name":"teleport","output":"tool teleport not found"}]</tool_result>"#
    );
}

#[tokio::test]
async fn unknown_sub_agent_yields_agent_result_feedback() {
    let provider = ScriptedProvider::new(vec![
        "<agent_call><agent_name>ghost</agent_name><input>help</input></agent_call>",
        &*final_reply("no ghost"),
    ]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("ask ghost"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "no ghost");
    assert_eq!(
        history.contents()[2].content,
        r#"<agent_result>[{"name":"ghost","output":"agent ghost not found"}]</agent_result>"#
    );
    let ghost = history.agent_history("ghost").expect("sub-history recorded for every agent call");
    assert!(ghost.contents().is_empty());
}

#[tokio::test]
async fn tool_results_take_priority_over_agent_results() {
    let provider = ScriptedProvider::new(vec![
        &*format!("{}<agent_call><agent_name>ghost</agent_name><input>x</input></agent_call>", time_call()),
        &*final_reply("done"),
    ]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_tool("get_current_time"),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    agent
        .run(&CallContext::new(), &mut history, AgentInput::text("both"))
        .await
        .expect("run succeeds");

    let feedback = &history.contents()[2].content;
    assert!(feedback.starts_with("<tool_result>"));
    assert!(!history.contents().iter().any(|turn| turn.content.starts_with("<agent_result>")));
}

#[tokio::test]
async fn missing_task_status_is_a_protocol_error() {
    let provider = ScriptedProvider::new(vec!["<response>half done</response>"]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);
    let before = history.status;

    let err = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect_err("protocol error");

    assert!(matches!(err, AgentError::MissingTaskStatus));
    assert_eq!(
        err.user_message(),
        "error processing your request, please try again later"
    );
    assert_eq!(history.status, before);
}

#[tokio::test]
async fn malformed_parameters_fail_the_run() {
    let provider = ScriptedProvider::new(vec![
        "<tool_call><tool_name>get_current_time</tool_name><parameters>{oops}</parameters></tool_call>",
    ]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_tool("get_current_time"),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    let err = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect_err("codec error");
    assert!(matches!(err, AgentError::Codec(_)));
}

#[tokio::test]
async fn missing_response_triggers_bounded_correction_rounds() {
    let provider = ScriptedProvider::new(vec!["just thinking", "still thinking", "more thinking"]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider).with_options(AgentOptions {
        max_rounds: 3,
        ..AgentOptions::default()
    });
    let mut history = TaskHistory::for_task(1);

    let err = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect_err("round limit");

    assert!(matches!(err, AgentError::MaxRoundsExceeded { limit: 3 }));
    let requests = provider.requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].input.text, RESPONSE_CORRECTION_PROMPT);
    assert_eq!(requests[2].input.text, RESPONSE_CORRECTION_PROMPT);
    assert_eq!(history.status, Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn whitespace_response_finishes_in_one_round() {
    let provider = ScriptedProvider::new(vec![
        "<response>  </response><task_status>completed</task_status>",
    ]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "");
    assert_eq!(provider.requests().await.len(), 1);
    assert_eq!(history.status, Some(TaskStatus::Completed));
}

#[tokio::test]
async fn correction_round_recovers() {
    let provider = ScriptedProvider::new(vec!["no tags at all", &*final_reply("fixed")]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "fixed");
    let turns = history.contents();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[2].content, RESPONSE_CORRECTION_PROMPT);
}

#[tokio::test]
async fn in_progress_status_is_recorded() {
    let provider = ScriptedProvider::new(vec![
        "<response>Which city?</response><task_status>in_progress</task_status>",
    ]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let output = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("weather"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "Which city?");
    assert_eq!(history.status, Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn labels_fill_the_agent_context() {
    let provider = ScriptedProvider::new(vec![&*final_reply("bonjour")]);
    let agent = agent_with(
        AgentDefinition::new("assistant").with_context("Always answer {{user_name}} in {{language}}."),
        &provider,
    );
    let mut history = TaskHistory::for_task(1);

    agent
        .run(
            &CallContext::new(),
            &mut history,
            AgentInput::text("hi")
                .with_label("user_name", "Ada")
                .with_label("language", "French"),
        )
        .await
        .expect("run succeeds");

    let requests = provider.requests().await;
    assert!(requests[0].system_prompt.contains("Always answer Ada in French."));
}

#[tokio::test]
async fn previous_task_turns_precede_current_turns() {
    let provider = ScriptedProvider::new(vec![&*final_reply("again")]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);

    let mut previous = TaskHistory::for_task(1);
    previous.push_user("<user_input>earlier</user_input>");
    previous.push_assistant("earlier answer");
    let mut history = TaskHistory::for_task(2);
    history.set_previous_task(Arc::new(previous));

    agent
        .run(&CallContext::new(), &mut history, AgentInput::text("now"))
        .await
        .expect("run succeeds");

    let requests = provider.requests().await;
    assert_eq!(requests[0].history.len(), 2);
    assert_eq!(requests[0].history[1].content, "earlier answer");
    assert_eq!(history.contents().len(), 2);
}

#[tokio::test]
async fn cancelled_context_stops_before_generation() {
    let provider = ScriptedProvider::new(vec![&*final_reply("never")]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let token = CancellationToken::new();
    token.cancel();
    let mut history = TaskHistory::for_task(1);

    let err = agent
        .run(
            &CallContext::with_cancellation(token),
            &mut history,
            AgentInput::text("hi"),
        )
        .await
        .expect_err("cancelled");

    assert!(matches!(err, AgentError::Cancelled));
    assert!(provider.requests().await.is_empty());
    assert!(history.contents().is_empty());
}

#[tokio::test]
async fn generation_failure_propagates() {
    let provider = ScriptedProvider::new(vec![]);
    let agent = agent_with(AgentDefinition::new("assistant"), &provider);
    let mut history = TaskHistory::for_task(1);

    let err = agent
        .run(&CallContext::new(), &mut history, AgentInput::text("hi"))
        .await
        .expect_err("generation error");
    assert!(matches!(err, AgentError::Generation(_)));
}

#[test]
fn unknown_inbuilt_tool_fails_the_build() {
    let provider = ScriptedProvider::new(vec![]);
    let definition = AgentDefinition::new("assistant").with_tool("teleport");
    let err = Agent::new(&definition, Arc::new(provider), registry(), None)
        .err()
        .expect("build fails");
    assert_eq!(err.to_string(), "tool teleport not found");
}

#[test]
fn sub_agents_require_a_dispatcher() {
    let provider = ScriptedProvider::new(vec![]);
    let definition =
        AgentDefinition::new("planner").with_agent(AgentDescriptor::new("researcher", "finds"));
    let result = Agent::new(&definition, Arc::new(provider), registry(), None);
    assert!(matches!(result, Err(AgentError::Catalog(_))));
}

fn directory(provider: &ScriptedProvider, options: AgentOptions) -> Arc<AgentDirectory> {
    let planner = AgentDefinition::new("planner")
        .with_description("plans work")
        .with_agent(AgentDescriptor::new("researcher", "finds facts"));
    let researcher = AgentDefinition::new("researcher").with_description("finds facts");
    let looper = AgentDefinition::new("looper")
        .with_agent(AgentDescriptor::new("looper", "delegates to itself"));
    AgentDirectory::new(
        vec![planner, researcher, looper],
        Arc::new(provider.clone()),
        registry(),
        options,
    )
}

#[tokio::test]
async fn delegation_runs_sub_agent_on_nested_history() {
    let provider = ScriptedProvider::new(vec![
        "<agent_call><agent_name>researcher</agent_name><input>find the answer</input></agent_call>",
        &*final_reply("42"),
        &*final_reply("The answer is 42"),
    ]);
    let directory = directory(&provider, AgentOptions::default());
    let planner = directory.build("planner").expect("planner");
    let mut history = TaskHistory::for_task(7);

    let output = planner
        .run(
            &CallContext::new(),
            &mut history,
            AgentInput::text("question").with_session("session-1"),
        )
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "The answer is 42");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 3);
    let sub_request = &requests[1];
    assert_eq!(sub_request.input.text, "<user_input>find the answer</user_input>");
    assert_eq!(sub_request.input.session_key, "session-1");
    assert_eq!(sub_request.input.child_session_key, history.id());

    let sub_history = history.agent_history("researcher").expect("sub history");
    assert_eq!(sub_history.contents().len(), 2);
    assert_eq!(sub_history.status, Some(TaskStatus::Completed));
    assert_eq!(
        history.contents()[2].content,
        r#"<agent_result>[{"name":"researcher","output":"42"}]</agent_result>"#
    );
}

#[tokio::test]
async fn delegation_depth_is_capped() {
    let call = "<agent_call><agent_name>looper</agent_name><input>again</input></agent_call>";
    let provider = ScriptedProvider::new(vec![
        call,
        call,
        &*final_reply("inner"),
        &*final_reply("outer"),
    ]);
    let directory = directory(
        &provider,
        AgentOptions {
            max_delegation_depth: 1,
            ..AgentOptions::default()
        },
    );
    let looper = directory.build("looper").expect("looper");
    let mut history = TaskHistory::for_task(1);

    let output = looper
        .run(&CallContext::new(), &mut history, AgentInput::text("loop"))
        .await
        .expect("run succeeds");

    assert_eq!(output.text, "outer");
    let nested = history.agent_history("looper").expect("depth one history");
    let feedback = &nested.contents()[2].content;
    assert!(feedback.contains("maximum delegation depth of 1"), "{feedback}");
    assert!(nested.agent_history("looper").is_some());
    assert!(
        nested
            .agent_history("looper")
            .map(|h| h.contents().is_empty())
            .unwrap_or(false)
    );
}

#[tokio::test]
async fn directory_rejects_unknown_agents() {
    let provider = ScriptedProvider::new(vec![]);
    let directory = directory(&provider, AgentOptions::default());
    assert!(matches!(
        directory.build("nobody"),
        Err(AgentError::UnknownAgent(name)) if name == "nobody"
    ));

    let mut history = TaskHistory::new();
    let err = directory
        .dispatch(&CallContext::new(), "nobody", &mut history, AgentInput::text("x"))
        .await
        .expect_err("unknown agent");
    assert_eq!(err.to_string(), "agent nobody not found");
}
