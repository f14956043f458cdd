use super::directive::TurnDirective;
use super::errors::AgentError;
use super::models::{AgentDefinition, AgentOptions, ToolSpec};
use super::runtime::CallRuntime;
use super::runtime::parser::{extract_agent_calls, extract_tag, extract_tool_calls, wrap_tag};
use crate::application::tooling::{AgentDispatcher, CapabilityCatalog, ToolRegistry};
use crate::constants::{
    AGENT_RESULT_TAG, RESPONSE_CORRECTION_PROMPT, RESPONSE_TAG, TASK_STATUS_TAG, TOOL_RESULT_TAG,
    USER_INPUT_TAG,
};
use crate::domain::calls::{CallOutcome, CallRequest};
use crate::domain::context::CallContext;
use crate::domain::history::{TaskHistory, TaskStatus};
use crate::domain::types::{AgentInput, AgentOutput};
use crate::model::{GenerateRequest, ModelProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Agent {
    name: String,
    description: String,
    context: String,
    provider: Arc<dyn ModelProvider>,
    runtime: CallRuntime,
    options: AgentOptions,
}

impl Agent {
    /// Builds an agent and its catalog from a definition.
    ///
    /// Inbuilt tools are resolved from `registry`; an unknown name fails the
    /// build. Sub-agents need a `dispatcher`.
    pub fn new(
        definition: &AgentDefinition,
        provider: Arc<dyn ModelProvider>,
        registry: Arc<ToolRegistry>,
        dispatcher: Option<Arc<dyn AgentDispatcher>>,
    ) -> Result<Self, AgentError> {
        let mut catalog = CapabilityCatalog::new(registry);
        if let Some(dispatcher) = dispatcher {
            catalog = catalog.with_dispatcher(dispatcher);
        }
        for tool in &definition.tools {
            match tool {
                ToolSpec::Inbuilt(name) => catalog.register_tool(name)?,
                ToolSpec::Remote(descriptor) => catalog.register_remote_tool(descriptor.clone()),
            }
        }
        for agent in &definition.agents {
            catalog.register_agent(agent.clone())?;
        }

        Ok(Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            context: definition.context.clone(),
            provider,
            runtime: CallRuntime::new(catalog),
            options: AgentOptions::default(),
        })
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> AgentOptions {
        self.options
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        self.runtime.catalog()
    }

    /// Runs one user turn against `history` until the model produces a
    /// terminal response.
    ///
    /// On success the history carries the new turns, the parsed task status
    /// and the token stats of the final round.
    pub async fn run(
        &self,
        ctx: &CallContext,
        history: &mut TaskHistory,
        input: AgentInput,
    ) -> Result<AgentOutput, AgentError> {
        let system_prompt = self
            .runtime
            .system_prompt(&self.context, &input.labels)
            .map_err(AgentError::Serialization)?;
        let session_key = input.session_key.clone();
        let mut next_input = AgentInput {
            text: wrap_tag(USER_INPUT_TAG, &input.text),
            ..input
        };

        info!(
            agent = %self.name,
            task_id = history.id(),
            session = %session_key,
            depth = ctx.depth(),
            "Agent run started"
        );

        for round in 0..self.options.max_rounds {
            if ctx.is_cancelled() {
                warn!(agent = %self.name, round, "Agent run cancelled");
                return Err(AgentError::Cancelled);
            }

            let user_text = next_input.text.clone();
            let request = GenerateRequest {
                system_prompt: system_prompt.clone(),
                history: history.transcript(),
                input: next_input,
            };
            debug!(agent = %self.name, round, turns = request.history.len(), "Submitting round to model provider");

            let response = tokio::select! {
                _ = ctx.cancellation().cancelled() => {
                    warn!(agent = %self.name, round, "Agent run cancelled during generation");
                    return Err(AgentError::Cancelled);
                }
                result = self.provider.generate(ctx, request) => result?,
            };

            if !user_text.is_empty() {
                history.push_user(user_text);
            }

            let tool_calls = extract_tool_calls(&response.text)?;
            let tool_outcomes = self
                .runtime
                .perform_all(ctx, history, &session_key, tool_calls.into_iter().map(CallRequest::Tool))
                .await;

            let agent_calls = extract_agent_calls(&response.text);
            let agent_outcomes = self
                .runtime
                .perform_all(ctx, history, &session_key, agent_calls.into_iter().map(CallRequest::Agent))
                .await;

            history.push_assistant(response.text.clone());

            match decide(&response.text, tool_outcomes, agent_outcomes)? {
                TurnDirective::Feedback { tag, outcomes } => {
                    debug!(agent = %self.name, round, tag, calls = outcomes.len(), "Feeding call outcomes back");
                    let payload = serde_json::to_string(&outcomes).map_err(AgentError::Serialization)?;
                    history.push_user(wrap_tag(tag, &payload));
                    next_input = AgentInput::default();
                }
                TurnDirective::Correct => {
                    warn!(agent = %self.name, round, "Model output has no response block, requesting correction");
                    next_input = AgentInput::text(RESPONSE_CORRECTION_PROMPT);
                }
                TurnDirective::Finish { response: text, status } => {
                    info!(agent = %self.name, round, task_id = history.id(), status = %status, "Agent run finished");
                    history.status = Some(status);
                    history.stats = response.stats;
                    return Ok(AgentOutput {
                        text,
                        stats: response.stats,
                    });
                }
            }
        }

        warn!(agent = %self.name, limit = self.options.max_rounds, "Agent exhausted its round limit");
        Err(AgentError::MaxRoundsExceeded {
            limit: self.options.max_rounds,
        })
    }
}

/// Tool outcomes win over agent outcomes; without either the output must
/// carry a `<response>` and a `<task_status>`.
fn decide(
    output: &str,
    tool_outcomes: Vec<CallOutcome>,
    agent_outcomes: Vec<CallOutcome>,
) -> Result<TurnDirective, AgentError> {
    if !tool_outcomes.is_empty() {
        return Ok(TurnDirective::Feedback {
            tag: TOOL_RESULT_TAG,
            outcomes: tool_outcomes,
        });
    }
    if !agent_outcomes.is_empty() {
        return Ok(TurnDirective::Feedback {
            tag: AGENT_RESULT_TAG,
            outcomes: agent_outcomes,
        });
    }

    let response = extract_tag(output, RESPONSE_TAG);
    if response.is_empty() {
        return Ok(TurnDirective::Correct);
    }

    let status_text = extract_tag(output, TASK_STATUS_TAG);
    if status_text.trim().is_empty() {
        return Err(AgentError::MissingTaskStatus);
    }
    let status = TaskStatus::parse(&status_text).unwrap_or_else(|| {
        warn!(status = %status_text.trim(), "Unrecognised task status, treating task as in progress");
        TaskStatus::InProgress
    });

    Ok(TurnDirective::Finish {
        response: response.trim().to_string(),
        status,
    })
}

#[cfg(test)]
mod decide_tests {
    use super::*;

    fn outcome(name: &str) -> CallOutcome {
        CallOutcome {
            name: name.into(),
            output: "ok".into(),
        }
    }

    #[test]
    fn tool_outcomes_take_priority() {
        let directive = decide("", vec![outcome("t")], vec![outcome("a")]).expect("directive");
        assert!(matches!(directive, TurnDirective::Feedback { tag, .. } if tag == TOOL_RESULT_TAG));
    }

    #[test]
    fn missing_response_requests_correction() {
        let directive = decide("thinking out loud", vec![], vec![]).expect("directive");
        assert!(matches!(directive, TurnDirective::Correct));
        let directive = decide("<response></response>", vec![], vec![]).expect("directive");
        assert!(matches!(directive, TurnDirective::Correct));
    }

    #[test]
    fn whitespace_response_still_finishes() {
        let directive = decide(
            "<response>  </response><task_status>completed</task_status>",
            vec![],
            vec![],
        )
        .expect("directive");
        assert!(matches!(
            directive,
            TurnDirective::Finish { ref response, status: TaskStatus::Completed } if response.is_empty()
        ));
    }

    #[test]
    fn response_without_status_is_a_protocol_error() {
        let err = decide("<response>hi</response>", vec![], vec![]).expect_err("must fail");
        assert!(matches!(err, AgentError::MissingTaskStatus));
    }

    #[test]
    fn unknown_status_falls_back_to_in_progress() {
        let directive = decide(
            "<response>hi</response><task_status>pending</task_status>",
            vec![],
            vec![],
        )
        .expect("directive");
        assert!(matches!(
            directive,
            TurnDirective::Finish { status: TaskStatus::InProgress, .. }
        ));
    }
}
