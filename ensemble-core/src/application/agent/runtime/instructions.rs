use crate::application::tooling::{AgentDescriptor, ToolDescriptor};
use std::collections::HashMap;

const AGENT_CONTEXT_LABEL: &str = "agent_system_context";

const AGENT_PROMPT_TEMPLATE: &str = r#"You are an assistant that works through user requests one task at a time and keeps track of whether the current task is finished.

Each user message arrives wrapped in <user_input></user_input> tags.

Instructions specific to this agent:
<agent_system_context>
{{agent_system_context}}
</agent_system_context>

For every user message:
1. Read the request inside <user_input>.
2. Think it through step by step and put that reasoning inside <thinking></thinking>.
3. Write the answer for the user inside a single <response></response> block.
4. Close with a single <task_status></task_status> block holding one of:
   - in_progress: the task needs more interaction with the user.
   - completed: the task is done and nothing further is needed.

Output layout:
<thinking>
[your reasoning]
</thinking>
<response>
[your answer]
</response>
<task_status>
[in_progress or completed]
</task_status>
"#;

const CATALOG_PROMPT_TEMPLATE: &str = r#"
You can use the tools and agents listed below. Read their descriptions and parameters before using them.
<tools>
{{tools}}
</tools>
Using tools:
1. Pick the tool that best matches the request.
2. Provide every required parameter as a JSON object. If a required value is unknown, ask the user for it.
3. Call a tool with exactly this layout:
<tool_call>
  <tool_name>name_of_the_tool</tool_name>
  <parameters>
    {"param1": "value1", "param2": "value2"}
  </parameters>
</tool_call>
4. Results come back inside <tool_result></tool_result> as a JSON list of {"name", "output"} entries. Use them in your answer.
5. If a tool fails, explain the problem and suggest another way forward.
6. Several tool calls may be made in one reply; they run in the order written.

<agents>
{{agents}}
</agents>
Using agents:
1. Decide whether the task needs a specialised agent or whether you can handle it yourself.
2. To delegate, pick the most suitable agent from the list and call it with exactly this layout:
<agent_call>
  <agent_name>name_of_the_agent</agent_name>
  <input>
    plain text request for the agent
  </input>
</agent_call>
3. Replies come back inside <agent_result></agent_result> as a JSON list of {"name", "output"} entries.
4. If an agent asks you something you can answer, answer it in your next delegation.
"#;

/// Replaces every `{{key}}` in `template` with its value from `labels`.
/// Placeholders without a label are left untouched.
pub fn replace_labels(template: &str, labels: &HashMap<String, String>) -> String {
    labels.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// Builds the system prompt for one run.
///
/// Labels are substituted into the agent context first; the result fills the
/// fixed wrapper. The catalog fragment follows when the agent has any tool or
/// sub-agent.
pub fn compose_system_prompt(
    agent_context: &str,
    labels: &HashMap<String, String>,
    tools: &[ToolDescriptor],
    agents: &[AgentDescriptor],
) -> Result<String, serde_json::Error> {
    let context = replace_labels(agent_context, labels);
    let wrapper = AGENT_PROMPT_TEMPLATE.replace(&label(AGENT_CONTEXT_LABEL), &context);

    if tools.is_empty() && agents.is_empty() {
        return Ok(wrapper);
    }

    let catalog = CATALOG_PROMPT_TEMPLATE
        .replace(&label("tools"), &serde_json::to_string(tools)?)
        .replace(&label("agents"), &serde_json::to_string(agents)?);
    Ok(format!("{wrapper}\n{catalog}"))
}

fn label(key: &str) -> String {
    format!("{{{{{key}}}}}")
}
