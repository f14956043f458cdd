//! Application constants
//!
//! Single source of truth for paths, tag names and loop limits.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_STORE_DIR: &str = "data/sessions";

pub const DEFAULT_MAX_ROUNDS: usize = 16;
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 4;

/// Width of the zero padded task id used as the record key.
pub const TASK_ID_WIDTH: usize = 19;

pub const USER_INPUT_TAG: &str = "user_input";
pub const RESPONSE_TAG: &str = "response";
pub const TASK_STATUS_TAG: &str = "task_status";
pub const TOOL_RESULT_TAG: &str = "tool_result";
pub const AGENT_RESULT_TAG: &str = "agent_result";

/// Input sent back to the model when its output carried no `<response>` block.
pub const RESPONSE_CORRECTION_PROMPT: &str =
    "it look like response tag not properly completed.correct the error silently.";
