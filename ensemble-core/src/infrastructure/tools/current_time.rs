use crate::application::tooling::{InbuiltTool, ToolFailure};
use crate::domain::context::CallContext;
use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// Layout string some models copy from RFC 3339 documentation.
const RFC3339_REFERENCE_LAYOUT: &str = "2006-01-02T15:04:05Z07:00";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CurrentTimeInput {
    /// strftime style format string, default format is RFC 3339 (e.g. 2024-05-01T10:00:00Z).
    #[serde(default)]
    pub format: Option<String>,
    /// Time zone: `UTC`, `Local`, a fixed offset such as `+05:30` or an IANA name
    /// such as `Asia/Colombo` or `America/New_York`. Defaults to UTC.
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentTimeOutput {
    /// Current time formatted as per input parameters.
    #[serde(rename = "currentTime")]
    pub current_time: String,
}

pub struct CurrentTimeTool;

#[async_trait]
impl InbuiltTool for CurrentTimeTool {
    type Input = CurrentTimeInput;
    type Output = CurrentTimeOutput;

    const NAME: &'static str = "get_current_time";
    const DESCRIPTION: &'static str = "get current time";

    async fn invoke(
        &self,
        _ctx: &CallContext,
        input: Self::Input,
    ) -> Result<Self::Output, ToolFailure> {
        let format = input.format.as_deref().map(str::trim).unwrap_or_default();
        let location = input.location.as_deref().map(str::trim).unwrap_or_default();

        let current_time = match location {
            "" | "UTC" | "utc" | "Z" | "Etc/UTC" => render(Utc::now(), format)?,
            "Local" | "local" => render(Local::now(), format)?,
            other => match other.parse::<FixedOffset>() {
                Ok(offset) => render(Utc::now().with_timezone(&offset), format)?,
                Err(_) => {
                    let zone: chrono_tz::Tz = other.parse().map_err(|err| {
                        ToolFailure::new(format!("invalid location: {other}: {err}"))
                    })?;
                    render(Utc::now().with_timezone(&zone), format)?
                }
            },
        };

        Ok(CurrentTimeOutput { current_time })
    }
}

fn render<Tz>(now: DateTime<Tz>, format: &str) -> Result<String, ToolFailure>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if format.is_empty() || format == RFC3339_REFERENCE_LAYOUT {
        return Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ToolFailure::new(format!("invalid format: {format}")));
    }

    let mut rendered = String::new();
    write!(rendered, "{}", now.format(format))
        .map_err(|_| ToolFailure::new(format!("invalid format: {format}")))?;
    Ok(rendered)
}
