//! Adapter turning a typed tool into the uniform JSON contract.
//!
//! Every inbuilt tool is an explicit bundle: name, description, a typed
//! input whose JSON schema is derived with `schemars`, a typed output and an
//! async `invoke`. [`InbuiltToolAdapter`] decodes the model's JSON into the
//! input type, runs the tool and encodes the output back to JSON.

use super::descriptor::ToolDescriptor;
use super::error::{SchemaError, ToolFailure, ToolInvokeError};
use super::interface::ToolExecutor;
use crate::domain::context::CallContext;
use async_trait::async_trait;
use schemars::JsonSchema;
use schemars::schema::{InstanceType, SingleOrVec};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[async_trait]
pub trait InbuiltTool: Send + Sync + 'static {
    type Input: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn invoke(
        &self,
        ctx: &CallContext,
        input: Self::Input,
    ) -> Result<Self::Output, ToolFailure>;
}

pub struct InbuiltToolAdapter<T: InbuiltTool> {
    tool: T,
    descriptor: ToolDescriptor,
}

impl<T: InbuiltTool> InbuiltToolAdapter<T> {
    pub fn new(tool: T) -> Result<Self, SchemaError> {
        let parameters = input_schema::<T::Input>(T::NAME)?;
        Ok(Self {
            tool,
            descriptor: ToolDescriptor {
                name: T::NAME.to_string(),
                service_name: String::new(),
                description: T::DESCRIPTION.to_string(),
                parameters,
                inbuilt: true,
            },
        })
    }
}

#[async_trait]
impl<T: InbuiltTool> ToolExecutor for InbuiltToolAdapter<T> {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, ctx: &CallContext, input: &str) -> Result<String, ToolInvokeError> {
        if ctx.is_cancelled() {
            return Err(ToolInvokeError::Cancelled(T::NAME.to_string()));
        }
        let decoded: T::Input =
            serde_json::from_str(input).map_err(|source| ToolInvokeError::InvalidInput {
                tool: T::NAME.to_string(),
                source,
            })?;

        match self.tool.invoke(ctx, decoded).await {
            Ok(output) => {
                serde_json::to_string(&output).map_err(|source| ToolInvokeError::Encode {
                    tool: T::NAME.to_string(),
                    source,
                })
            }
            Err(failure) => {
                debug!(tool = T::NAME, %failure, "Inbuilt tool reported failure");
                Ok(format!("error: {failure}"))
            }
        }
    }
}

/// JSON schema advertised for a tool input. Only record types are accepted.
fn input_schema<I: JsonSchema>(tool: &str) -> Result<Value, SchemaError> {
    let root = schemars::schema_for!(I);
    let is_object = match &root.schema.instance_type {
        Some(SingleOrVec::Single(kind)) => **kind == InstanceType::Object,
        _ => false,
    };
    if !is_object {
        let found = root
            .schema
            .instance_type
            .as_ref()
            .map(|kind| format!("{kind:?}"))
            .unwrap_or_else(|| "none".to_string());
        return Err(SchemaError::NotAnObject {
            tool: tool.to_string(),
            found,
        });
    }

    let mut schema = serde_json::to_value(&root).map_err(|source| SchemaError::Serialize {
        tool: tool.to_string(),
        source,
    })?;
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
    }
    Ok(schema)
}
