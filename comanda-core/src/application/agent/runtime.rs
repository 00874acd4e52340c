use super::directive::AgentDirective;
use super::errors::{AgentError, ToolError};
use crate::rpc::types::{INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::tooling::{ToolInvokeError, ToolServerInterface};
use crate::types::ToolDescriptor;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) struct ToolRuntime {
    bridge: Arc<dyn ToolServerInterface>,
}

impl ToolRuntime {
    pub fn new(bridge: Arc<dyn ToolServerInterface>) -> Self {
        Self { bridge }
    }

    pub async fn host_instructions(&self) -> Option<String> {
        self.bridge.instructions().await
    }

    /// Run one tool call. Mistakes the model can fix (unknown tool, bad
    /// arguments) come back as failed executions; transport failures are errors.
    pub async fn execute(
        &self,
        tools: &[ToolDescriptor],
        tool_name: &str,
        input: Value,
    ) -> Result<ToolExecution, ToolError> {
        let Some(tool) = tools
            .iter()
            .find(|tool| tool.name.eq_ignore_ascii_case(tool_name))
        else {
            warn!(requested_tool = %tool_name, "Unknown tool requested by agent");
            return Ok(ToolExecution::failed(
                tool_name,
                input,
                format!("A ferramenta \"{tool_name}\" não existe. Use apenas as ferramentas listadas."),
            ));
        };
        let tool_name = tool.name.clone();

        let arguments = match input.clone() {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        debug!(tool = %tool_name, "Dispatching tool via MCP");
        match self.bridge.invoke_tool(&tool_name, arguments).await {
            Ok(result) => {
                let is_error = result
                    .get("isError")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let message = extract_tool_message(&result);
                let execution = ToolExecution {
                    tool: tool_name,
                    success: !is_error,
                    input,
                    output: result,
                    message,
                };
                info!(tool = %execution.tool, success = execution.success, "Tool executed");
                Ok(execution)
            }
            Err(ToolInvokeError::Rpc { code, message, .. })
                if code == INVALID_PARAMS || code == METHOD_NOT_FOUND =>
            {
                warn!(tool = %tool_name, code, %message, "Tool rejected the call");
                Ok(ToolExecution::failed(tool_name, input, message))
            }
            Err(source) => {
                warn!(tool = %tool_name, %source, "Tool execution failed");
                Err(ToolError::Execution {
                    tool: tool_name,
                    source,
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ToolExecution {
    pub tool: String,
    pub success: bool,
    pub input: Value,
    pub output: Value,
    pub message: Option<String>,
}

impl ToolExecution {
    fn failed(tool: impl Into<String>, input: Value, message: impl Into<String>) -> Self {
        let execution = Self {
            tool: tool.into(),
            success: false,
            input,
            output: Value::Null,
            message: Some(message.into()),
        };
        info!(tool = %execution.tool, success = execution.success, "Tool executed");
        execution
    }

    /// Payload of the tool message fed back to the model.
    pub fn to_feedback(&self) -> String {
        json!({
            "tool_result": {
                "tool": self.tool,
                "input": self.input,
                "success": self.success,
                "output": self.output,
                "message": self.message,
            }
        })
        .to_string()
    }
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum WireDirective {
    CallTool {
        tool: String,
        #[serde(default)]
        input: Value,
    },
    Final {
        response: String,
    },
}

impl From<WireDirective> for AgentDirective {
    fn from(wire: WireDirective) -> Self {
        match wire {
            WireDirective::CallTool { tool, input } => AgentDirective::CallTool { tool, input },
            WireDirective::Final { response } => AgentDirective::Final { response },
        }
    }
}

/// Interpret a model reply. Plain prose (no JSON object) is the final answer.
pub(crate) fn parse_agent_action(content: &str) -> Result<AgentDirective, AgentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AgentError::InvalidResponse("empty agent response".into()));
    }
    match extract_json(trimmed) {
        Some(value @ Value::Object(_)) => serde_json::from_value::<WireDirective>(value)
            .map(AgentDirective::from)
            .map_err(|err| AgentError::InvalidResponse(err.to_string())),
        // A JSON-encoded string wrapping the real directive.
        Some(Value::String(inner)) => parse_agent_action(&inner),
        _ => Ok(AgentDirective::Final {
            response: trimmed.to_string(),
        }),
    }
}

/// Try the whole reply, then a fenced code block, then the outermost braces.
fn extract_json(text: &str) -> Option<Value> {
    let fenced = text
        .strip_prefix("```")
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()))
        .and_then(|rest| rest.rfind("```").map(|end| &rest[..end]));
    let braced = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    };

    std::iter::once(text)
        .chain(fenced)
        .chain(braced)
        .find_map(|candidate| serde_json::from_str(candidate.trim()).ok())
}

fn extract_tool_message(result: &Value) -> Option<String> {
    result
        .get("content")
        .and_then(Value::as_array)?
        .iter()
        .filter(|block| {
            block
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|kind| kind.eq_ignore_ascii_case("text"))
        })
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_and_embedded_directives() {
        let fenced = "```json\n{\"action\":\"call_tool\",\"tool\":\"search_order\"}\n```";
        assert_eq!(
            parse_agent_action(fenced).expect("fenced"),
            AgentDirective::CallTool {
                tool: "search_order".into(),
                input: Value::Null
            }
        );

        let embedded = r#"Claro! {"action":"final","response":"Pedido anotado."}"#;
        assert_eq!(
            parse_agent_action(embedded).expect("embedded"),
            AgentDirective::Final {
                response: "Pedido anotado.".into()
            }
        );
    }

    #[test]
    fn prose_without_json_is_final() {
        assert_eq!(
            parse_agent_action("  Olá! O que vai querer hoje?\n").expect("prose"),
            AgentDirective::Final {
                response: "Olá! O que vai querer hoje?".into()
            }
        );
    }

    #[test]
    fn malformed_directives_are_rejected() {
        for content in [
            r#"{"tool":"order_cost"}"#,
            r#"{"action":"call_tool"}"#,
            r#"{"action":"final"}"#,
            r#"{"action":"dance"}"#,
            "   ",
        ] {
            assert!(
                matches!(parse_agent_action(content), Err(AgentError::InvalidResponse(_))),
                "{content} should be rejected"
            );
        }
    }

    #[test]
    fn tool_message_skips_blank_blocks() {
        let result = json!({
            "content": [
                { "type": "image", "data": "..." },
                { "type": "text", "text": "  " },
                { "type": "text", "text": " 20 " }
            ]
        });
        assert_eq!(extract_tool_message(&result).as_deref(), Some("20"));
        assert_eq!(extract_tool_message(&json!({})), None);
    }
}
