// Driver tests - full chat turns through the agent and a live tool host
//
// The model is scripted; everything else (agent loop, MCP client, tool host,
// memory store) is the production code path.

use async_trait::async_trait;
use comanda_core::address::UnconfiguredAddressLookup;
use comanda_core::agent::{Agent, AgentError, TurnProcessor};
use comanda_core::config::AgentConfig;
use comanda_core::driver::{Driver, DriverError, DriverState, TurnOutcome};
use comanda_core::host::{OrderTools, ToolHost};
use comanda_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use comanda_core::store::MemoryOrderStore;
use comanda_core::tooling::{ToolHostClient, ToolInvokeError, ToolServerInterface};
use comanda_core::types::{ChatMessage, MessageRole, ToolDescriptor};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{BufReader, duplex, split};
use tokio::sync::Mutex;

struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.seen.lock().await.push(request.clone());
        let mut replies = self.replies.lock().await;
        if replies.is_empty() {
            return Err(ModelError::malformed("scripted", "script exhausted"));
        }
        Ok(ModelResponse::from_text(replies.remove(0), request.session_id))
    }
}

async fn live_host() -> Arc<ToolHostClient> {
    let (client_side, host_side) = duplex(16 * 1024);
    let host = ToolHost::new(OrderTools::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(UnconfiguredAddressLookup),
    ));
    tokio::spawn(async move {
        let (reader, writer) = split(host_side);
        host.serve(BufReader::new(reader), writer).await
    });

    let (reader, writer) = split(client_side);
    Arc::new(
        ToolHostClient::connect("comanda-host", reader, writer)
            .await
            .expect("handshake"),
    )
}

fn agent_config(max_steps: usize) -> AgentConfig {
    AgentConfig {
        max_steps,
        ..AgentConfig::default()
    }
}

#[tokio::test]
async fn two_sodas_then_the_total() {
    let client = live_host().await;
    let model = ScriptedModel::new(&[
        r#"{"action":"call_tool","tool":"insert_order","input":{"item":"refrigerante"}}"#,
        r#"{"action":"call_tool","tool":"insert_order","input":{"item":"refrigerante"}}"#,
        r#"{"action":"final","response":"Dois refrigerantes anotados."}"#,
        r#"{"action":"call_tool","tool":"order_cost","input":{}}"#,
        r#"{"action":"final","response":"O total é 20."}"#,
    ]);
    let agent = Agent::new(model.clone(), "llama3", agent_config(8), client.clone());
    let mut driver = Driver::start(client.as_ref(), Arc::new(agent), 40)
        .await
        .expect("driver starts");
    assert_eq!(driver.tools().len(), 5);

    let first = driver
        .handle_line("quero dois refrigerantes")
        .await
        .expect("first turn");
    assert_eq!(first, TurnOutcome::Reply("Dois refrigerantes anotados.".into()));
    // user + 2 × (directive + tool result) + final
    assert_eq!(driver.history().len(), 6);

    let second = driver.handle_line("quanto ficou?").await.expect("second turn");
    assert_eq!(second, TurnOutcome::Reply("O total é 20.".into()));

    let last_request = model.seen.lock().await.last().cloned().expect("requests");
    let tool_result = last_request
        .messages
        .iter()
        .rev()
        .find(|msg| msg.role == MessageRole::Tool)
        .expect("cost result fed back");
    let payload: Value = serde_json::from_str(&tool_result.content).expect("json");
    assert_eq!(payload["tool_result"]["message"], "20");
    assert_eq!(payload["tool_result"]["output"]["structuredContent"]["total"], 20);
}

#[tokio::test]
async fn run_loop_prints_replies_and_stops_on_exit() {
    let client = live_host().await;
    let model = ScriptedModel::new(&[
        "Olá! O que vai pedir hoje?",
        r#"```json
{"action":"final","response":"Certo!"}
```"#,
    ]);
    let agent = Agent::new(model, "llama3", agent_config(8), client.clone());
    let mut driver = Driver::start(client.as_ref(), Arc::new(agent), 40)
        .await
        .expect("driver starts");

    let mut output = Vec::new();
    driver
        .run("oi\n\nok\nQUIT\n".as_bytes(), &mut output)
        .await
        .expect("session ends cleanly");

    let transcript = String::from_utf8(output).expect("utf8");
    assert!(transcript.contains("Atendente: Olá! O que vai pedir hoje?\n"));
    assert!(transcript.contains("Atendente: Certo!\n"));
    assert!(transcript.ends_with("Até logo!\n"));
    assert_eq!(driver.state(), DriverState::Terminated);
}

#[tokio::test]
async fn model_transport_failure_is_fatal() {
    let client = live_host().await;
    let agent = Agent::new(ScriptedModel::new(&[]), "llama3", agent_config(8), client.clone());
    let mut driver = Driver::start(client.as_ref(), Arc::new(agent), 40)
        .await
        .expect("driver starts");

    let err = driver.handle_line("oi").await.expect_err("model failed");
    assert!(matches!(err, DriverError::Agent(AgentError::Model(_))));
    assert_eq!(driver.state(), DriverState::Terminated);
    assert_eq!(driver.handle_line("oi").await.expect("after exit"), TurnOutcome::Exit);
}

#[tokio::test]
async fn step_limit_is_reported_and_session_continues() {
    let client = live_host().await;
    let model = ScriptedModel::new(&[
        r#"{"action":"call_tool","tool":"search_order"}"#,
        r#"{"action":"call_tool","tool":"search_order"}"#,
        r#"{"action":"final","response":"Seu pedido está vazio."}"#,
    ]);
    let agent = Agent::new(model, "llama3", agent_config(1), client.clone());
    let mut driver = Driver::start(client.as_ref(), Arc::new(agent), 40)
        .await
        .expect("driver starts");

    let limited = driver.handle_line("o que pedi?").await.expect("recoverable");
    assert!(matches!(limited, TurnOutcome::Reply(text) if text.contains("reformular")));
    assert_eq!(driver.state(), DriverState::AwaitingInput);

    let next = driver.handle_line("e agora?").await.expect("next turn");
    assert_eq!(next, TurnOutcome::Reply("Seu pedido está vazio.".into()));
}

#[tokio::test]
async fn interrupted_turn_keeps_the_executed_insert_in_history() {
    let client = live_host().await;
    let model = ScriptedModel::new(&[
        r#"{"action":"call_tool","tool":"insert_order","input":{"item":"pizza"}}"#,
        r#"{"action":"call_tool","tool":"insert_order","input":{"item":"pizza"}}"#,
        r#"{"action":"final","response":"Você pediu uma pizza."}"#,
    ]);
    let agent = Agent::new(model.clone(), "llama3", agent_config(1), client.clone());
    let mut driver = Driver::start(client.as_ref(), Arc::new(agent), 40)
        .await
        .expect("driver starts");

    let limited = driver.handle_line("uma pizza").await.expect("recoverable");
    assert!(matches!(limited, TurnOutcome::Reply(text) if text.contains("reformular")));

    let roles: Vec<MessageRole> = driver.history().all().iter().map(|msg| msg.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant
        ]
    );
    let listing = client
        .invoke_tool("search_order", Value::Null)
        .await
        .expect("search");
    assert_eq!(listing["structuredContent"]["items"], serde_json::json!(["pizza"]));

    driver.handle_line("e aí?").await.expect("next turn");
    let last_request = model.seen.lock().await.last().cloned().expect("requests");
    assert!(
        last_request
            .messages
            .iter()
            .any(|msg| msg.role == MessageRole::Tool && msg.content.contains("pizza"))
    );
    let consecutive_users = last_request
        .messages
        .windows(2)
        .any(|pair| pair[0].role == MessageRole::User && pair[1].role == MessageRole::User);
    assert!(!consecutive_users);
}

struct NoTools;

#[async_trait]
impl ToolServerInterface for NoTools {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        Ok(Vec::new())
    }

    async fn invoke_tool(&self, _tool: &str, _arguments: Value) -> Result<Value, ToolInvokeError> {
        Ok(Value::Null)
    }

    async fn instructions(&self) -> Option<String> {
        None
    }
}

struct Silent;

#[async_trait]
impl TurnProcessor for Silent {
    async fn process(
        &self,
        _history: &[ChatMessage],
        _tools: &[ToolDescriptor],
    ) -> Result<Vec<ChatMessage>, AgentError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn empty_tool_set_aborts_startup() {
    let result = Driver::start(&NoTools, Arc::new(Silent), 40).await;
    let err = result.err().expect("startup refused");
    assert!(matches!(err, DriverError::NoTools));
    assert!(err.user_message().contains("Nenhuma ferramenta"));
}
