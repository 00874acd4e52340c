use serde::Deserialize;

pub const DEFAULT_MAX_STEPS: usize = 8;
pub const DEFAULT_HISTORY_WINDOW: usize = 40;

/// Persona and tool guidance handed to the reasoning engine on every turn.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"
Você é o atendente de uma lanchonete e anota pedidos de delivery pelo chat.
Seja cordial e objetivo, e sempre responda em português.

Ferramentas disponíveis:
- insert_order: adiciona um item ao pedido. Para quantidades, chame uma vez por unidade ("quero dois refrigerantes" vira duas chamadas com item "refrigerante").
- delete_order: remove uma unidade de um item do pedido ("tira o refrigerante").
- search_order: lista os itens do pedido atual ("o que tem no meu pedido?").
- order_cost: informa o valor total do pedido ("quanto ficou?").
- delivery_address: consulta o endereço de entrega pelo CEP, com número e complemento opcionais ("meu CEP é 01001-000, número 12, apto 3").

Nunca invente itens, preços ou endereços: use sempre as ferramentas.
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub system_prompt: String,
    /// Upper bound on tool calls within one user turn
    pub max_steps: usize,
    /// Messages sent to the model per turn; `0` sends the whole history
    pub history_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.trim().to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawAgentConfig {
    system_prompt: Option<String>,
    max_steps: Option<usize>,
    history_window: Option<usize>,
}

impl From<RawAgentConfig> for AgentConfig {
    fn from(raw: RawAgentConfig) -> Self {
        let defaults = Self::default();
        Self {
            system_prompt: raw
                .system_prompt
                .map(|prompt| prompt.trim().to_string())
                .filter(|prompt| !prompt.is_empty())
                .unwrap_or(defaults.system_prompt),
            max_steps: raw.max_steps.unwrap_or(defaults.max_steps),
            history_window: raw.history_window.unwrap_or(defaults.history_window),
        }
    }
}
