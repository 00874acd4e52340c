use crate::address::{AddressLookup, format_delivery_address};
use crate::constants::{ADDRESS_LOOKUP_FAILURE, UNIT_PRICE};
use crate::store::{OrderStore, StoreError};
use crate::types::ToolDescriptor;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const INSERT_ORDER: &str = "insert_order";
pub const DELETE_ORDER: &str = "delete_order";
pub const SEARCH_ORDER: &str = "search_order";
pub const ORDER_COST: &str = "order_cost";
pub const DELIVERY_ADDRESS: &str = "delivery_address";

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ToolCallError {
    fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

/// Text plus optional structured payload returned by one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub structured: Option<Value>,
}

impl ToolOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
        }
    }

    /// Shape the output as an MCP `tools/call` result.
    pub fn into_call_result(self) -> Value {
        let mut result = json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": false,
        });
        if let (Some(structured), Some(map)) = (self.structured, result.as_object_mut()) {
            map.insert("structuredContent".to_string(), structured);
        }
        result
    }
}

/// The five order operations, backed by an injected store and address service.
pub struct OrderTools {
    store: Arc<dyn OrderStore>,
    address: Arc<dyn AddressLookup>,
}

impl OrderTools {
    pub fn new(store: Arc<dyn OrderStore>, address: Arc<dyn AddressLookup>) -> Self {
        Self { store, address }
    }

    pub async fn insert_order(&self, item: &str) -> Result<String, StoreError> {
        self.store.insert(item).await?;
        info!(item, "Item added to order");
        Ok(format!("Item '{item}' adicionado ao pedido."))
    }

    /// Absent items are not an error: the confirmation is the same either way.
    pub async fn delete_order(&self, item: &str) -> Result<String, StoreError> {
        let removed = self.store.delete_one(item).await?;
        if removed {
            info!(item, "Item removed from order");
        } else {
            debug!(item, "Delete requested for item not in order");
        }
        Ok(format!("Item '{item}' removido do pedido."))
    }

    pub async fn search_order(&self) -> Result<Vec<String>, StoreError> {
        self.store.list().await
    }

    pub async fn order_cost(&self) -> Result<u64, StoreError> {
        Ok(self.store.count().await? * UNIT_PRICE)
    }

    /// Never fails: lookup problems come back as [`ADDRESS_LOOKUP_FAILURE`].
    pub async fn delivery_address(
        &self,
        postal_code: &str,
        number: &str,
        complement: &str,
    ) -> String {
        match self.address.lookup(postal_code).await {
            Ok(address) => format_delivery_address(&address, number, complement),
            Err(err) => {
                warn!(postal_code, %err, "Address lookup failed");
                ADDRESS_LOOKUP_FAILURE.to_string()
            }
        }
    }

    pub fn descriptors() -> Vec<ToolDescriptor> {
        let item_schema = |description: &str| {
            json!({
                "type": "object",
                "properties": {
                    "item": { "type": "string", "description": description }
                },
                "required": ["item"]
            })
        };
        let no_arguments = json!({ "type": "object", "properties": {} });

        vec![
            ToolDescriptor {
                name: INSERT_ORDER.to_string(),
                description: Some(
                    "Adiciona um item ao pedido. Chame uma vez para cada unidade.".to_string(),
                ),
                input_schema: Some(item_schema("Nome do item, por exemplo 'refrigerante'")),
            },
            ToolDescriptor {
                name: DELETE_ORDER.to_string(),
                description: Some(
                    "Remove uma unidade do item informado; não faz nada se o item não estiver no pedido."
                        .to_string(),
                ),
                input_schema: Some(item_schema("Nome do item a remover")),
            },
            ToolDescriptor {
                name: SEARCH_ORDER.to_string(),
                description: Some("Lista os itens do pedido atual na ordem em que foram pedidos.".to_string()),
                input_schema: Some(no_arguments.clone()),
            },
            ToolDescriptor {
                name: ORDER_COST.to_string(),
                description: Some(format!(
                    "Calcula o valor total do pedido ({UNIT_PRICE} por item)."
                )),
                input_schema: Some(no_arguments),
            },
            ToolDescriptor {
                name: DELIVERY_ADDRESS.to_string(),
                description: Some(
                    "Consulta o endereço de entrega a partir do CEP e acrescenta número e complemento."
                        .to_string(),
                ),
                input_schema: Some(json!({
                    "type": "object",
                    "properties": {
                        "postalCode": { "type": "string", "description": "CEP do endereço" },
                        "number": { "type": "string", "description": "Número do imóvel", "default": "" },
                        "complement": { "type": "string", "description": "Complemento, como apartamento ou bloco", "default": "" }
                    },
                    "required": ["postalCode"]
                })),
            },
        ]
    }

    /// Dispatch a `tools/call` by name.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolCallError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(ToolCallError::invalid(name, "arguments must be an object")),
        };
        debug!(tool = name, "Dispatching tool call");

        match name {
            INSERT_ORDER => {
                let item = required_text(name, &arguments, "item")?;
                if item.trim().is_empty() {
                    return Err(ToolCallError::invalid(name, "'item' must not be empty"));
                }
                Ok(ToolOutput::text(self.insert_order(&item).await?))
            }
            DELETE_ORDER => {
                let item = required_text(name, &arguments, "item")?;
                Ok(ToolOutput::text(self.delete_order(&item).await?))
            }
            SEARCH_ORDER => {
                let items = self.search_order().await?;
                Ok(ToolOutput {
                    text: Value::from(items.clone()).to_string(),
                    structured: Some(json!({ "items": items })),
                })
            }
            ORDER_COST => {
                let total = self.order_cost().await?;
                Ok(ToolOutput {
                    text: total.to_string(),
                    structured: Some(json!({ "total": total })),
                })
            }
            DELIVERY_ADDRESS => {
                let postal_code = required_text(name, &arguments, "postalCode")?;
                if postal_code.trim().is_empty() {
                    return Err(ToolCallError::invalid(name, "'postalCode' must not be empty"));
                }
                let number = optional_text(name, &arguments, "number")?;
                let complement = optional_text(name, &arguments, "complement")?;
                Ok(ToolOutput::text(
                    self.delivery_address(postal_code.trim(), &number, &complement)
                        .await,
                ))
            }
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }
}

fn required_text(tool: &str, arguments: &Map<String, Value>, key: &str) -> Result<String, ToolCallError> {
    match arguments.get(key) {
        Some(value) => text_value(tool, key, value),
        None => Err(ToolCallError::invalid(tool, format!("missing '{key}'"))),
    }
}

fn optional_text(tool: &str, arguments: &Map<String, Value>, key: &str) -> Result<String, ToolCallError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => text_value(tool, key, value),
    }
}

// Models tend to send house numbers as JSON numbers.
fn text_value(tool: &str, key: &str, value: &Value) -> Result<String, ToolCallError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(ToolCallError::invalid(tool, format!("'{key}' must be a string"))),
    }
}
