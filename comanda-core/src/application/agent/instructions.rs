use crate::types::ToolDescriptor;

const PROTOCOL_LINES: [&str; 5] = [
    "Responda sempre com um único objeto JSON, sem comentários nem blocos de código.",
    "Para usar uma ferramenta responda: {\"action\":\"call_tool\",\"tool\":\"nome_da_ferramenta\",\"input\":{...}}.",
    "O resultado chega na mensagem seguinte como {\"tool_result\":{...}}; chame quantas ferramentas precisar, uma por vez.",
    "Quando tiver a resposta para o cliente responda: {\"action\":\"final\",\"response\":\"...\"}.",
    "Não invente ferramentas além das listadas abaixo.",
];

/// System message for one turn: persona, host guidance, action protocol and
/// the tool catalogue with input schemas.
pub(crate) fn compose_system_message(
    system_prompt: &str,
    host_instructions: Option<&str>,
    tools: &[ToolDescriptor],
) -> String {
    let mut sections = Vec::new();
    if !system_prompt.trim().is_empty() {
        sections.push(system_prompt.trim().to_string());
    }
    if let Some(guidance) = host_instructions.map(str::trim).filter(|text| !text.is_empty()) {
        sections.push(format!("Orientação do servidor de ferramentas: {guidance}"));
    }
    sections.push(PROTOCOL_LINES.join("\n"));

    let mut catalogue = vec!["Ferramentas:".to_string()];
    for tool in tools {
        let mut line = format!("- {}", tool.name);
        if let Some(description) = &tool.description {
            line.push_str(&format!(": {description}"));
        }
        if let Some(schema) = &tool.input_schema {
            let compact = serde_json::to_string(schema).unwrap_or_default();
            line.push_str(&format!(" Entrada: {compact}"));
        }
        catalogue.push(line);
    }
    sections.push(catalogue.join("\n"));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_tools_with_schema() {
        let tools = vec![ToolDescriptor {
            name: "order_cost".into(),
            description: Some("Valor total".into()),
            input_schema: Some(json!({"type":"object"})),
        }];
        let message = compose_system_message("Atendente.", Some("  "), &tools);

        assert!(message.starts_with("Atendente."));
        assert!(!message.contains("Orientação"));
        assert!(message.contains(r#"- order_cost: Valor total Entrada: {"type":"object"}"#));
        assert!(message.contains("\"action\":\"final\""));
    }
}
