use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use expenso_core::DeterministicExpenseRuntime;

use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
use crate::search::PolicySearch;
use crate::tools::{
    CategorizeExpenseTool, ExpenseSummaryTool, SearchPolicyTool, ToolRegistry, ValidateExpenseTool,
};

/// Owns the tool registry and guardrails. Every tool invocation flows
/// through `dispatch_tool` so the guardrail policy is applied uniformly.
pub struct AgentRuntime {
    registry: ToolRegistry,
    guardrails: GuardrailPolicy,
}

impl AgentRuntime {
    pub fn new(registry: ToolRegistry, guardrails: GuardrailPolicy) -> Self {
        Self { registry, guardrails }
    }

    /// Standard assembly: the deterministic rule engines behind all four
    /// tools, with the given policy search backend.
    pub fn with_default_tools(search: Arc<dyn PolicySearch>) -> Self {
        let engine = Arc::new(DeterministicExpenseRuntime::default());

        let mut registry = ToolRegistry::default();
        registry.register(SearchPolicyTool::new(search));
        registry.register(ValidateExpenseTool::new(engine.clone()));
        registry.register(CategorizeExpenseTool::new(engine.clone()));
        registry.register(ExpenseSummaryTool::new(engine));

        Self::new(registry, GuardrailPolicy::default())
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    pub fn knows_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Instruction for the hosted conversation loop driving these tools.
    pub fn system_prompt(&self) -> String {
        crate::llm::system_prompt()
    }

    /// Guardrail-checked dispatch. A blocked call is still a successful
    /// response: the denial travels as a structured payload, not an error.
    pub async fn dispatch_tool(&self, name: &str, input: Value) -> Result<Value> {
        let intent = GuardrailIntent::ToolCall { tool_name: name.to_string() };
        match self.guardrails.evaluate(&intent) {
            GuardrailDecision::Allow => {}
            GuardrailDecision::Deny { reason_code, user_message, fallback_path }
            | GuardrailDecision::Degrade { reason_code, user_message, fallback_path } => {
                return Ok(json!({
                    "status": "blocked",
                    "reason_code": reason_code,
                    "message": user_message,
                    "fallback_path": fallback_path,
                }));
            }
        }

        self.registry.dispatch(name, input).await
    }
}
