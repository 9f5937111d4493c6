//! Agent runtime for the expense assistant.
//!
//! This crate wires the deterministic expense engines into agent tools:
//! - **Tool Execution** (`tools`) - the four expense tools behind one registry
//! - **Policy Search** (`search`) - external or built-in policy document lookup
//! - **Guardrail Enforcement** (`guardrails`) - what the assistant may never do
//! - **Orchestration** (`runtime`) - guardrail-checked tool dispatch
//!
//! # Safety Principle
//!
//! The LLM is strictly a translator. It NEVER approves reimbursements,
//! changes policy limits, or decides validation outcomes. Those are
//! deterministic decisions made by the expense rule engines.

pub mod guardrails;
pub mod llm;
pub mod runtime;
pub mod search;
pub mod tools;

pub use guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
pub use llm::LlmClient;
pub use runtime::AgentRuntime;
pub use search::{HttpPolicySearch, PolicySearch, PolicySearchResults, StaticPolicySearch};
pub use tools::{Tool, ToolRegistry};
