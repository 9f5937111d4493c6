#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailIntent {
    ToolCall { tool_name: String },
    ReimbursementApproval { amount_cents: i64 },
    PolicyLimitOverride { category: String },
    AmbiguousExpenseIntent { raw_text: String },
}

impl GuardrailIntent {
    pub fn action_key(&self) -> String {
        match self {
            Self::ToolCall { tool_name } => format!("tool.{tool_name}"),
            Self::ReimbursementApproval { .. } => "policy.reimbursement_approval".to_string(),
            Self::PolicyLimitOverride { .. } => "policy.limit_override".to_string(),
            Self::AmbiguousExpenseIntent { .. } => "expense.ambiguous_intent".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
    Degrade { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub llm_can_approve_reimbursements: bool,
    pub llm_can_change_limits: bool,
    pub tools_enabled: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self {
            llm_can_approve_reimbursements: false,
            llm_can_change_limits: false,
            tools_enabled: true,
        }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(&self, intent: &GuardrailIntent) -> GuardrailDecision {
        match intent {
            GuardrailIntent::ToolCall { .. } if self.tools_enabled => GuardrailDecision::Allow,
            GuardrailIntent::ToolCall { .. } => GuardrailDecision::Degrade {
                reason_code: "tools_disabled",
                user_message:
                    "Expense tools are temporarily unavailable. Please try again shortly."
                        .to_string(),
                fallback_path: "conversation_only",
            },
            GuardrailIntent::ReimbursementApproval { .. } => GuardrailDecision::Deny {
                reason_code: if self.llm_can_approve_reimbursements {
                    "reimbursement_policy_conflict"
                } else {
                    "reimbursement_approval_disallowed"
                },
                user_message:
                    "I cannot approve reimbursements in chat. Please submit the report through the approval workflow."
                        .to_string(),
                fallback_path: "approval_workflow",
            },
            GuardrailIntent::PolicyLimitOverride { .. } => GuardrailDecision::Deny {
                reason_code: if self.llm_can_change_limits {
                    "limit_override_policy_conflict"
                } else {
                    "limit_override_disallowed"
                },
                user_message:
                    "I cannot change policy limits from chat. Limits are set by the finance team."
                        .to_string(),
                fallback_path: "policy_administration",
            },
            GuardrailIntent::AmbiguousExpenseIntent { .. } => GuardrailDecision::Degrade {
                reason_code: "ambiguous_expense_intent",
                user_message: "I could not safely determine the expense action from that request."
                    .to_string(),
                fallback_path: "request_explicit_action",
            },
        }
    }
}
