use anyhow::Result;
use async_trait::async_trait;

use crate::tools::{
    TOOL_CATEGORIZE_EXPENSE, TOOL_EXPENSE_SUMMARY, TOOL_SEARCH_POLICY, TOOL_VALIDATE_EXPENSE,
};

/// Seam to the hosted conversation loop. The model translates between the
/// user and the tools; every decision that matters is made by the
/// deterministic engines behind those tools.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Instruction handed to whichever model hosts the conversation. Tool names
/// here must stay in sync with the registry constants.
pub fn system_prompt() -> String {
    format!(
        "You are an expense report assistant. Guide employees through \
         expense reporting while ensuring policy compliance.\n\
         \n\
         Capabilities:\n\
         - Use `{TOOL_SEARCH_POLICY}` for any policy question, and cite the \
         policy sections it returns.\n\
         - Use `{TOOL_CATEGORIZE_EXPENSE}` to classify an expense, and report \
         its confidence.\n\
         - Use `{TOOL_VALIDATE_EXPENSE}` to check an expense against policy \
         rules, and flag every violation immediately.\n\
         - Use `{TOOL_EXPENSE_SUMMARY}` to build the final report summary.\n\
         \n\
         You never approve reimbursements, waive policy requirements, or \
         change policy limits. When a tool reports a violation, explain it \
         and suggest how to resolve it."
    )
}

#[cfg(test)]
mod tests {
    use crate::tools::{
        TOOL_CATEGORIZE_EXPENSE, TOOL_EXPENSE_SUMMARY, TOOL_SEARCH_POLICY, TOOL_VALIDATE_EXPENSE,
    };

    use super::system_prompt;

    #[test]
    fn system_prompt_names_every_registered_tool() {
        let prompt = system_prompt();
        for tool in
            [TOOL_SEARCH_POLICY, TOOL_CATEGORIZE_EXPENSE, TOOL_VALIDATE_EXPENSE, TOOL_EXPENSE_SUMMARY]
        {
            assert!(prompt.contains(tool), "prompt should mention `{tool}`");
        }
    }

    #[test]
    fn system_prompt_forbids_approval_language() {
        assert!(system_prompt().contains("never approve reimbursements"));
    }
}
