use thiserror::Error;

/// Failures turning raw tool input into domain values. Rule outcomes are
/// never errors: violations and warnings travel as data inside the result
/// structures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("amount `{0}` is not a valid monetary value")]
    InvalidAmount(String),
    #[error("amount `{0}` is negative")]
    NegativeAmount(String),
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn messages_carry_the_offending_input() {
        assert_eq!(
            DomainError::InvalidAmount("ten-ish".to_owned()).to_string(),
            "amount `ten-ish` is not a valid monetary value"
        );
        assert_eq!(DomainError::NegativeAmount("-4".to_owned()).to_string(), "amount `-4` is negative");
    }
}
