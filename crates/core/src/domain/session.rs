use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// A conversation session. Tool invocations append events to it so a
/// conversation can be replayed after a restart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    PolicySearch,
    Validation,
    Categorization,
    Summary,
}

impl SessionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolicySearch => "policy_search",
            Self::Validation => "validation",
            Self::Categorization => "categorization",
            Self::Summary => "summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "policy_search" => Some(Self::PolicySearch),
            "validation" => Some(Self::Validation),
            "categorization" => Some(Self::Categorization),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// One recorded tool invocation. The payload keeps the tool's full JSON
/// output; `id` is assigned by storage in append order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: i64,
    pub session_id: SessionId,
    pub kind: SessionEventKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
