use serde::{Deserialize, Serialize};

/// Lifecycle state of a connection between two users.
///
/// Transitions are monotone: pending may become accepted or declined, and
/// neither terminal state can change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Declined,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ConnectionStatus::Pending),
            "accepted" => Some(ConnectionStatus::Accepted),
            "declined" => Some(ConnectionStatus::Declined),
            _ => None,
        }
    }
}

/// Addressee's answer to a pending connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionAction {
    Accept,
    Decline,
}

impl ConnectionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionAction::Accept => "accept",
            ConnectionAction::Decline => "decline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accept" => Some(ConnectionAction::Accept),
            "decline" => Some(ConnectionAction::Decline),
            _ => None,
        }
    }
}

/// How a profile relates to the viewer requesting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    #[serde(rename = "self")]
    Self_,
    Connected,
    PendingOutgoing,
    PendingIncoming,
    None,
}
