//! Bridge message types
//!
//! The bridge speaks newline-delimited JSON in both directions. Outbound
//! lines are subscription commands or trade instructions; inbound lines are
//! price ticks or acknowledgements of what we sent.

use serde::{Deserialize, Serialize};

/// Subscription command sent to the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCommand {
    pub action: CommandAction,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandAction {
    Subscribe,
    Unsubscribe,
}

impl BridgeCommand {
    pub fn subscribe(symbol: impl Into<String>) -> Self {
        Self {
            action: CommandAction::Subscribe,
            symbol: symbol.into(),
        }
    }

    pub fn unsubscribe(symbol: impl Into<String>) -> Self {
        Self {
            action: CommandAction::Unsubscribe,
            symbol: symbol.into(),
        }
    }
}

/// Acknowledgement the bridge returns for every line it receives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeAck {
    pub status: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub action: String,
}

/// Classified inbound line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine {
    /// Blank keep-alive line
    Empty,
    /// Acknowledgement of an outbound line
    Ack(BridgeAck),
    /// Anything else is handed to tick ingress as-is
    Tick(String),
}

impl InboundLine {
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return InboundLine::Empty;
        }
        if trimmed.contains("\"status\"") {
            if let Ok(ack) = serde_json::from_str::<BridgeAck>(trimmed) {
                return InboundLine::Ack(ack);
            }
        }
        InboundLine::Tick(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_string(&BridgeCommand::subscribe("EURUSD")).unwrap();
        assert_eq!(json, r#"{"action":"SUBSCRIBE","symbol":"EURUSD"}"#);

        let json = serde_json::to_string(&BridgeCommand::unsubscribe("EURUSD")).unwrap();
        assert_eq!(json, r#"{"action":"UNSUBSCRIBE","symbol":"EURUSD"}"#);
    }

    #[test]
    fn test_classify_ack() {
        let line = r#"{"status":"processed","symbol":"EURUSD","action":"BUY"}"#;
        match InboundLine::classify(line) {
            InboundLine::Ack(ack) => {
                assert_eq!(ack.status, "processed");
                assert_eq!(ack.action, "BUY");
            }
            other => panic!("expected ack, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_tick_and_empty() {
        assert_eq!(InboundLine::classify("  \r"), InboundLine::Empty);
        assert_eq!(
            InboundLine::classify("{\"symbol\":\"EURUSD\",\"bid\":1.1}\r"),
            InboundLine::Tick("{\"symbol\":\"EURUSD\",\"bid\":1.1}".to_string())
        );
    }
}
