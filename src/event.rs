use crate::chat::{MessageId, MessageStatus, Sender};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    MessageAppended {
        id: MessageId,
        sender: Sender,
        status: MessageStatus,
    },
    StatusAdvanced {
        id: MessageId,
        status: MessageStatus,
    },
    TypingChanged {
        typing: bool,
    },
}

impl AppEvent {
    pub fn to_log_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!("unprintable event {self:?}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::AppEvent;
    use crate::chat::{MessageId, MessageStatus};

    #[test]
    fn log_line_is_tagged_json() {
        let event = AppEvent::StatusAdvanced {
            id: MessageId::new(3),
            status: MessageStatus::Read,
        };
        assert_eq!(
            event.to_log_line(),
            r#"{"event":"status_advanced","id":3,"status":"read"}"#
        );
    }
}
