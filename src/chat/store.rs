use crate::chat::{Message, MessageId, MessageStatus, Sender};

/// Ordered, append-only list of messages for one chat session.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    last_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> MessageId {
        self.last_id += 1;
        MessageId::new(self.last_id)
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Moves a message forward to `status`.
    ///
    /// Unknown ids and non-forward moves are ignored. Returns whether the
    /// stored status changed.
    pub fn update_status(&mut self, id: MessageId, status: MessageStatus) -> bool {
        let Some(message) = self.messages.iter_mut().find(|message| message.id == id) else {
            return false;
        };
        if status <= message.status {
            return false;
        }

        message.status = status;
        true
    }

    /// Marks every user message that has not been read as read.
    pub fn mark_user_messages_read(&mut self) -> Vec<MessageId> {
        let unread: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|message| message.sender == Sender::User && message.status != MessageStatus::Read)
            .map(|message| message.id)
            .collect();

        unread
            .into_iter()
            .filter(|id| self.update_status(*id, MessageStatus::Read))
            .collect()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::MessageStore;
    use crate::chat::{Message, MessageId, MessageStatus, Sender};
    use chrono::Local;

    fn push(store: &mut MessageStore, sender: Sender, text: &str, status: MessageStatus) -> MessageId {
        let id = store.next_id();
        store.append(Message {
            id,
            text: text.to_string(),
            sender,
            timestamp: Local::now(),
            status,
        });
        id
    }

    fn find(store: &MessageStore, id: MessageId) -> Option<&Message> {
        store.messages().iter().find(|message| message.id == id)
    }

    #[test]
    fn append_keeps_insertion_order_and_unique_ids() {
        let mut store = MessageStore::new();
        let first = push(&mut store, Sender::User, "one", MessageStatus::Sending);
        let second = push(&mut store, Sender::Agent, "two", MessageStatus::Sent);

        assert_ne!(first, second);
        assert!(first < second);
        let texts: Vec<&str> = store.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn update_status_changes_only_the_status_field() {
        let mut store = MessageStore::new();
        let id = push(&mut store, Sender::User, "line one\nline two", MessageStatus::Sending);
        let before = find(&store, id).cloned().expect("message should exist");

        assert!(store.update_status(id, MessageStatus::Sent));

        let after = find(&store, id).expect("message should exist");
        assert_eq!(after.status, MessageStatus::Sent);
        assert_eq!(after.text, before.text);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.sender, before.sender);
    }

    #[test]
    fn update_status_for_unknown_id_is_a_no_op() {
        let mut store = MessageStore::new();
        push(&mut store, Sender::User, "hello", MessageStatus::Sending);

        assert!(!store.update_status(MessageId::new(42), MessageStatus::Read));
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].status, MessageStatus::Sending);
    }

    #[test]
    fn update_status_refuses_to_move_backwards() {
        let mut store = MessageStore::new();
        let id = push(&mut store, Sender::User, "hello", MessageStatus::Delivered);

        assert!(!store.update_status(id, MessageStatus::Sent));
        assert!(!store.update_status(id, MessageStatus::Delivered));
        assert_eq!(find(&store, id).map(|m| m.status), Some(MessageStatus::Delivered));
    }

    #[test]
    fn mark_user_messages_read_skips_agent_and_already_read() {
        let mut store = MessageStore::new();
        let read = push(&mut store, Sender::User, "old", MessageStatus::Read);
        let agent = push(&mut store, Sender::Agent, "reply", MessageStatus::Sent);
        let sent = push(&mut store, Sender::User, "a", MessageStatus::Sent);
        let delivered = push(&mut store, Sender::User, "b", MessageStatus::Delivered);

        let changed = store.mark_user_messages_read();

        assert_eq!(changed, vec![sent, delivered]);
        assert_eq!(find(&store, read).map(|m| m.status), Some(MessageStatus::Read));
        assert_eq!(find(&store, agent).map(|m| m.status), Some(MessageStatus::Sent));
        assert_eq!(find(&store, sent).map(|m| m.status), Some(MessageStatus::Read));
    }
}
