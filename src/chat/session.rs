use crate::chat::replies::compose_reply;
use crate::chat::schedule::{Action, Schedule};
use crate::chat::store::MessageStore;
use crate::chat::{Message, MessageId, MessageStatus, Sender};
use crate::event::AppEvent;
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

/// Delays for the simulated peer, measured from the moment a message is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub typing_delay: Range<Duration>,
    pub user_sent: Duration,
    pub user_delivered: Duration,
    pub agent_delivered: Duration,
    pub agent_read: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            typing_delay: Duration::from_millis(1000)..Duration::from_millis(2500),
            user_sent: Duration::from_millis(300),
            user_delivered: Duration::from_millis(600),
            agent_delivered: Duration::from_millis(500),
            agent_read: Duration::from_millis(1000),
        }
    }
}

/// State of one chat window: the message list, the pending delayed actions and
/// the scripted peer.
///
/// Time is an offset from session start supplied by the caller, so the
/// session itself never reads a clock.
pub struct ChatSession {
    agent_name: String,
    store: MessageStore,
    schedule: Schedule,
    timings: Timings,
    rng: StdRng,
    started_at: DateTime<Local>,
    pending_replies: usize,
    events: Vec<AppEvent>,
}

impl ChatSession {
    pub fn new(
        agent_name: impl Into<String>,
        timings: Timings,
        rng: StdRng,
        started_at: DateTime<Local>,
    ) -> Self {
        let mut session = Self {
            agent_name: agent_name.into(),
            store: MessageStore::new(),
            schedule: Schedule::new(),
            timings,
            rng,
            started_at,
            pending_replies: 0,
            events: Vec::new(),
        };

        let welcome = format!(
            "Hi! I'm your {}. How can I help you today?",
            session.agent_name
        );
        session.append(Sender::Agent, welcome, Duration::ZERO, MessageStatus::Read);
        session
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.schedule.next_due()
    }

    pub fn drain_events(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sends `text` as the user. Blank input is ignored.
    pub fn submit(&mut self, text: &str, now: Duration) -> Option<MessageId> {
        if text.trim().is_empty() {
            return None;
        }

        let id = self.append(Sender::User, text.to_string(), now, MessageStatus::Sending);
        self.schedule.push(
            now + self.timings.user_sent,
            Action::Advance {
                id,
                status: MessageStatus::Sent,
            },
        );
        self.schedule.push(
            now + self.timings.user_delivered,
            Action::Advance {
                id,
                status: MessageStatus::Delivered,
            },
        );

        let delay = self.typing_delay();
        self.schedule.push(
            now + delay,
            Action::Reply {
                prompt: text.to_string(),
            },
        );
        self.pending_replies += 1;
        if self.pending_replies == 1 {
            self.events.push(AppEvent::TypingChanged { typing: true });
        }

        tracing::info!(%id, reply_in_ms = delay.as_millis() as u64, "user message submitted");
        Some(id)
    }

    /// Applies every action due at or before `now`. Returns how many fired.
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some((due, action)) = self.schedule.pop_due(now) {
            match action {
                Action::Advance { id, status } => self.advance_status(id, status),
                Action::Reply { prompt } => self.deliver_reply(&prompt, due),
            }
            fired += 1;
        }
        fired
    }

    fn advance_status(&mut self, id: MessageId, status: MessageStatus) {
        if self.store.update_status(id, status) {
            tracing::debug!(%id, status = status.as_str(), "status advanced");
            self.events.push(AppEvent::StatusAdvanced { id, status });
        } else {
            tracing::debug!(%id, status = status.as_str(), "stale status update ignored");
        }
    }

    fn deliver_reply(&mut self, prompt: &str, at: Duration) {
        let reply = compose_reply(prompt, self.wall_clock(at), &mut self.rng);
        tracing::debug!(kind = ?reply.kind, "agent reply composed");

        for id in self.store.mark_user_messages_read() {
            self.events.push(AppEvent::StatusAdvanced {
                id,
                status: MessageStatus::Read,
            });
        }

        let id = self.append(Sender::Agent, reply.text, at, MessageStatus::Sent);
        self.schedule.push(
            at + self.timings.agent_delivered,
            Action::Advance {
                id,
                status: MessageStatus::Delivered,
            },
        );
        self.schedule.push(
            at + self.timings.agent_read,
            Action::Advance {
                id,
                status: MessageStatus::Read,
            },
        );

        self.pending_replies = self.pending_replies.saturating_sub(1);
        if self.pending_replies == 0 {
            self.events.push(AppEvent::TypingChanged { typing: false });
        }
    }

    fn append(&mut self, sender: Sender, text: String, at: Duration, status: MessageStatus) -> MessageId {
        let id = self.store.next_id();
        self.store.append(Message {
            id,
            text,
            sender,
            timestamp: self.wall_clock(at),
            status,
        });
        self.events.push(AppEvent::MessageAppended { id, sender, status });
        id
    }

    fn typing_delay(&mut self) -> Duration {
        let range = self.timings.typing_delay.clone();
        if range.is_empty() {
            return range.start;
        }
        self.rng.gen_range(range)
    }

    fn wall_clock(&self, at: Duration) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(at).unwrap_or_else(|_| chrono::Duration::zero());
        self.started_at + offset
    }
}
