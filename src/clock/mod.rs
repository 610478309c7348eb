use crate::chat::session::ChatSession;
use crate::chat::{Message, MessageId};
use crate::event::AppEvent;
use eframe::egui;
use snafu::{ResultExt, Snafu};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, OnceLock};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::Notify;
use tokio::time::{self, Instant};

#[derive(Debug, Snafu)]
pub enum ClockError {
    #[snafu(display("tokio runtime unavailable: {source}"))]
    NoRuntime { source: TryCurrentError },
}

/// What the window needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub agent_name: String,
    pub messages: Vec<Message>,
    pub typing: bool,
}

/// Drives a [`ChatSession`] in real time from a background tokio task.
///
/// The task sleeps until the session's next scheduled action, applies it and
/// forwards the resulting events to the UI channel.
#[derive(Clone)]
pub struct ChatClock {
    session: Arc<Mutex<ChatSession>>,
    wake: Arc<Notify>,
    tx: mpsc::Sender<AppEvent>,
    repaint: Arc<OnceLock<egui::Context>>,
    runtime_handle: Handle,
    origin: Instant,
    started: Arc<AtomicBool>,
}

impl ChatClock {
    pub fn new(mut session: ChatSession, tx: mpsc::Sender<AppEvent>) -> Result<Self, ClockError> {
        let runtime_handle = Handle::try_current().context(NoRuntimeSnafu)?;
        let welcome = session.drain_events();
        let clock = Self {
            session: Arc::new(Mutex::new(session)),
            wake: Arc::new(Notify::new()),
            tx,
            repaint: Arc::new(OnceLock::new()),
            runtime_handle,
            origin: Instant::now(),
            started: Arc::new(AtomicBool::new(false)),
        };
        clock.forward(welcome);
        Ok(clock)
    }

    /// Lets the background task wake the window after applying events.
    pub fn attach_repaint(&self, ctx: egui::Context) {
        let _ = self.repaint.set(ctx);
    }

    pub fn start(&self) {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let clock = self.clone();
        self.runtime_handle.spawn(async move {
            tracing::debug!("chat clock started");
            clock.run().await;
        });
    }

    pub fn submit(&self, text: &str) -> Option<MessageId> {
        let id = {
            let mut session = self.lock();
            let id = session.submit(text, self.origin.elapsed());
            self.forward(session.drain_events());
            id
        };

        if id.is_some() {
            self.wake.notify_one();
        }
        id
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let session = self.lock();
        ChatSnapshot {
            agent_name: session.agent_name().to_string(),
            messages: session.messages().to_vec(),
            typing: session.is_typing(),
        }
    }

    async fn run(&self) {
        loop {
            let next_due = self.lock().next_due();
            match next_due {
                Some(due) => {
                    let woken = tokio::select! {
                        _ = time::sleep_until(self.origin + due) => false,
                        _ = self.wake.notified() => true,
                    };
                    if woken {
                        continue;
                    }
                }
                None => {
                    self.wake.notified().await;
                    continue;
                }
            }

            let mut session = self.lock();
            let fired = session.advance(self.origin.elapsed());
            if fired > 0 {
                self.forward(session.drain_events());
            }
        }
    }

    fn forward(&self, events: Vec<AppEvent>) {
        if events.is_empty() {
            return;
        }
        for event in events {
            if self.tx.send(event).is_err() {
                tracing::debug!("event receiver dropped");
                break;
            }
        }
        if let Some(ctx) = self.repaint.get() {
            ctx.request_repaint();
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
