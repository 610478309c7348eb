use crate::chat::{Message, Sender};
use crate::clock::{ChatClock, ChatSnapshot};
use crate::event::AppEvent;
use crate::theme::Theme;
use chrono::{DateTime, Local};
use eframe::egui::{self, Align, Color32, CornerRadius, Frame, Layout, Margin, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};

const COMPOSER_ID: &str = "composer_input";
const MAX_BUBBLE_FRACTION: f32 = 0.75;
const MAX_DIAGNOSTICS: usize = 500;

pub struct MockChatApp {
    rx: Receiver<AppEvent>,
    clock: ChatClock,
    theme: Theme,
    input_buffer: String,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl MockChatApp {
    pub fn new(rx: Receiver<AppEvent>, clock: ChatClock, theme: Theme) -> Self {
        Self {
            rx,
            clock,
            theme,
            input_buffer: String::new(),
            diagnostics_log: Vec::new(),
            scroll_to_bottom: true,
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        if self.diagnostics_log.len() >= MAX_DIAGNOSTICS {
            self.diagnostics_log.remove(0);
        }
        self.diagnostics_log
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), message.into()));
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        if scrolls_transcript(&event) {
            self.scroll_to_bottom = true;
        }
        self.log_diagnostic(event.to_log_line());
    }

    fn submit_input(&mut self, ctx: &egui::Context) {
        if !is_submittable(&self.input_buffer) {
            return;
        }

        if self.clock.submit(&self.input_buffer).is_some() {
            self.input_buffer.clear();
            self.scroll_to_bottom = true;
            ctx.request_repaint();
        }
    }

    fn render_header(&self, ctx: &egui::Context, snapshot: &ChatSnapshot) {
        egui::TopBottomPanel::top("header")
            .frame(self.theme.header_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    Frame::new()
                        .fill(self.theme.avatar_fill)
                        .corner_radius(CornerRadius::same(self.theme.radius_pill))
                        .inner_margin(Margin::same(self.theme.spacing_8 as i8))
                        .show(ui, |ui| {
                            ui.label(RichText::new("🤖").size(20.0).color(self.theme.header_fill));
                        });
                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(&snapshot.agent_name)
                                .heading()
                                .strong()
                                .color(self.theme.header_text),
                        );
                        ui.label(RichText::new("Online").small().color(self.theme.presence_text));
                    });
                });
            });
    }

    fn render_composer(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        egui::TopBottomPanel::bottom("composer")
            .frame(theme.composer_frame())
            .show(ctx, |ui| {
                let input_id = egui::Id::new(COMPOSER_ID);
                let focused = ui.memory(|memory| memory.has_focus(input_id));
                let mut send_now = false;
                if focused && ui.input(|input| wants_submit(input.key_pressed(egui::Key::Enter), input.modifiers)) {
                    // Swallow the key so the text box does not insert a newline.
                    ui.input_mut(|input| {
                        input.events.retain(|event| {
                            !matches!(
                                event,
                                egui::Event::Key {
                                    key: egui::Key::Enter,
                                    pressed: true,
                                    ..
                                }
                            )
                        })
                    });
                    send_now = true;
                }

                ui.horizontal(|ui| {
                    let button_width = 48.0;
                    let input_width = (ui.available_width() - button_width - theme.spacing_8).max(80.0);
                    theme.input_frame().show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.input_buffer)
                                .id(input_id)
                                .frame(false)
                                .desired_rows(1)
                                .desired_width(input_width - 2.0 * theme.spacing_16)
                                .hint_text("Type a message..."),
                        );
                    });

                    let enabled = is_submittable(&self.input_buffer);
                    let fill = if enabled { theme.send_fill } else { theme.send_disabled };
                    let button = egui::Button::new(RichText::new("➤").size(18.0).color(Color32::WHITE))
                        .fill(fill)
                        .corner_radius(CornerRadius::same(theme.radius_pill))
                        .min_size(egui::vec2(button_width, button_width - 8.0));
                    send_now |= ui.add_enabled(enabled, button).clicked();
                });

                if send_now {
                    self.submit_input(ctx);
                    ui.memory_mut(|memory| memory.request_focus(input_id));
                }
            });
    }

    fn render_messages(&mut self, ctx: &egui::Context, snapshot: &ChatSnapshot) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in &snapshot.messages {
                        self.render_bubble(ui, message, &snapshot.agent_name);
                    }

                    if snapshot.typing {
                        self.render_typing(ui);
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(120.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).monospace().small());
                            }
                        });
                });
        });
    }

    fn render_bubble(&self, ui: &mut egui::Ui, message: &Message, agent_name: &str) {
        let theme = &self.theme;
        let max_width = ui.available_width() * MAX_BUBBLE_FRACTION;
        let (layout, icon, name) = match message.sender {
            Sender::User => (Layout::right_to_left(Align::TOP), "👤", "You"),
            Sender::Agent => (Layout::left_to_right(Align::TOP), "🤖", agent_name),
        };

        ui.with_layout(layout, |ui| {
            theme.bubble_frame(message.sender).show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.with_layout(Layout::top_down(Align::LEFT), |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(icon).small().color(theme.caption));
                        ui.label(RichText::new(name).small().strong().color(theme.caption));
                    });
                    ui.add(egui::Label::new(RichText::new(&message.text).color(theme.text_primary)).wrap());
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format_time(&message.timestamp))
                                .small()
                                .color(theme.text_muted),
                        );
                        if message.is_from_user() {
                            let (glyph, color) = theme.status_glyph(message.status);
                            ui.label(RichText::new(glyph).small().color(color));
                        }
                    });
                });
            });
        });
    }

    fn render_typing(&self, ui: &mut egui::Ui) {
        let theme = &self.theme;
        let time = ui.input(|input| input.time);
        ui.with_layout(Layout::left_to_right(Align::TOP), |ui| {
            theme.bubble_frame(Sender::Agent).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🤖").small().color(theme.caption));
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(36.0, 16.0), egui::Sense::hover());
                    for dot in 0..3 {
                        let x = rect.left() + 6.0 + dot as f32 * 12.0;
                        let y = rect.center().y - bounce_offset(time, dot);
                        ui.painter().circle_filled(egui::pos2(x, y), 4.0, theme.typing_dot);
                    }
                });
            });
        });
        ui.ctx().request_repaint();
    }
}

impl eframe::App for MockChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        let snapshot = self.clock.snapshot();
        self.render_header(ctx, &snapshot);
        self.render_composer(ctx);
        self.render_messages(ctx, &snapshot);
    }
}

pub fn is_submittable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Enter sends; Shift+Enter is left to the text box as a newline.
pub fn wants_submit(enter_pressed: bool, modifiers: egui::Modifiers) -> bool {
    enter_pressed && !modifiers.shift
}

/// Any change to the transcript, status ticks included, pulls the view down.
pub fn scrolls_transcript(event: &AppEvent) -> bool {
    match event {
        AppEvent::MessageAppended { .. }
        | AppEvent::StatusAdvanced { .. }
        | AppEvent::TypingChanged { .. } => true,
    }
}

pub fn format_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%I:%M %p").to_string()
}

// Dots hop one after another, 150ms apart.
fn bounce_offset(time: f64, dot: usize) -> f32 {
    let phase = time * std::f64::consts::TAU - dot as f64 * 0.15 * std::f64::consts::TAU;
    (phase.sin().max(0.0) * 4.0) as f32
}

#[cfg(test)]
mod tests {
    use super::{bounce_offset, format_time, is_submittable, scrolls_transcript, wants_submit};
    use crate::chat::{MessageId, MessageStatus};
    use crate::event::AppEvent;
    use chrono::{Local, TimeZone};
    use eframe::egui::Modifiers;

    #[test]
    fn blank_input_cannot_be_sent() {
        assert!(!is_submittable(""));
        assert!(!is_submittable("  \n\t"));
        assert!(is_submittable(" x "));
    }

    #[test]
    fn enter_sends_but_shift_enter_does_not() {
        assert!(wants_submit(true, Modifiers::NONE));
        assert!(!wants_submit(true, Modifiers::SHIFT));
        assert!(!wants_submit(false, Modifiers::NONE));
    }

    #[test]
    fn status_ticks_scroll_the_transcript() {
        assert!(scrolls_transcript(&AppEvent::StatusAdvanced {
            id: MessageId::new(2),
            status: MessageStatus::Read,
        }));
        assert!(scrolls_transcript(&AppEvent::TypingChanged { typing: true }));
    }

    #[test]
    fn bubble_time_is_two_digit_hour_and_minute() {
        let timestamp = Local
            .with_ymd_and_hms(2024, 3, 5, 9, 4, 0)
            .single()
            .expect("fixture time should be unambiguous");
        assert_eq!(format_time(&timestamp), "09:04 AM");
    }

    #[test]
    fn bounce_stays_within_four_points() {
        for step in 0..100 {
            let time = step as f64 * 0.037;
            for dot in 0..3 {
                let offset = bounce_offset(time, dot);
                assert!((0.0..=4.0).contains(&offset));
            }
        }
    }
}
