use crate::chat::{MessageStatus, Sender};
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub header_fill: Color32,
    pub header_text: Color32,
    pub presence_text: Color32,
    pub wallpaper: Color32,
    pub user_bubble: Color32,
    pub agent_bubble: Color32,
    pub caption: Color32,
    pub composer_bar: Color32,
    pub input_fill: Color32,
    pub input_focus_ring: Color32,
    pub send_fill: Color32,
    pub send_hover: Color32,
    pub send_disabled: Color32,
    pub avatar_fill: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub tick: Color32,
    pub tick_read: Color32,
    pub typing_dot: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_8: u8,
    pub radius_pill: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_fill: Color32::from_rgb(0x07, 0x5E, 0x54),
            header_text: Color32::WHITE,
            presence_text: Color32::from_rgb(0xBB, 0xF7, 0xD0),
            wallpaper: Color32::from_rgb(0xEC, 0xE5, 0xDD),
            user_bubble: Color32::from_rgb(0xDC, 0xF8, 0xC6),
            agent_bubble: Color32::WHITE,
            caption: Color32::from_rgb(0x07, 0x5E, 0x54),
            composer_bar: Color32::from_rgb(0xF0, 0xF0, 0xF0),
            input_fill: Color32::WHITE,
            input_focus_ring: Color32::from_rgb(0x25, 0xD3, 0x66),
            send_fill: Color32::from_rgb(0x25, 0xD3, 0x66),
            send_hover: Color32::from_rgb(0x20, 0xBA, 0x5A),
            send_disabled: Color32::from_rgb(0xD1, 0xD5, 0xDB),
            avatar_fill: Color32::from_rgb(0xD1, 0xD5, 0xDB),
            text_primary: Color32::from_rgb(0x1F, 0x29, 0x37),
            text_muted: Color32::from_rgb(0x6B, 0x72, 0x80),
            tick: Color32::from_rgb(0x9C, 0xA3, 0xAF),
            tick_read: Color32::from_rgb(0x60, 0xA5, 0xFA),
            typing_dot: Color32::from_rgb(0x9C, 0xA3, 0xAF),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            spacing_16: Self::P16,
            radius_8: Self::R8,
            radius_pill: 20,
        }
    }
}

impl Theme {
    pub const R8: u8 = 8;
    pub const P8: f32 = 8.0;
    pub const P12: f32 = 12.0;
    pub const P16: f32 = 16.0;

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = self.wallpaper;
        visuals.override_text_color = Some(self.text_primary);
        visuals.extreme_bg_color = self.input_fill;
        visuals.widgets.inactive.bg_fill = self.send_fill;
        visuals.widgets.inactive.weak_bg_fill = self.send_fill;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.send_hover;
        visuals.widgets.hovered.weak_bg_fill = self.send_hover;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.active.bg_fill = self.send_hover;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.selection.stroke = Stroke::new(2.0, self.input_focus_ring);
        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 12.0);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(10.0));
        ctx.set_style(style);
    }

    pub fn header_frame(&self) -> Frame {
        Frame::new()
            .fill(self.header_fill)
            .inner_margin(Margin::same(self.spacing_16 as i8))
            .shadow(egui::epaint::Shadow {
                offset: [0, 2],
                blur: 6,
                spread: 0,
                color: Color32::from_rgba_premultiplied(0, 0, 0, 40),
            })
    }

    pub fn bubble_frame(&self, sender: Sender) -> Frame {
        let fill = match sender {
            Sender::User => self.user_bubble,
            Sender::Agent => self.agent_bubble,
        };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_8))
            .stroke(Stroke::NONE)
            .shadow(egui::epaint::Shadow {
                offset: [0, 1],
                blur: 2,
                spread: 0,
                color: Color32::from_rgba_premultiplied(0, 0, 0, 20),
            })
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.composer_bar)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .stroke(Stroke::NONE)
    }

    pub fn input_frame(&self) -> Frame {
        Frame::new()
            .fill(self.input_fill)
            .inner_margin(Margin::symmetric(self.spacing_16 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_pill))
    }

    /// Clock, single check, double check, highlighted double check.
    pub fn status_glyph(&self, status: MessageStatus) -> (&'static str, Color32) {
        match status {
            MessageStatus::Sending => ("🕓", self.tick),
            MessageStatus::Sent => ("✔", self.tick),
            MessageStatus::Delivered => ("✔✔", self.tick),
            MessageStatus::Read => ("✔✔", self.tick_read),
        }
    }
}
