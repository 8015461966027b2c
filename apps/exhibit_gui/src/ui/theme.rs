//! 主题定义

use egui::{Color32, Rounding, Stroke, Style, Visuals};

/// 展厅浅色主题，琥珀色强调
pub struct ExhibitTheme;

impl ExhibitTheme {
    // 颜色定义
    pub const BG_PAGE: Color32 = Color32::from_rgb(248, 250, 252);
    pub const BG_CARD: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BG_CHIP: Color32 = Color32::from_rgb(241, 245, 249);
    pub const ACCENT: Color32 = Color32::from_rgb(245, 158, 11);
    pub const ACCENT_SOFT: Color32 = Color32::from_rgb(254, 243, 199);
    pub const ACCENT_TEXT: Color32 = Color32::from_rgb(146, 64, 14);
    pub const DANGER: Color32 = Color32::from_rgb(220, 38, 38);
    pub const DANGER_SOFT: Color32 = Color32::from_rgb(254, 226, 226);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(15, 23, 42);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(100, 116, 139);
    pub const BORDER: Color32 = Color32::from_rgb(226, 232, 240);

    /// 应用主题到 egui context
    pub fn apply(ctx: &egui::Context) {
        let mut style = Style::default();
        let mut visuals = Visuals::light();

        visuals.panel_fill = Self::BG_PAGE;
        visuals.window_fill = Self::BG_CARD;
        visuals.extreme_bg_color = Self::BORDER;
        visuals.faint_bg_color = Self::BG_CHIP;

        visuals.widgets.noninteractive.bg_fill = Self::BG_CARD;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::TEXT_MUTED);
        visuals.widgets.noninteractive.rounding = Rounding::same(8.0);

        visuals.widgets.inactive.bg_fill = Self::BG_CARD;
        visuals.widgets.inactive.weak_bg_fill = Self::BG_CARD;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Self::BORDER);
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.inactive.rounding = Rounding::same(8.0);

        visuals.widgets.hovered.weak_bg_fill = Self::ACCENT_SOFT;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Self::ACCENT);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.hovered.rounding = Rounding::same(8.0);

        visuals.widgets.active.weak_bg_fill = Self::ACCENT;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
        visuals.widgets.active.rounding = Rounding::same(8.0);

        visuals.selection.bg_fill = Self::ACCENT;
        visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);

        visuals.window_rounding = Rounding::same(12.0);
        visuals.window_stroke = Stroke::new(1.0, Self::BORDER);

        style.visuals = visuals;

        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.window_margin = egui::Margin::same(12.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);

        ctx.set_style(style);
    }

    /// 卡片外框
    pub fn card() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::BG_CARD)
            .stroke(Stroke::new(1.0, Self::BORDER))
            .rounding(Rounding::same(12.0))
            .inner_margin(egui::Margin::same(24.0))
    }
}
