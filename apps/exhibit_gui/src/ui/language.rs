//! 语言选择

use egui::{Button, RichText, Ui};
use exhibit_catalog::{LanguageCatalog, LanguageCode};

use crate::ui::theme::ExhibitTheme;

/// 语言选择按钮组
///
/// 不持有状态：高亮的语言由调用方传入，点击时把代码交给 `on_select`。
pub struct LanguageSelector;

impl LanguageSelector {
    pub fn show(ui: &mut Ui, active: LanguageCode, mut on_select: impl FnMut(LanguageCode)) {
        ui.horizontal_wrapped(|ui| {
            for (code, name) in LanguageCatalog::entries() {
                let is_active = code == active;
                let text = if is_active {
                    RichText::new(name).color(egui::Color32::WHITE)
                } else {
                    RichText::new(name).color(ExhibitTheme::TEXT_PRIMARY)
                };

                let mut button = Button::new(text);
                if is_active {
                    button = button.fill(ExhibitTheme::ACCENT);
                }

                if ui.add(button).clicked() {
                    on_select(code);
                }
            }
        });
    }
}
