//! 入口页与展品列表

use egui::{RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::language::LanguageSelector;
use crate::ui::theme::ExhibitTheme;

pub struct WelcomeScreen;

impl WelcomeScreen {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        let mut selected = None;

        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(
                RichText::new("Welcome")
                    .size(36.0)
                    .color(ExhibitTheme::TEXT_PRIMARY),
            );
            ui.label(
                RichText::new("Choose your narration language")
                    .size(16.0)
                    .color(ExhibitTheme::TEXT_MUTED),
            );
            ui.add_space(24.0);

            ExhibitTheme::card().show(ui, |ui| {
                ui.set_max_width(560.0);
                LanguageSelector::show(ui, state.language, |code| selected = Some(code));
            });
        });

        if let Some(code) = selected {
            state.choose_language(code);
        }
    }
}

pub struct GalleryScreen;

impl GalleryScreen {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        let mut open_code: Option<String> = None;

        ui.horizontal(|ui| {
            if ui.button("⬅ Back").clicked() {
                state.back();
            }
            ui.label(
                RichText::new("Artifacts")
                    .size(22.0)
                    .color(ExhibitTheme::TEXT_PRIMARY)
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("📂").on_hover_text("Open exhibit data").clicked() {
                    state.open_data_dialog();
                }
                ui.label(
                    RichText::new(state.language.display_name()).color(ExhibitTheme::ACCENT_TEXT),
                );
            });
        });

        ui.add_space(12.0);

        // 编号输入
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.code_query)
                    .hint_text("Enter artifact code")
                    .desired_width(240.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Listen").clicked() || submitted {
                open_code = Some(state.code_query.clone());
            }
        });

        if let Some(message) = &state.data_error {
            ui.label(RichText::new(message).color(ExhibitTheme::DANGER));
        }

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);

        if state.artifacts.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(
                    RichText::new("No exhibit data loaded")
                        .color(ExhibitTheme::TEXT_MUTED)
                        .size(14.0),
                );
                ui.label(
                    RichText::new("Open a JSON file or enter an artifact code")
                        .color(ExhibitTheme::TEXT_MUTED)
                        .size(12.0),
                );
            });
        } else {
            let language = state.language;
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (code, artifact) in state.artifacts.iter() {
                        let has_audio = artifact.audio_url(language).is_some();
                        let response = egui::Frame::none()
                            .fill(ExhibitTheme::BG_CARD)
                            .rounding(egui::Rounding::same(8.0))
                            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                            .show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(code)
                                            .size(12.0)
                                            .color(ExhibitTheme::TEXT_MUTED),
                                    );
                                    ui.label(
                                        RichText::new(artifact.display_title(language, code))
                                            .color(ExhibitTheme::TEXT_PRIMARY),
                                    );
                                    if !has_audio {
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| {
                                                ui.label(
                                                    RichText::new("no narration")
                                                        .size(11.0)
                                                        .color(ExhibitTheme::TEXT_MUTED),
                                                );
                                            },
                                        );
                                    }
                                });
                            })
                            .response;

                        if response.interact(egui::Sense::click()).clicked() {
                            open_code = Some(code.to_string());
                        }
                        ui.add_space(2.0);
                    }
                });
        }

        if let Some(code) = open_code {
            state.open_artifact(&code);
        }
    }
}
