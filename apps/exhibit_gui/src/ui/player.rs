//! 展品解说播放页

use egui::{Align, Button, Layout, ProgressBar, RichText, Ui};
use exhibit_catalog::LanguageCode;
use exhibit_player::{AudioEngine, NarrationPlayer, PlaybackStatus};

use crate::state::AppState;
use crate::ui::language::LanguageSelector;
use crate::ui::theme::ExhibitTheme;

/// 页面发出的导航请求
enum Navigation {
    Back,
    Home,
}

pub struct PlayerScreen;

impl PlayerScreen {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        let Some(player) = state.player.as_mut() else {
            return;
        };

        let mut navigation = None;
        let mut selected_language = None;
        let mut volume = state.volume;

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.set_max_width(720.0);

            Self::header(ui, player.language(), &mut navigation);
            ui.add_space(16.0);

            Self::artwork(ui, player);
            ExhibitTheme::card().show(ui, |ui| {
                ui.set_width(ui.available_width());
                Self::description(ui, player);
                ui.add_space(16.0);
                Self::controls(ui, player);
                ui.add_space(12.0);
                Self::volume(ui, &mut volume);
            });

            ui.add_space(16.0);
            ExhibitTheme::card().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new("Available Languages")
                        .size(18.0)
                        .color(ExhibitTheme::TEXT_PRIMARY),
                );
                ui.add_space(8.0);
                LanguageSelector::show(ui, player.language(), |code| {
                    selected_language = Some(code)
                });
            });
        });

        match navigation {
            Some(Navigation::Back) => state.back(),
            Some(Navigation::Home) => state.back_to_home(),
            None => {}
        }
        if volume != state.volume {
            state.set_volume(volume);
        }
        if let Some(code) = selected_language {
            state.change_language(code);
        }
    }

    fn header(ui: &mut Ui, language: LanguageCode, navigation: &mut Option<Navigation>) {
        ui.horizontal(|ui| {
            if ui.button("🏠 Home").clicked() {
                *navigation = Some(Navigation::Home);
            }
            if ui.button("⬅ Back").clicked() {
                *navigation = Some(Navigation::Back);
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                egui::Frame::none()
                    .fill(ExhibitTheme::ACCENT_SOFT)
                    .rounding(egui::Rounding::same(16.0))
                    .inner_margin(egui::Margin::symmetric(14.0, 6.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(language.display_name())
                                .color(ExhibitTheme::ACCENT_TEXT)
                                .strong(),
                        );
                    });
            });
        });
    }

    fn artwork(ui: &mut Ui, player: &NarrationPlayer<AudioEngine>) {
        let Some(url) = player.image_url() else {
            return;
        };
        let uri = if url.contains("://") {
            url.to_string()
        } else {
            format!("file://{}", url)
        };

        ui.vertical_centered(|ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_height(500.0)
                    .rounding(egui::Rounding::same(8.0)),
            );
            ui.label(RichText::new(url).size(11.0).color(ExhibitTheme::TEXT_MUTED));
        });
        ui.add_space(16.0);
    }

    fn description(ui: &mut Ui, player: &NarrationPlayer<AudioEngine>) {
        ui.vertical_centered(|ui| {
            egui::Frame::none()
                .fill(ExhibitTheme::BG_CHIP)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::symmetric(10.0, 4.0))
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(player.artifact_code())
                            .size(12.0)
                            .color(ExhibitTheme::TEXT_MUTED),
                    );
                });
            ui.add_space(8.0);
            ui.label(
                RichText::new(player.title())
                    .size(28.0)
                    .color(ExhibitTheme::TEXT_PRIMARY),
            );
            ui.label(RichText::new(player.description()).color(ExhibitTheme::TEXT_MUTED));
        });
    }

    fn volume(ui: &mut Ui, volume: &mut f32) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("🔊").color(ExhibitTheme::TEXT_MUTED));
            ui.add(egui::Slider::new(volume, 0.0..=1.0).show_value(false));
        });
    }

    fn controls(ui: &mut Ui, player: &mut NarrationPlayer<AudioEngine>) {
        let snapshot = player.snapshot();

        if let Some(error) = &snapshot.error {
            egui::Frame::none()
                .fill(ExhibitTheme::DANGER_SOFT)
                .stroke(egui::Stroke::new(1.0, ExhibitTheme::DANGER))
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(12.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        RichText::new(format!("⚠ {}", error))
                            .color(ExhibitTheme::DANGER),
                    );
                });
            return;
        }

        let progress = (snapshot.progress_percentage() / 100.0) as f32;
        ui.add(
            ProgressBar::new(progress.clamp(0.0, 1.0))
                .desired_height(8.0)
                .fill(ExhibitTheme::ACCENT),
        );
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(snapshot.current_label())
                    .size(13.0)
                    .color(ExhibitTheme::TEXT_MUTED),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(
                    RichText::new(snapshot.total_label())
                        .size(13.0)
                        .color(ExhibitTheme::TEXT_MUTED),
                );
            });
        });

        ui.add_space(12.0);

        let enabled = player.controller().controls_enabled();
        ui.horizontal(|ui| {
            let width = 56.0 + 80.0 + ui.spacing().item_spacing.x * 2.0;
            ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));

            let replay = ui.add_enabled(
                enabled,
                Button::new(RichText::new("↺").size(22.0))
                    .min_size(egui::vec2(56.0, 56.0))
                    .rounding(egui::Rounding::same(28.0)),
            );
            if replay.clicked() {
                if let Err(e) = player.controller_mut().replay() {
                    tracing::debug!(error = %e, "replay ignored");
                }
            }

            if snapshot.status == PlaybackStatus::Loading {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(80.0, 80.0), egui::Sense::hover());
                ui.put(rect, egui::Spinner::new().size(32.0).color(ExhibitTheme::ACCENT));
            } else {
                let icon = if snapshot.is_playing() { "⏸" } else { "▶" };
                let toggle = ui.add_enabled(
                    enabled,
                    Button::new(RichText::new(icon).size(30.0).color(egui::Color32::WHITE))
                        .fill(ExhibitTheme::ACCENT)
                        .min_size(egui::vec2(80.0, 80.0))
                        .rounding(egui::Rounding::same(40.0)),
                );
                if toggle.clicked() {
                    if let Err(e) = player.controller_mut().toggle_play_pause() {
                        tracing::debug!(error = %e, "play/pause ignored");
                    }
                }
            }
        });
    }
}
