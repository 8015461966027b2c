//! Exhibit Player GUI

mod state;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use exhibit_catalog::LanguageCode;
use exhibit_player::PlayerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use state::{AppState, Route};
use ui::{ExhibitTheme, GalleryScreen, PlayerScreen, WelcomeScreen};

#[derive(Parser, Debug)]
#[command(name = "exhibit-gui", about = "Museum artifact narration player")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, env = "EXHIBIT_CONFIG")]
    config: Option<PathBuf>,

    /// 展品数据 JSON 文件（覆盖配置）
    #[arg(short, long, env = "EXHIBIT_DATA")]
    data: Option<PathBuf>,

    /// 初始语言（覆盖配置）
    #[arg(short, long, env = "EXHIBIT_LANG")]
    lang: Option<LanguageCode>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exhibit_gui=info,exhibit_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match PlayerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default config");
            PlayerConfig::default()
        }
    };
    if let Some(data) = args.data {
        config.artifacts_path = Some(data);
    }
    if let Some(lang) = args.lang {
        config.default_language = lang;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([420.0, 480.0])
            .with_title("Exhibit Player"),
        ..Default::default()
    };

    eframe::run_native(
        "Exhibit Player",
        options,
        Box::new(|cc| {
            // 应用主题
            ExhibitTheme::apply(&cc.egui_ctx);
            // 展品图片
            egui_extras::install_image_loaders(&cc.egui_ctx);

            Ok(Box::new(ExhibitApp {
                state: AppState::new(config),
            }))
        }),
    )
}

struct ExhibitApp {
    state: AppState,
}

impl eframe::App for ExhibitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 处理播放引擎信号
        if self.state.poll_player() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.state.route {
            Route::Welcome => WelcomeScreen::show(ui, &mut self.state),
            Route::Gallery => GalleryScreen::show(ui, &mut self.state),
            Route::Player => {
                ui.vertical_centered(|ui| PlayerScreen::show(ui, &mut self.state));
            }
        });

        // 播放或加载中持续刷新进度
        if self.state.is_animating() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
