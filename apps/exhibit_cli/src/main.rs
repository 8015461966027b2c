//! exhibit-cli - 命令行工具
//!
//! 查看语言目录、展品数据，并在终端播放展品解说

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use exhibit_catalog::{ArtifactCollection, CatalogError, LanguageCatalog, LanguageCode};
use exhibit_player::{
    AudioEngine, ConfigError, EngineError, NarrationPlayer, PlaybackStatus, PlayerConfig,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "exhibit-cli", about = "Museum artifact narration tools")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, env = "EXHIBIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出支持的语言
    Languages,
    /// 以 JSON 输出展品信息
    Info {
        #[arg(short, long, env = "EXHIBIT_DATA")]
        data: Option<PathBuf>,
        #[arg(long)]
        code: String,
        #[arg(short, long)]
        lang: Option<LanguageCode>,
    },
    /// 播放展品解说
    Play {
        #[arg(short, long, env = "EXHIBIT_DATA")]
        data: Option<PathBuf>,
        #[arg(long)]
        code: String,
        #[arg(short, long)]
        lang: Option<LanguageCode>,
        /// 禁止自动播放，元数据就绪后由命令行发起播放
        #[arg(long)]
        no_autoplay: bool,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("No exhibit data file given (use --data or artifacts_path)")]
    MissingData,

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// `info` 命令的输出
#[derive(Debug, Serialize)]
struct ArtifactSummary {
    code: String,
    language: LanguageCode,
    found: bool,
    title: String,
    description: String,
    image_url: Option<String>,
    audio_url: Option<String>,
    available_languages: Vec<LanguageCode>,
}

impl ArtifactSummary {
    fn new(artifacts: &ArtifactCollection, code: &str, language: LanguageCode) -> Self {
        match artifacts.get(code) {
            Some(artifact) => Self {
                code: code.to_string(),
                language,
                found: true,
                title: artifact.display_title(language, code),
                description: artifact.display_description(language).to_string(),
                image_url: artifact.image_url().map(str::to_string),
                audio_url: artifact.audio_url(language).map(str::to_string),
                available_languages: artifact.available_languages(),
            },
            None => Self {
                code: code.to_string(),
                language,
                found: false,
                title: exhibit_catalog::fallback_title(code),
                description: exhibit_catalog::FALLBACK_DESCRIPTION.to_string(),
                image_url: None,
                audio_url: None,
                available_languages: Vec::new(),
            },
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exhibit_cli=info,exhibit_player=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = PlayerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Languages => {
            for (code, name) in LanguageCatalog::entries() {
                println!("{}\t{}", code, name);
            }
            Ok(())
        }
        Command::Info { data, code, lang } => {
            let artifacts = load_artifacts(data, &config)?;
            let language = lang.unwrap_or(config.default_language);
            let summary = ArtifactSummary::new(&artifacts, code.trim(), language);
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "failed to encode summary"),
            }
            Ok(())
        }
        Command::Play {
            data,
            code,
            lang,
            no_autoplay,
        } => {
            let artifacts = load_artifacts(data, &config)?;
            let mut config = config;
            if no_autoplay {
                config.autoplay = false;
            }
            let language = lang.unwrap_or(config.default_language);
            play(&config, &artifacts, code.trim(), language)
        }
    }
}

fn load_artifacts(
    data: Option<PathBuf>,
    config: &PlayerConfig,
) -> Result<ArtifactCollection, CliError> {
    let path = data
        .or_else(|| config.artifacts_path.clone())
        .ok_or(CliError::MissingData)?;
    Ok(ArtifactCollection::load(&path)?)
}

fn play(
    config: &PlayerConfig,
    artifacts: &ArtifactCollection,
    code: &str,
    language: LanguageCode,
) -> Result<(), CliError> {
    let engine = AudioEngine::spawn(config.engine_config())?;
    let mut player = NarrationPlayer::new(engine, language, code, artifacts.get(code).cloned());

    println!("{} [{}]", player.title(), language.display_name());
    println!("{}", player.description());

    let mut user_started = false;
    let mut last_report = Instant::now();

    loop {
        player.poll();
        let snapshot = player.snapshot();

        match snapshot.status {
            PlaybackStatus::Ended => {
                println!("\rFinished {:>18}", snapshot.total_label());
                return Ok(());
            }
            PlaybackStatus::Errored => {
                let message = snapshot
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(CliError::Playback(message));
            }
            // 只有自动播放被拒绝时才会在这里停住
            PlaybackStatus::Paused if !user_started => {
                tracing::info!("autoplay rejected, starting playback");
                user_started = true;
                if let Err(e) = player.controller_mut().toggle_play_pause() {
                    return Err(CliError::Playback(e.to_string()));
                }
            }
            _ => {}
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            last_report = Instant::now();
            print!(
                "\r{} / {}  {:>5.1}%",
                snapshot.current_label(),
                snapshot.total_label(),
                snapshot.progress_percentage()
            );
            let _ = std::io::stdout().flush();
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts() -> ArtifactCollection {
        ArtifactCollection::from_json(
            r#"{
                "D-01": {
                    "audio_urls": { "en": "drum-en.mp3", "ko": "drum-ko.mp3" },
                    "title": { "en": "Bronze Drum" },
                    "image_url": "drum.jpg"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_summary_for_known_artifact() {
        let summary = ArtifactSummary::new(&artifacts(), "D-01", LanguageCode::Ko);
        assert!(summary.found);
        assert_eq!(summary.title, "Artifact D-01");
        assert_eq!(summary.audio_url.as_deref(), Some("drum-ko.mp3"));
        assert_eq!(
            summary.available_languages,
            vec![LanguageCode::En, LanguageCode::Ko]
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["language"], "ko");
        assert_eq!(json["image_url"], "drum.jpg");
    }

    #[test]
    fn test_summary_for_unknown_artifact() {
        let summary = ArtifactSummary::new(&artifacts(), "Z-99", LanguageCode::En);
        assert!(!summary.found);
        assert_eq!(summary.title, "Artifact Z-99");
        assert_eq!(summary.description, exhibit_catalog::FALLBACK_DESCRIPTION);
        assert!(summary.audio_url.is_none());
    }

    #[test]
    fn test_cli_parses_play_flags() {
        let cli = Cli::try_parse_from([
            "exhibit-cli",
            "play",
            "--data",
            "items.json",
            "--code",
            "D-01",
            "--lang",
            "ja",
            "--no-autoplay",
        ])
        .unwrap();
        match cli.command {
            Command::Play {
                code,
                lang,
                no_autoplay,
                ..
            } => {
                assert_eq!(code, "D-01");
                assert_eq!(lang, Some(LanguageCode::Ja));
                assert!(no_autoplay);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
