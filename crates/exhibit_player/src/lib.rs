//! exhibit_player - 展品解说播放引擎
//!
//! 播放控制器、媒体句柄抽象，以及基于 symphonia + cpal 的音频引擎。

mod config;
mod controller;
mod decoder;
mod engine;
mod handle;
mod listener;
mod narration;
mod output;
mod signal;
mod source;
mod time;

pub use config::*;
pub use controller::{ControlError, PlaybackController, PlaybackError, PlaybackSnapshot};
pub use decoder::*;
pub use engine::*;
pub use handle::*;
pub use listener::*;
pub use narration::*;
pub use output::*;
pub use signal::*;
pub use source::*;
pub use time::*;
