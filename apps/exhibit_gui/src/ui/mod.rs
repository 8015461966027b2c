//! UI 模块

pub mod gallery;
pub mod language;
pub mod player;
pub mod theme;

pub use gallery::{GalleryScreen, WelcomeScreen};
pub use player::PlayerScreen;
pub use theme::ExhibitTheme;
