// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for voxbrush hosts (config, prefs, notices).
//! Keeps host adapters thin and framework-agnostic.

pub mod config;
pub mod notices;
pub mod prefs;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use notices::{Notice, NoticeKind, NoticeService};
pub use prefs::{OverlayPrefs, PREFS_KEY};
