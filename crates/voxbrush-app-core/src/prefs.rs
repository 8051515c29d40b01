// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved overlay preferences (config plus a little user history).

use serde::{Deserialize, Serialize};
use voxbrush_core::OverlayConfig;

/// Config key the preferences are stored under.
pub const PREFS_KEY: &str = "overlay_prefs";

/// Most recent colors kept in [`OverlayPrefs::recent_colors`].
pub const MAX_RECENT_COLORS: usize = 8;

/// Preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OverlayPrefs {
    /// Overlay tuning knobs.
    pub overlay: OverlayConfig,
    /// Brush colors, most recent first.
    pub recent_colors: Vec<[f32; 3]>,
    /// Renderer that was active when the session ended.
    pub last_renderer: Option<String>,
}

impl OverlayPrefs {
    /// Moves `color` to the front of the history, dropping the oldest entry
    /// past [`MAX_RECENT_COLORS`].
    pub fn remember_color(&mut self, color: [f32; 3]) {
        self.recent_colors.retain(|c| *c != color);
        self.recent_colors.insert(0, color);
        self.recent_colors.truncate(MAX_RECENT_COLORS);
    }

    /// Overlay config with the session history applied: the last renderer
    /// becomes the default, the latest color the brush tint.
    pub fn effective_config(&self) -> OverlayConfig {
        let mut cfg = self.overlay.clone();
        if let Some(name) = &self.last_renderer {
            cfg.default_renderer = name.clone();
        }
        if let Some(color) = self.recent_colors.first() {
            cfg.default_color = *color;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn recent_colors_dedupe_and_stay_bounded() {
        let mut prefs = OverlayPrefs::default();
        for i in 0..10 {
            prefs.remember_color([i as f32 / 10.0, 0.0, 0.0]);
        }
        assert_eq!(prefs.recent_colors.len(), MAX_RECENT_COLORS);
        assert_eq!(prefs.recent_colors[0], [0.9, 0.0, 0.0]);

        prefs.remember_color([0.5, 0.0, 0.0]);
        assert_eq!(prefs.recent_colors.len(), MAX_RECENT_COLORS);
        assert_eq!(prefs.recent_colors[0], [0.5, 0.0, 0.0]);
        assert_eq!(
            prefs
                .recent_colors
                .iter()
                .filter(|c| **c == [0.5, 0.0, 0.0])
                .count(),
            1
        );
    }

    #[test]
    fn history_overrides_defaults() {
        let mut prefs = OverlayPrefs {
            last_renderer: Some("lines".into()),
            ..OverlayPrefs::default()
        };
        prefs.remember_color([0.0, 1.0, 0.0]);
        let cfg = prefs.effective_config();
        assert_eq!(cfg.default_renderer, "lines");
        assert_eq!(cfg.default_color, [0.0, 1.0, 0.0]);
        assert_eq!(cfg.depth_half_range, prefs.overlay.depth_half_range);
    }

    #[test]
    fn old_files_without_history_still_load() {
        let prefs: OverlayPrefs =
            serde_json::from_str(r#"{"overlay":{"highlight_slice":false}}"#).unwrap();
        assert!(!prefs.overlay.highlight_slice);
        assert!(prefs.recent_colors.is_empty());
        assert_eq!(prefs.last_renderer, None);
    }
}
