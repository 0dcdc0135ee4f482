//! System metrics consulted by sizing, icon placement and frame math.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Screen and decoration sizes used by the placement engine.
///
/// Loaded from the `[metrics]` table of the configuration file; every
/// field falls back to the values of a 1024x768 desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemMetrics {
    /// Desktop size.
    #[serde(default = "default_screen")]
    pub screen: Size,
    /// Size of a minimized window.
    #[serde(default = "default_icon")]
    pub icon: Size,
    /// Grid cell used when laying out minimized windows.
    #[serde(default = "default_icon_spacing")]
    pub icon_spacing: Size,
    /// Smallest tracking size a framed window may be resized to.
    #[serde(default = "default_min_track")]
    pub min_track: Size,
    /// Thin border thickness.
    pub border: Size,
    /// Sizing frame thickness.
    pub frame: Size,
    /// Dialog frame thickness.
    pub dlg_frame: Size,
    /// Caption bar height.
    pub caption_height: i32,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self {
            screen: default_screen(),
            icon: default_icon(),
            icon_spacing: default_icon_spacing(),
            min_track: default_min_track(),
            border: Size::new(1, 1),
            frame: Size::new(4, 4),
            dlg_frame: Size::new(3, 3),
            caption_height: 18,
        }
    }
}

// Default value functions for serde
fn default_screen() -> Size {
    Size::new(1024, 768)
}

fn default_icon() -> Size {
    Size::new(32, 32)
}

fn default_icon_spacing() -> Size {
    Size::new(75, 75)
}

fn default_min_track() -> Size {
    Size::new(112, 27)
}
