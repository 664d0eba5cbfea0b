use std::path::Path;

use anyhow::Context;
use echosweep_core::{BoardConfig, Position};
use serde::{Deserialize, Serialize};

/// Settings file layout:
///
/// ```toml
/// [board]
/// height = 16
/// width = 30
/// bombs = 99
/// seed = 42
///
/// [view]
/// cell_size = 24
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub board: BoardConfig,
    pub view: ViewSettings,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ViewSettings {
    /// Edge length of one cell in pixels, used to map pointer coordinates.
    pub cell_size: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { cell_size: 20 }
    }
}

impl ViewSettings {
    /// Maps a pixel coordinate to the cell under it.
    ///
    /// Coordinates past the grid stay out of range and are rejected by the board.
    pub(crate) fn cell_at_pixel(&self, x: u32, y: u32) -> Position {
        let cell = self.cell_size.max(1);
        let clamp = |value: u32| u16::try_from(value / cell).unwrap_or(u16::MAX);
        Position::new(clamp(y), clamp(x))
    }
}

impl Settings {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Self = toml::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::debug!("loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
