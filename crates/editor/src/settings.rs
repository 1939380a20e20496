use std::fs;
use std::path::Path;

use foundation::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::canvas::{MapView, TileSource};
use crate::error::SettingsError;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Highest zoom level offered by the tile proxy.
pub const MAX_TILE_ZOOM: u8 = 19;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    /// Upstream tile URL template (`{z}/{x}/{y}`), fetched through the local proxy.
    pub tile_server: String,
    pub attribution: String,
    pub cache_tiles: bool,
    pub zoom_level: u8,
    /// `[latitude, longitude]` of the initial view.
    pub center: [f64; 2],
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_server: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                    .to_string(),
            cache_tiles: false,
            zoom_level: 6,
            center: [51.330, 10.453],
        }
    }
}

impl MapSettings {
    pub fn initial_view(&self) -> MapView {
        MapView {
            center: Coordinate::new(self.center[0], self.center[1]),
            zoom: self.zoom_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub map_settings: MapSettings,
    pub http_port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            map_settings: MapSettings::default(),
            http_port: 47836,
        }
    }
}

impl AppSettings {
    /// Reads `settings.json` from `dir`, or writes the defaults there if it does not exist.
    pub fn load_or_init(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&content)?);
        }

        let settings = Self::default();
        settings.save(dir)?;
        info!("wrote default settings to {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, dir: &Path) -> Result<(), SettingsError> {
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SETTINGS_FILE_NAME), payload)?;
        Ok(())
    }

    /// Tiles are always served through the local proxy, which forwards to `tile_server`.
    pub fn tile_source(&self) -> TileSource {
        TileSource {
            url_template: format!("http://127.0.0.1:{}/tiles/{{z}}/{{x}}/{{y}}", self.http_port),
            attribution: self.map_settings.attribution.clone(),
            max_zoom: MAX_TILE_ZOOM,
        }
    }
}
