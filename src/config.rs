use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "beatlayout.ini";

/// `[Section]` / `Key=Value` pairs. Lines starting with `;` or `#` are comments;
/// keys before the first section header land in the "" section.
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        std::fs::read_to_string(path).map(|text| Self::parse(&text))
    }

    pub fn parse(content: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut section = String::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with([';', '#']) {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                sections.entry(section.clone()).or_default();
            } else if let Some((key, value)) = line.split_once('=')
                && !key.trim().is_empty()
            {
                sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { sections }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section)?.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

/// Tunables for spawn windows and jump-in poses. Distances are in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Seconds before reaching the player that an object becomes active.
    pub reaction_time_seconds: f32,
    /// Beats past the player a note stays active.
    pub despawn_beat_margin: f32,
    /// Beats past the player a bomb stays active; bombs can be walked through.
    pub bomb_despawn_beat_margin: f32,
    /// Depth at which an object enters the reaction window.
    pub jump_half_distance: f32,
    pub lane_width: f32,
    pub row_height: f32,
    pub grid_origin_x: f32,
    pub grid_origin_y: f32,
    /// Height added to the stacked start position.
    pub floor_offset: f32,
    /// Share of the reaction time spent rotating into the final facing.
    pub rotation_animation_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            reaction_time_seconds: 1.0,
            despawn_beat_margin: 0.5,
            bomb_despawn_beat_margin: 1.0,
            jump_half_distance: 9.0,
            lane_width: 0.6,
            row_height: 0.55,
            grid_origin_x: -0.9,
            grid_origin_y: 0.0,
            floor_offset: 0.0,
            rotation_animation_fraction: 0.2,
        }
    }
}

impl LayoutConfig {
    /// Reads `[Layout]`, falling back to defaults for missing or unusable keys.
    pub fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        let get = |key: &str, fallback: f32| -> f32 {
            let Some(raw) = conf.get("Layout", key) else {
                return fallback;
            };
            match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!("Ignoring invalid value '{raw}' for Layout.{key}.");
                    fallback
                }
            }
        };

        Self {
            reaction_time_seconds: get("ReactionTimeSeconds", default.reaction_time_seconds),
            despawn_beat_margin: get("DespawnBeatMargin", default.despawn_beat_margin),
            bomb_despawn_beat_margin: get("BombDespawnBeatMargin", default.bomb_despawn_beat_margin),
            jump_half_distance: get("JumpHalfDistance", default.jump_half_distance),
            lane_width: get("LaneWidth", default.lane_width),
            row_height: get("RowHeight", default.row_height),
            grid_origin_x: get("GridOriginX", default.grid_origin_x),
            grid_origin_y: get("GridOriginY", default.grid_origin_y),
            floor_offset: get("FloorOffset", default.floor_offset),
            rotation_animation_fraction: get(
                "RotationAnimationFraction",
                default.rotation_animation_fraction,
            ),
        }
        .sanitized()
    }

    /// Replaces values the pose and spawn math cannot use with their defaults.
    ///
    /// Times and distances that are divided by must be positive, despawn
    /// margins must not be negative, and the rotation fraction is clamped to
    /// `0..=1`. Every field must be finite.
    pub fn sanitized(self) -> Self {
        let default = Self::default();
        let positive = |name: &str, v: f32, fallback: f32| -> f32 {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                warn!("Layout.{name} must be positive (got {v}); using {fallback}.");
                fallback
            }
        };
        let non_negative = |name: &str, v: f32, fallback: f32| -> f32 {
            if v.is_finite() && v >= 0.0 {
                v
            } else {
                warn!("Layout.{name} must not be negative (got {v}); using {fallback}.");
                fallback
            }
        };
        let finite = |name: &str, v: f32, fallback: f32| -> f32 {
            if v.is_finite() {
                v
            } else {
                warn!("Layout.{name} must be finite (got {v}); using {fallback}.");
                fallback
            }
        };

        Self {
            reaction_time_seconds: positive(
                "ReactionTimeSeconds",
                self.reaction_time_seconds,
                default.reaction_time_seconds,
            ),
            despawn_beat_margin: non_negative(
                "DespawnBeatMargin",
                self.despawn_beat_margin,
                default.despawn_beat_margin,
            ),
            bomb_despawn_beat_margin: non_negative(
                "BombDespawnBeatMargin",
                self.bomb_despawn_beat_margin,
                default.bomb_despawn_beat_margin,
            ),
            jump_half_distance: positive(
                "JumpHalfDistance",
                self.jump_half_distance,
                default.jump_half_distance,
            ),
            lane_width: positive("LaneWidth", self.lane_width, default.lane_width),
            row_height: positive("RowHeight", self.row_height, default.row_height),
            grid_origin_x: finite("GridOriginX", self.grid_origin_x, default.grid_origin_x),
            grid_origin_y: finite("GridOriginY", self.grid_origin_y, default.grid_origin_y),
            floor_offset: finite("FloorOffset", self.floor_offset, default.floor_offset),
            rotation_animation_fraction: finite(
                "RotationAnimationFraction",
                self.rotation_animation_fraction,
                default.rotation_animation_fraction,
            )
            .clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub log_level: LogLevel,
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    pub fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        Self {
            log_level: conf
                .get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level),
            layout: LayoutConfig::from_ini(conf),
        }
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

fn default_config_contents() -> String {
    let default = Config::default();
    let l = default.layout;

    let mut content = String::new();
    content.push_str("[Options]\n");
    content.push_str(&format!("LogLevel={}\n", default.log_level.as_str()));
    content.push('\n');

    // [Layout] section - keys in alphabetical order
    content.push_str("[Layout]\n");
    content.push_str(&format!("BombDespawnBeatMargin={}\n", l.bomb_despawn_beat_margin));
    content.push_str(&format!("DespawnBeatMargin={}\n", l.despawn_beat_margin));
    content.push_str(&format!("FloorOffset={}\n", l.floor_offset));
    content.push_str(&format!("GridOriginX={}\n", l.grid_origin_x));
    content.push_str(&format!("GridOriginY={}\n", l.grid_origin_y));
    content.push_str(&format!("JumpHalfDistance={}\n", l.jump_half_distance));
    content.push_str(&format!("LaneWidth={}\n", l.lane_width));
    content.push_str(&format!("ReactionTimeSeconds={}\n", l.reaction_time_seconds));
    content.push_str(&format!(
        "RotationAnimationFraction={}\n",
        l.rotation_animation_fraction
    ));
    content.push_str(&format!("RowHeight={}\n", l.row_height));
    content.push('\n');
    content
}

fn create_default_config_file() -> Result<(), std::io::Error> {
    info!("'{CONFIG_PATH}' not found, creating with default values.");
    std::fs::write(CONFIG_PATH, default_config_contents())
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    match SimpleIni::read(CONFIG_PATH) {
        Ok(conf) => {
            let loaded = Config::from_ini(&conf);
            *CONFIG.lock().unwrap_or_else(|e| e.into_inner()) = loaded;
            info!("Configuration loaded from '{CONFIG_PATH}'.");
        }
        Err(e) => {
            warn!("Failed to load '{CONFIG_PATH}': {e}. Using default values.");
        }
    }
}

pub fn get() -> Config {
    *CONFIG.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini(text: &str) -> SimpleIni {
        SimpleIni::parse(text)
    }

    #[test]
    fn reads_layout_keys() {
        let conf = ini(
            "; comment\n[Layout]\nReactionTimeSeconds = 1.5\nLaneWidth=0.5\n\n[Options]\nLogLevel=debug\n",
        );
        let cfg = Config::from_ini(&conf);
        assert_eq!(cfg.layout.reaction_time_seconds, 1.5);
        assert_eq!(cfg.layout.lane_width, 0.5);
        assert_eq!(cfg.layout.row_height, LayoutConfig::default().row_height);
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn rejects_unusable_values() {
        let conf = ini(
            "[Layout]\nReactionTimeSeconds=-2\nJumpHalfDistance=abc\nDespawnBeatMargin=inf\nRotationAnimationFraction=3\n",
        );
        let cfg = LayoutConfig::from_ini(&conf);
        let default = LayoutConfig::default();
        assert_eq!(cfg.reaction_time_seconds, default.reaction_time_seconds);
        assert_eq!(cfg.jump_half_distance, default.jump_half_distance);
        assert_eq!(cfg.despawn_beat_margin, default.despawn_beat_margin);
        assert_eq!(cfg.rotation_animation_fraction, 1.0);
    }

    #[test]
    fn sanitizing_replaces_values_that_break_pose_math() {
        let default = LayoutConfig::default();
        let cfg = LayoutConfig {
            reaction_time_seconds: 0.0,
            jump_half_distance: f32::NAN,
            despawn_beat_margin: -1.0,
            grid_origin_x: f32::INFINITY,
            rotation_animation_fraction: -0.5,
            lane_width: 0.75,
            ..default
        }
        .sanitized();
        assert_eq!(cfg.reaction_time_seconds, default.reaction_time_seconds);
        assert_eq!(cfg.jump_half_distance, default.jump_half_distance);
        assert_eq!(cfg.despawn_beat_margin, default.despawn_beat_margin);
        assert_eq!(cfg.grid_origin_x, default.grid_origin_x);
        assert_eq!(cfg.rotation_animation_fraction, 0.0);
        assert_eq!(cfg.lane_width, 0.75, "usable values pass through");
        assert_eq!(default.sanitized(), default);
    }

    #[test]
    fn default_file_round_trips_to_defaults() {
        let conf = ini(&default_config_contents());
        let cfg = Config::from_ini(&conf);
        assert_eq!(cfg.layout, LayoutConfig::default());
        assert_eq!(cfg.log_level, Config::default().log_level);
    }

    #[test]
    fn bombs_linger_longer_than_notes_by_default() {
        let d = LayoutConfig::default();
        assert!(d.bomb_despawn_beat_margin > d.despawn_beat_margin);
    }
}
