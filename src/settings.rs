//! Settings with persistence
//!
//! Settings are read from `~/.config/platformer/settings.toml`, or from a path
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use platformer_core::TimeConfig;
use platformer_game::MovementConfig;
use rapier3d::prelude::Group;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub movement: MovementConfig,
    pub physics: PhysicsSettings,
    pub time: TimeConfig,
    pub session: SessionSettings,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("platformer"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from a file, or return defaults if it is missing or broken
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        self.movement.validate()?;
        if !(self.time.fixed_timestep > 0.0) {
            anyhow::bail!("time.fixed_timestep must be positive");
        }
        if !(self.physics.ground_probe_radius > 0.0) {
            anyhow::bail!("physics.ground_probe_radius must be positive");
        }
        self.physics.ground_groups()?;
        if !(self.session.frame_rate > 0.0) {
            anyhow::bail!("session.frame_rate must be positive");
        }
        if !(0.0..1.0).contains(&self.session.frame_jitter) {
            anyhow::bail!("session.frame_jitter must be in [0, 1)");
        }
        Ok(())
    }
}

/// Physics world and character body settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity vector
    pub gravity: Vec3,
    /// Radius of the ground probe ball
    pub ground_probe_radius: f32,
    /// Collision group of walkable geometry, numbered 1 to 32
    pub ground_group: u8,
    /// Character capsule height
    pub character_height: f32,
    /// Character capsule radius
    pub character_radius: f32,
    /// Character mass
    pub character_mass: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground_probe_radius: 0.1,
            ground_group: 1,
            character_height: 1.0,
            character_radius: 0.3,
            character_mass: 1.0,
        }
    }
}

impl PhysicsSettings {
    /// The ground group as a collision group mask
    pub fn ground_groups(&self) -> anyhow::Result<Group> {
        match self.ground_group {
            n @ 1..=32 => Ok(Group::from_bits_truncate(1 << (n - 1))),
            n => anyhow::bail!("physics.ground_group must be in 1..=32, got {n}"),
        }
    }
}

/// Headless session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Simulated seconds
    pub duration: f32,
    /// Rendered frames per second (input rate)
    pub frame_rate: f32,
    /// Random frame time variation, as a fraction of the frame time
    pub frame_jitter: f32,
    /// Seed for the frame time variation
    pub seed: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration: 8.0,
            frame_rate: 60.0,
            frame_jitter: 0.2,
            seed: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: GameSettings = toml::from_str(
            r#"
            [movement]
            jump_force = 12.0
            max_jumps = 3

            [session]
            duration = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.movement.jump_force, 12.0);
        assert_eq!(settings.movement.max_jumps, 3);
        assert_eq!(settings.movement.coyote_time, 0.15);
        assert_eq!(settings.session.duration, 2.5);
        assert_eq!(settings.session.frame_rate, 60.0);
    }

    #[test]
    fn test_ground_group_from_toml() {
        let settings: GameSettings = toml::from_str(
            r#"
            [physics]
            ground_group = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.physics.ground_group, 3);
        assert_eq!(settings.physics.ground_groups().unwrap(), Group::GROUP_3);
        assert_eq!(settings.physics.ground_probe_radius, 0.1);
        assert_eq!(
            PhysicsSettings::default().ground_groups().unwrap(),
            platformer_physics::GROUND_GROUP
        );
    }

    #[test]
    fn test_ground_group_out_of_range_rejected() {
        for group in [0, 33] {
            let mut settings = GameSettings::default();
            settings.physics.ground_group = group;
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn test_invalid_movement_rejected() {
        let mut settings = GameSettings::default();
        settings.movement.jump_cut_multiplier = 2.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = GameSettings::load_from(Path::new("/nonexistent/platformer/settings.toml"));
        assert_eq!(settings.movement, MovementConfig::default());
    }
}
