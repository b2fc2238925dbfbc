//! Level data
//!
//! Levels are authored as JSON and loaded before the match starts. Once
//! loaded a level never changes; enemies are copied out of it into the
//! match state.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_KILL_PLANE_Y;
use crate::error::LevelError;
use crate::sim::{Aabb, EnemyKind};

/// A solid ground segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Sprite drawn for this segment
    #[serde(default)]
    pub sprite: Option<String>,
}

impl Ground {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

/// A static, collidable prop standing on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Bottom-centre position
    pub x: f32,
    pub y: f32,
    /// Sprite footprint
    pub width: f32,
    pub height: f32,
    pub sprite: String,
}

impl Obstacle {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_feet(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }
}

/// Where an enemy starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    #[serde(default)]
    pub kind: EnemyKind,
    /// Bottom-centre position
    pub pos: Vec2,
}

/// Level file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub background: String,
    pub length: f32,
    pub base_score: u64,
    pub spawn: Vec2,
    #[serde(default = "default_kill_plane")]
    pub kill_plane_y: f32,
    pub grounds: Vec<Ground>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
}

fn default_kill_plane() -> f32 {
    DEFAULT_KILL_PLANE_Y
}

/// A validated, immutable level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    pub background: String,
    pub length: f32,
    pub base_score: u64,
    pub spawn: Vec2,
    pub kill_plane_y: f32,
    pub grounds: Vec<Ground>,
    pub obstacles: Vec<Obstacle>,
    pub enemy_spawns: Vec<EnemySpawn>,
    /// Grounds then obstacles, as hitboxes
    geometry: Vec<Aabb>,
}

impl Level {
    /// Everything actors collide with
    #[inline]
    pub fn geometry(&self) -> &[Aabb] {
        &self.geometry
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let data: LevelData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level '{}' ({} grounds, {} obstacles, {} enemies)",
            level.name,
            level.grounds.len(),
            level.obstacles.len(),
            level.enemy_spawns.len()
        );
        Ok(level)
    }

    /// Built-in level: three islands, two pits, a few crates and knights
    pub fn demo() -> Self {
        let ground = |x: f32, width: f32| Ground {
            x,
            y: 800.0,
            width,
            height: 400.0,
            sprite: Some("images/ground/grass.png".to_string()),
        };
        let crate_at = |x: f32| Obstacle {
            x,
            y: 800.0,
            width: 80.0,
            height: 80.0,
            sprite: "images/obstacles/crate.png".to_string(),
        };
        let knight = |x: f32| EnemySpawn {
            kind: EnemyKind::Knight,
            pos: Vec2::new(x, 800.0),
        };
        let data = LevelData {
            name: "Castle Approach".to_string(),
            background: "images/backgrounds/castle.png".to_string(),
            length: 7000.0,
            base_score: 1000,
            spawn: Vec2::new(640.0, 800.0),
            kill_plane_y: DEFAULT_KILL_PLANE_Y,
            grounds: vec![ground(0.0, 2400.0), ground(2600.0, 2000.0), ground(4750.0, 2250.0)],
            obstacles: vec![crate_at(1600.0), crate_at(3400.0), crate_at(5600.0)],
            enemies: vec![knight(2100.0), knight(4000.0), knight(6000.0)],
        };
        // The demo data is static and always valid
        Self::from_data_unchecked(data)
    }

    fn from_data_unchecked(data: LevelData) -> Self {
        let geometry = data
            .grounds
            .iter()
            .map(Ground::hitbox)
            .chain(data.obstacles.iter().map(Obstacle::hitbox))
            .collect();
        Self {
            name: data.name,
            background: data.background,
            length: data.length,
            base_score: data.base_score,
            spawn: data.spawn,
            kill_plane_y: data.kill_plane_y,
            grounds: data.grounds,
            obstacles: data.obstacles,
            enemy_spawns: data.enemies,
            geometry,
        }
    }

    /// Back to the file representation
    pub fn to_data(&self) -> LevelData {
        LevelData {
            name: self.name.clone(),
            background: self.background.clone(),
            length: self.length,
            base_score: self.base_score,
            spawn: self.spawn,
            kill_plane_y: self.kill_plane_y,
            grounds: self.grounds.clone(),
            obstacles: self.obstacles.clone(),
            enemies: self.enemy_spawns.clone(),
        }
    }
}

impl TryFrom<LevelData> for Level {
    type Error = LevelError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        if !(data.length.is_finite() && data.length > 0.0) {
            return Err(LevelError::Invalid(format!(
                "length must be positive, got {}",
                data.length
            )));
        }
        if data.grounds.is_empty() {
            return Err(LevelError::Invalid("level has no ground".to_string()));
        }
        for (i, g) in data.grounds.iter().enumerate() {
            if !(g.width > 0.0 && g.height > 0.0) {
                return Err(LevelError::Invalid(format!("ground {i} has an empty footprint")));
            }
        }
        for (i, o) in data.obstacles.iter().enumerate() {
            if !(o.width > 0.0 && o.height > 0.0) {
                return Err(LevelError::Invalid(format!("obstacle {i} has an empty footprint")));
            }
        }
        if data.spawn.x < 0.0 || data.spawn.x > data.length {
            return Err(LevelError::Invalid(format!("spawn x {} outside level", data.spawn.x)));
        }
        if data.spawn.y >= data.kill_plane_y {
            return Err(LevelError::Invalid("spawn is below the kill plane".to_string()));
        }
        Ok(Self::from_data_unchecked(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "name": "Test Field",
        "background": "bg.png",
        "length": 3000,
        "base_score": 500,
        "spawn": [640, 800],
        "grounds": [
            { "x": 0, "y": 800, "width": 3000, "height": 200 }
        ],
        "obstacles": [
            { "x": 1000, "y": 800, "width": 80, "height": 80, "sprite": "crate.png" }
        ],
        "enemies": [
            { "kind": "knight", "pos": [2000, 800] }
        ]
    }"#;

    #[test]
    fn test_parse_level() {
        let level = Level::from_json(LEVEL_JSON).unwrap();
        assert_eq!(level.name, "Test Field");
        assert_eq!(level.base_score, 500);
        assert_eq!(level.kill_plane_y, DEFAULT_KILL_PLANE_Y);
        assert_eq!(level.enemy_spawns.len(), 1);
        assert_eq!(level.enemy_spawns[0].kind, EnemyKind::Knight);

        let geometry = level.geometry();
        assert_eq!(geometry.len(), 2);
        assert_eq!(geometry[1], Aabb::new(960.0, 720.0, 80.0, 80.0));
    }

    #[test]
    fn test_rejects_invalid_level() {
        let no_ground = LEVEL_JSON.replace(
            r#"{ "x": 0, "y": 800, "width": 3000, "height": 200 }"#,
            "",
        );
        assert!(matches!(Level::from_json(&no_ground), Err(LevelError::Invalid(_))));

        let bad_length = LEVEL_JSON.replace("\"length\": 3000", "\"length\": -1");
        assert!(matches!(Level::from_json(&bad_length), Err(LevelError::Invalid(_))));

        assert!(matches!(Level::from_json("{"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_demo_level_is_valid() {
        let demo = Level::demo();
        let reparsed = Level::try_from(demo.to_data()).unwrap();
        assert_eq!(reparsed, demo);
        assert_eq!(demo.geometry().len(), demo.grounds.len() + demo.obstacles.len());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Level::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }
}
