//! Tile/object map data.
//!
//! The session only reads a map through [`MapSource`]: iterate the tiles of a
//! named tile layer, and iterate the objects of a named object layer. The JSON
//! [`MapFile`] is the on-disk implementation; [`MapFile::fallback_arena`]
//! stands in when the real map cannot be loaded.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::assets::ImageId;

pub const LAYER_GROUND: &str = "Ground";
pub const LAYER_OBJECTS: &str = "Objects";
pub const LAYER_COLLISIONS: &str = "Collisions";
pub const LAYER_ENTITIES: &str = "Entities";
pub const PLAYER_SPAWN: &str = "Player";

/// One ground tile, in grid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRef {
    pub x: i32,
    pub y: i32,
    pub image: ImageId,
}

/// One placed object, in world pixels (top-left anchored).
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub image: Option<ImageId>,
    pub name: String,
}

pub trait MapSource {
    fn tile_size(&self) -> u32;
    fn tiles(&self, layer: &str) -> Vec<TileRef>;
    fn objects(&self, layer: &str) -> Vec<MapObject>;
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapFile {
    pub version: String,
    pub map_id: String,
    pub tile_size: u32,
    #[serde(default)]
    pub tile_layers: Vec<TileLayer>,
    #[serde(default)]
    pub object_layers: Vec<ObjectLayer>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileLayer {
    pub name: String,
    pub tiles: Vec<TileJson>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileJson {
    pub x: i32,
    pub y: i32,
    pub image: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectLayer {
    pub name: String,
    pub objects: Vec<ObjectJson>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectJson {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl MapSource for MapFile {
    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn tiles(&self, layer: &str) -> Vec<TileRef> {
        self.tile_layers
            .iter()
            .filter(|l| l.name == layer)
            .flat_map(|l| &l.tiles)
            .map(|t| TileRef {
                x: t.x,
                y: t.y,
                image: ImageId::new(&t.image),
            })
            .collect()
    }

    fn objects(&self, layer: &str) -> Vec<MapObject> {
        self.object_layers
            .iter()
            .filter(|l| l.name == layer)
            .flat_map(|l| &l.objects)
            .map(|o| MapObject {
                x: o.x,
                y: o.y,
                width: o.width,
                height: o.height,
                image: o.image.as_deref().map(ImageId::new),
                name: o.name.clone(),
            })
            .collect()
    }
}

impl MapFile {
    /// Walled square arena: ground everywhere, a one-tile wall ring, the
    /// player in the middle and a spawn point near each corner.
    pub fn fallback_arena(tile_size: u32, tiles_across: i32) -> Self {
        let n = tiles_across.max(5);
        let ts = tile_size as f32;
        let extent = n as f32 * ts;

        let tiles = (0..n)
            .flat_map(|y| (0..n).map(move |x| (x, y)))
            .map(|(x, y)| TileJson {
                x,
                y,
                image: "tiles/ground".to_string(),
            })
            .collect();

        let wall = |x: f32, y: f32, width: f32, height: f32| ObjectJson {
            x,
            y,
            width,
            height,
            image: None,
            name: String::new(),
        };
        let walls = vec![
            wall(0.0, 0.0, extent, ts),
            wall(0.0, extent - ts, extent, ts),
            wall(0.0, ts, ts, extent - 2.0 * ts),
            wall(extent - ts, ts, ts, extent - 2.0 * ts),
        ];

        let point = |x: f32, y: f32, name: &str| ObjectJson {
            x,
            y,
            width: 0.0,
            height: 0.0,
            image: None,
            name: name.to_string(),
        };
        let near = 2.0 * ts;
        let far = extent - 2.0 * ts;
        let entities = vec![
            point(extent / 2.0, extent / 2.0, PLAYER_SPAWN),
            point(near, near, "Enemy"),
            point(far, near, "Enemy"),
            point(near, far, "Enemy"),
            point(far, far, "Enemy"),
        ];

        Self {
            version: "0.1".to_string(),
            map_id: "fallback_arena".to_string(),
            tile_size,
            tile_layers: vec![TileLayer {
                name: LAYER_GROUND.to_string(),
                tiles,
            }],
            object_layers: vec![
                ObjectLayer {
                    name: LAYER_COLLISIONS.to_string(),
                    objects: walls,
                },
                ObjectLayer {
                    name: LAYER_ENTITIES.to_string(),
                    objects: entities,
                },
            ],
        }
    }
}

pub fn load_map_from_path(path: &Path) -> Result<MapFile, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let map: MapFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse map JSON {}: {e}", path.display()))?;
    validate_map(&map)?;
    Ok(map)
}

fn validate_map(map: &MapFile) -> Result<(), String> {
    if map.version != "0.1" {
        return Err(format!(
            "Map validation failed: unsupported version '{}'",
            map.version
        ));
    }
    if map.tile_size == 0 {
        return Err("Map validation failed: tile_size must be > 0".to_string());
    }

    let mut names = HashSet::new();
    let layer_names = map
        .tile_layers
        .iter()
        .map(|l| &l.name)
        .chain(map.object_layers.iter().map(|l| &l.name));
    for name in layer_names {
        if !names.insert(name.as_str()) {
            return Err(format!(
                "Map validation failed: duplicate layer name '{}'",
                name
            ));
        }
    }

    for layer in &map.object_layers {
        for object in &layer.objects {
            if object.width < 0.0 || object.height < 0.0 {
                return Err(format!(
                    "Map validation failed: object '{}' in layer '{}' has negative size",
                    object.name, layer.name
                ));
            }
        }
    }

    let player_spawns = map
        .objects(LAYER_ENTITIES)
        .iter()
        .filter(|o| o.name == PLAYER_SPAWN)
        .count();
    if player_spawns != 1 {
        return Err(format!(
            "Map validation failed: expected exactly one '{}' entity, found {}",
            PLAYER_SPAWN, player_spawns
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "survivor_map_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn load_map_parses_layers() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "map_id": "world",
              "tile_size": 64,
              "tile_layers": [
                { "name": "Ground", "tiles": [ { "x": 0, "y": 0, "image": "tiles/grass" },
                                               { "x": 1, "y": 0, "image": "tiles/grass" } ] }
              ],
              "object_layers": [
                { "name": "Objects", "objects": [
                    { "x": 128, "y": 64, "width": 64, "height": 96, "image": "objects/tree" } ] },
                { "name": "Entities", "objects": [
                    { "x": 300, "y": 300, "name": "Player" },
                    { "x": 10, "y": 20, "name": "Enemy" } ] }
              ]
            }"#,
        )
        .expect("write temp file");

        let map = load_map_from_path(&path).expect("valid map should load");
        let ground = map.tiles(LAYER_GROUND);
        assert_eq!(ground.len(), 2);
        assert_eq!(ground[1].x, 1);
        assert_eq!(ground[0].image.as_str(), "tiles/grass");

        let objects = map.objects(LAYER_OBJECTS);
        assert_eq!(objects[0].image.as_ref().map(|i| i.as_str()), Some("objects/tree"));
        assert!(map.objects(LAYER_COLLISIONS).is_empty());
        assert_eq!(map.objects(LAYER_ENTITIES).len(), 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_map_rejects_missing_player() {
        let path = temp_file_path("no_player");
        fs::write(
            &path,
            r#"{ "version": "0.1", "map_id": "w", "tile_size": 64,
                 "object_layers": [ { "name": "Entities", "objects": [ { "x": 1, "y": 1, "name": "Enemy" } ] } ] }"#,
        )
        .expect("write temp file");
        let err = load_map_from_path(&path).expect_err("missing player should fail");
        assert!(err.contains("exactly one 'Player'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_map_rejects_duplicate_layer_names() {
        let path = temp_file_path("dup");
        fs::write(
            &path,
            r#"{ "version": "0.1", "map_id": "w", "tile_size": 64,
                 "tile_layers": [ { "name": "Ground", "tiles": [] } ],
                 "object_layers": [ { "name": "Ground", "objects": [] } ] }"#,
        )
        .expect("write temp file");
        let err = load_map_from_path(&path).expect_err("duplicate layers should fail");
        assert!(err.contains("duplicate layer name"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn fallback_arena_is_valid() {
        let arena = MapFile::fallback_arena(64, 20);
        validate_map(&arena).expect("fallback arena must validate");
        assert_eq!(arena.tiles(LAYER_GROUND).len(), 400);
        assert_eq!(arena.objects(LAYER_COLLISIONS).len(), 4);
        let spawns = arena
            .objects(LAYER_ENTITIES)
            .into_iter()
            .filter(|o| o.name != PLAYER_SPAWN)
            .count();
        assert_eq!(spawns, 4);
    }

    #[test]
    fn shipped_world_map_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/maps/world.json");
        let map = load_map_from_path(&path).expect("shipped map should load");
        assert_eq!(map.map_id, "world");
        assert!(!map.tiles(LAYER_GROUND).is_empty());
        assert_eq!(map.objects(LAYER_COLLISIONS).len(), 4);
    }
}
