//! Image handles and the metadata the simulation needs from them.
//!
//! Decoding and drawing images belongs to the platform. The simulation only
//! needs each image's size (to build rects) and its collision mask. The
//! catalog starts from nominal placeholder sizes with full-rectangle masks and
//! can refine masks from PNG alpha on disk; every missing file degrades to the
//! placeholder and is logged, never fatal.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;

use crate::mask::{load_mask_from_path, CollisionMask};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(Arc<str>);

impl ImageId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub size: Vec2,
    pub mask: Arc<CollisionMask>,
}

impl ImageInfo {
    fn placeholder(size: Vec2) -> Self {
        Self {
            size,
            mask: Arc::new(CollisionMask::full(size.x as u32, size.y as u32)),
        }
    }
}

/// Walk-cycle frames for each facing.
#[derive(Debug, Clone, Default)]
pub struct DirectionalFrames {
    pub right: Vec<ImageId>,
    pub left: Vec<ImageId>,
    pub up: Vec<ImageId>,
    pub down: Vec<ImageId>,
}

#[derive(Debug, Clone)]
pub struct EnemyVariant {
    pub name: String,
    pub frames: Vec<ImageId>,
}

#[derive(Debug, Clone)]
pub struct AssetCatalog {
    images: HashMap<ImageId, ImageInfo>,
    pub player: DirectionalFrames,
    pub gun: ImageId,
    pub bullet: ImageId,
    pub enemy_variants: Vec<EnemyVariant>,
    pub death_effect_frames: Vec<ImageId>,
    pub loading_frames: Vec<ImageId>,
    pub heart_full: ImageId,
    pub heart_empty: ImageId,
    pub menu_background: ImageId,
}

pub const PLAYER_FRAME_SIZE: Vec2 = Vec2::new(96.0, 128.0);
pub const ENEMY_FRAME_SIZE: Vec2 = Vec2::new(96.0, 96.0);
pub const GUN_SIZE: Vec2 = Vec2::new(64.0, 32.0);
pub const BULLET_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub const EFFECT_FRAME_SIZE: Vec2 = Vec2::new(128.0, 128.0);
pub const HEART_SIZE: Vec2 = Vec2::new(40.0, 40.0);

impl AssetCatalog {
    pub fn empty() -> Self {
        Self {
            images: HashMap::new(),
            player: DirectionalFrames::default(),
            gun: ImageId::new("gun/gun"),
            bullet: ImageId::new("gun/bullet"),
            enemy_variants: Vec::new(),
            death_effect_frames: Vec::new(),
            loading_frames: Vec::new(),
            heart_full: ImageId::new("ui/heart/full"),
            heart_empty: ImageId::new("ui/heart/empty"),
            menu_background: ImageId::new("ui/menu_background"),
        }
    }

    /// The stock sprite set with nominal sizes and rectangular masks.
    pub fn placeholder(viewport: Vec2) -> Self {
        let mut catalog = Self::empty();

        let walk = |catalog: &mut Self, facing: &str| -> Vec<ImageId> {
            (0..4)
                .map(|i| catalog.register(&format!("player/{facing}/{i}"), PLAYER_FRAME_SIZE))
                .collect()
        };
        let player = DirectionalFrames {
            right: walk(&mut catalog, "right"),
            left: walk(&mut catalog, "left"),
            up: walk(&mut catalog, "up"),
            down: walk(&mut catalog, "down"),
        };
        catalog.player = player;

        catalog.gun = catalog.register("gun/gun", GUN_SIZE);
        catalog.bullet = catalog.register("gun/bullet", BULLET_SIZE);

        for name in ["bat", "blob", "skeleton"] {
            let frames = (0..4)
                .map(|i| catalog.register(&format!("enemies/{name}/{i}"), ENEMY_FRAME_SIZE))
                .collect();
            catalog.enemy_variants.push(EnemyVariant {
                name: name.to_string(),
                frames,
            });
        }

        catalog.death_effect_frames = (0..8)
            .map(|i| catalog.register(&format!("ui/death/{i}"), EFFECT_FRAME_SIZE))
            .collect();
        catalog.loading_frames = (0..8)
            .map(|i| catalog.register(&format!("ui/loading/{i}"), EFFECT_FRAME_SIZE))
            .collect();
        catalog.heart_full = catalog.register("ui/heart/full", HEART_SIZE);
        catalog.heart_empty = catalog.register("ui/heart/empty", HEART_SIZE);
        catalog.menu_background = catalog.register("ui/menu_background", viewport);
        catalog
    }

    /// Register (or replace) an image with a rectangular mask.
    pub fn register(&mut self, name: &str, size: Vec2) -> ImageId {
        let id = ImageId::new(name);
        self.images.insert(id.clone(), ImageInfo::placeholder(size));
        id
    }

    pub fn register_with_mask(&mut self, name: &str, mask: CollisionMask) -> ImageId {
        let id = ImageId::new(name);
        let size = Vec2::new(mask.width() as f32, mask.height() as f32);
        self.images.insert(
            id.clone(),
            ImageInfo {
                size,
                mask: Arc::new(mask),
            },
        );
        id
    }

    pub fn info(&self, id: &ImageId) -> Option<&ImageInfo> {
        self.images.get(id)
    }

    pub fn size_of(&self, id: &ImageId, fallback: Vec2) -> Vec2 {
        self.images.get(id).map(|i| i.size).unwrap_or(fallback)
    }

    /// Mask for `id`, or a full rectangle of `fallback` size for unknown images.
    pub fn mask_of(&self, id: &ImageId, fallback: Vec2) -> Arc<CollisionMask> {
        match self.images.get(id) {
            Some(info) => Arc::clone(&info.mask),
            None => Arc::new(CollisionMask::full(fallback.x as u32, fallback.y as u32)),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Replace placeholder masks with alpha masks read from `root/<id>.png`.
    /// Returns how many masks were loaded.
    pub fn load_masks_from_dir(&mut self, root: &Path) -> usize {
        let mut loaded = 0;
        let mut missing = Vec::new();

        for (id, info) in self.images.iter_mut() {
            let path = root.join(format!("{}.png", id.as_str()));
            match load_mask_from_path(&path) {
                Ok(mask) => {
                    info.size = Vec2::new(mask.width() as f32, mask.height() as f32);
                    info.mask = Arc::new(mask);
                    loaded += 1;
                }
                Err(err) => {
                    log::debug!("{err}");
                    missing.push(id.as_str().to_string());
                }
            }
        }

        if !missing.is_empty() {
            missing.sort();
            log::warn!(
                "{} of {} images not found under '{}'; using rectangle masks (first: {})",
                missing.len(),
                self.images.len(),
                root.display(),
                missing[0]
            );
        }
        log::info!("Loaded {loaded} collision masks from '{}'", root.display());
        loaded
    }
}
