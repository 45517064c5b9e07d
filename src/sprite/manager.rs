use crate::assets::AssetLoader;
use crate::error::GameResult;
use crate::math::Vec2;
use crate::pool::{ObjectPool, PoolError};
use crate::render::Renderer;
use crate::sprite::object::{SpriteKind, SpriteObject};
use log::{debug, error, warn};

pub const MAX_SPRITES: usize = 256;

/// Bounded pool of sprites, updated and drawn in insertion order
pub struct SpriteManager {
    sprites: ObjectPool<SpriteObject>,
    next_id: i32,
}

impl SpriteManager {
    pub fn new() -> Self {
        SpriteManager::with_capacity(MAX_SPRITES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SpriteManager {
            sprites: ObjectPool::with_capacity(capacity),
            next_id: 1,
        }
    }

    /// Id that has not been handed out by this manager yet
    pub fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, sprite: SpriteObject) -> Result<(), PoolError<SpriteObject>> {
        self.sprites.add(sprite).inspect_err(|e| {
            error!("Cannot add sprite: {}", e);
        })
    }

    /// Load a texture and add a sprite owning a reference to it; returns the
    /// new sprite's id
    ///
    /// On any failure nothing stays allocated: a texture reference taken
    /// for a sprite that did not fit in the pool is dropped again.
    pub fn load_sprite(
        &mut self,
        assets: &mut dyn AssetLoader,
        path: &str,
        name: &str,
        position: Vec2,
        kind: SpriteKind,
    ) -> Option<i32> {
        let id = self.next_id();
        let Some(sprite) = SpriteObject::load(id, name, path, assets, position, kind) else {
            error!("Failed to load sprite '{}' from {}", name, path);
            return None;
        };

        match self.add(sprite) {
            Ok(()) => {
                debug!("Loaded sprite '{}' (id {})", name, id);
                Some(id)
            }
            Err(rejected) => {
                rejected.into_item().release_texture(assets);
                None
            }
        }
    }

    /// Remove a sprite, unloading its texture if it owns one
    pub fn remove_by_id(&mut self, id: i32, assets: &mut dyn AssetLoader) -> Option<SpriteObject> {
        let Some(mut sprite) = self.sprites.remove_where(|s| s.id == id) else {
            warn!("Sprite with id {} not found", id);
            return None;
        };
        sprite.release_texture(assets);
        Some(sprite)
    }

    pub fn remove_by_name(&mut self, name: &str, assets: &mut dyn AssetLoader) -> Option<SpriteObject> {
        let Some(mut sprite) = self.sprites.remove_where(|s| s.name == name) else {
            warn!("Sprite '{}' not found", name);
            return None;
        };
        sprite.release_texture(assets);
        Some(sprite)
    }

    pub fn update(&mut self, dt: f32) {
        for sprite in self.sprites.iter_mut() {
            sprite.update(dt);
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        for sprite in self.sprites.iter().filter(|s| s.visible) {
            sprite.draw(renderer)?;
        }
        Ok(())
    }

    /// Remove every sprite (safe to call repeatedly)
    pub fn unload_all(&mut self, assets: &mut dyn AssetLoader) {
        let mut count = 0;
        for mut sprite in self.sprites.drain() {
            sprite.release_texture(assets);
            count += 1;
        }
        if count > 0 {
            debug!("Unloaded {} sprites", count);
        }
    }

    pub fn get_by_id(&self, id: i32) -> Option<&SpriteObject> {
        self.sprites.find(|s| s.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: i32) -> Option<&mut SpriteObject> {
        self.sprites.find_mut(|s| s.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SpriteObject> {
        self.sprites.find(|s| s.name == name)
    }

    pub fn get_by_kind(&self, kind: SpriteKind) -> Vec<&SpriteObject> {
        self.sprites.filter(|s| s.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpriteObject> {
        self.sprites.iter()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl Default for SpriteManager {
    fn default() -> Self {
        SpriteManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureHandle;
    use crate::testing::{MemoryAssets, RecordingRenderer};

    fn sprite(id: i32, name: &str, kind: SpriteKind) -> SpriteObject {
        SpriteObject::new(id, name, TextureHandle::INVALID, Vec2::ZERO, kind)
    }

    #[test]
    fn test_capacity() {
        let mut manager = SpriteManager::with_capacity(MAX_SPRITES);
        for i in 0..MAX_SPRITES as i32 {
            assert!(manager.add(sprite(i, "s", SpriteKind::Normal)).is_ok());
        }
        assert_eq!(manager.len(), MAX_SPRITES);
        assert!(manager.add(sprite(999, "extra", SpriteKind::Normal)).is_err());
        assert_eq!(manager.len(), MAX_SPRITES);
    }

    #[test]
    fn test_load_sprite_failure_allocates_nothing() {
        let mut assets = MemoryAssets::new();
        let mut manager = SpriteManager::new();

        let id = manager.load_sprite(&mut assets, "res/missing.png", "ghost", Vec2::ZERO, SpriteKind::Enemy);
        assert_eq!(id, None);
        assert!(manager.is_empty());
        assert_eq!(assets.loaded_count(), 0);
    }

    #[test]
    fn test_load_sprite_into_full_pool_releases_texture() {
        let mut assets = MemoryAssets::new().with_file("res/hero.png", 32, 32);
        let mut manager = SpriteManager::with_capacity(1);
        manager.add(sprite(50, "filler", SpriteKind::Decor)).unwrap();

        let id = manager.load_sprite(&mut assets, "res/hero.png", "hero", Vec2::ZERO, SpriteKind::Player);
        assert_eq!(id, None);
        assert_eq!(assets.loaded_count(), 0);
        assert_eq!(assets.unloaded.len(), 1);
    }

    #[test]
    fn test_remove_unloads_owned_texture_only() {
        let mut assets = MemoryAssets::new().with_file("res/hero.png", 32, 32);
        let mut manager = SpriteManager::new();

        let shared = assets.create_solid_texture("block", 8, 8, crate::render::palette::RED, None);
        manager
            .add(SpriteObject::new(100, "block", shared, Vec2::ZERO, SpriteKind::Decor))
            .unwrap();
        let hero = manager
            .load_sprite(&mut assets, "res/hero.png", "hero", Vec2::ZERO, SpriteKind::Player)
            .unwrap();

        manager.remove_by_id(100, &mut assets).unwrap();
        assert!(assets.unloaded.is_empty(), "borrowed texture stays loaded");

        manager.remove_by_id(hero, &mut assets).unwrap();
        assert_eq!(assets.unloaded.len(), 1);
        assert!(manager.remove_by_id(hero, &mut assets).is_none());
    }

    #[test]
    fn test_same_name_sprites_share_texture_until_last_removed() {
        let mut assets = MemoryAssets::new().with_file("res/coin.png", 16, 16);
        let mut manager = SpriteManager::new();
        let a = manager
            .load_sprite(&mut assets, "res/coin.png", "coin", Vec2::ZERO, SpriteKind::Item)
            .unwrap();
        let b = manager
            .load_sprite(&mut assets, "res/coin.png", "coin", Vec2::new(20.0, 0.0), SpriteKind::Item)
            .unwrap();
        let texture = manager.get_by_id(b).unwrap().texture;
        assert_eq!(manager.get_by_id(a).unwrap().texture, texture);
        assert_eq!(assets.ref_count(texture), 2);

        manager.remove_by_id(a, &mut assets).unwrap();
        assert!(manager.get_by_id(b).is_some());
        assert_eq!(assets.texture_size(texture), Some((16, 16)), "b still draws");
        assert!(assets.unloaded.is_empty());

        manager.remove_by_id(b, &mut assets).unwrap();
        assert_eq!(assets.texture_size(texture), None);
        assert_eq!(assets.unloaded, vec![texture]);
    }

    #[test]
    fn test_remove_by_name() {
        let mut assets = MemoryAssets::new().with_file("res/hero.png", 32, 32);
        let mut manager = SpriteManager::new();
        manager
            .load_sprite(&mut assets, "res/hero.png", "hero", Vec2::ZERO, SpriteKind::Player)
            .unwrap();

        assert!(manager.remove_by_name("hero", &mut assets).is_some());
        assert_eq!(assets.unloaded.len(), 1);
        assert!(manager.remove_by_name("hero", &mut assets).is_none());
    }

    #[test]
    fn test_lookups() {
        let mut manager = SpriteManager::new();
        manager.add(sprite(1, "tree", SpriteKind::Decor)).unwrap();
        manager.add(sprite(2, "rock", SpriteKind::Decor)).unwrap();
        manager.add(sprite(3, "hero", SpriteKind::Player)).unwrap();

        assert_eq!(manager.get_by_name("rock").map(|s| s.id), Some(2));
        assert_eq!(manager.get_by_kind(SpriteKind::Decor).len(), 2);
        assert!(manager.get_by_id(4).is_none());
    }

    #[test]
    fn test_draw_skips_invisible() {
        let mut assets = MemoryAssets::new();
        let texture = assets.create_solid_texture("dot", 4, 4, crate::render::palette::RED, None);
        let mut renderer = RecordingRenderer::new(100, 100);
        renderer.texture_sizes.insert(texture, (4, 4));

        let mut manager = SpriteManager::new();
        let mut hidden = SpriteObject::new(1, "hidden", texture, Vec2::ZERO, SpriteKind::Effect);
        hidden.visible = false;
        manager.add(hidden).unwrap();
        manager
            .add(SpriteObject::new(2, "shown", texture, Vec2::ZERO, SpriteKind::Effect))
            .unwrap();

        manager.draw(&mut renderer).unwrap();
        assert_eq!(renderer.texture_draws().len(), 1);
    }

    #[test]
    fn test_unload_all_twice() {
        let mut assets = MemoryAssets::new();
        let mut manager = SpriteManager::new();
        manager.add(sprite(1, "a", SpriteKind::Ui)).unwrap();
        manager.unload_all(&mut assets);
        assert_eq!(manager.len(), 0);
        manager.unload_all(&mut assets);
        assert_eq!(manager.len(), 0);
    }
}
