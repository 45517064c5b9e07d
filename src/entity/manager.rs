use crate::assets::AssetLoader;
use crate::entity::{Entity, EntityFrame, EntityKind};
use crate::error::GameResult;
use crate::pool::{ObjectPool, PoolError};
use crate::render::Renderer;
use log::{debug, error, warn};

pub const MAX_ENTITIES: usize = 255;

/// Owns every live entity, updates and draws them in insertion order
pub struct EntityManager {
    entities: ObjectPool<Entity>,
    next_id: i32,
}

impl EntityManager {
    pub fn new() -> Self {
        EntityManager::with_capacity(MAX_ENTITIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        EntityManager {
            entities: ObjectPool::with_capacity(capacity),
            next_id: 1,
        }
    }

    /// Fresh id for an entity about to be added
    pub fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, entity: Entity) -> Result<(), PoolError<Entity>> {
        self.entities.add(entity).inspect_err(|e| {
            error!("Cannot add entity: {}", e);
        })
    }

    /// Remove an entity, running its `destroy` and freeing a sprite texture it owns
    pub fn remove_by_id(&mut self, id: i32, assets: &mut dyn AssetLoader) -> Option<Entity> {
        let Some(mut entity) = self.entities.remove_where(|e| e.id == id) else {
            warn!("Entity with id {} not found", id);
            return None;
        };
        release(&mut entity, assets);
        Some(entity)
    }

    pub fn remove_by_name(&mut self, name: &str, assets: &mut dyn AssetLoader) -> Option<Entity> {
        let Some(mut entity) = self.entities.remove_where(|e| e.name == name) else {
            warn!("Entity '{}' not found", name);
            return None;
        };
        release(&mut entity, assets);
        Some(entity)
    }

    /// Ids of entities that are no longer active, in pool order
    pub fn inactive_ids(&self) -> Vec<i32> {
        self.entities
            .iter()
            .filter(|e| !e.is_active())
            .map(|e| e.id)
            .collect()
    }

    /// Remove every inactive entity; returns how many were removed
    pub fn remove_inactive(&mut self, assets: &mut dyn AssetLoader) -> usize {
        let ids = self.inactive_ids();
        for &id in &ids {
            self.remove_by_id(id, assets);
        }
        ids.len()
    }

    pub fn update(&mut self, frame: &EntityFrame) {
        for entity in self.entities.iter_mut() {
            if entity.is_active() {
                entity.run_update(frame);
            }
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        for entity in self.entities.iter().filter(|e| e.is_active()) {
            entity.run_draw(renderer)?;
        }
        Ok(())
    }

    /// Draw active entities one kind at a time, `layers[0]` at the back
    pub fn draw_layers(&self, renderer: &mut dyn Renderer, layers: &[EntityKind]) -> GameResult<()> {
        for &kind in layers {
            for entity in self.entities.iter().filter(|e| e.kind == kind && e.is_active()) {
                entity.run_draw(renderer)?;
            }
        }
        Ok(())
    }

    /// Release everything (safe to call repeatedly)
    pub fn unload_all(&mut self, assets: &mut dyn AssetLoader) {
        let mut count = 0;
        for mut entity in self.entities.drain() {
            release(&mut entity, assets);
            count += 1;
        }
        if count > 0 {
            debug!("Unloaded {} entities", count);
        }
    }

    pub fn get_by_id(&self, id: i32) -> Option<&Entity> {
        self.entities.find(|e| e.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: i32) -> Option<&mut Entity> {
        self.entities.find_mut(|e| e.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.find(|e| e.name == name)
    }

    pub fn get_by_kind(&self, kind: EntityKind) -> Vec<&Entity> {
        self.entities.filter(|e| e.kind == kind)
    }

    pub fn count_by_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entities.is_full()
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        EntityManager::new()
    }
}

fn release(entity: &mut Entity, assets: &mut dyn AssetLoader) {
    entity.run_destroy();
    if let Some(mut sprite) = entity.sprite.take() {
        sprite.release_texture(assets);
    }
}
