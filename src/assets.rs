//! Texture registry
//!
//! Textures are owned by the `AssetManager` and referred to everywhere else
//! through `TextureHandle`s. A handle carries the generation of the slot it
//! was issued from, so once a texture is unloaded (and its slot possibly
//! reused) old handles simply stop resolving instead of pointing at the
//! wrong image.
//!
//! Textures are also cached by name: loading a name twice returns the
//! handle that is already live and adds a reference to it. Every load or
//! create is matched by one `unload_texture`; the texture is freed when the
//! last reference goes.

use log::{debug, error, warn};
use sdl2::image::LoadTexture;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Texture, TextureCreator};
use sdl2::surface::Surface;
use sdl2::video::WindowContext;
use std::collections::HashMap;

/// Maximum number of textures alive at once
pub const MAX_TEXTURES: usize = 64;

/// Generation-checked reference to a loaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    index: u32,
    generation: u32,
}

impl TextureHandle {
    /// Returned by failed loads; never resolves
    pub const INVALID: TextureHandle = TextureHandle {
        index: u32::MAX,
        generation: 0,
    };

    pub fn is_valid(&self) -> bool {
        *self != TextureHandle::INVALID
    }
}

/// Texture services screens and managers need
pub trait AssetLoader {
    /// Load an image file under `name`; `TextureHandle::INVALID` on failure
    fn load_texture(&mut self, name: &str, path: &str) -> TextureHandle;

    /// Generate a solid-color texture, optionally with a 1px border
    fn create_solid_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        fill: Color,
        border: Option<Color>,
    ) -> TextureHandle;

    /// Handle for a texture already loaded under `name`
    fn texture(&self, name: &str) -> TextureHandle;

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)>;

    /// Drop one reference to a texture, freeing it on the last one; stale
    /// handles are ignored
    fn unload_texture(&mut self, handle: TextureHandle);
}

struct Slot<T> {
    generation: u32,
    refs: u32,
    value: Option<T>,
}

/// Outcome of `SlotTable::release`
#[derive(Debug, PartialEq)]
pub enum Released<T> {
    /// The handle did not point at a live value
    Stale,
    /// Other references remain; carries how many
    Shared(u32),
    /// That was the last reference
    Freed(T),
}

/// Bounded generational slot storage
///
/// Freed slots are reused, each reuse bumping the generation so handles to
/// the previous occupant no longer match. Values are reference counted:
/// `insert` starts at one, `acquire` adds one, `release` drops one.
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    capacity: usize,
}

impl<T> SlotTable<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        SlotTable {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Store a value; gives it back if every slot is taken
    pub fn insert(&mut self, value: T) -> Result<TextureHandle, T> {
        if let Some(index) = self.slots.iter().position(|slot| slot.value.is_none()) {
            let slot = &mut self.slots[index];
            slot.generation += 1;
            slot.refs = 1;
            slot.value = Some(value);
            return Ok(TextureHandle {
                index: index as u32,
                generation: slot.generation,
            });
        }

        if self.slots.len() >= self.capacity {
            return Err(value);
        }

        self.slots.push(Slot {
            generation: 1,
            refs: 1,
            value: Some(value),
        });
        Ok(TextureHandle {
            index: (self.slots.len() - 1) as u32,
            generation: 1,
        })
    }

    fn slot(&self, handle: TextureHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: TextureHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    fn live_slot_mut(&mut self, handle: TextureHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    /// Add a reference to a live value; false for stale handles
    pub fn acquire(&mut self, handle: TextureHandle) -> bool {
        match self.live_slot_mut(handle) {
            Some(slot) => {
                slot.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference, taking the value out when it was the last
    pub fn release(&mut self, handle: TextureHandle) -> Released<T> {
        let Some(slot) = self.live_slot_mut(handle) else {
            return Released::Stale;
        };
        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs > 0 {
            return Released::Shared(slot.refs);
        }
        match slot.value.take() {
            Some(value) => Released::Freed(value),
            None => Released::Stale,
        }
    }

    /// Take a value out regardless of how many references it has
    pub fn remove(&mut self, handle: TextureHandle) -> Option<T> {
        self.live_slot_mut(handle).and_then(|slot| {
            slot.refs = 0;
            slot.value.take()
        })
    }

    pub fn ref_count(&self, handle: TextureHandle) -> u32 {
        self.slot(handle)
            .filter(|slot| slot.value.is_some())
            .map_or(0, |slot| slot.refs)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every value; generations are kept so old handles stay dead
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.refs = 0;
            slot.value = None;
        }
    }
}

/// SDL-backed texture registry
pub struct AssetManager<'tc> {
    creator: &'tc TextureCreator<WindowContext>,
    textures: SlotTable<Texture<'tc>>,
    names: HashMap<String, TextureHandle>,
}

impl<'tc> AssetManager<'tc> {
    pub fn new(creator: &'tc TextureCreator<WindowContext>) -> Self {
        AssetManager {
            creator,
            textures: SlotTable::with_capacity(MAX_TEXTURES),
            names: HashMap::new(),
        }
    }

    /// Mutable texture for drawing (color/alpha mod are per texture in SDL)
    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture<'tc>> {
        self.textures.get_mut(handle)
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.len()
    }

    /// Live handle cached under `name`, with one more reference taken
    fn acquire_cached(&mut self, name: &str) -> Option<TextureHandle> {
        let handle = *self.names.get(name)?;
        self.textures.acquire(handle).then_some(handle)
    }

    pub fn unload_all(&mut self) {
        let count = self.textures.len();
        self.textures.clear();
        self.names.clear();
        debug!("Unloaded {} textures", count);
    }

    fn register(&mut self, name: &str, mut texture: Texture<'tc>) -> TextureHandle {
        texture.set_blend_mode(BlendMode::Blend);
        match self.textures.insert(texture) {
            Ok(handle) => {
                self.names.insert(name.to_string(), handle);
                handle
            }
            Err(_) => {
                error!("No texture slots available for '{}' ({} max)", name, MAX_TEXTURES);
                TextureHandle::INVALID
            }
        }
    }

    fn build_solid_surface(
        width: u32,
        height: u32,
        fill: Color,
        border: Option<Color>,
    ) -> Result<Surface<'static>, String> {
        let mut surface = Surface::new(width.max(1), height.max(1), PixelFormatEnum::RGBA8888)?;
        match border {
            Some(border_color) => {
                surface.fill_rect(None, border_color)?;
                if width > 2 && height > 2 {
                    surface.fill_rect(Rect::new(1, 1, width - 2, height - 2), fill)?;
                }
            }
            None => surface.fill_rect(None, fill)?,
        }
        Ok(surface)
    }
}

impl<'tc> AssetLoader for AssetManager<'tc> {
    fn load_texture(&mut self, name: &str, path: &str) -> TextureHandle {
        if let Some(handle) = self.acquire_cached(name) {
            debug!("Texture '{}' already loaded", name);
            return handle;
        }

        match self.creator.load_texture(path) {
            Ok(texture) => {
                debug!("Loaded texture '{}' from {}", name, path);
                self.register(name, texture)
            }
            Err(e) => {
                error!("Failed to load texture '{}' from {}: {}", name, path, e);
                TextureHandle::INVALID
            }
        }
    }

    fn create_solid_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        fill: Color,
        border: Option<Color>,
    ) -> TextureHandle {
        if let Some(handle) = self.acquire_cached(name) {
            return handle;
        }

        let texture = Self::build_solid_surface(width, height, fill, border).and_then(|surface| {
            self.creator
                .create_texture_from_surface(&surface)
                .map_err(|e| e.to_string())
        });

        match texture {
            Ok(texture) => self.register(name, texture),
            Err(e) => {
                error!("Failed to generate texture '{}': {}", name, e);
                TextureHandle::INVALID
            }
        }
    }

    fn texture(&self, name: &str) -> TextureHandle {
        self.names.get(name).copied().unwrap_or(TextureHandle::INVALID)
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(handle).map(|texture| {
            let query = texture.query();
            (query.width, query.height)
        })
    }

    fn unload_texture(&mut self, handle: TextureHandle) {
        match self.textures.release(handle) {
            Released::Freed(_) => {
                self.names.retain(|_, h| *h != handle);
            }
            Released::Shared(refs) => {
                debug!("Texture still referenced {} more time(s)", refs);
            }
            Released::Stale => {
                if handle.is_valid() {
                    warn!("Tried to unload a texture that is no longer loaded");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_never_resolves() {
        let mut table: SlotTable<u32> = SlotTable::with_capacity(4);
        table.insert(7).unwrap();
        assert!(!TextureHandle::INVALID.is_valid());
        assert_eq!(table.get(TextureHandle::INVALID), None);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut table = SlotTable::with_capacity(1);
        let first = table.insert("grass").unwrap();
        assert_eq!(table.remove(first), Some("grass"));

        let second = table.insert("dirt").unwrap();
        assert_ne!(first, second);
        assert_eq!(table.get(first), None, "old handle must not see the new texture");
        assert_eq!(table.get(second), Some(&"dirt"));
    }

    #[test]
    fn test_capacity_rejects() {
        let mut table = SlotTable::with_capacity(2);
        table.insert(1).unwrap();
        table.insert(2).unwrap();
        assert_eq!(table.insert(3), Err(3));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_shared_value_freed_on_last_release() {
        let mut table = SlotTable::with_capacity(2);
        let coin = table.insert("coin").unwrap();
        assert!(table.acquire(coin));
        assert_eq!(table.ref_count(coin), 2);

        assert_eq!(table.release(coin), Released::Shared(1));
        assert_eq!(table.get(coin), Some(&"coin"), "still referenced once");
        assert_eq!(table.release(coin), Released::Freed("coin"));
        assert_eq!(table.get(coin), None);
        assert_eq!(table.release(coin), Released::Stale);
        assert!(!table.acquire(coin));
    }

    #[test]
    fn test_clear_keeps_generations() {
        let mut table = SlotTable::with_capacity(2);
        let handle = table.insert(1).unwrap();
        table.clear();
        assert!(table.is_empty());
        let again = table.insert(2).unwrap();
        assert_ne!(handle, again);
        assert_eq!(table.get(handle), None);
    }
}
