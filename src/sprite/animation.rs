//! Frame-sequence animation
//!
//! An `AnimationSequence` is immutable data: a name, a playback policy and
//! a list of frames (sprite sheet index + duration). Sequences are shared
//! through `Rc` between every `Animator` that plays them; each animator
//! only keeps its own progress.
//!
//! # Frame progression
//!
//! Each update adds `dt * speed` to the frame timer and then, while the
//! timer covers the current frame's duration, subtracts that duration and
//! steps. Subtracting (not resetting) keeps long frames from losing time:
//! a 0.35s step through 0.1s frames lands 0.05s into the fourth frame.
//!
//! - `Loop`: after the last frame, back to frame 0
//! - `Once`: stays on the last frame (still reported as playing)
//! - `PingPong`: 0,1,2,1,0,1,... (end frames are not repeated)
//!
//! Sequences can be defined in code or loaded from a JSON library:
//!
//! ```json
//! { "sequences": [
//!     { "name": "run", "kind": "Loop",
//!       "frames": [ { "sprite_index": 3, "duration": 0.08 } ] }
//! ] }
//! ```

use crate::error::GameResult;
use crate::pool::{ObjectPool, PoolError};
use log::{debug, error, warn};
use sdl2::rect::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

pub const MAX_ANIMATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    Loop,
    Once,
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub sprite_index: u32,
    /// Seconds this frame stays on screen
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSequence {
    pub name: String,
    pub kind: SequenceKind,
    pub frames: Vec<AnimationFrame>,
}

impl AnimationSequence {
    pub fn new(name: &str, kind: SequenceKind, frames: Vec<AnimationFrame>) -> Self {
        AnimationSequence {
            name: name.to_string(),
            kind,
            frames,
        }
    }

    /// Consecutive sheet indices `first..first + count`, all `duration` long
    pub fn from_range(name: &str, kind: SequenceKind, first: u32, count: u32, duration: f32) -> Self {
        let frames = (first..first + count)
            .map(|sprite_index| AnimationFrame {
                sprite_index,
                duration,
            })
            .collect();
        AnimationSequence::new(name, kind, frames)
    }
}

/// On-disk form of a set of sequences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationLibrary {
    pub sequences: Vec<AnimationSequence>,
}

impl AnimationLibrary {
    pub fn load_from_file(path: &Path) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let library: AnimationLibrary = serde_json::from_str(&content)?;
        Ok(library)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayDirection {
    Forward,
    Backward,
}

/// Playback state for one sequence
#[derive(Debug, Clone)]
pub struct Animator {
    name: String,
    sequence: Rc<AnimationSequence>,
    kind: SequenceKind,
    index: usize,
    timer: f32,
    speed: f32,
    playing: bool,
    direction: PlayDirection,
}

impl Animator {
    /// New animator, already playing from frame 0 if the sequence has frames
    pub fn new(name: &str, sequence: Rc<AnimationSequence>) -> Self {
        let kind = sequence.kind;
        let playing = !sequence.frames.is_empty();
        Animator {
            name: name.to_string(),
            sequence,
            kind,
            index: 0,
            timer: 0.0,
            speed: 1.0,
            playing,
            direction: PlayDirection::Forward,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &AnimationSequence {
        &self.sequence
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn frame_timer(&self) -> f32 {
        self.timer
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Frame being shown, or `None` when stopped
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        if self.playing {
            self.sequence.frames.get(self.index)
        } else {
            None
        }
    }

    /// Sheet index to draw; frame 0's index while stopped
    pub fn sprite_index(&self) -> u32 {
        self.sequence
            .frames
            .get(self.index)
            .map(|f| f.sprite_index)
            .unwrap_or(0)
    }

    pub fn update(&mut self, dt: f32) {
        if !self.playing || self.sequence.frames.is_empty() {
            return;
        }

        self.timer += dt * self.speed;
        loop {
            let duration = self.sequence.frames[self.index].duration;
            if duration <= 0.0 || self.timer < duration {
                break;
            }
            self.timer -= duration;
            self.step();
        }
    }

    fn step(&mut self) {
        let last = self.sequence.frames.len() - 1;
        match self.kind {
            SequenceKind::Loop => {
                self.index = if self.index < last { self.index + 1 } else { 0 };
            }
            SequenceKind::Once => {
                self.index = (self.index + 1).min(last);
            }
            SequenceKind::PingPong => {
                if last == 0 {
                    return;
                }
                match self.direction {
                    PlayDirection::Forward if self.index < last => self.index += 1,
                    PlayDirection::Forward => {
                        self.direction = PlayDirection::Backward;
                        self.index -= 1;
                    }
                    PlayDirection::Backward if self.index > 0 => self.index -= 1,
                    PlayDirection::Backward => {
                        self.direction = PlayDirection::Forward;
                        self.index = 1;
                    }
                }
            }
        }
    }

    /// Restart from frame 0, but only for the sequence already bound
    ///
    /// Any other name is refused with a warning; switching sequences means
    /// using a different animator.
    pub fn play(&mut self, name: &str) -> bool {
        if name != self.sequence.name {
            warn!(
                "Animator '{}' is bound to '{}', cannot play '{}'",
                self.name, self.sequence.name, name
            );
            return false;
        }
        self.index = 0;
        self.timer = 0.0;
        self.direction = PlayDirection::Forward;
        self.playing = !self.sequence.frames.is_empty();
        true
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.index = 0;
        self.timer = 0.0;
        self.direction = PlayDirection::Forward;
    }

    /// Playback speed multiplier (negative values are treated as 0)
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Override the sequence's playback policy for this animator
    pub fn set_kind(&mut self, kind: SequenceKind) {
        self.kind = kind;
        if self.index >= self.sequence.frames.len() {
            self.index = 0;
        }
    }
}

/// Grid layout of a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub frame_width: u32,
    pub frame_height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl Default for SheetLayout {
    /// 704x704 sheet of 64x64 cells
    fn default() -> Self {
        SheetLayout {
            frame_width: 64,
            frame_height: 64,
            columns: 11,
            rows: 11,
        }
    }
}

impl SheetLayout {
    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Source rectangle for a sheet index; out-of-range indices use frame 0
    pub fn frame_rect(&self, sprite_index: u32) -> Rect {
        let index = if sprite_index >= self.frame_count() || self.columns == 0 {
            error!(
                "Frame index {} out of bounds (0-{}), using frame 0",
                sprite_index,
                self.frame_count().saturating_sub(1)
            );
            0
        } else {
            sprite_index
        };
        let col = index % self.columns.max(1);
        let row = index / self.columns.max(1);
        Rect::new(
            (col * self.frame_width) as i32,
            (row * self.frame_height) as i32,
            self.frame_width,
            self.frame_height,
        )
    }
}

/// Sequence library plus a bounded pool of named animators
pub struct AnimationManager {
    library: HashMap<String, Rc<AnimationSequence>>,
    animators: ObjectPool<Animator>,
    layout: SheetLayout,
}

impl AnimationManager {
    pub fn new() -> Self {
        AnimationManager::with_capacity(MAX_ANIMATIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        AnimationManager {
            library: HashMap::new(),
            animators: ObjectPool::with_capacity(capacity),
            layout: SheetLayout::default(),
        }
    }

    pub fn layout(&self) -> SheetLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: SheetLayout) {
        self.layout = layout;
    }

    pub fn frame_rect(&self, sprite_index: u32) -> Rect {
        self.layout.frame_rect(sprite_index)
    }

    //=========================================================================
    // Sequence library
    //=========================================================================

    /// Register a sequence; a sequence with the same name is replaced
    pub fn add_sequence(&mut self, sequence: AnimationSequence) -> Rc<AnimationSequence> {
        let sequence = Rc::new(sequence);
        if self
            .library
            .insert(sequence.name.clone(), Rc::clone(&sequence))
            .is_some()
        {
            warn!("Replacing animation sequence '{}'", sequence.name);
        }
        sequence
    }

    /// Add every sequence in a JSON library file; returns how many were added
    pub fn load_library(&mut self, path: &Path) -> GameResult<usize> {
        let library = AnimationLibrary::load_from_file(path)?;
        let count = library.sequences.len();
        for sequence in library.sequences {
            self.add_sequence(sequence);
        }
        debug!("Loaded {} animation sequences from {}", count, path.display());
        Ok(count)
    }

    pub fn sequence(&self, name: &str) -> Option<Rc<AnimationSequence>> {
        self.library.get(name).cloned()
    }

    //=========================================================================
    // Animators
    //=========================================================================

    pub fn add_animator(&mut self, animator: Animator) -> Result<(), PoolError<Animator>> {
        self.animators.add(animator).inspect_err(|e| {
            error!("Cannot add animator: {}", e);
        })
    }

    /// Create an animator named `name` playing library sequence `sequence`
    pub fn create_animator(&mut self, name: &str, sequence: &str) -> bool {
        let Some(seq) = self.sequence(sequence) else {
            warn!("Animation sequence '{}' not found", sequence);
            return false;
        };
        self.add_animator(Animator::new(name, seq)).is_ok()
    }

    pub fn remove_animator(&mut self, name: &str) -> Option<Animator> {
        let removed = self.animators.remove_where(|a| a.name == name);
        if removed.is_none() {
            warn!("Animator '{}' not found", name);
        }
        removed
    }

    pub fn update(&mut self, dt: f32) {
        for animator in self.animators.iter_mut() {
            animator.update(dt);
        }
    }

    pub fn animator(&self, name: &str) -> Option<&Animator> {
        self.animators.find(|a| a.name == name)
    }

    pub fn animator_mut(&mut self, name: &str) -> Option<&mut Animator> {
        self.animators.find_mut(|a| a.name == name)
    }

    fn with_animator<R>(&mut self, name: &str, f: impl FnOnce(&mut Animator) -> R) -> Option<R> {
        match self.animator_mut(name) {
            Some(animator) => Some(f(animator)),
            None => {
                warn!("Animator '{}' not found", name);
                None
            }
        }
    }

    pub fn play_animation(&mut self, animator: &str, sequence: &str) -> bool {
        self.with_animator(animator, |a| a.play(sequence))
            .unwrap_or(false)
    }

    pub fn stop_animation(&mut self, animator: &str) {
        self.with_animator(animator, Animator::stop);
    }

    pub fn set_speed(&mut self, animator: &str, speed: f32) {
        self.with_animator(animator, |a| a.set_speed(speed));
    }

    pub fn set_state(&mut self, animator: &str, kind: SequenceKind) {
        self.with_animator(animator, |a| a.set_kind(kind));
    }

    pub fn is_playing(&self, animator: &str) -> bool {
        self.animator(animator).is_some_and(Animator::is_playing)
    }

    /// Drop every animator (sequences stay in the library)
    pub fn unload_all(&mut self) {
        let count = self.animators.drain().count();
        if count > 0 {
            debug!("Unloaded {} animators", count);
        }
    }

    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }
}

impl Default for AnimationManager {
    fn default() -> Self {
        AnimationManager::new()
    }
}
