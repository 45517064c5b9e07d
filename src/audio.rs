//! Audio
//!
//! Thin wrapper over `sdl2::mixer` with per-category volumes and a music
//! "deck" that fades the current track out before starting a queued one.
//!
//! # Architecture
//!
//! - `MusicDeck`: pure state machine for the music channel (current track,
//!   fade-out, pending track, start delay). It returns `MusicCommand`s
//!   instead of touching SDL, so it is unit tested on its own.
//! - `AudioManager`: owns the mixer, the loaded tracks and sound chunks,
//!   applies the deck's commands, and implements `AudioControl`.
//!
//! If the audio device cannot be opened the manager still runs, silently.

use log::{debug, info, warn};
use sdl2::mixer::{self, AUDIO_S16LSB, Channel, Chunk, InitFlag, Music, Sdl2MixerContext};
use sdl2::{AudioSubsystem, Sdl};
use std::collections::HashMap;

/// Fade applied when a new track replaces a playing one
pub const DEFAULT_MUSIC_FADE: f32 = 1.0;
const MIXER_CHANNELS: i32 = 16;

/// What screens are allowed to ask of the audio system
pub trait AudioControl {
    fn play_sound(&mut self, name: &str);

    /// Start a track; if another is playing it fades out first
    fn play_music(&mut self, name: &str, looped: bool);

    fn fade_out_music(&mut self, seconds: f32);

    fn stop_music(&mut self);

    fn stop_all_sounds(&mut self);

    /// Track currently playing (or fading out)
    fn current_music(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    Sfx,
    Vox,
    Ambience,
}

/// Category volumes, all in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volumes {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
    pub vox: f32,
    pub ambience: f32,
}

impl Default for Volumes {
    fn default() -> Self {
        Volumes {
            master: 1.0,
            music: 0.7,
            sfx: 0.7,
            vox: 0.7,
            ambience: 0.7,
        }
    }
}

impl Volumes {
    fn category(&self, category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Sfx => self.sfx,
            SoundCategory::Vox => self.vox,
            SoundCategory::Ambience => self.ambience,
        }
    }
}

/// Convert 0..=1 to SDL_mixer's 0..=128 range
fn mixer_volume(level: f32) -> i32 {
    (level.clamp(0.0, 1.0) * mixer::MAX_VOLUME as f32).round() as i32
}

//=============================================================================
// Music deck
//=============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MusicCommand {
    Start { name: String, looped: bool },
    Halt,
    /// Fade level for the current track, 0..=1
    FadeLevel(f32),
}

#[derive(Debug, Clone)]
struct Fade {
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone)]
struct PendingTrack {
    name: String,
    looped: bool,
    delay_left: f32,
}

/// Music channel state: current track, fade-out and queued track
#[derive(Debug, Clone)]
pub struct MusicDeck {
    current: Option<String>,
    fade: Option<Fade>,
    pending: Option<PendingTrack>,
    /// Silence between a finished fade and the queued track
    pub pending_delay: f32,
    pub fade_duration: f32,
}

impl MusicDeck {
    pub fn new() -> Self {
        MusicDeck {
            current: None,
            fade: None,
            pending: None,
            pending_delay: 0.0,
            fade_duration: DEFAULT_MUSIC_FADE,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.name.as_str())
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Request a track. Replaces via fade when something else is playing.
    ///
    /// Asking for the track that is currently fading out cancels the fade
    /// and any queued track.
    pub fn request(&mut self, name: &str, looped: bool) -> Vec<MusicCommand> {
        match &self.current {
            Some(current) if current == name => {
                self.pending = None;
                match self.fade.take() {
                    Some(_) => vec![MusicCommand::FadeLevel(1.0)],
                    None => Vec::new(),
                }
            }
            Some(_) => {
                self.pending = Some(PendingTrack {
                    name: name.to_string(),
                    looped,
                    delay_left: self.pending_delay,
                });
                if self.fade.is_none() {
                    self.fade = Some(Fade {
                        elapsed: 0.0,
                        duration: self.fade_duration,
                    });
                }
                Vec::new()
            }
            None => {
                self.pending = None;
                self.current = Some(name.to_string());
                vec![
                    MusicCommand::FadeLevel(1.0),
                    MusicCommand::Start {
                        name: name.to_string(),
                        looped,
                    },
                ]
            }
        }
    }

    pub fn fade_out(&mut self, seconds: f32) -> Vec<MusicCommand> {
        if self.current.is_none() {
            return Vec::new();
        }
        if seconds <= 0.0 {
            self.current = None;
            self.fade = None;
            return vec![MusicCommand::Halt];
        }
        self.fade = Some(Fade {
            elapsed: 0.0,
            duration: seconds,
        });
        Vec::new()
    }

    /// Stop immediately and forget any queued track
    pub fn stop(&mut self) -> Vec<MusicCommand> {
        self.current = None;
        self.fade = None;
        self.pending = None;
        vec![MusicCommand::Halt]
    }

    pub fn update(&mut self, dt: f32) -> Vec<MusicCommand> {
        let mut commands = Vec::new();

        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            if fade.elapsed >= fade.duration {
                self.fade = None;
                self.current = None;
                commands.push(MusicCommand::Halt);
            } else {
                commands.push(MusicCommand::FadeLevel(1.0 - fade.elapsed / fade.duration));
                return commands;
            }
        } else if self.current.is_none() {
            if let Some(pending) = &mut self.pending {
                pending.delay_left -= dt;
            }
        }

        if self.current.is_none() {
            let ready = self
                .pending
                .as_ref()
                .is_some_and(|pending| pending.delay_left <= 0.0);
            if ready {
                if let Some(pending) = self.pending.take() {
                    self.current = Some(pending.name.clone());
                    commands.push(MusicCommand::FadeLevel(1.0));
                    commands.push(MusicCommand::Start {
                        name: pending.name,
                        looped: pending.looped,
                    });
                }
            }
        }

        commands
    }
}

impl Default for MusicDeck {
    fn default() -> Self {
        MusicDeck::new()
    }
}

//=============================================================================
// SDL mixer
//=============================================================================

struct Mixer {
    _audio: AudioSubsystem,
    _context: Sdl2MixerContext,
}

impl Drop for Mixer {
    fn drop(&mut self) {
        mixer::close_audio();
    }
}

struct Sound {
    chunk: Chunk,
    category: SoundCategory,
}

pub struct AudioManager {
    // Chunks and tracks must drop before the mixer closes
    tracks: HashMap<String, Music<'static>>,
    sounds: HashMap<String, Sound>,
    mixer: Option<Mixer>,

    volumes: Volumes,
    music_enabled: bool,
    sfx_enabled: bool,
    vox_enabled: bool,
    ambience_enabled: bool,

    deck: MusicDeck,
    fade_level: f32,
}

impl AudioManager {
    /// Open the audio device, falling back to a silent manager on failure
    pub fn open(sdl: &Sdl, volumes: Volumes) -> Self {
        let mut manager = AudioManager::silent(volumes);
        match Self::open_mixer(sdl) {
            Ok(opened) => {
                info!("Audio device opened");
                manager.mixer = Some(opened);
                manager.apply_music_volume();
            }
            Err(e) => warn!("Audio unavailable, continuing without sound: {}", e),
        }
        manager
    }

    /// Manager with no device; every call only updates bookkeeping
    pub fn silent(volumes: Volumes) -> Self {
        let mut manager = AudioManager {
            tracks: HashMap::new(),
            sounds: HashMap::new(),
            mixer: None,
            volumes: Volumes::default(),
            music_enabled: true,
            sfx_enabled: true,
            vox_enabled: true,
            ambience_enabled: true,
            deck: MusicDeck::new(),
            fade_level: 1.0,
        };
        manager.set_volumes(volumes);
        manager
    }

    fn open_mixer(sdl: &Sdl) -> Result<Mixer, String> {
        let audio = sdl.audio()?;
        mixer::open_audio(44_100, AUDIO_S16LSB, mixer::DEFAULT_CHANNELS, 1_024)?;
        let context = mixer::init(InitFlag::OGG | InitFlag::MP3)?;
        mixer::allocate_channels(MIXER_CHANNELS);
        Ok(Mixer {
            _audio: audio,
            _context: context,
        })
    }

    pub fn is_available(&self) -> bool {
        self.mixer.is_some()
    }

    pub fn load_music(&mut self, name: &str, path: &str) -> bool {
        if self.mixer.is_none() {
            return false;
        }
        match Music::from_file(path) {
            Ok(track) => {
                debug!("Loaded music '{}' from {}", name, path);
                self.tracks.insert(name.to_string(), track);
                true
            }
            Err(e) => {
                warn!("Failed to load music '{}' from {}: {}", name, path, e);
                false
            }
        }
    }

    pub fn load_sound(&mut self, name: &str, path: &str, category: SoundCategory) -> bool {
        if self.mixer.is_none() {
            return false;
        }
        match Chunk::from_file(path) {
            Ok(chunk) => {
                debug!("Loaded sound '{}' from {}", name, path);
                self.sounds.insert(name.to_string(), Sound { chunk, category });
                true
            }
            Err(e) => {
                warn!("Failed to load sound '{}' from {}: {}", name, path, e);
                false
            }
        }
    }

    /// Advance fades and queued tracks
    pub fn update(&mut self, dt: f32) {
        let commands = self.deck.update(dt);
        self.apply(commands);
    }

    //=========================================================================
    // Volumes and category switches
    //=========================================================================

    pub fn volumes(&self) -> Volumes {
        self.volumes
    }

    pub fn set_volumes(&mut self, volumes: Volumes) {
        self.volumes = Volumes {
            master: volumes.master.clamp(0.0, 1.0),
            music: volumes.music.clamp(0.0, 1.0),
            sfx: volumes.sfx.clamp(0.0, 1.0),
            vox: volumes.vox.clamp(0.0, 1.0),
            ambience: volumes.ambience.clamp(0.0, 1.0),
        };
        self.apply_music_volume();
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.set_volumes(Volumes {
            master: volume,
            ..self.volumes
        });
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.set_volumes(Volumes {
            music: volume,
            ..self.volumes
        });
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.set_volumes(Volumes {
            sfx: volume,
            ..self.volumes
        });
    }

    /// Effective music level (category x master x current fade)
    pub fn effective_music_volume(&self) -> f32 {
        self.volumes.music * self.volumes.master * self.fade_level
    }

    pub fn effective_sound_volume(&self, category: SoundCategory) -> f32 {
        self.volumes.category(category) * self.volumes.master
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        if !enabled {
            self.stop_music();
        }
    }

    pub fn set_category_enabled(&mut self, category: SoundCategory, enabled: bool) {
        match category {
            SoundCategory::Sfx => self.sfx_enabled = enabled,
            SoundCategory::Vox => self.vox_enabled = enabled,
            SoundCategory::Ambience => self.ambience_enabled = enabled,
        }
    }

    pub fn is_category_enabled(&self, category: SoundCategory) -> bool {
        match category {
            SoundCategory::Sfx => self.sfx_enabled,
            SoundCategory::Vox => self.vox_enabled,
            SoundCategory::Ambience => self.ambience_enabled,
        }
    }

    pub fn is_music_enabled(&self) -> bool {
        self.music_enabled
    }

    //=========================================================================
    // Mixer side effects
    //=========================================================================

    fn apply(&mut self, commands: Vec<MusicCommand>) {
        for command in commands {
            match command {
                MusicCommand::FadeLevel(level) => {
                    self.fade_level = level;
                    self.apply_music_volume();
                }
                MusicCommand::Halt => {
                    if self.mixer.is_some() {
                        Music::halt();
                    }
                }
                MusicCommand::Start { name, looped } => self.start_track(&name, looped),
            }
        }
    }

    fn start_track(&mut self, name: &str, looped: bool) {
        if self.mixer.is_none() {
            return;
        }
        let Some(track) = self.tracks.get(name) else {
            warn!("Music '{}' is not loaded", name);
            return;
        };
        let loops = if looped { -1 } else { 1 };
        if let Err(e) = track.play(loops) {
            warn!("Failed to play music '{}': {}", name, e);
        } else {
            debug!("Playing music '{}'", name);
        }
    }

    fn apply_music_volume(&self) {
        if self.mixer.is_some() {
            Music::set_volume(mixer_volume(self.effective_music_volume()));
        }
    }
}

impl AudioControl for AudioManager {
    fn play_sound(&mut self, name: &str) {
        let Some(sound) = self.sounds.get_mut(name) else {
            if self.mixer.is_some() {
                warn!("Sound '{}' is not loaded", name);
            }
            return;
        };

        let category = sound.category;
        let enabled = match category {
            SoundCategory::Sfx => self.sfx_enabled,
            SoundCategory::Vox => self.vox_enabled,
            SoundCategory::Ambience => self.ambience_enabled,
        };
        if !enabled {
            return;
        }

        let level = self.volumes.category(category) * self.volumes.master;
        sound.chunk.set_volume(mixer_volume(level));
        if let Err(e) = Channel::all().play(&sound.chunk, 0) {
            debug!("No free channel for sound '{}': {}", name, e);
        }
    }

    fn play_music(&mut self, name: &str, looped: bool) {
        if !self.music_enabled {
            return;
        }
        let commands = self.deck.request(name, looped);
        self.apply(commands);
    }

    fn fade_out_music(&mut self, seconds: f32) {
        let commands = self.deck.fade_out(seconds);
        self.apply(commands);
    }

    fn stop_music(&mut self) {
        let commands = self.deck.stop();
        self.apply(commands);
        self.fade_level = 1.0;
    }

    fn stop_all_sounds(&mut self) {
        if self.mixer.is_some() {
            Channel::all().halt();
        }
    }

    fn current_music(&self) -> Option<&str> {
        self.deck.current()
    }
}
