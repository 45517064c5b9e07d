use log::{error, info, warn};
use sdl2::controller::GameController;
use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use starter2d::assets::AssetManager;
use starter2d::audio::{AudioManager, SoundCategory};
use starter2d::clock::frame_budget_remaining;
use starter2d::config::Settings;
use starter2d::input::InputState;
use starter2d::render::present_frame;
use starter2d::screen::ScreenManager;
use starter2d::screens::{DEBUG_MUSIC, MAIN_MUSIC, register_demo_screens};
use starter2d::{GameError, GameResult, Handler, Services, logging};
use std::time::Instant;

const MUSIC_FILES: [(&str, &str); 2] = [
    (MAIN_MUSIC, "res/audio/music/main_theme.ogg"),
    (DEBUG_MUSIC, "res/audio/music/debug_theme.ogg"),
];

const SOUND_FILES: [(&str, &str); 4] = [
    ("jump", "res/audio/sfx/jump.wav"),
    ("land", "res/audio/sfx/land.wav"),
    ("shoot", "res/audio/sfx/shoot.wav"),
    ("hit", "res/audio/sfx/hit.wav"),
];

/// Register every track and sound the demo screens ask for by name
///
/// Missing files are logged by the audio manager; the game runs without them.
fn load_audio(audio: &mut AudioManager) {
    for (name, path) in MUSIC_FILES {
        audio.load_music(name, path);
    }
    for (name, path) in SOUND_FILES {
        audio.load_sound(name, path, SoundCategory::Sfx);
    }
}

fn run() -> GameResult<()> {
    let settings = Settings::load_or_default();
    logging::init(settings.debug_mode);
    info!("Starting {} v{}", settings.title, env!("CARGO_PKG_VERSION"));

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let controller_subsystem = sdl_context.game_controller()?;
    let _image_context = sdl2::image::init(sdl2::image::InitFlag::PNG)?;

    let mut audio = AudioManager::open(&sdl_context, settings.volumes());
    load_audio(&mut audio);

    // Window size follows the desktop unless a scale is configured
    let desktop = video_subsystem
        .desktop_display_mode(0)
        .map(|mode| (mode.w, mode.h))
        .ok();
    let (window_width, window_height) = settings.window_size(desktop);
    info!("Window: {}x{}", window_width, window_height);

    let mut window_builder = video_subsystem.window(&settings.title, window_width, window_height);
    window_builder.position_centered().resizable();
    if settings.fullscreen {
        window_builder.fullscreen_desktop();
    }
    let window = window_builder
        .build()
        .map_err(|e| GameError::Sdl(e.to_string()))?;

    let mut canvas_builder = window.into_canvas().accelerated().target_texture();
    if settings.vsync {
        canvas_builder = canvas_builder.present_vsync();
    }
    let mut canvas = canvas_builder
        .build()
        .map_err(|e| GameError::Sdl(e.to_string()))?;
    let texture_creator = canvas.texture_creator();

    // Everything is drawn at the virtual resolution, then scaled
    let (virtual_width, virtual_height) = settings.virtual_size();
    let mut virtual_target = texture_creator
        .create_texture_target(PixelFormatEnum::RGBA8888, virtual_width, virtual_height)
        .map_err(|e| GameError::RenderTarget(e.to_string()))?;

    let mut assets = AssetManager::new(&texture_creator);
    let mut input = InputState::new(canvas.output_size()?);
    let mut screens = ScreenManager::new();
    register_demo_screens(&mut screens);
    let mut handler = Handler::new(&settings, screens);

    let mut event_pump = sdl_context.event_pump()?;
    let mut controllers: Vec<GameController> = Vec::new();

    while handler.is_running() {
        let frame_start = Instant::now();

        input.begin_frame();
        for event in event_pump.poll_iter() {
            if let Event::ControllerDeviceAdded { which, .. } = event {
                match controller_subsystem.open(which) {
                    Ok(controller) => {
                        info!("Controller connected: {}", controller.name());
                        controllers.push(controller);
                    }
                    Err(e) => warn!("Could not open controller {}: {}", which, e),
                }
            }
            input.handle_event(&event);
        }
        controllers.retain(GameController::attached);

        let dt = handler.tick(Instant::now());
        input.update_unified(dt);
        handler.update_frame(&mut Services {
            input: &input,
            assets: &mut assets,
            audio: &mut audio,
        });
        audio.update(dt);

        present_frame(&mut canvas, &mut virtual_target, &mut assets, &handler)?;

        // vsync already paces the loop; this covers drivers that ignore it
        if let Some(remaining) = frame_budget_remaining(settings.target_fps, frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    handler.shutdown(&mut Services {
        input: &input,
        assets: &mut assets,
        audio: &mut audio,
    });
    assets.unload_all();
    info!("Shut down cleanly");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
