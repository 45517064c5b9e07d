// Demo screens - client code of the screen system
//
// - init.rs: startup splash, hands over to the title screen
// - title.rs: title menu
// - platformer.rs: Debug1, side-view physics and animated player
// - shooter.rs: Debug2, top-down shooter built on the entity pool
// - showcase.rs: Debug3, drawing / sprite pool / text / mouse tests

pub mod init;
pub mod platformer;
pub mod shooter;
pub mod showcase;
pub mod title;

pub use init::InitScreen;
pub use platformer::PlatformerScreen;
pub use shooter::ShooterScreen;
pub use showcase::ShowcaseScreen;
pub use title::TitleScreen;

use crate::screen::{ScreenContext, ScreenId, ScreenManager};
use sdl2::keyboard::Keycode;

/// Track names registered with the audio manager at startup
pub const MAIN_MUSIC: &str = "main";
pub const DEBUG_MUSIC: &str = "debug";

pub fn register_demo_screens(manager: &mut ScreenManager) {
    manager.register(ScreenId::Init, Box::new(InitScreen::new()));
    manager.register(ScreenId::Title, Box::new(TitleScreen::new()));
    manager.register(ScreenId::Debug1, Box::new(PlatformerScreen::new()));
    manager.register(ScreenId::Debug2, Box::new(ShooterScreen::new()));
    manager.register(ScreenId::Debug3, Box::new(ShowcaseScreen::new()));
}

/// Esc returns to the title, Tab moves on to `next`
///
/// Returns true when a switch was queued, so the caller can stop updating.
fn debug_navigation(ctx: &mut ScreenContext, next: ScreenId) -> bool {
    if ctx.input.is_key_pressed(Keycode::Escape) {
        ctx.set_screen(ScreenId::Title);
        return true;
    }
    if ctx.input.is_key_pressed(Keycode::Tab) {
        ctx.set_screen(next);
        return true;
    }
    false
}

/// Load `path`, or build a flat placeholder texture when the file is missing
fn texture_or_placeholder(
    ctx: &mut ScreenContext,
    name: &str,
    path: &str,
    size: (u32, u32),
    fill: sdl2::pixels::Color,
    border: sdl2::pixels::Color,
) -> crate::assets::TextureHandle {
    let handle = ctx.assets.load_texture(name, path);
    if handle.is_valid() {
        return handle;
    }
    ctx.assets
        .create_solid_texture(&format!("{}_placeholder", name), size.0, size.1, fill, Some(border))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLoader;
    use crate::screen::ScreenCommand;
    use crate::testing::TestServices;

    #[test]
    fn test_all_demo_screens_registered() {
        let mut manager = ScreenManager::new();
        register_demo_screens(&mut manager);
        for id in [
            ScreenId::Init,
            ScreenId::Title,
            ScreenId::Debug1,
            ScreenId::Debug2,
            ScreenId::Debug3,
        ] {
            assert!(manager.is_registered(id), "{} missing", id);
        }
        assert!(!manager.is_registered(ScreenId::Credits));
    }

    #[test]
    fn test_navigation_keys() {
        let mut services = TestServices::new();
        services.input.press_key(Keycode::Tab);
        assert!(debug_navigation(&mut services.context(), ScreenId::Debug2));
        assert_eq!(services.commands, vec![ScreenCommand::SetScreen(ScreenId::Debug2)]);

        let mut services = TestServices::new();
        services.input.press_key(Keycode::Escape);
        assert!(debug_navigation(&mut services.context(), ScreenId::Debug2));
        assert_eq!(services.commands, vec![ScreenCommand::SetScreen(ScreenId::Title)]);
    }

    #[test]
    fn test_placeholder_when_file_missing() {
        let mut services = TestServices::new();
        let handle = texture_or_placeholder(
            &mut services.context(),
            "hero",
            "res/image/hero.png",
            (16, 16),
            crate::render::palette::BLUE,
            crate::render::palette::DARK_BLUE,
        );
        assert!(handle.is_valid());
        assert_eq!(services.assets.texture_size(handle), Some((16, 16)));
    }
}
