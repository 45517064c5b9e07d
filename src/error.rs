//! Error types for the framework
//!
//! Expected conditions (a full pool, a lookup miss, a missing texture) are
//! logged and skipped where they happen. `GameError` is only for failures
//! that should stop startup: SDL could not create something we cannot run
//! without, or a file we were told to read could not be parsed.

use std::fmt;

/// Errors that abort initialization or a load request
#[derive(Debug)]
pub enum GameError {
    /// An SDL call failed (SDL reports errors as strings)
    Sdl(String),

    /// The offscreen virtual render target could not be created
    RenderTarget(String),

    /// Reading a file failed
    Io(std::io::Error),

    /// A JSON file was malformed
    Json(serde_json::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameError::Sdl(msg) => write!(f, "SDL error: {}", msg),
            GameError::RenderTarget(msg) => {
                write!(f, "Failed to create virtual render target: {}", msg)
            }
            GameError::Io(err) => write!(f, "IO error: {}", err),
            GameError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(err) => Some(err),
            GameError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::Io(err)
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Json(err)
    }
}

/// Most of sdl2's API returns `Result<_, String>`
impl From<String> for GameError {
    fn from(msg: String) -> Self {
        GameError::Sdl(msg)
    }
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GameError::Sdl("no video device".to_string());
        assert_eq!(err.to_string(), "SDL error: no video device");

        let err = GameError::RenderTarget("out of memory".to_string());
        assert!(err.to_string().contains("virtual render target"));
    }

    #[test]
    fn test_from_conversions() {
        let err: GameError = String::from("boom").into();
        assert!(matches!(err, GameError::Sdl(_)));

        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: GameError = json_err.into();
        assert!(matches!(err, GameError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
