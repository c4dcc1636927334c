use crate::error::PlatformError;
use bevy::prelude::*;

/// Fire-and-forget hand-off of a URI to the platform (mail client, dialer, browser).
pub trait UrlOpener: Send + Sync + 'static {
    fn open(&self, uri: &str) -> Result<(), PlatformError>;
}

/// Native builds use the OS handler; WASM builds open a new browser tab.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUrlOpener;

impl UrlOpener for SystemUrlOpener {
    #[cfg(not(target_arch = "wasm32"))]
    fn open(&self, uri: &str) -> Result<(), PlatformError> {
        open::that(uri).map_err(|source| PlatformError::UrlOpen {
            uri: uri.to_string(),
            source,
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn open(&self, uri: &str) -> Result<(), PlatformError> {
        let window = web_sys::window().ok_or_else(|| PlatformError::Browser {
            uri: uri.to_string(),
            reason: "window object not available".to_string(),
        })?;
        window
            .open_with_url_and_target(uri, "_blank")
            .map(|_| ())
            .map_err(|e| PlatformError::Browser {
                uri: uri.to_string(),
                reason: format!("{e:?}"),
            })
    }
}

#[derive(Resource)]
pub struct PlatformUrlOpener(pub Box<dyn UrlOpener>);

impl PlatformUrlOpener {
    pub fn new(opener: impl UrlOpener) -> Self {
        Self(Box::new(opener))
    }

    /// Failures are logged and dropped; nothing retries a hand-off.
    pub fn open_logged(&self, uri: &str) {
        match self.0.open(uri) {
            Ok(()) => info!("[ACTION] Opened '{}'", uri),
            Err(e) => error!("[ACTION] {}", e),
        }
    }
}

impl Default for PlatformUrlOpener {
    fn default() -> Self {
        Self::new(SystemUrlOpener)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every URI instead of opening it.
    #[derive(Clone, Default)]
    pub struct RecordingUrlOpener {
        pub opened: Arc<Mutex<Vec<String>>>,
    }

    impl UrlOpener for RecordingUrlOpener {
        fn open(&self, uri: &str) -> Result<(), PlatformError> {
            self.opened.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }
}
