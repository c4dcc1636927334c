use bevy::prelude::*;
use std::time::Duration;

/// Identity of an audio output an overlay can route playback through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioSinkId(pub u32);

/// Platform video player bound to one overlay surface.
pub trait VideoBackend: Send + Sync + 'static {
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn set_audio_sink(&mut self, sink: AudioSinkId);

    /// Advance the backend's clock by one frame.
    fn advance(&mut self, _delta: Duration) {}

    fn position(&self) -> Duration {
        Duration::ZERO
    }
}

/// Audio output owned by an overlay.
pub trait AudioSink: Send + Sync + 'static {
    fn id(&self) -> AudioSinkId;
    fn stop(&mut self);
}

/// Headless player: tracks play state and a playback position driven by frame time.
/// Used when no platform decoder is wired in; the surface itself is a placeholder quad.
#[derive(Debug, Clone, Default)]
pub struct ClockedVideoBackend {
    clip: String,
    playing: bool,
    position: Duration,
    audio_sink: Option<AudioSinkId>,
}

impl ClockedVideoBackend {
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            ..default()
        }
    }

    pub fn clip(&self) -> &str {
        &self.clip
    }

    pub fn audio_sink(&self) -> Option<AudioSinkId> {
        self.audio_sink
    }
}

impl VideoBackend for ClockedVideoBackend {
    fn play(&mut self) {
        debug!("[VIDEO] Playing clip '{}'", self.clip);
        self.playing = true;
    }

    // Stopping rewinds, matching a platform player's stop rather than pause.
    fn stop(&mut self) {
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_audio_sink(&mut self, sink: AudioSinkId) {
        self.audio_sink = Some(sink);
    }

    fn advance(&mut self, delta: Duration) {
        if self.playing {
            self.position += delta;
        }
    }

    fn position(&self) -> Duration {
        self.position
    }
}

/// Audio sink placeholder paired with [`ClockedVideoBackend`].
#[derive(Debug, Clone)]
pub struct ChannelAudioSink {
    id: AudioSinkId,
}

impl ChannelAudioSink {
    pub fn new(id: AudioSinkId) -> Self {
        Self { id }
    }
}

impl AudioSink for ChannelAudioSink {
    fn id(&self) -> AudioSinkId {
        self.id
    }

    fn stop(&mut self) {
        debug!("[VIDEO] Audio sink {:?} stopped", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_runs_while_playing() {
        let mut backend = ClockedVideoBackend::new("videos/about.mp4");
        backend.advance(Duration::from_millis(500));
        assert_eq!(backend.position(), Duration::ZERO);

        backend.play();
        backend.advance(Duration::from_millis(500));
        backend.advance(Duration::from_millis(250));
        assert_eq!(backend.position(), Duration::from_millis(750));

        backend.stop();
        assert!(!backend.is_playing());
        assert_eq!(backend.position(), Duration::ZERO);
    }
}

/// Recording fakes shared by tests across the crate.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    pub struct PlaybackLog {
        pub plays: usize,
        pub stops: usize,
        pub audio_routes: Vec<AudioSinkId>,
        pub audio_stops: usize,
    }

    pub type SharedLog = Arc<Mutex<PlaybackLog>>;

    pub struct RecordingBackend {
        log: SharedLog,
        playing: bool,
    }

    impl RecordingBackend {
        pub fn new(log: SharedLog) -> Self {
            Self {
                log,
                playing: false,
            }
        }
    }

    impl VideoBackend for RecordingBackend {
        fn play(&mut self) {
            self.playing = true;
            self.log.lock().unwrap().plays += 1;
        }

        fn stop(&mut self) {
            self.playing = false;
            self.log.lock().unwrap().stops += 1;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn set_audio_sink(&mut self, sink: AudioSinkId) {
            self.log.lock().unwrap().audio_routes.push(sink);
        }
    }

    pub struct RecordingAudioSink {
        pub id: AudioSinkId,
        pub log: SharedLog,
    }

    impl AudioSink for RecordingAudioSink {
        fn id(&self) -> AudioSinkId {
            self.id
        }

        fn stop(&mut self) {
            self.log.lock().unwrap().audio_stops += 1;
        }
    }
}
