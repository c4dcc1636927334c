use super::backend::{AudioSink, VideoBackend};
use crate::interaction::region::HitRegion;
use crate::tracking::status::MarkerId;
use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayState {
    #[default]
    Hidden,
    Playing,
}

impl OverlayState {
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Playing => "playing",
        }
    }
}

/// The overlay's own renderable and hit region, borrowed for one transition.
pub struct OverlaySurface<'a> {
    pub visibility: &'a mut Visibility,
    pub region: Option<&'a mut HitRegion>,
}

impl OverlaySurface<'_> {
    fn set_enabled(&mut self, enabled: bool) {
        *self.visibility = if enabled {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if let Some(region) = self.region.as_deref_mut() {
            region.set_enabled(enabled);
        }
    }
}

/// Marker-attached video surface with a Hidden/Playing state machine.
///
/// `show()` enables the surface immediately but only issues the play command
/// on the next tick, once hit-testing has seen the re-enabled region.
/// Invariant: `Playing` only while the owning marker is tracked; tracking loss
/// forces `hide()`.
#[derive(Component)]
pub struct VideoOverlay {
    name: String,
    marker: MarkerId,
    state: OverlayState,
    start_pending: bool,
    backend: Box<dyn VideoBackend>,
    audio: Option<Box<dyn AudioSink>>,
}

impl VideoOverlay {
    pub fn new(
        name: impl Into<String>,
        marker: impl Into<MarkerId>,
        backend: impl VideoBackend,
    ) -> Self {
        Self {
            name: name.into(),
            marker: marker.into(),
            state: OverlayState::Hidden,
            start_pending: false,
            backend: Box::new(backend),
            audio: None,
        }
    }

    pub fn with_audio(mut self, sink: impl AudioSink) -> Self {
        self.audio = Some(Box::new(sink));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn marker(&self) -> &MarkerId {
        &self.marker
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == OverlayState::Playing
    }

    /// Shown but waiting for the next tick to start playback.
    pub fn is_start_pending(&self) -> bool {
        self.start_pending
    }

    pub fn playback_position(&self) -> Duration {
        self.backend.position()
    }

    /// Make the surface visible and hit-testable and schedule playback.
    /// Returns false when already playing.
    pub fn show(&mut self, surface: &mut OverlaySurface) -> bool {
        if self.is_playing() {
            return false;
        }
        surface.set_enabled(true);
        self.start_pending = true;
        self.state = OverlayState::Playing;
        true
    }

    /// Second half of `show()`, run one tick later. Returns whether playback started.
    pub fn start_pending_playback(&mut self) -> bool {
        if !self.start_pending || !self.is_playing() {
            return false;
        }
        self.start_pending = false;
        if let Some(audio) = &self.audio {
            self.backend.set_audio_sink(audio.id());
        }
        self.backend.play();
        true
    }

    /// Stop playback and audio and hide the surface. Safe to call in any state,
    /// including between `show()` and the deferred start. Returns whether the
    /// overlay was playing.
    pub fn hide(&mut self, surface: &mut OverlaySurface) -> bool {
        let was_playing = self.is_playing();
        self.start_pending = false;
        if self.backend.is_playing() {
            self.backend.stop();
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.stop();
        }
        surface.set_enabled(false);
        self.state = OverlayState::Hidden;
        was_playing
    }

    pub fn advance(&mut self, delta: Duration) {
        self.backend.advance(delta);
    }
}

/// Emitted on every actual Hidden/Playing transition.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct OverlayStateChanged {
    pub overlay: Entity,
    pub name: String,
    pub state: OverlayState,
}

/// Query data needed to drive an overlay transition.
pub type OverlayParts = (
    &'static mut VideoOverlay,
    &'static mut Visibility,
    Option<&'static mut HitRegion>,
);

/// Show the overlay on `entity`. `None` when the entity has no overlay,
/// otherwise whether the state changed.
pub fn show_overlay(overlays: &mut Query<OverlayParts>, entity: Entity) -> Option<bool> {
    let (mut overlay, mut visibility, mut region) = overlays.get_mut(entity).ok()?;
    let mut surface = OverlaySurface {
        visibility: &mut visibility,
        region: region.as_deref_mut(),
    };
    Some(overlay.show(&mut surface))
}

/// Hide the overlay on `entity`. `None` when the entity has no overlay,
/// otherwise whether it was playing.
pub fn hide_overlay(overlays: &mut Query<OverlayParts>, entity: Entity) -> Option<bool> {
    let (mut overlay, mut visibility, mut region) = overlays.get_mut(entity).ok()?;
    let mut surface = OverlaySurface {
        visibility: &mut visibility,
        region: region.as_deref_mut(),
    };
    Some(overlay.hide(&mut surface))
}
