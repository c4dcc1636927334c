use bevy::asset::AssetMetaCheck;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use constants::logging::LOG_FILTER;
use constants::render_settings::CLEAR_COLOUR;

use crate::engine::core::app_state::AppState;
use crate::engine::core::card_core::{CardCorePlugin, CardSystems};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::ManifestLoadingPlugin;
use crate::interaction::ArCamera;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tracking::shortcuts::handle_tracking_keyboard_shortcuts;

pub fn create_app() -> App {
    let mut app = App::new();

    let [r, g, b, a] = CLEAR_COLOUR;
    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .insert_resource(ClearColor(Color::srgba(r, g, b, a)))
        .add_plugins(CardCorePlugin)
        .add_plugins(ManifestLoadingPlugin)
        .add_plugins(WebRpcPlugin);

    // Pointer input and dispatch wait for a built scene.
    app.configure_sets(
        Update,
        (CardSystems::Input, CardSystems::Dispatch).run_if(in_state(AppState::Running)),
    );

    app.add_systems(Startup, setup).add_systems(
        Update,
        handle_tracking_keyboard_shortcuts
            .before(CardSystems::Tracking)
            .run_if(in_state(AppState::Running)),
    );

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

// Marker poses arrive in this camera's world space.
fn create_ar_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 0.0, 0.3).looking_at(Vec3::ZERO, Vec3::Y),
        ArCamera,
    ));
}

fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    create_ar_camera(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        level: Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
