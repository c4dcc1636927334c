/// Log filter applied on top of the default level.
/// Keeps GPU backends quiet and the engine's own subsystems at debug.
pub const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=warn,ar_card_engine=debug";
