use crate::engine::core::card_core::CardSystems;
use crate::engine::loading::card_builder::SceneChanged;
use crate::interaction::dispatcher::ActionExecuted;
use crate::interaction::input::{PointerDown, PointerSource};
use crate::tracking::source::{TrackingStatusReport, TrackingStatusSource};
use crate::tracking::status::{MarkerId, TrackingStatus};
use crate::video::overlay::{OverlayStateChanged, VideoOverlay};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Engine-side effect of a handled request, applied after handling.
#[derive(Debug, Clone)]
pub enum RpcCommand {
    Report(TrackingStatusReport),
    Pointer(PointerDown),
}

/// Read-only overlay view for `get_overlay_states`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OverlaySummary {
    pub name: String,
    pub marker: MarkerId,
    pub state: &'static str,
}

/// Resource managing bidirectional RPC communication between the host page and Bevy.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the host-page bridge for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(CardSystems::Tracking),
            )
            .add_systems(
                Update,
                (forward_engine_notifications, send_outgoing_messages)
                    .chain()
                    .after(CardSystems::Dispatch),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("[RPC] Failed to register message listener: {:?}", e);
        }
    }

    // Ownership moves to JS so the listener outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    source: Res<TrackingStatusSource>,
    overlays: Query<&VideoOverlay>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut reports: EventWriter<TrackingStatusReport>,
    mut pointers: EventWriter<PointerDown>,
) {
    if events.is_empty() {
        return;
    }

    let summaries: Vec<OverlaySummary> = overlays
        .iter()
        .map(|overlay| OverlaySummary {
            name: overlay.name().to_string(),
            marker: overlay.marker().clone(),
            state: overlay.state().to_string(),
        })
        .collect();

    let mut commands = Vec::new();
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) =
                    handle_rpc_request(&request, &source, &summaries, &mut commands)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("[RPC] Parse error: {}", parse_error);
            }
        }
    }

    for command in commands {
        match command {
            RpcCommand::Report(report) => {
                reports.write(report);
            }
            RpcCommand::Pointer(pointer) => {
                pointers.write(pointer);
            }
        }
    }
}

/// Handle one request. Methods run whether or not the request carries an id;
/// only requests with an id get a response.
pub fn handle_rpc_request(
    request: &RpcRequest,
    source: &TrackingStatusSource,
    overlays: &[OverlaySummary],
    commands: &mut Vec<RpcCommand>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "tracking_status" => handle_tracking_status(&request.params, commands),
        "pointer_down" => handle_pointer_down(&request.params, commands),
        "get_marker_status" => handle_get_marker_status(&request.params, source),
        "get_overlay_states" => Ok(serde_json::json!({ "overlays": overlays })),
        _ => {
            warn!("[RPC] Unknown method: {}", request.method);
            let id = request.id.clone()?;
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

#[derive(Deserialize)]
struct PoseParams {
    translation: [f32; 3],
    #[serde(default = "identity_rotation")]
    rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn handle_tracking_status(
    params: &serde_json::Value,
    commands: &mut Vec<RpcCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct TrackingStatusParams {
        marker: String,
        status: String,
        #[serde(default)]
        pose: Option<PoseParams>,
    }

    let parsed = serde_json::from_value::<TrackingStatusParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'marker' and 'status' parameters"))?;

    let status = TrackingStatus::from_string(&parsed.status)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown status: {}", parsed.status)))?;

    let mut report = TrackingStatusReport::new(parsed.marker.as_str(), status);
    report.pose = parsed.pose.map(|pose| Transform {
        translation: Vec3::from_array(pose.translation),
        rotation: Quat::from_array(pose.rotation).normalize(),
        ..default()
    });
    commands.push(RpcCommand::Report(report));

    Ok(serde_json::json!({
        "success": true,
        "marker": parsed.marker,
        "status": status,
    }))
}

fn handle_pointer_down(
    params: &serde_json::Value,
    commands: &mut Vec<RpcCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct PointerParams {
        x: f32,
        y: f32,
    }

    let parsed = serde_json::from_value::<PointerParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'x' and 'y' parameters"))?;

    commands.push(RpcCommand::Pointer(PointerDown {
        screen_position: Vec2::new(parsed.x, parsed.y),
        source: PointerSource::Host,
    }));

    Ok(serde_json::json!({ "success": true }))
}

fn handle_get_marker_status(
    params: &serde_json::Value,
    source: &TrackingStatusSource,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct MarkerParams {
        marker: Option<String>,
    }

    let parsed = if params.is_null() {
        MarkerParams { marker: None }
    } else {
        serde_json::from_value::<MarkerParams>(params.clone())
            .map_err(|_| RpcError::invalid_params("Expected optional 'marker' parameter"))?
    };

    let describe = |marker: &MarkerId, status: TrackingStatus| {
        serde_json::json!({
            "marker": marker,
            "status": status,
            "active": status.is_active(),
        })
    };

    match parsed.marker {
        Some(marker) => {
            let marker = MarkerId::new(marker);
            Ok(describe(&marker, source.current_status(&marker)))
        }
        None => {
            let markers: Vec<_> = source
                .known_markers()
                .iter()
                .map(|(marker, status)| describe(marker, *status))
                .collect();
            Ok(serde_json::json!({ "markers": markers }))
        }
    }
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Mirror engine events to the host page.
fn forward_engine_notifications(
    mut executed: EventReader<ActionExecuted>,
    mut overlay_changes: EventReader<OverlayStateChanged>,
    mut scene_changes: EventReader<SceneChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for action in executed.read() {
        rpc_interface.send_notification(
            "action_executed",
            serde_json::json!({
                "kind": action.kind,
                "marker": action.marker,
            }),
        );
    }

    for change in overlay_changes.read() {
        rpc_interface.send_notification(
            "overlay_state_changed",
            serde_json::json!({
                "name": change.name,
                "state": change.state,
            }),
        );
    }

    for scene in scene_changes.read() {
        rpc_interface.send_notification(
            "scene_changed",
            serde_json::json!({ "scene": scene.scene }),
        );
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("[RPC] Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("[RPC] No parent window available for message transmission");
                    }
                } else {
                    error!("[RPC] Window object not available");
                }
            }
            Err(e) => {
                error!("[RPC] Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No host page outside the browser.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, params: serde_json::Value, id: Option<u64>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: id.map(serde_json::Value::from),
        }
    }

    #[test]
    fn tracking_status_queues_report_with_pose() {
        let source = TrackingStatusSource::default();
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(
                "tracking_status",
                serde_json::json!({
                    "marker": "card_front",
                    "status": "tracked",
                    "pose": { "translation": [0.0, 0.1, -0.4] }
                }),
                Some(1),
            ),
            &source,
            &[],
            &mut commands,
        )
        .unwrap();

        assert!(response.error.is_none());
        let [RpcCommand::Report(report)] = commands.as_slice() else {
            panic!("expected one report, got {:?}", commands);
        };
        assert_eq!(report.marker, MarkerId::new("card_front"));
        assert_eq!(report.status, TrackingStatus::Tracked);
        assert_eq!(
            report.pose.map(|p| p.translation),
            Some(Vec3::new(0.0, 0.1, -0.4))
        );
    }

    #[test]
    fn notifications_still_take_effect_without_response() {
        let source = TrackingStatusSource::default();
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request("pointer_down", serde_json::json!({"x": 10.0, "y": 20.0}), None),
            &source,
            &[],
            &mut commands,
        );

        assert!(response.is_none());
        assert!(matches!(
            commands.as_slice(),
            [RpcCommand::Pointer(PointerDown {
                source: PointerSource::Host,
                ..
            })]
        ));
    }

    #[test]
    fn invalid_status_is_rejected() {
        let source = TrackingStatusSource::default();
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(
                "tracking_status",
                serde_json::json!({"marker": "card_front", "status": "lost"}),
                Some(2),
            ),
            &source,
            &[],
            &mut commands,
        )
        .unwrap();

        assert_eq!(response.error.map(|e| e.code), Some(-32602));
        assert!(commands.is_empty());
    }

    #[test]
    fn marker_status_queries() {
        let mut source = TrackingStatusSource::default();
        source.set_scene_markers([MarkerId::new("card_front")]);
        source.report(&MarkerId::new("card_front"), TrackingStatus::ExtendedTracked);
        source.report(&MarkerId::new("stray"), TrackingStatus::Tracked);
        let mut commands = Vec::new();

        let single = handle_rpc_request(
            &request("get_marker_status", serde_json::json!({"marker": "card_front"}), Some(3)),
            &source,
            &[],
            &mut commands,
        )
        .and_then(|r| r.result)
        .unwrap();
        assert_eq!(single["status"], "extended_tracked");
        assert_eq!(single["active"], true);

        let all = handle_rpc_request(
            &request("get_marker_status", serde_json::Value::Null, Some(4)),
            &source,
            &[],
            &mut commands,
        )
        .and_then(|r| r.result)
        .unwrap();
        assert_eq!(all["markers"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn overlay_states_and_unknown_methods() {
        let source = TrackingStatusSource::default();
        let overlays = [OverlaySummary {
            name: "showreel".into(),
            marker: MarkerId::new("card_front"),
            state: "playing",
        }];
        let mut commands = Vec::new();

        let states = handle_rpc_request(
            &request("get_overlay_states", serde_json::Value::Null, Some(5)),
            &source,
            &overlays,
            &mut commands,
        )
        .and_then(|r| r.result)
        .unwrap();
        assert_eq!(states["overlays"][0]["state"], "playing");

        let unknown = handle_rpc_request(
            &request("get_fps", serde_json::Value::Null, Some(6)),
            &source,
            &overlays,
            &mut commands,
        )
        .unwrap();
        assert_eq!(unknown.error.map(|e| e.code), Some(-32601));
    }
}
