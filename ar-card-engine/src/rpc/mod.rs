//! JSON-RPC 2.0 bridge to the host page.
//!
//! In the browser the engine runs inside an iframe. The host page owns the
//! camera feed and the marker tracker, and talks to the engine over
//! `postMessage`:
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ tracking_status / pointer_down ─────> │ TrackingStatusReport / PointerDown
//!        ├─ get_marker_status (with ID) ────────> │
//!        │ <───────────────── Response (with ID) ─┤
//!        │ <──── action_executed / overlay_state_changed / scene_changed
//! ```
//!
//! Requests without an ID still run; they just get no response.
//!
//! ## Methods
//!
//! - `tracking_status`: `{ marker, status, pose?: { translation, rotation } }`
//! - `pointer_down`: `{ x, y }` in logical window pixels
//! - `get_marker_status`: `{ marker? }`; all known markers when omitted
//! - `get_overlay_states`: name, marker and state of every overlay
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// Message listener, request handling and notification forwarding.
pub mod web_rpc;
