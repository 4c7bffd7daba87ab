//! Wire protocol: envelopes, actions, correlation ids.
//!
//! Field and action names follow the original extension's wire format so
//! captures from either side line up with what this crate produces.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use baml_core::descriptor::ModDescriptor;

/// Which side of the bridge an envelope came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "BESTIARY_CLIENT")]
    Client,
    #[serde(rename = "BESTIARY_EXTENSION")]
    Extension,
}

/// Envelope relayed between the page and the extension.
///
/// Requests carry `id` + `message`; responses carry the originating `id` +
/// `response`; pushes carry `message` with no id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub from: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl Envelope {
    /// Page-originated request with a correlation id.
    pub fn request(id: impl Into<String>, action: Action) -> Self {
        Self {
            from: Origin::Client,
            id: Some(id.into()),
            message: Some(action),
            response: None,
        }
    }

    /// Extension-originated response tagged with the originating id.
    pub fn response(id: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            from: Origin::Extension,
            id: Some(id.into()),
            message: None,
            response: Some(response),
        }
    }

    /// Extension-originated push (no correlation id).
    pub fn push(action: Action) -> Self {
        Self {
            from: Origin::Extension,
            id: None,
            message: Some(action),
            response: None,
        }
    }
}

/// Every action that crosses the bridge, tagged by `action` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(rename = "registerLocalMods")]
    RegisterLocalMods { mods: Vec<ModDescriptor> },
    #[serde(rename = "getLocalModConfig")]
    GetLocalModConfig { hash: String },
    #[serde(rename = "getVersion")]
    GetVersion,
    #[serde(rename = "getModCounts")]
    GetModCounts,
    #[serde(rename = "getLocalMods")]
    GetLocalMods,
    #[serde(rename = "getManualMods")]
    GetManualMods,
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "executeLocalMod")]
    ExecuteLocalMod {
        name: String,
        #[serde(default)]
        force: bool,
    },
    #[serde(rename = "updateLocalModState")]
    UpdateLocalModState { name: String, enabled: bool },
    #[serde(rename = "updateDebugMode")]
    UpdateDebugMode { enabled: bool },
    #[serde(rename = "openDashboard")]
    OpenDashboard,
}

impl Action {
    /// Wire name of the action tag.
    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterLocalMods { .. } => "registerLocalMods",
            Action::GetLocalModConfig { .. } => "getLocalModConfig",
            Action::GetVersion => "getVersion",
            Action::GetModCounts => "getModCounts",
            Action::GetLocalMods => "getLocalMods",
            Action::GetManualMods => "getManualMods",
            Action::Ping => "ping",
            Action::ExecuteLocalMod { .. } => "executeLocalMod",
            Action::UpdateLocalModState { .. } => "updateLocalModState",
            Action::UpdateDebugMode { .. } => "updateDebugMode",
            Action::OpenDashboard => "openDashboard",
        }
    }

    /// Whether the relay forwards this action page → background. The relay
    /// drops anything outside this fixed set.
    pub fn relayed_to_background(&self) -> bool {
        matches!(
            self,
            Action::RegisterLocalMods { .. }
                | Action::GetLocalModConfig { .. }
                | Action::GetVersion
                | Action::GetModCounts
                | Action::GetLocalMods
                | Action::GetManualMods
        )
    }

    /// Whether the relay forwards this action background → page.
    pub fn relayed_to_page(&self) -> bool {
        matches!(
            self,
            Action::ExecuteLocalMod { .. }
                | Action::UpdateLocalModState { .. }
                | Action::UpdateDebugMode { .. }
        )
    }
}

static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fresh correlation id, `mod_msg_<unix-ms>_<seq>`.
pub fn next_message_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("mod_msg_{millis}_{seq}")
}
