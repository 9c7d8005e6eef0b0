//! Shared wire and configuration types for Lifeline
//!
//! This crate contains the serializable types exchanged between the overlay
//! and its host, plus the overlay configuration. It is shared between the
//! native core (lifeline-core), the WASM frontend (lifeline-ui) and the
//! replay harness (lifeline-cli).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Protocol Names
// ─────────────────────────────────────────────────────────────────────────────

/// Inbound event type discriminators (host → overlay)
pub mod events {
    /// Legacy visibility toggle: `{status: bool}`
    pub const UI: &str = "ui";
    /// Legacy data push: arbitrary flat payload
    pub const SERVER_DATA: &str = "serverData";
    /// Generic panel mutation: `{componentId, action, data?}`
    pub const COMPONENT: &str = "component";
    /// Host reports that a responder accepted the medic call
    pub const RESPONDED: &str = "responded";
}

/// Outbound request names (overlay → host)
pub mod actions {
    pub const CLOSE: &str = "close";
    pub const GET_SERVER_DATA: &str = "getServerData";
    pub const DEATHSCREEN_ACTION: &str = "deathscreenAction";
    pub const SUBMIT_INJURIES: &str = "submitInjuries";
}

/// Well-known panel identifiers
pub mod panels {
    /// Reserved panel driven by the legacy `ui` event
    pub const MAIN: &str = "main";
    /// Reserved panel driven by the legacy `serverData` event
    pub const SERVER: &str = "server";
    pub const DEATHSCREEN: &str = "deathscreen";
    pub const INJURIES: &str = "injuries";
    pub const INVENTORY: &str = "inventory";
    pub const NOTIFICATION: &str = "notification";
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Payload of the legacy `ui` event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiMessage {
    #[serde(default)]
    pub status: bool,
}

/// Action carried by a `component` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentAction {
    Show,
    Hide,
    Update,
}

impl ComponentAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "show" => Some(Self::Show),
            "hide" => Some(Self::Hide),
            "update" => Some(Self::Update),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Update => "update",
        }
    }
}

/// Payload of the generic `component` event.
///
/// `action` stays a string so an unknown action can be reported by name
/// instead of failing the whole message. `data` distinguishes an absent
/// field (`None`) from an explicit `null` (`Some(Value::Null)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMessage {
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Deserialize a field that is present (even as `null`) into `Some`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// A host-bound request: action name plus JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub action: String,
    pub payload: Value,
}

impl OutboundRequest {
    pub fn new(action: impl Into<String>, payload: Value) -> Self {
        Self {
            action: action.into(),
            payload,
        }
    }

    /// Request with an empty object body
    pub fn empty(action: impl Into<String>) -> Self {
        Self::new(action, Value::Object(Default::default()))
    }
}

/// Body of `deathscreenAction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathScreenActionPayload {
    pub action: String,
}

/// Body of `submitInjuries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjurySubmission {
    pub injuries: Vec<String>,
}

/// Body of `close` when targeting a named panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseComponent {
    pub component: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Panel Data Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Host-supplied data for the death screen panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathScreenData {
    /// `Some(false)` hides the local medics option; absent means allowed
    #[serde(default)]
    pub allow_local: Option<bool>,
}

impl DeathScreenData {
    pub fn allows_local(&self) -> bool {
        self.allow_local != Some(false)
    }
}

/// Severity level for notification toasts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    #[default]
    Normal,
    Critical,
}

/// Host-supplied data for the notification panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: ToastSeverity,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Build context the overlay runs in.
///
/// Development resolves failed host requests to an empty object so the UI can
/// render without a live host; production surfaces the failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Hold-to-confirm and cooldown tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldConfig {
    /// How long an action must be held before it commits
    #[serde(default = "default_hold_ms")]
    pub duration_ms: u64,

    /// Outbound request name used for committed holds
    #[serde(default = "default_dispatch_event")]
    pub dispatch_event: String,

    /// Cooldown applied when a hold completes, in whole seconds
    #[serde(default = "default_cooldowns")]
    pub cooldowns: BTreeMap<String, u32>,

    /// Cooldowns present when the overlay starts
    #[serde(default = "default_initial_cooldowns")]
    pub initial_cooldowns: BTreeMap<String, u32>,

    /// Cooldowns applied when the host reports a responder
    #[serde(default = "default_responded_cooldowns")]
    pub responded_cooldowns: BTreeMap<String, u32>,
}

fn default_hold_ms() -> u64 {
    2500
}

fn default_dispatch_event() -> String {
    actions::DEATHSCREEN_ACTION.to_string()
}

fn default_cooldowns() -> BTreeMap<String, u32> {
    BTreeMap::from([("call".to_string(), 50), ("local".to_string(), 5 * 60)])
}

fn default_initial_cooldowns() -> BTreeMap<String, u32> {
    BTreeMap::from([("local".to_string(), 5 * 60)])
}

fn default_responded_cooldowns() -> BTreeMap<String, u32> {
    BTreeMap::from([("local".to_string(), 10 * 60)])
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_hold_ms(),
            dispatch_event: default_dispatch_event(),
            cooldowns: default_cooldowns(),
            initial_cooldowns: default_initial_cooldowns(),
            responded_cooldowns: default_responded_cooldowns(),
        }
    }
}

impl HoldConfig {
    /// Cooldown for a completed action (0 when not configured)
    pub fn cooldown_for(&self, action: &str) -> u32 {
        self.cooldowns.get(action).copied().unwrap_or(0)
    }
}

/// Key bindings for the death screen actions (matched case-insensitively)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_call_key")]
    pub call: String,
    #[serde(default = "default_local_key")]
    pub local: String,
}

fn default_call_key() -> String {
    "e".to_string()
}

fn default_local_key() -> String {
    "g".to_string()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            call: default_call_key(),
            local: default_local_key(),
        }
    }
}

/// Bounds for the injury editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryLimits {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

fn default_max_entries() -> usize {
    10
}

fn default_max_text_len() -> usize {
    80
}

impl Default for InjuryLimits {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_text_len: default_max_text_len(),
        }
    }
}

/// Toast queue tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default = "default_normal_ms")]
    pub normal_ms: u64,
    #[serde(default = "default_critical_ms")]
    pub critical_ms: u64,
}

fn default_max_visible() -> usize {
    5
}

fn default_normal_ms() -> u64 {
    5000
}

fn default_critical_ms() -> u64 {
    7000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            normal_ms: default_normal_ms(),
            critical_ms: default_critical_ms(),
        }
    }
}

fn default_fallback_resource() -> String {
    "lifeline".to_string()
}

/// Top-level overlay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Log every bridge request, response and inbound event
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub environment: Environment,

    /// Resource name used when the host accessor is unavailable
    #[serde(default = "default_fallback_resource")]
    pub fallback_resource: String,

    #[serde(default)]
    pub hold: HoldConfig,

    #[serde(default)]
    pub keys: KeyBindings,

    #[serde(default)]
    pub injuries: InjuryLimits,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            debug: false,
            environment: Environment::default(),
            fallback_resource: default_fallback_resource(),
            hold: HoldConfig::default(),
            keys: KeyBindings::default(),
            injuries: InjuryLimits::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn component_message_distinguishes_null_from_absent() {
        let absent: ComponentMessage =
            serde_json::from_value(json!({"componentId": "injuries", "action": "show"})).unwrap();
        assert_eq!(absent.data, None);

        let null: ComponentMessage = serde_json::from_value(
            json!({"componentId": "injuries", "action": "show", "data": null}),
        )
        .unwrap();
        assert_eq!(null.data, Some(Value::Null));
    }

    #[test]
    fn component_action_parse() {
        assert_eq!(ComponentAction::parse("update"), Some(ComponentAction::Update));
        assert_eq!(ComponentAction::parse("toggle"), None);
        assert_eq!(ComponentAction::Hide.as_str(), "hide");
    }

    #[test]
    fn allow_local_defaults_to_true() {
        let data: DeathScreenData = serde_json::from_value(json!({})).unwrap();
        assert!(data.allows_local());

        let data: DeathScreenData = serde_json::from_value(json!({"allowLocal": false})).unwrap();
        assert!(!data.allows_local());
    }

    #[test]
    fn hold_config_defaults() {
        let hold = HoldConfig::default();
        assert_eq!(hold.duration_ms, 2500);
        assert_eq!(hold.cooldown_for("call"), 50);
        assert_eq!(hold.cooldown_for("local"), 300);
        assert_eq!(hold.cooldown_for("unknown"), 0);
        assert_eq!(hold.initial_cooldowns.get("local"), Some(&300));
    }
}
