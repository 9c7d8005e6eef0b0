pub mod bridge;
pub mod config;
pub mod dev;
pub mod hold;
pub mod panels;
pub mod registry;

// Re-exports for convenience
pub use bridge::{
    Bridge, BridgeError, Detached, Dispatcher, FixedResource, HostEnvironment, HttpTransport,
    LoopbackTransport, ProtocolError, RecordedRequest, Subscription, Transport,
};
pub use config::{ConfigError, OverlayConfigExt};
pub use hold::{
    ActionSink, BridgeSink, Clock, HoldCooldownEngine, HoldRejected, HoldState, HoldTicket,
    LocalTask, ManualClock, Outbox, TickOutcome,
};
pub use panels::{DeathScreen, InjuryList, Inventory, NotificationQueue};
pub use registry::{PanelChange, PanelRegistry, RegistryBinding, SharedRegistry};
pub use lifeline_types as types;
