//! UI Components
//!
//! One component per panel. Each reads the shared [`Overlay`](crate::app::Overlay)
//! state and renders nothing while its panel is hidden.

pub mod deathscreen;
pub mod injuries;
pub mod inventory;
pub mod main_panel;
pub mod toast;

pub use deathscreen::DeathScreenPanel;
pub use injuries::InjuriesPanel;
pub use inventory::InventoryPanel;
pub use main_panel::MainPanel;
pub use toast::ToastFrame;
