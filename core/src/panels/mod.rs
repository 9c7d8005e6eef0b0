//! Per-panel view models
//!
//! Pure state for the panels the overlay ships with. The UI layer owns
//! rendering and scheduling; these types own the rules.

pub mod deathscreen;
pub mod injuries;
pub mod inventory;
pub mod notification;

pub use deathscreen::{ActionButton, DeathScreen, format_countdown};
pub use injuries::{Injury, InjuryList};
pub use inventory::{Inventory, InventoryItem};
pub use notification::{NotificationQueue, Toast};
