//! Death screen controller
//!
//! Maps key and pointer input onto the hold engine and builds the button
//! view model. Two actions exist: `call` (summon player medics) and `local`
//! (take the NPC medics), the latter only when the host allows it.

use lifeline_types::{DeathScreenData, HoldConfig, KeyBindings};

use crate::hold::{Clock, HoldCooldownEngine, HoldRejected, HoldTicket};

pub const CALL: &str = "call";
pub const LOCAL: &str = "local";

const RESPONDED_TEXT: &str = "Help is on the way";

/// One rendered action button
#[derive(Debug, Clone, PartialEq)]
pub struct ActionButton {
    pub action: &'static str,
    pub label: String,
    pub disabled: bool,
    /// Fill percentage while this button's action is held
    pub progress: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DeathScreen {
    keys: KeyBindings,
    help_text: Option<String>,
}

impl DeathScreen {
    pub fn new(keys: &KeyBindings) -> Self {
        Self {
            keys: keys.clone(),
            help_text: None,
        }
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    /// Action bound to `key`, compared case-insensitively
    pub fn action_for_key(&self, key: &str) -> Option<&'static str> {
        if key.eq_ignore_ascii_case(&self.keys.call) {
            Some(CALL)
        } else if key.eq_ignore_ascii_case(&self.keys.local) {
            Some(LOCAL)
        } else {
            None
        }
    }

    /// Actions offered by the current panel data
    pub fn available_actions(data: &DeathScreenData) -> Vec<&'static str> {
        if data.allows_local() {
            vec![CALL, LOCAL]
        } else {
            vec![CALL]
        }
    }

    /// Start holding `action` from a pointer press or key press
    pub fn press<C: Clock>(
        &self,
        engine: &mut HoldCooldownEngine<C>,
        action: &str,
        data: &DeathScreenData,
    ) -> Result<HoldTicket, HoldRejected> {
        if action == LOCAL && !data.allows_local() {
            return Err(HoldRejected::ActionDisabled {
                action: action.to_string(),
            });
        }
        engine.begin_hold(action)
    }

    /// Key down: begin the bound action's hold.
    ///
    /// Keys only start holds while the screen is `visible`. Returns the ticket
    /// to drive frame ticks with; `None` for unbound keys, a hidden screen and
    /// rejected holds.
    pub fn key_down<C: Clock>(
        &self,
        engine: &mut HoldCooldownEngine<C>,
        key: &str,
        data: &DeathScreenData,
        visible: bool,
    ) -> Option<HoldTicket> {
        let action = self.action_for_key(key)?;
        if !visible {
            tracing::debug!(key, "death screen hidden, key ignored");
            return None;
        }
        match self.press(engine, action, data) {
            Ok(ticket) => Some(ticket),
            Err(rejected) => {
                tracing::debug!(key, reason = %rejected, "hold not started");
                None
            }
        }
    }

    /// Key up: release the bound action if it is the one held.
    ///
    /// Not gated on visibility: a hold started before the screen was hidden
    /// must still be releasable.
    pub fn key_up<C: Clock>(&self, engine: &mut HoldCooldownEngine<C>, key: &str) -> bool {
        self.action_for_key(key)
            .is_some_and(|action| engine.release(action))
    }

    /// Pointer up or pointer leaving a button: release whatever is held
    pub fn lift<C: Clock>(&self, engine: &mut HoldCooldownEngine<C>) -> bool {
        engine.release_any().is_some()
    }

    /// The host reports a responder accepted the call
    pub fn on_responded<C: Clock>(&mut self, engine: &mut HoldCooldownEngine<C>, hold: &HoldConfig) {
        self.help_text = Some(RESPONDED_TEXT.to_string());
        engine.apply_cooldowns(&hold.responded_cooldowns);
        tracing::info!("responder on the way");
    }

    pub fn buttons<C: Clock>(
        &self,
        engine: &HoldCooldownEngine<C>,
        data: &DeathScreenData,
    ) -> Vec<ActionButton> {
        Self::available_actions(data)
            .into_iter()
            .map(|action| {
                let remaining = engine.remaining_cooldown(action);
                let disabled = remaining > 0;
                let mut label = self.base_label(action);
                if disabled {
                    label.push_str(&format!(" ({})", format_countdown(remaining)));
                }
                let progress = (!disabled && engine.holding() == Some(action))
                    .then(|| engine.progress_for(action));
                ActionButton {
                    action,
                    label,
                    disabled,
                    progress,
                }
            })
            .collect()
    }

    fn base_label(&self, action: &str) -> String {
        match action {
            CALL => format!("[{}] Call Medics", self.keys.call.to_uppercase()),
            LOCAL => format!("[{}] Take Local Medics", self.keys.local.to_uppercase()),
            other => other.to_string(),
        }
    }
}

/// `m:ss` countdown label
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::hold::{ManualClock, Outbox, TickOutcome};

    fn setup() -> (DeathScreen, HoldCooldownEngine<ManualClock>, ManualClock, Outbox) {
        let clock = ManualClock::new();
        let outbox = Outbox::new();
        let hold = HoldConfig {
            initial_cooldowns: BTreeMap::new(),
            ..HoldConfig::default()
        };
        let engine = HoldCooldownEngine::new(clock.clone(), &hold, outbox.clone());
        (DeathScreen::new(&KeyBindings::default()), engine, clock, outbox)
    }

    #[test]
    fn countdown_format() {
        assert_eq!(format_countdown(300), "5:00");
        assert_eq!(format_countdown(50), "0:50");
        assert_eq!(format_countdown(61), "1:01");
    }

    #[test]
    fn keys_map_case_insensitively() {
        let (screen, ..) = setup();
        assert_eq!(screen.action_for_key("E"), Some(CALL));
        assert_eq!(screen.action_for_key("g"), Some(LOCAL));
        assert_eq!(screen.action_for_key("x"), None);
    }

    #[test]
    fn call_key_holds_and_commits() {
        let (screen, mut engine, clock, outbox) = setup();
        let data = DeathScreenData::default();

        let ticket = screen.key_down(&mut engine, "e", &data, true).unwrap();
        clock.advance_ms(2500);
        assert_eq!(
            engine.tick(ticket),
            TickOutcome::Completed {
                action: CALL.to_string()
            }
        );
        assert_eq!(outbox.drain()[0].payload["action"], "call");
    }

    #[test]
    fn key_down_while_holding_is_ignored() {
        let (screen, mut engine, _clock, _outbox) = setup();
        let data = DeathScreenData::default();

        screen.key_down(&mut engine, "e", &data, true).unwrap();
        assert!(screen.key_down(&mut engine, "g", &data, true).is_none());
        assert!(screen.key_down(&mut engine, "e", &data, true).is_none());
        assert_eq!(engine.holding(), Some(CALL));
    }

    #[test]
    fn key_up_only_releases_its_own_action() {
        let (screen, mut engine, _clock, _outbox) = setup();
        let data = DeathScreenData::default();

        screen.key_down(&mut engine, "g", &data, true).unwrap();
        assert!(!screen.key_up(&mut engine, "e"));
        assert!(screen.key_up(&mut engine, "G"));
        assert!(!engine.is_holding());
    }

    #[test]
    fn hidden_screen_ignores_key_down_but_not_key_up() {
        let (screen, mut engine, clock, outbox) = setup();
        let data = DeathScreenData::default();

        assert!(screen.key_down(&mut engine, "e", &data, false).is_none());
        assert!(!engine.is_holding());

        // Held while visible, released after the screen went away
        let ticket = screen.key_down(&mut engine, "e", &data, true).unwrap();
        clock.advance_ms(1000);
        engine.tick(ticket);
        assert!(screen.key_up(&mut engine, "e"));

        clock.advance_ms(2000);
        assert_eq!(engine.tick(ticket), TickOutcome::Stale);
        assert!(outbox.is_empty());
        assert!(engine.can_begin(CALL));
    }

    #[test]
    fn local_is_disabled_by_panel_data() {
        let (screen, mut engine, _clock, _outbox) = setup();
        let data = DeathScreenData {
            allow_local: Some(false),
        };

        assert!(screen.key_down(&mut engine, "g", &data, true).is_none());
        assert_eq!(
            screen.press(&mut engine, LOCAL, &data),
            Err(HoldRejected::ActionDisabled {
                action: LOCAL.to_string()
            })
        );
        let buttons = screen.buttons(&engine, &data);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].action, CALL);
    }

    #[test]
    fn lift_releases_any_hold() {
        let (screen, mut engine, _clock, _outbox) = setup();
        screen.press(&mut engine, CALL, &DeathScreenData::default()).unwrap();
        assert!(screen.lift(&mut engine));
        assert!(!screen.lift(&mut engine));
    }

    #[test]
    fn buttons_show_countdown_and_progress() {
        let (screen, mut engine, clock, _outbox) = setup();
        let data = DeathScreenData::default();
        engine.set_cooldown(LOCAL, 75);

        let ticket = screen.press(&mut engine, CALL, &data).unwrap();
        clock.advance_ms(1250);
        engine.tick(ticket);

        let buttons = screen.buttons(&engine, &data);
        assert_eq!(buttons[0].label, "[E] Call Medics");
        assert_eq!(buttons[0].progress, Some(50.0));
        assert!(!buttons[0].disabled);
        assert_eq!(buttons[1].label, "[G] Take Local Medics (1:15)");
        assert!(buttons[1].disabled);
        assert_eq!(buttons[1].progress, None);
    }

    #[test]
    fn responded_sets_help_text_and_local_cooldown() {
        let (mut screen, mut engine, _clock, _outbox) = setup();
        assert_eq!(screen.help_text(), None);

        screen.on_responded(&mut engine, &HoldConfig::default());
        assert_eq!(screen.help_text(), Some("Help is on the way"));
        assert_eq!(engine.remaining_cooldown(LOCAL), 600);
    }
}
