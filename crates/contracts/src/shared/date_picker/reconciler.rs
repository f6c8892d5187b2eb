//! State machine that keeps the public value, the native widget value and the
//! validation state of one date field in step.
//!
//! Every operation returns the [`Command`]s the UI layer has to apply. Values
//! written by the reconciler come back as change notifications from the host
//! (public value) or the widget (native value); one-shot echo guards per
//! representation swallow those so an update never re-enters its own origin.

use super::codec;
use super::config::DatePickerConfig;
use super::overlay::OverlayHandle;
use super::validation::{validate, ValidationError, ValidationState};
use super::value::{parse_public, DateValue};

/// Side effect requested by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand a new public value to the host.
    PublishValue(String),
    PublishValidation(ValidationState),
    PublishOpened(bool),
    /// Put a value into the calendar and the text field.
    WriteNative(Option<DateValue>),
    /// Show the display text of the native value in the text field.
    RefreshText,
    PushActiveOverlay(OverlayHandle),
    RemoveActiveOverlay(OverlayHandle),
    /// Refocus the text field once the popup has rendered.
    ScheduleFocus(Ticket),
    CancelFocus,
}

/// Opened-state transition a deferred action was scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct EchoGuards {
    /// Public value published by the reconciler, not yet echoed by the host.
    public: Option<String>,
    /// Native value written by the reconciler, not yet echoed by the widget.
    native: Option<Option<DateValue>>,
}

#[derive(Debug)]
pub struct ValueReconciler {
    handle: OverlayHandle,
    config: DatePickerConfig,
    value: String,
    native: Option<DateValue>,
    validation: ValidationState,
    opened: bool,
    transition: u64,
    focus_pending: bool,
    guards: EchoGuards,
}

impl ValueReconciler {
    pub fn new(config: DatePickerConfig) -> Self {
        Self::with_handle(OverlayHandle::new(), config)
    }

    pub fn with_handle(handle: OverlayHandle, config: DatePickerConfig) -> Self {
        Self {
            handle,
            config,
            value: String::new(),
            native: None,
            validation: ValidationState::valid(),
            opened: false,
            transition: 0,
            focus_pending: false,
            guards: EchoGuards::default(),
        }
    }

    pub fn handle(&self) -> OverlayHandle {
        self.handle
    }

    pub fn config(&self) -> &DatePickerConfig {
        &self.config
    }

    /// Public value (`YYYY-MM-DD` or empty).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Date of the public value.
    pub fn date(&self) -> Option<DateValue> {
        parse_public(&self.value).map(DateValue::from)
    }

    /// Value currently held by the native widget. May differ from the public
    /// value after a rejected input.
    pub fn native(&self) -> Option<DateValue> {
        self.native
    }

    pub fn has_value(&self) -> bool {
        self.native.is_some()
    }

    /// Public value in the configured display pattern.
    pub fn formatted_value(&self) -> String {
        self.date()
            .and_then(|date| self.format(&date))
            .unwrap_or_default()
    }

    /// Text the field shows for the native value.
    pub fn display_text(&self) -> String {
        self.native
            .and_then(|date| self.format(&date))
            .unwrap_or_default()
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn is_invalid(&self) -> bool {
        self.validation.invalid
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Ticket of the current opened-state transition.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.transition)
    }

    fn format(&self, date: &DateValue) -> Option<String> {
        codec::format(date, &self.config.format, &self.config.locale)
    }

    /// The host assigned the public value.
    ///
    /// The value is pushed to the native widget and validated, but never
    /// rewritten here even if it is invalid: the host keeps what it wrote.
    pub fn set_public_value(&mut self, value: &str) -> Vec<Command> {
        if let Some(echo) = self.guards.public.take() {
            if echo == value {
                log::debug!("date picker {}: public echo {value:?} ignored", self.handle);
                return Vec::new();
            }
        }
        if value == self.value {
            return Vec::new();
        }

        let mut commands = Vec::new();
        let date = parse_public(value).map(DateValue::from);
        match date {
            Some(_) => self.value = value.to_string(),
            None if value.trim().is_empty() => self.value = String::new(),
            None => {
                log::warn!(
                    "date picker {}: host value {value:?} is not a YYYY-MM-DD date, clearing",
                    self.handle
                );
                self.value = String::new();
                self.guards.public = Some(String::new());
                commands.push(Command::PublishValue(String::new()));
            }
        }

        log::debug!("date picker {}: host set value {:?}", self.handle, self.value);
        commands.extend(self.write_native(date));
        commands
    }

    /// The user picked a date in the calendar or typed into the field.
    ///
    /// A valid date is committed as the public value. An invalid or missing
    /// one clears the public value and records the error; the widget keeps
    /// whatever the user entered.
    pub fn on_native_value_changed(&mut self, native: Option<DateValue>) -> Vec<Command> {
        if let Some(echo) = self.guards.native.take() {
            if echo == native {
                log::debug!("date picker {}: native echo ignored", self.handle);
                return Vec::new();
            }
        }
        // Also covers the absent -> absent notification a fresh widget sends.
        if native == self.native {
            return Vec::new();
        }

        self.native = native;
        let mut commands = Vec::new();
        let outcome = self.run_validation(&mut commands);

        let public = match outcome {
            Ok(()) => native.and_then(|date| date.to_public()).unwrap_or_default(),
            Err(error) => {
                log::debug!("date picker {}: rejected input: {error}", self.handle);
                String::new()
            }
        };
        commands.extend(self.commit_public(public));
        commands
    }

    /// The calendar reported a value. Our own writes come back here too;
    /// anything else is a user pick, which is committed and closes the popup.
    pub fn on_calendar_picked(&mut self, picked: Option<DateValue>) -> Vec<Command> {
        if picked == self.native {
            return self.on_native_value_changed(picked);
        }

        let mut commands = self.on_native_value_changed(picked);
        commands.push(Command::RefreshText);
        commands.extend(self.close());
        commands
    }

    /// Clear affordance: empties the value without touching the popup.
    ///
    /// The widget is always reset, even when it holds no date, so text that
    /// never parsed is wiped as well.
    pub fn clear(&mut self) -> Vec<Command> {
        let mut commands = self.commit_public(String::new());
        if self.native.is_some() {
            commands.extend(self.write_native(None));
        } else {
            commands.push(Command::WriteNative(None));
        }
        commands
    }

    /// Validate the current value regardless of interaction, as a host form
    /// does before submitting.
    pub fn validate(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        let _ = self.run_validation(&mut commands);
        commands
    }

    pub fn open(&mut self) -> Vec<Command> {
        if self.opened {
            return Vec::new();
        }
        if !self.config.is_interactive() {
            log::debug!("date picker {}: open suppressed", self.handle);
            return Vec::new();
        }

        self.opened = true;
        self.transition += 1;

        let mut commands = vec![
            Command::PublishOpened(true),
            Command::PushActiveOverlay(self.handle),
        ];
        if self.focus_pending {
            commands.push(Command::CancelFocus);
        }
        self.focus_pending = true;
        commands.push(Command::ScheduleFocus(self.ticket()));
        commands
    }

    pub fn close(&mut self) -> Vec<Command> {
        if !self.opened {
            return Vec::new();
        }

        self.opened = false;
        self.transition += 1;

        let mut commands = vec![
            Command::PublishOpened(false),
            Command::RemoveActiveOverlay(self.handle),
        ];
        if self.focus_pending {
            self.focus_pending = false;
            commands.push(Command::CancelFocus);
        }
        commands
    }

    pub fn toggle(&mut self) -> Vec<Command> {
        if self.opened {
            self.close()
        } else {
            self.open()
        }
    }

    /// Close scheduled under `ticket`; dropped if the popup changed state since.
    pub fn close_if_current(&mut self, ticket: Ticket) -> Vec<Command> {
        if ticket != self.ticket() {
            log::debug!("date picker {}: stale close dropped", self.handle);
            return Vec::new();
        }
        self.close()
    }

    /// Whether the refocus scheduled under `ticket` should run now. Returns
    /// true at most once per opening.
    pub fn complete_focus(&mut self, ticket: Ticket) -> bool {
        if self.opened && self.focus_pending && ticket == self.ticket() {
            self.focus_pending = false;
            true
        } else {
            false
        }
    }

    /// Disabling closes the popup; it never validates.
    pub fn set_disabled(&mut self, disabled: bool) -> Vec<Command> {
        self.config.disabled = disabled;
        if disabled {
            self.close()
        } else {
            Vec::new()
        }
    }

    /// Replace the configuration. New bounds and messages apply from the next
    /// validation pass.
    pub fn configure(&mut self, config: DatePickerConfig) -> Vec<Command> {
        if config == self.config {
            return Vec::new();
        }
        self.config = config;
        if self.config.is_interactive() {
            Vec::new()
        } else {
            self.close()
        }
    }

    fn write_native(&mut self, date: Option<DateValue>) -> Vec<Command> {
        if self.native == date {
            return Vec::new();
        }
        self.native = date;
        self.guards.native = Some(date);

        let mut commands = vec![Command::WriteNative(date)];
        let _ = self.run_validation(&mut commands);
        commands
    }

    fn commit_public(&mut self, value: String) -> Vec<Command> {
        if value == self.value {
            return Vec::new();
        }
        log::debug!("date picker {}: committing value {value:?}", self.handle);
        self.value = value.clone();
        self.guards.public = Some(value.clone());
        vec![Command::PublishValue(value)]
    }

    fn run_validation(&mut self, commands: &mut Vec<Command>) -> Result<(), ValidationError> {
        let outcome = validate(
            self.native.as_ref(),
            self.config.required,
            &self.config.bounds(),
        );
        let state = ValidationState::from_outcome(outcome, &self.config.messages);
        if state != self.validation {
            self.validation = state.clone();
            commands.push(Command::PublishValidation(state));
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::date_picker::validation::ValidationMessages;

    fn bounded() -> DatePickerConfig {
        DatePickerConfig {
            minimum_date: Some("2024-01-01".to_string()),
            maximum_date: Some("2024-12-31".to_string()),
            ..DatePickerConfig::default()
        }
    }

    fn published_value(commands: &[Command]) -> Option<&str> {
        commands.iter().find_map(|c| match c {
            Command::PublishValue(v) => Some(v.as_str()),
            _ => None,
        })
    }

    fn count(commands: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_host_value_within_bounds() {
        let mut picker = ValueReconciler::new(bounded());
        let commands = picker.set_public_value("2024-06-15");

        assert_eq!(
            commands,
            vec![Command::WriteNative(Some(DateValue::new(2024, 5, 15)))]
        );
        assert!(!picker.is_invalid());
        assert_eq!(picker.value(), "2024-06-15");
        assert_eq!(picker.formatted_value(), "15-06-2024");
        assert_eq!(picker.display_text(), "15-06-2024");
    }

    #[test]
    fn test_host_value_above_maximum() {
        let mut picker = ValueReconciler::new(bounded());
        let commands = picker.set_public_value("2025-01-01");

        let messages = ValidationMessages::default();
        assert!(picker.is_invalid());
        assert_eq!(
            picker.validation().error_message.as_deref(),
            Some(messages.maximum.as_str())
        );
        // the host keeps what it wrote
        assert_eq!(published_value(&commands), None);
        assert_eq!(picker.value(), "2025-01-01");
    }

    #[test]
    fn test_host_clears_required_value() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.set_public_value("2024-06-15");
        picker.set_public_value("");

        assert!(picker.is_invalid());
        assert_eq!(
            picker.validation().error_message.as_deref(),
            Some(ValidationMessages::default().required.as_str())
        );
        assert_eq!(picker.formatted_value(), "");
    }

    #[test]
    fn test_pristine_control_is_not_flagged() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        assert!(picker.set_public_value("").is_empty());
        assert!(picker.on_native_value_changed(None).is_empty());
        assert!(!picker.is_invalid());

        let commands = picker.validate();
        assert!(picker.is_invalid());
        assert_eq!(count(&commands, |c| matches!(c, Command::PublishValidation(_))), 1);
    }

    #[test]
    fn test_same_public_value_propagates_once() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        let first = picker.set_public_value("2024-06-15");
        let second = picker.set_public_value("2024-06-15");

        assert_eq!(count(&first, |c| matches!(c, Command::WriteNative(_))), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_native_echo_of_host_write_is_ignored() {
        let mut picker = ValueReconciler::new(bounded());
        let commands = picker.set_public_value("2024-06-15");
        let Some(Command::WriteNative(written)) = commands.first().cloned() else {
            panic!("expected a native write, got {commands:?}");
        };

        assert!(picker.on_native_value_changed(written).is_empty());
        assert_eq!(picker.value(), "2024-06-15");
    }

    #[test]
    fn test_user_pick_commits_value() {
        let mut picker = ValueReconciler::new(bounded());
        let commands = picker.on_native_value_changed(Some(DateValue::new(2024, 2, 10)));

        assert_eq!(commands, vec![Command::PublishValue("2024-03-10".to_string())]);
        assert_eq!(picker.value(), "2024-03-10");
        assert!(!picker.is_invalid());

        // the host echoes the published value back
        assert!(picker.set_public_value("2024-03-10").is_empty());
    }

    #[test]
    fn test_user_pick_out_of_bounds_clears_public_value() {
        let mut picker = ValueReconciler::new(bounded());
        picker.on_native_value_changed(Some(DateValue::new(2024, 2, 10)));
        let commands = picker.on_native_value_changed(Some(DateValue::new(2023, 11, 31)));

        assert_eq!(published_value(&commands), Some(""));
        assert!(picker.is_invalid());
        assert_eq!(
            picker.validation().error_message.as_deref(),
            Some(ValidationMessages::default().minimum.as_str())
        );
        // the widget keeps the rejected date
        assert_eq!(picker.native(), Some(DateValue::new(2023, 11, 31)));
        assert!(!commands.iter().any(|c| matches!(c, Command::WriteNative(_))));
    }

    #[test]
    fn test_typed_impossible_date() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.on_native_value_changed(codec::parse("10/10/2024"));
        let commands = picker.on_native_value_changed(codec::parse("31/02/2024"));

        assert_eq!(published_value(&commands), Some(""));
        assert!(picker.validation().invalid);
        assert_eq!(picker.validation().error_message, None);
        assert_eq!(picker.display_text(), "");
    }

    #[test]
    fn test_typed_text_commits_and_formats() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.on_native_value_changed(codec::parse("01022024"));

        assert_eq!(picker.native(), Some(DateValue::new(2024, 1, 1)));
        assert_eq!(picker.value(), "2024-02-01");
        assert_eq!(picker.display_text(), "01-02-2024");
    }

    #[test]
    fn test_unparseable_text_is_required_missing() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.on_native_value_changed(codec::parse("15/06/2024"));
        picker.on_native_value_changed(codec::parse("15/06"));

        assert_eq!(picker.value(), "");
        assert_eq!(
            picker.validation().error_message.as_deref(),
            Some(ValidationMessages::default().required.as_str())
        );
    }

    #[test]
    fn test_optional_field_accepts_empty() {
        let config = DatePickerConfig {
            required: false,
            ..DatePickerConfig::default()
        };
        let mut picker = ValueReconciler::new(config);
        picker.set_public_value("2024-06-15");
        picker.set_public_value("");
        assert!(!picker.is_invalid());
    }

    #[test]
    fn test_garbage_host_value_is_cleared() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.set_public_value("2024-06-15");
        let commands = picker.set_public_value("next tuesday");

        assert_eq!(published_value(&commands), Some(""));
        assert_eq!(picker.value(), "");
        assert!(commands.contains(&Command::WriteNative(None)));
        // the correction echoes back without another round
        assert!(picker.set_public_value("").is_empty());
    }

    #[test]
    fn test_clear_keeps_popup_state() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.set_public_value("2024-06-15");
        picker.open();

        let commands = picker.clear();
        assert!(picker.is_opened());
        assert!(!commands.iter().any(|c| matches!(c, Command::PublishOpened(_))));
        assert_eq!(published_value(&commands), Some(""));
        assert!(commands.contains(&Command::WriteNative(None)));
        assert!(picker.is_invalid());
        assert!(!picker.has_value());

        picker.close();
        picker.clear();
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_clear_after_unparseable_text_resets_field() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.on_native_value_changed(codec::parse("15/06/2024"));
        picker.on_native_value_changed(codec::parse("15/06/20"));
        assert_eq!(picker.value(), "");
        assert_eq!(picker.native(), None);

        let commands = picker.clear();
        assert!(commands.contains(&Command::WriteNative(None)));
        assert_eq!(published_value(&commands), None);
        assert_eq!(picker.display_text(), "");

        // The calendar echoes the reset; nothing else happens.
        assert!(picker.on_calendar_picked(None).is_empty());
    }

    #[test]
    fn test_calendar_echo_of_host_write_keeps_popup_open() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.open();
        picker.set_public_value("2024-06-15");

        let commands = picker.on_calendar_picked(Some(DateValue::new(2024, 5, 15)));
        assert!(commands.is_empty());
        assert!(picker.is_opened());
    }

    #[test]
    fn test_calendar_pick_commits_and_closes() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.open();

        let commands = picker.on_calendar_picked(Some(DateValue::new(2024, 5, 15)));
        assert_eq!(published_value(&commands), Some("2024-06-15"));
        assert!(commands.contains(&Command::RefreshText));
        assert!(commands.contains(&Command::PublishOpened(false)));
        assert!(!picker.is_opened());
        assert_eq!(picker.display_text(), "15-06-2024");
    }

    #[test]
    fn test_calendar_pick_while_closed_does_not_reopen() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        let commands = picker.on_calendar_picked(Some(DateValue::new(2024, 5, 15)));
        assert_eq!(published_value(&commands), Some("2024-06-15"));
        assert!(!commands.iter().any(|c| matches!(c, Command::PublishOpened(_))));
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_open_while_disabled() {
        let config = DatePickerConfig {
            disabled: true,
            ..DatePickerConfig::default()
        };
        let mut picker = ValueReconciler::new(config);
        assert!(picker.open().is_empty());
        assert!(picker.toggle().is_empty());
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_open_while_readonly() {
        let config = DatePickerConfig {
            readonly: true,
            ..DatePickerConfig::default()
        };
        let mut picker = ValueReconciler::new(config);
        assert!(picker.open().is_empty());
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_disable_forces_close_without_validation() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.open();

        let commands = picker.set_disabled(true);
        assert!(!picker.is_opened());
        assert!(commands.contains(&Command::PublishOpened(false)));
        assert!(!commands.iter().any(|c| matches!(c, Command::PublishValidation(_))));
        assert!(!picker.is_invalid());

        // already closed: still closed, nothing to do
        assert!(picker.set_disabled(true).is_empty());
        assert!(!picker.is_opened());

        picker.set_disabled(false);
        picker.open();
        assert!(picker.is_opened());
    }

    #[test]
    fn test_configure_disabled_closes() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.open();
        let commands = picker.configure(DatePickerConfig {
            disabled: true,
            ..DatePickerConfig::default()
        });
        assert!(commands.contains(&Command::PublishOpened(false)));
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_new_bounds_apply_on_next_validation() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.set_public_value("2025-01-01");
        assert!(!picker.is_invalid());

        let commands = picker.configure(bounded());
        assert!(commands.is_empty());
        assert!(!picker.is_invalid());

        picker.validate();
        assert!(picker.is_invalid());
    }

    #[test]
    fn test_open_registers_overlay_and_schedules_focus() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        let handle = picker.handle();

        let commands = picker.open();
        let ticket = picker.ticket();
        assert_eq!(
            commands,
            vec![
                Command::PublishOpened(true),
                Command::PushActiveOverlay(handle),
                Command::ScheduleFocus(ticket),
            ]
        );

        assert!(picker.complete_focus(ticket));
        assert!(!picker.complete_focus(ticket));

        let commands = picker.close();
        assert_eq!(
            commands,
            vec![
                Command::PublishOpened(false),
                Command::RemoveActiveOverlay(handle),
            ]
        );
    }

    #[test]
    fn test_rapid_toggle_cancels_stale_focus() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.toggle();
        let stale = picker.ticket();

        let commands = picker.toggle();
        assert!(commands.contains(&Command::CancelFocus));
        picker.toggle();
        let current = picker.ticket();

        assert_ne!(stale, current);
        assert!(!picker.complete_focus(stale));
        assert!(picker.complete_focus(current));
    }

    #[test]
    fn test_stale_deferred_close_is_dropped() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        picker.open();
        let ticket = picker.ticket();

        picker.close();
        picker.open();
        assert!(picker.close_if_current(ticket).is_empty());
        assert!(picker.is_opened());

        let current = picker.ticket();
        assert!(!picker.close_if_current(current).is_empty());
        assert!(!picker.is_opened());
    }

    #[test]
    fn test_redundant_open_close() {
        let mut picker = ValueReconciler::new(DatePickerConfig::default());
        assert!(picker.close().is_empty());
        picker.open();
        assert!(picker.open().is_empty());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut picker = ValueReconciler::new(bounded());
        picker.on_native_value_changed(Some(DateValue::new(2024, 0, 1)));
        assert!(!picker.is_invalid());
        assert_eq!(picker.value(), "2024-01-01");
        picker.on_native_value_changed(Some(DateValue::new(2024, 11, 31)));
        assert!(!picker.is_invalid());
        assert_eq!(picker.value(), "2024-12-31");
    }

    #[test]
    fn test_custom_format() {
        let config = DatePickerConfig {
            format: "YYYY/MM/DD".to_string(),
            ..DatePickerConfig::default()
        };
        let mut picker = ValueReconciler::new(config);
        picker.set_public_value("2024-06-15");
        assert_eq!(picker.formatted_value(), "2024/06/15");
    }
}
