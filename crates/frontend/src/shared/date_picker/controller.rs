use chrono::{Local, NaiveDate};
use contracts::shared::date_picker::codec;
use contracts::shared::date_picker::value::parse_public;
use contracts::shared::date_picker::{
    Command, DatePickerConfig, DateValue, OverlayHandle, OverlayRegistry, Ticket,
    ValidationState, ValueReconciler,
};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::focus::FocusScheduler;
use crate::shared::overlay_stack::{z_index_for, OverlayStackService};

/// State of one date field, shared between the host form and `DatePicker`.
///
/// The host owns the public value signal and may read it, write it, or call
/// the imperative actions (`open`, `close`, `toggle`, `clear`, `validate`,
/// `disable`, `enable`).
/// Everything else is driven by the `ValueReconciler` inside.
#[derive(Clone, Copy)]
pub struct DatePickerController {
    reconciler: StoredValue<ValueReconciler>,
    handle: OverlayHandle,
    value: RwSignal<String>,
    config: RwSignal<DatePickerConfig>,
    text: RwSignal<String>,
    calendar: RwSignal<Option<NaiveDate>>,
    has_value: RwSignal<bool>,
    validation: RwSignal<ValidationState>,
    opened: RwSignal<bool>,
    input_ref: NodeRef<leptos::html::Input>,
    stack: Option<OverlayStackService>,
    focus: FocusScheduler,
    on_overlay_opened: StoredValue<Option<Callback<OverlayHandle>>>,
}

impl DatePickerController {
    /// Create a controller bound to the host's value signal.
    ///
    /// Picks up the `OverlayStackService` from context when one is provided.
    pub fn new(value: RwSignal<String>) -> Self {
        let reconciler = ValueReconciler::new(DatePickerConfig::default());
        let handle = reconciler.handle();
        let stack = use_context::<OverlayStackService>();
        if stack.is_none() {
            log::warn!("date picker {handle}: no OverlayStackService in context, popups will not stack");
        }

        Self {
            reconciler: StoredValue::new(reconciler),
            handle,
            value,
            config: RwSignal::new(DatePickerConfig::default()),
            text: RwSignal::new(String::new()),
            calendar: RwSignal::new(None),
            has_value: RwSignal::new(false),
            validation: RwSignal::new(ValidationState::valid()),
            opened: RwSignal::new(false),
            input_ref: NodeRef::new(),
            stack,
            focus: FocusScheduler::new(),
            on_overlay_opened: StoredValue::new(None),
        }
    }

    pub fn handle(&self) -> OverlayHandle {
        self.handle
    }

    // ----- reactive reads -----

    pub fn value(&self) -> String {
        self.value.get()
    }

    /// Public value in the configured display pattern.
    pub fn formatted_value(&self) -> String {
        let value = self.value.get();
        self.config.with(|config| {
            parse_public(&value)
                .and_then(|date| codec::format(&DateValue::from(date), &config.format, &config.locale))
                .unwrap_or_default()
        })
    }

    pub fn invalid(&self) -> bool {
        self.validation.with(|v| v.invalid)
    }

    pub fn error_message(&self) -> Option<String> {
        self.validation.with(|v| v.error_message.clone())
    }

    pub fn is_opened(&self) -> bool {
        self.opened.get()
    }

    /// Whether the field holds anything the clear affordance can remove.
    pub fn has_value(&self) -> bool {
        self.has_value.get()
    }

    pub fn text(&self) -> String {
        self.text.get()
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.calendar.get()
    }

    pub fn z_index(&self) -> i32 {
        match self.stack {
            Some(stack) => stack.z_index(self.handle),
            None => z_index_for(None),
        }
    }

    pub(super) fn calendar_signal(&self) -> RwSignal<Option<NaiveDate>> {
        self.calendar
    }

    pub(super) fn input_ref(&self) -> NodeRef<leptos::html::Input> {
        self.input_ref
    }

    pub(super) fn is_topmost(&self) -> bool {
        self.stack
            .map_or(true, |stack| stack.is_topmost(self.handle))
    }

    /// Escape closes the popup only when it is open and above every other popup.
    pub(super) fn closes_on_escape(&self) -> bool {
        let opened = self
            .reconciler
            .try_with_value(|r| r.is_opened())
            .unwrap_or(false);
        opened && self.is_topmost()
    }

    // ----- imperative actions -----

    pub fn open(&self) {
        self.run(|r| r.open());
    }

    pub fn close(&self) {
        self.run(|r| r.close());
    }

    pub fn toggle(&self) {
        self.run(|r| r.toggle());
    }

    pub fn clear(&self) {
        self.run(|r| r.clear());
    }

    /// Force a validation pass and report the result.
    pub fn validate(&self) -> bool {
        self.run(|r| r.validate());
        !self.validation.get_untracked().invalid
    }

    /// Disable the field. Closes the popup; never validates.
    pub fn disable(&self) {
        self.set_disabled(true);
    }

    pub fn enable(&self) {
        self.set_disabled(false);
    }

    /// Select today's date as if the user had clicked it.
    pub fn pick_today(&self) {
        self.calendar.set(Some(Local::now().date_naive()));
    }

    // ----- wiring used by the component -----

    pub(super) fn configure(&self, config: DatePickerConfig) {
        if self.config.with_untracked(|current| *current != config) {
            self.config.set(config.clone());
        }
        self.run(move |r| r.configure(config));
    }

    /// Read the active configuration, reactively.
    pub(super) fn settings<T>(&self, f: impl FnOnce(&DatePickerConfig) -> T) -> T {
        self.config.with(f)
    }

    // Lasts until the host's config signal next changes.
    fn set_disabled(&self, disabled: bool) {
        if self.config.with_untracked(|c| c.disabled != disabled) {
            self.config.update(|c| c.disabled = disabled);
        }
        self.run(|r| r.set_disabled(disabled));
    }

    pub(super) fn set_on_overlay_opened(&self, callback: Option<Callback<OverlayHandle>>) {
        let _ = self.on_overlay_opened.try_set_value(callback);
    }

    /// The host value signal changed.
    pub(super) fn sync_from_host(&self, value: &str) {
        self.run(|r| r.set_public_value(value));
    }

    /// The user typed into the text field.
    pub(super) fn type_text(&self, text: String) {
        let parsed = codec::parse(&text);
        self.text.set(text);
        self.run(|r| r.on_native_value_changed(parsed));

        // Let the calendar follow a complete, real date.
        if let Some(date) = parsed.and_then(|d| d.to_naive()) {
            if self.calendar.get_untracked() != Some(date) {
                self.calendar.set(Some(date));
            }
        }
    }

    /// Replace typed text with the formatted date once the user leaves the field.
    pub(super) fn normalize_text(&self) {
        let display = self
            .reconciler
            .try_with_value(|r| r.display_text())
            .unwrap_or_default();
        if !display.is_empty() && self.text.get_untracked() != display {
            self.text.set(display);
        }
    }

    /// The calendar value changed, either by our own write or by a user pick.
    pub(super) fn on_calendar_changed(&self, picked: Option<NaiveDate>) {
        let picked = picked.map(DateValue::from);
        self.run(|r| r.on_calendar_picked(picked));
    }

    /// Close after the current event has finished dispatching.
    pub(super) fn close_deferred(&self) {
        let Some(ticket) = self.reconciler.try_with_value(|r| r.ticket()) else {
            return;
        };
        let this = *self;
        spawn_local(async move {
            TimeoutFuture::new(0).await;
            this.run(|r| r.close_if_current(ticket));
        });
    }

    /// The component is going away; drop any overlay registration.
    pub(super) fn detach(&self) {
        self.run(|r| r.close());
    }

    fn run(&self, op: impl FnOnce(&mut ValueReconciler) -> Vec<Command>) {
        let Some((commands, has_value)) = self.reconciler.try_update_value(|r| {
            let commands = op(r);
            (commands, r.has_value())
        }) else {
            return;
        };

        if self.has_value.get_untracked() != has_value {
            self.has_value.set(has_value);
        }
        self.apply(commands);
    }

    fn apply(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::PublishValue(value) => self.value.set(value),
                Command::PublishValidation(state) => self.validation.set(state),
                Command::PublishOpened(opened) => self.opened.set(opened),
                Command::WriteNative(date) => {
                    self.refresh_text();
                    self.calendar.set(date.and_then(|d| d.to_naive()));
                }
                Command::RefreshText => self.refresh_text(),
                Command::PushActiveOverlay(handle) => {
                    if let Some(stack) = self.stack {
                        stack.push_active(handle);
                    }
                    if let Some(callback) = self.on_overlay_opened.try_get_value().flatten() {
                        callback.run(handle);
                    }
                }
                Command::RemoveActiveOverlay(handle) => {
                    if let Some(stack) = self.stack {
                        stack.remove_active(handle);
                    }
                }
                Command::ScheduleFocus(ticket) => self.schedule_focus(ticket),
                Command::CancelFocus => self.focus.cancel(),
            }
        }
    }

    fn refresh_text(&self) {
        let display = self
            .reconciler
            .try_with_value(|r| r.display_text())
            .unwrap_or_default();
        self.text.set(display);
    }

    fn schedule_focus(&self, ticket: Ticket) {
        let this = *self;
        self.focus.schedule(move || {
            let due = this
                .reconciler
                .try_update_value(|r| r.complete_focus(ticket))
                .unwrap_or(false);
            if due {
                this.refocus_input();
            }
        });
    }

    // Blur first so the browser fires a fresh focus even if the field kept it.
    fn refocus_input(&self) {
        if let Some(input) = self.input_ref.get_untracked() {
            let _ = input.blur();
            let _ = input.focus();
        }
    }
}
