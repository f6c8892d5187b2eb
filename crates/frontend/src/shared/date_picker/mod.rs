//! Date field with a typed text input and a calendar popup.
//!
//! The host form owns a `RwSignal<String>` holding the date as `YYYY-MM-DD`
//! (empty when unset) and hands it to a `DatePickerController`. The
//! `DatePicker` component renders the field and keeps the text input, the
//! calendar and the host value in step.

pub mod controller;
pub mod focus;
pub mod popup;

pub use controller::DatePickerController;
pub use popup::CalendarPopup;

use crate::shared::icons::icon;
use contracts::shared::date_picker::{DatePickerConfig, OverlayHandle};
use leptos::ev;
use leptos::prelude::*;

#[component]
pub fn DatePicker(
    controller: DatePickerController,
    /// Display pattern, bounds, messages and locale.
    #[prop(optional, into)]
    config: Signal<DatePickerConfig>,
    /// Called with the popup's handle each time it is pushed onto the overlay stack.
    #[prop(optional)]
    on_overlay_opened: Option<Callback<OverlayHandle>>,
) -> impl IntoView {
    controller.set_on_overlay_opened(on_overlay_opened);
    controller.configure(config.get_untracked());

    Effect::new(move |_| {
        let config = config.get();
        controller.configure(config);
    });

    // Host writes to the public value.
    Effect::new(move |_| {
        let value = controller.value();
        controller.sync_from_host(&value);
    });

    // Calendar picks, and our own writes echoing back.
    Effect::new(move |_| {
        let picked = controller.calendar_date();
        controller.on_calendar_changed(picked);
    });

    let escape = window_event_listener(ev::keydown, move |ev: ev::KeyboardEvent| {
        if ev.key() == "Escape" && controller.closes_on_escape() {
            controller.close();
        }
    });
    on_cleanup(move || {
        escape.remove();
        controller.detach();
    });

    let disabled = Signal::derive(move || controller.settings(|c| c.disabled));
    let readonly = Signal::derive(move || controller.settings(|c| c.readonly));
    let interactive = Signal::derive(move || controller.settings(|c| c.is_interactive()));
    let placeholder = move || controller.settings(|c| c.input_placeholder.clone().unwrap_or_default());
    let tooltip = move || controller.settings(|c| c.tooltip.clone());
    let required = move || controller.settings(|c| c.required);

    let field_style = move || {
        let border = if controller.invalid() {
            "var(--colorPaletteRedBorder2, #d13438)"
        } else {
            "var(--colorNeutralStroke1, #d1d1d1)"
        };
        format!(
            "position: relative; display: flex; align-items: center; gap: 4px; \
             padding: 0 4px 0 12px; border: 1px solid {border}; \
             border-radius: var(--borderRadiusMedium, 4px); \
             background: var(--colorNeutralBackground1, #fff);"
        )
    };

    let on_clear = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        controller.clear();
    };
    let on_toggle = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        controller.toggle();
    };

    view! {
        <div class="date-picker" title=tooltip>
            <Show when=move || !placeholder().is_empty()>
                <label class="date-picker__label" style="display: block; margin-bottom: 4px; font-size: 0.875rem;">
                    {placeholder}
                    <Show when=required>
                        <span style="color: var(--colorPaletteRedForeground1, #d13438);">" *"</span>
                    </Show>
                </label>
            </Show>
            <div
                class="date-picker__field"
                style=field_style
                on:click=move |_| controller.open()
            >
                <input
                    node_ref=controller.input_ref()
                    type="text"
                    inputmode="numeric"
                    autocomplete="off"
                    prop:value=move || controller.text()
                    prop:disabled=disabled
                    prop:readonly=readonly
                    aria-invalid=move || controller.invalid().to_string()
                    on:input=move |ev| controller.type_text(event_target_value(&ev))
                    on:change=move |_| controller.normalize_text()
                    style="flex: 1; min-width: 0; border: none; outline: none; background: transparent; \
                           padding: 6px 0; font-size: 0.875rem; color: var(--colorNeutralForeground1, #242424);"
                />
                <Show when=move || controller.has_value() && interactive.get()>
                    <button
                        type="button"
                        class="date-picker__clear"
                        aria-label="clear"
                        on:click=on_clear
                        style="display: flex; border: none; background: none; padding: 4px; cursor: pointer;"
                    >
                        {icon("times")}
                    </button>
                </Show>
                <button
                    type="button"
                    class="date-picker__toggle"
                    aria-label="calendar"
                    prop:disabled=move || !interactive.get()
                    on:click=on_toggle
                    style="display: flex; border: none; background: none; padding: 4px; cursor: pointer;"
                >
                    {icon("calendar")}
                </button>
                <Show when=move || controller.is_opened()>
                    <CalendarPopup controller=controller />
                </Show>
            </div>
            <Show when=move || controller.invalid()>
                <div
                    class="date-picker__error"
                    style="margin-top: 4px; font-size: 0.75rem; color: var(--colorPaletteRedForeground1, #d13438);"
                >
                    {move || controller.error_message().unwrap_or_default()}
                </div>
            </Show>
        </div>
    }
}
