use leptos::ev;
use leptos::prelude::*;
use thaw::*;

use super::controller::DatePickerController;

/// Calendar popup (backdrop + positioned surface) for one `DatePicker`.
///
/// Clicking the backdrop closes the popup, but only when both the press and
/// the release landed on the backdrop itself.
#[component]
pub fn CalendarPopup(
    controller: DatePickerController,
) -> impl IntoView {
    let backdrop_mouse_down = RwSignal::new(false);

    let is_direct_backdrop_event = |ev: &ev::MouseEvent| -> bool {
        match (ev.target(), ev.current_target()) {
            (Some(t), Some(ct)) => t == ct,
            _ => false,
        }
    };

    let handle_mouse_down = move |ev: ev::MouseEvent| {
        backdrop_mouse_down.set(is_direct_backdrop_event(&ev));
    };

    let handle_click = move |ev: ev::MouseEvent| {
        let should_close = backdrop_mouse_down.get_untracked() && is_direct_backdrop_event(&ev);
        backdrop_mouse_down.set(false);
        if should_close {
            // The backdrop is removed by the close; let its own click finish dispatching first.
            controller.close_deferred();
        }
    };

    let stop_propagation = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
    };

    let caption = move || {
        let date = controller.calendar_date();
        controller.settings(|c| date.map(|d| c.locale.caption(d)).unwrap_or_default())
    };

    let today_allowed = move || {
        let today = chrono::Local::now().date_naive();
        controller.settings(|c| c.bounds().contains(today))
    };

    let backdrop_style = move || {
        format!(
            "position: fixed; inset: 0; background: transparent; z-index: {};",
            controller.z_index()
        )
    };
    let surface_style = move || {
        format!(
            "position: absolute; top: calc(100% + 4px); left: 0; z-index: {}; \
             background: var(--colorNeutralBackground1, #fff); \
             border: 1px solid var(--colorNeutralStroke1, #d1d1d1); \
             border-radius: var(--borderRadiusMedium, 4px); \
             box-shadow: var(--shadow16, 0 8px 16px rgba(0,0,0,0.14)); \
             padding: 8px; min-width: 280px;",
            controller.z_index() + 1
        )
    };

    view! {
        <div
            class="date-picker-backdrop"
            style=backdrop_style
            on:mousedown=handle_mouse_down
            on:click=handle_click
        ></div>
        <div class="date-picker-popup" style=surface_style on:click=stop_propagation>
            <div class="date-picker-popup__caption" style="font-weight: 600; padding: 4px 8px;">
                {caption}
            </div>
            <Calendar value=controller.calendar_signal() />
            <Flex justify=FlexJustify::End gap=FlexGap::Small>
                <Button
                    size=ButtonSize::Small
                    appearance=ButtonAppearance::Subtle
                    disabled=Signal::derive(move || !today_allowed())
                    on_click=move |_| controller.pick_today()
                >
                    {move || controller.settings(|c| c.locale.today.clone())}
                </Button>
                <Button
                    size=ButtonSize::Small
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| controller.close()
                >
                    {move || controller.settings(|c| c.locale.cancel.clone())}
                </Button>
            </Flex>
        </div>
    }
}
