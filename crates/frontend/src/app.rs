use crate::shared::date_picker::{DatePicker, DatePickerController};
use crate::shared::overlay_stack::OverlayStackService;
use contracts::shared::date_picker::config::DEFAULT_CONFIG;
use contracts::shared::date_picker::{DatePickerConfig, OverlayHandle};
use leptos::prelude::*;
use thaw::*;

const START_CONFIG: &str = r#"
{
    "required": true,
    "format": "DD-MM-YYYY",
    "minimum_date": "2000-01-01",
    "input_placeholder": "Data de início",
    "tooltip": "Primeiro dia do período"
}
"#;

const END_CONFIG: &str = r#"
{
    "required": false,
    "format": "DD/MM/YYYY",
    "input_placeholder": "Data de término"
}
"#;

fn load_config(name: &str, json: &str) -> DatePickerConfig {
    match DatePickerConfig::from_json(json) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{name}: {e:#}, falling back to defaults");
            DatePickerConfig::from_json(DEFAULT_CONFIG).unwrap_or_default()
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Popups from every date field on the page share one stack.
    provide_context(OverlayStackService::new());

    view! {
        <PeriodForm />
    }
}

#[component]
fn PeriodForm() -> impl IntoView {
    let stack = use_context::<OverlayStackService>();

    let start_value = RwSignal::new(String::new());
    let end_value = RwSignal::new(String::new());
    let start = DatePickerController::new(start_value);
    let end = DatePickerController::new(end_value);

    let disabled = RwSignal::new(false);
    let start_base = load_config("start", START_CONFIG);
    let end_base = load_config("end", END_CONFIG);

    let start_config = Signal::stored(start_base);
    // The end of the period may not precede its start. The start field is
    // disabled through its controller, the end field through its config.
    let end_config = Signal::derive(move || {
        let minimum = start_value.get();
        DatePickerConfig {
            disabled: disabled.get(),
            minimum_date: (!minimum.is_empty()).then_some(minimum),
            ..end_base.clone()
        }
    });

    let on_overlay_opened = Callback::new(move |handle: OverlayHandle| {
        log::debug!("date popup {handle} opened");
    });

    let validate_all = move |_: leptos::ev::MouseEvent| {
        let start_ok = start.validate();
        let end_ok = end.validate();
        log::info!("period valid: {}", start_ok && end_ok);
    };

    view! {
        <Flex vertical=true gap=FlexGap::Large attr:style="max-width: 360px; padding: 24px;">
            <DatePicker controller=start config=start_config on_overlay_opened=on_overlay_opened />
            <DatePicker controller=end config=end_config on_overlay_opened=on_overlay_opened />

            <Flex gap=FlexGap::Small>
                <Button appearance=ButtonAppearance::Primary on_click=validate_all>
                    "Validar"
                </Button>
                <Button appearance=ButtonAppearance::Subtle on_click=move |_| start.open()>
                    "Abrir início"
                </Button>
                <Button appearance=ButtonAppearance::Subtle on_click=move |_| end.clear()>
                    "Limpar término"
                </Button>
                <Button
                    appearance=ButtonAppearance::Subtle
                    on_click=move |_| {
                        disabled.update(|d| *d = !*d);
                        if disabled.get_untracked() {
                            start.disable();
                        } else {
                            start.enable();
                        }
                    }
                >
                    {move || if disabled.get() { "Habilitar" } else { "Desabilitar" }}
                </Button>
            </Flex>

            <div style="font-size: 0.875rem; font-family: monospace;">
                <div>{move || format!("start: {:?} ({})", start.value(), start.formatted_value())}</div>
                <div>{move || format!("end: {:?} ({})", end.value(), end.formatted_value())}</div>
                <div>
                    {move || format!("invalid: start={} end={}", start.invalid(), end.invalid())}
                </div>
                <div>
                    {move || format!("open popups: {}", stack.map_or(0, |s| s.len()))}
                </div>
            </div>
        </Flex>
    }
}
