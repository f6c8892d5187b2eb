//! Date field core: value reconciliation, validation and the date codec.
//!
//! Nothing here touches the DOM. The frontend owns a [`ValueReconciler`] per
//! control and applies the [`Command`]s it returns.

pub mod codec;
pub mod config;
pub mod locale;
pub mod overlay;
pub mod reconciler;
pub mod validation;
pub mod value;

pub use config::DatePickerConfig;
pub use locale::Locale;
pub use overlay::{OverlayHandle, OverlayRegistry, OverlayStack};
pub use reconciler::{Command, Ticket, ValueReconciler};
pub use validation::{Bounds, ValidationError, ValidationMessages, ValidationState};
pub use value::DateValue;
