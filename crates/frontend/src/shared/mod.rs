pub mod date_picker;
pub mod icons;
pub mod overlay_stack;
