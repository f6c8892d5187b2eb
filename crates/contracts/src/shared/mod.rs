pub mod date_picker;
