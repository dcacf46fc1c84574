pub mod form_builder;
pub mod logging;
