mod builder;
mod ghost;
mod hover;

pub use builder::{FormBuilderState, FormBuilderView, FormRowState, form_builder};
