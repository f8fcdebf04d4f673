pub mod chomsky_normal_form;
pub mod context_free;
pub mod loader;
pub mod types;
