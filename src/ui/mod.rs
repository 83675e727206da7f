pub mod components;
pub mod render;
pub mod shell;
pub mod shortcuts;
