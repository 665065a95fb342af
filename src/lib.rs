pub mod commands;
pub mod delete;
pub mod validate;
