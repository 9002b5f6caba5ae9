pub mod access;
pub mod files;
pub mod hooks;
pub mod ui;
