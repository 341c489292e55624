pub mod hook;
pub mod install;
pub mod open;
pub mod status;
pub mod uninstall;
