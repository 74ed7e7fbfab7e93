pub mod dispatch;
pub mod install;
pub mod profile;
pub mod status;
pub mod uninstall;
