pub mod format;
pub mod home;
pub mod panels;
pub mod plot;
