#![forbid(unsafe_code)]

pub mod cards;
pub mod modals;
pub mod stats;
pub mod statusbar;
pub mod toasts;
pub mod topbar;
pub mod updates;
