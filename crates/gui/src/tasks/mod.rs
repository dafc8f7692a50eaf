#![forbid(unsafe_code)]

pub mod actions;
pub mod load;
pub mod region;
