//! Device drivers using platform abstraction

pub mod modem;
