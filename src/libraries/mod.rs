//! Common helper libraries

pub mod hex;
