#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Networking: outbound peer client and roster loading.

pub mod client;
pub mod peers;
