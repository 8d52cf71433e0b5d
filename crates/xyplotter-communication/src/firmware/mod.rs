//! Firmware protocol support
//!
//! Only GRBL-compatible controllers are driven: one command line in, one
//! acknowledgment line out.

pub mod grbl;
