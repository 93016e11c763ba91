//! shotpipe: Screenshot capture, region selection and delivery
//!
//! This library implements the core of a desktop screenshot utility. A
//! trigger action captures the display under the cursor, optionally lets the
//! user select a region on a frozen overlay, then saves the result locally
//! and/or uploads it over FTP, copying the final location to the clipboard
//! and notifying the user.
//!
//! The entry point is [`orchestrator::CaptureOrchestrator`].

pub mod capture;
pub mod config;
pub mod delivery;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod selection;
pub mod util;
