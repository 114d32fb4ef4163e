//! # roomctl-domain
//!
//! Pure domain model for the roomctl audiovisual control system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Rooms** (an immutable snapshot of the devices in one room)
//! - Define **Device configs** (address, driver, and declared ports/blocks)
//! - Define **Device state** (sparse, optional-per-field desired/achieved state)
//! - Define **Responses** (achieved state plus a sorted, field-level error report)
//! - Define the stable **field paths** used in error reports
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod field;
pub mod id;

pub mod response;
pub mod room;
pub mod state;
