//! Infrastructure layer: owns scarce resources (the live page), exposes
//! capabilities only.

pub mod form_page;

pub use form_page::{CdpPage, FormPage, CONTROL_WAIT};
