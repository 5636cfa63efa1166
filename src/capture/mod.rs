//! Capture source contract
//!
//! A capture source (browser selection, clipper, manual entry) hands the
//! scheduler a front/back text pair plus provenance metadata. The metadata is
//! stored for display and never interpreted by the scheduling core, with one
//! exception: when no back text is supplied, the surrounding text of the
//! capture is used as the answer side.

pub mod models;

pub use models::{CaptureContext, CaptureRequest};
