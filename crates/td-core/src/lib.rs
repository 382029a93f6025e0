//! td-core: stable foundation for the technology diffusion engine.
//!
//! Contains:
//! - ids (region/sector/enduse/technology identifiers, fuel carriers, years)
//! - keys (explicit composite keys for share and parameter tables)
//! - numeric (tolerances, share and capacity sum checks)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod keys;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use keys::*;
pub use numeric::*;
