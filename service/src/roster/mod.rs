//! MP roster: reference data and local search.
//!
//! The roster is a read-only list of sitting Members of Parliament loaded
//! once at startup. [`search`] provides the local free-text path of the
//! resolver; the postal-code path lives in [`crate::resolver`].

mod search;
mod types;

pub use search::search;
pub use types::{Mp, ResolvedMp};
