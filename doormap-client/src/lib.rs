//! # Doormap Client Library
//!
//! Read-side consumer of the aggregate API. Deployed map backends disagree
//! on response envelopes and coordinate field names, so this crate fetches
//! through an ordered list of endpoint candidates and normalizes whatever
//! comes back into one canonical record type, falling back to a configured
//! default location rather than failing a fetch outright.
//!
//! Also hosts the edit-session state machine used by create/edit forms.

pub mod error;
pub mod fetch;
pub mod normalize;
pub mod session;

pub use error::{ClientError, Result};
pub use fetch::AggregateFetcher;
pub use normalize::NormalizedAggregate;
pub use session::{AggregateDraft, EditSession, SessionState};
