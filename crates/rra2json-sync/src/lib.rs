//! Delivery of RRA records to downstream systems, and follow-up bugs for
//! incomplete ones.
//!
//! [`DirectorySink`] is always available; the HTTP sinks and the Bugzilla
//! client need the `http` feature.

mod error;
pub use error::SyncError;

pub mod event;
pub mod sink;
pub use event::event_envelope;
pub use sink::{Delivery, DirectorySink, Sink};

#[cfg(feature = "http")]
pub mod bugzilla;
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use bugzilla::{BugzillaClient, NagAction, NagOutcome, Rotation, nag, open_nag, plan_nag};
#[cfg(feature = "http")]
pub use http::{EventBusClient, ServiceMapClient};
