//! Chronoscope Query - temporal queries over containers of SOSA observations

pub mod fetch;
pub mod filter;
pub mod format;
pub mod index;
pub mod membership;
pub mod modal;
pub mod observation;
pub mod query;
pub mod temporal;
pub mod time;

pub use filter::{FilterOutcome, IntervalBounds, StructuralFilter};
pub use index::IndexRepresentationStore;
pub use membership::Membership;
pub use modal::ModalOperator;
pub use observation::ObservationRecord;
pub use query::{QuerySpec, ValueFilter};
pub use temporal::TemporalStore;
pub use time::IsoDuration;
