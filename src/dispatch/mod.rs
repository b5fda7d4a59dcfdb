//! Dispatch engine - delivers published entries to matching handlers.
//!
//! ## Architecture
//!
//! ```text
//!  publish([e1, e2, …])
//!        │  join_all (one future per entry)
//!        ▼
//!  ┌───────────────────────────────┐
//!  │ deliver(e)                    │
//!  │  RuleStore::list  (snapshot)  │
//!  │  filter matcher::matches      │
//!  │  join_all Invoker::invoke     │──► handler A
//!  │                               │──► handler B
//!  └───────────────────────────────┘
//!        │
//!        ▼
//!  DeliveryReport { Entries (input order), FailedEntryCount }
//! ```

mod dispatcher;
mod error;
mod invoker;
mod report;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, InvokeError};
pub use invoker::{InvocationTarget, Invoker, LambdaInvoker};
pub use report::{
    DeliveryReport, EntryOutcome, FailedInvocation, Invocation, INVOCATION_FAILED,
    MALFORMED_ENTRY,
};
