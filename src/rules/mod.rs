//! Rules - registered filters bound to handlers.
//!
//! ## Architecture
//!
//! ```text
//! SubscriptionRequest ──rules()──► NewRule ──RuleStore::register──► Rule { id, … }
//!                                                      │
//!                                     RuleStore::list ─┴─► Vec<Arc<Rule>> (snapshot)
//! ```
//!
//! The store is the only shared mutable state in the bus. Patterns are
//! parsed into [`PatternValue`] trees when a rule is registered, so matching
//! never has to inspect raw JSON shapes.

mod error;
mod pattern;
mod rule;
mod store;
mod subscription;

pub use error::{PatternError, RegistrationError, StoreError};
pub use pattern::{Pattern, PatternValue};
pub(crate) use pattern::json_kind;
pub use rule::{NewRule, Rule, RuleId};
pub use store::RuleStore;
pub use subscription::{RegistrationOutcome, SubscriptionRequest};
