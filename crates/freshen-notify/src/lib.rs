//! Uniform failure notifications for freshen.
//!
//! Every anticipated failure in the workspace becomes an [`ErrorReport`]
//! delivered to a [`NotificationSink`], and the failed operation yields a
//! substitute value instead of an error. The mechanism is the [`Guard`]
//! combinator: an ordered list of `(error kind, handler)` arms, evaluated
//! first-declared-first. Errors matching no arm are returned unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use freshen_notify::{Guard, Handler, MemorySink, Notifier, Source};
//!
//! let sink = Arc::new(MemorySink::default());
//! let guard = Guard::<std::io::Error, usize>::new(Notifier::new(sink.clone()))
//!     .on(std::io::ErrorKind::NotFound, Handler::new("cacheLoad").message(Source::Display));
//!
//! let read = guard.run(|| Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")));
//!
//! assert_eq!(read.unwrap(), 0);
//! assert_eq!(sink.reports()[0].category, "cacheLoad");
//! ```

mod guard;
mod report;
mod sink;
mod source;

pub use guard::{Guard, Handler, TotalGuard};
pub use report::ErrorReport;
pub use sink::{FnSink, MemorySink, NotificationSink, Notifier, NullSink, TracingSink};
pub use source::{Classified, Source};
