//! Change notification between market data and the objects priced off it.
//!
//! Market data (volatilities, quotes) is shared read-only between many
//! pricers and coupons. When it changes, dependents are not recomputed:
//! they only have a dirty flag raised and recompute on their next read.
//!
//! # Components
//!
//! - [`Observable`]: list of weak references to dependents
//! - [`Observer`]: receiver of change notifications
//! - [`DirtyFlag`]: observer that records "something upstream changed"
//! - [`Handle`]: shared, relinkable, possibly empty reference to a
//!   collaborator that relays its notifications
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pricer_core::observable::{DirtyFlag, Observable, Observer};
//!
//! let upstream = Observable::new();
//! let flag = DirtyFlag::new();
//! flag.clear();
//!
//! let weak: std::sync::Weak<dyn Observer> = Arc::downgrade(&flag) as _;
//! upstream.register_observer(weak);
//! upstream.notify_observers();
//!
//! assert!(flag.is_dirty());
//! ```

mod handle;
mod observer;

pub use handle::Handle;
pub use observer::{DirtyFlag, Observable, Observe, Observer};
