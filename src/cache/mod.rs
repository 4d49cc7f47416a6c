//! In-memory query caching for the session.
//!
//! This module provides an endpoint-agnostic caching mechanism that:
//! - accumulates paginated results into one entry under a stable key
//! - serves identical requests from cache and coalesces in-flight duplicates
//! - applies completions in dispatch order, not arrival order
//! - retains prior data alongside a fetch error (stale-while-error)
//! - disposes entries when their last subscriber goes away
//!
//! It also hosts the pagination state machine and the debounced search input
//! that drive the breed list, and the simpler one-shot `Query` used by detail
//! views.

mod debounce;
mod pager;
mod query;
mod store;

pub use debounce::DebouncedInput;
pub use pager::{PageRequest, Pager, PagerState};
pub use query::{Query, QueryState};
pub use store::{CacheEntry, EntryStatus, MergeMode, QueryCache};
