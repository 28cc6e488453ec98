//! Client module for comment requests.
//!
//! - [`Comments`] — The entry point, bound to an [`Environment`] and a base path
//! - [`CommentsBuilder`] — Fluent builder for configuring the client
//! - [`PreparedAction`] — Fluent builder for a single request
//!
//! # Operations
//!
//! | Constructor | Kind | Result |
//! |-------------|------|--------|
//! | [`Comments::comment`] / [`Comments::reply`] | insert | server response |
//! | [`Comments::update`] | update | server response |
//! | [`Comments::remove`] / [`Comments::delete`] | delete | server response |
//! | [`Comments::count`] | count | server response |
//! | [`Comments::find`] | resolved by `.of()`/`.by()`/`.on()` | first match or `null` |
//! | [`Comments::find_all`] | resolved by `.of()`/`.by()`/`.on()` | all matches |
//! | [`Comments::find_root`] | root lookup, needs `.on()` | first match or `null` |
//! | [`Comments::find_root_all`] | root lookup, needs `.on()` | all matches |

mod action;
mod comments;
mod sink;
pub mod transition;

pub use action::PreparedAction;
pub use comments::{Comments, CommentsBuilder, ENV_ORIGIN, ENV_PATH, Environment, normalize_path};
pub use sink::{Callback, Pending};
pub use transition::{Modifier, Transition, Warning};
