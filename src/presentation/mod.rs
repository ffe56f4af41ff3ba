//! State containers for the list and detail screens.
//!
//! Each view model publishes immutable snapshots through a
//! [`tokio::sync::watch`] channel. Async work runs on a [`TaskScope`] owned
//! by the view model, so dropping the view model cancels it.

mod detail;
mod main_screen;
mod scope;

pub use detail::{DetailState, DetailViewModel};
pub use main_screen::{MainState, MainViewModel};
pub use scope::TaskScope;

use tokio::sync::watch;

/// Replaces the current snapshot with `f(current)`.
fn replace_state<S: Default>(state: &watch::Sender<S>, f: impl FnOnce(S) -> S) {
    state.send_modify(|current| *current = f(std::mem::take(current)));
}
