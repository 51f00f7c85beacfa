//! Cart Observer

use std::num::NonZeroU32;

use crate::catalog::MenuItemId;

/// A state change reported by the cart after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// A line was created or its quantity replaced.
    LineChanged {
        /// Item whose line changed
        item_id: MenuItemId,

        /// Quantity now stored for the line
        quantity: NonZeroU32,
    },

    /// A line was deleted.
    LineRemoved {
        /// Item whose line was deleted
        item_id: MenuItemId,
    },

    /// Every line was deleted at once.
    Cleared,
}

/// Receives cart change notifications.
///
/// The presentation layer implements this to re-render counters, badges and
/// totals whenever the ledger changes, instead of the ledger reaching into the
/// view. Mutations that leave the cart as it was do not notify.
pub trait CartObserver {
    /// Called after every effective cart mutation.
    fn on_change(&mut self, event: CartEvent);
}

/// Observer that ignores every notification.
///
/// Used when no observer is provided; the calls compile away.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn on_change(&mut self, _event: CartEvent) {}
}

impl<T: CartObserver + ?Sized> CartObserver for Box<T> {
    fn on_change(&mut self, event: CartEvent) {
        (**self).on_change(event);
    }
}
