//! Single owner of the current cart snapshot and its task-scoped provider.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tokio::task_local;

use super::{CartAction, CartState, NewCartItem};
use crate::error::CartError;

task_local! {
    static CURRENT_CART: Arc<CartStore>;
}

/// Holds the current [`CartState`] and applies actions in dispatch order.
///
/// Readers get an `Arc` snapshot that never changes underneath them;
/// dispatch swaps in a new snapshot while holding the lock, so concurrent
/// dispatches are serialized and none is lost.
#[derive(Debug, Default)]
pub struct CartStore {
    state: Mutex<Arc<CartState>>,
}

impl CartStore {
    /// Store holding an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> MutexGuard<'_, Arc<CartState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `action` and return the resulting snapshot.
    pub fn dispatch(&self, action: CartAction) -> Arc<CartState> {
        let mut current = self.current();
        let next = Arc::new(current.reduce(action));
        *current = Arc::clone(&next);
        next
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CartState> {
        Arc::clone(&self.current())
    }

    pub fn add_item(&self, item: NewCartItem) -> Arc<CartState> {
        self.dispatch(CartAction::Add(item))
    }

    pub fn remove_item(&self, id: impl Into<String>) -> Arc<CartState> {
        self.dispatch(CartAction::Remove(id.into()))
    }

    pub fn set_quantity(&self, id: impl Into<String>, quantity: i64) -> Arc<CartState> {
        self.dispatch(CartAction::SetQuantity(id.into(), quantity))
    }

    pub fn clear(&self) -> Arc<CartState> {
        self.dispatch(CartAction::Clear)
    }

    /// Subtotal of the current snapshot.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.snapshot().subtotal()
    }
}

/// Makes a [`CartStore`] reachable through [`use_cart`] for the duration
/// of a task or closure.
#[derive(Debug, Clone, Copy)]
pub struct CartProvider;

impl CartProvider {
    /// Run `future` with `store` as the current cart.
    pub async fn scope<F: Future>(store: Arc<CartStore>, future: F) -> F::Output {
        CURRENT_CART.scope(store, future).await
    }

    /// Run `f` synchronously with `store` as the current cart.
    pub fn sync_scope<R>(store: Arc<CartStore>, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(store, f)
    }
}

/// The cart of the enclosing [`CartProvider`] scope.
///
/// # Errors
///
/// Returns `CartError::NotInitialized` outside a provider scope.
pub fn use_cart() -> Result<Arc<CartStore>, CartError> {
    CURRENT_CART
        .try_with(Arc::clone)
        .map_err(|_| CartError::NotInitialized)
}
