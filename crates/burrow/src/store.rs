// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Thread-local storage for cache entries.
//!
//! Every thread owns a private registry mapping `(namespace, value type)` to
//! an independent store. Handles on different threads therefore never observe
//! each other's entries, and no locking is involved anywhere.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::entry::Entry;

/// A single namespace's entries on the calling thread.
pub(crate) type Store<V> = HashMap<String, Entry<V>>;

/// Registry key. Including the value type makes a namespace reused with two
/// different value types two distinct stores rather than a downcast failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StoreKey {
    namespace: Arc<str>,
    values: TypeId,
}

thread_local! {
    static REGISTRY: RefCell<HashMap<StoreKey, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Runs `f` with exclusive access to the calling thread's store for
/// `namespace`, creating the store on first touch.
///
/// The registry is borrowed for the duration of `f`, so `f` must not invoke
/// cache operations itself; callers run user code (fetch producers) strictly
/// outside of this scope.
pub(crate) fn with_store<V, R>(namespace: &Arc<str>, f: impl FnOnce(&mut Store<V>) -> R) -> R
where
    V: 'static,
{
    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let slot = registry
            .entry(StoreKey {
                namespace: Arc::clone(namespace),
                values: TypeId::of::<V>(),
            })
            .or_insert_with(|| Box::new(Store::<V>::new()));
        let store = slot.downcast_mut::<Store<V>>().expect("registry slots are keyed by value type");
        f(store)
    })
}
