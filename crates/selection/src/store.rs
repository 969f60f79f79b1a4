use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use foundation::years::YearDomain;
use tracing::debug;

use crate::state::{InvalidSelectionRequest, SelectionPatch, SelectionRequest, SelectionState};

type Callback = Rc<dyn Fn(&SelectionState)>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

struct StoreInner {
    state: RefCell<SelectionState>,
    years: RefCell<Option<YearDomain>>,
    subscribers: RefCell<Vec<Subscriber>>,
    queue: RefCell<VecDeque<SelectionPatch>>,
    notifying: Cell<bool>,
    next_id: Cell<u64>,
}

/// Result of [`SelectionStore::set`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The state changed and every subscriber has been notified.
    Applied,
    /// The merged state equals the current one; nobody was notified.
    Unchanged,
    /// Called from inside a notification; the patch runs after the current
    /// notification cycle completes.
    Queued,
}

/// Shared handle to the one selection state.
///
/// Cloning the handle shares the same store. Notification is synchronous:
/// a non-idempotent [`set`](Self::set) calls every subscriber, in subscription
/// order, before it returns. A `set` issued from inside a subscriber callback
/// is queued and applied once the running cycle has finished, so updates are
/// delivered one at a time and in the order they were requested.
#[derive(Clone)]
pub struct SelectionStore {
    inner: Rc<StoreInner>,
}

/// Non-owning store handle for subscribers that need to write back.
#[derive(Clone)]
pub struct WeakSelectionStore {
    inner: Weak<StoreInner>,
}

impl WeakSelectionStore {
    pub fn upgrade(&self) -> Option<SelectionStore> {
        self.inner.upgrade().map(|inner| SelectionStore { inner })
    }
}

#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Removes the subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.store.upgrade() else {
            return false;
        };
        let mut subs = inner.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != self.id);
        subs.len() != before
    }
}

/// Clears the notifying flag even if a subscriber panics.
struct NotifyGuard<'a>(&'a Cell<bool>);

impl<'a> NotifyGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SelectionStore {
    pub fn new(initial: SelectionState) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                years: RefCell::new(None),
                subscribers: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakSelectionStore {
        WeakSelectionStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Snapshot copy of the current state.
    pub fn get(&self) -> SelectionState {
        *self.inner.state.borrow()
    }

    pub fn year_domain(&self) -> Option<YearDomain> {
        self.inner.years.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Registers the dataset's year set.
    ///
    /// From now on requested years are clamped to the nearest member. A focus
    /// year outside the domain moves to the latest year.
    pub fn install_year_domain(&self, domain: YearDomain) -> SetOutcome {
        let latest = domain.latest();
        let current = self.get().focus_year;
        let needs_snap = !domain.contains(current);
        *self.inner.years.borrow_mut() = Some(domain);
        if needs_snap {
            return self.set(SelectionPatch::new().year(latest));
        }
        SetOutcome::Unchanged
    }

    /// Merges `patch` into the state and notifies subscribers if anything
    /// changed.
    pub fn set(&self, patch: SelectionPatch) -> SetOutcome {
        if self.inner.notifying.get() {
            debug!(?patch, "selection update queued behind running notification");
            self.inner.queue.borrow_mut().push_back(patch);
            return SetOutcome::Queued;
        }
        match self.apply(&patch) {
            Some(state) => {
                self.notify_until_settled(state);
                SetOutcome::Applied
            }
            None => SetOutcome::Unchanged,
        }
    }

    /// Validates an untyped request, then behaves like [`set`](Self::set).
    ///
    /// An invalid request leaves the state untouched.
    pub fn set_request(
        &self,
        req: &SelectionRequest,
    ) -> Result<SetOutcome, InvalidSelectionRequest> {
        let patch = SelectionPatch::try_from(req)?;
        Ok(self.set(patch))
    }

    pub fn subscribe(&self, callback: impl Fn(&SelectionState) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            callback: Rc::new(callback),
        });
        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
        }
    }

    /// Merges and stores; returns the new state when it differs.
    fn apply(&self, patch: &SelectionPatch) -> Option<SelectionState> {
        let mut patch = *patch;
        if let (Some(year), Some(domain)) = (patch.year, self.inner.years.borrow().as_ref()) {
            let clamped = domain.nearest(year);
            if clamped != year {
                debug!(requested = year, clamped, "focus year clamped to dataset years");
            }
            patch.year = Some(clamped);
        }

        let mut state = self.inner.state.borrow_mut();
        let merged = state.merged(&patch);
        if merged == *state {
            return None;
        }
        *state = merged;
        Some(merged)
    }

    fn notify_until_settled(&self, first: SelectionState) {
        let _guard = NotifyGuard::enter(&self.inner.notifying);
        let mut next = Some(first);
        while let Some(state) = next.take() {
            self.notify(&state);
            loop {
                let queued = self.inner.queue.borrow_mut().pop_front();
                let Some(patch) = queued else {
                    break;
                };
                if let Some(changed) = self.apply(&patch) {
                    next = Some(changed);
                    break;
                }
            }
        }
    }

    fn notify(&self, state: &SelectionState) {
        let snapshot: Vec<(u64, Callback)> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| (s.id, Rc::clone(&s.callback)))
            .collect();
        for (id, callback) in snapshot {
            let still_subscribed = self.inner.subscribers.borrow().iter().any(|s| s.id == id);
            if still_subscribed {
                callback(state);
            }
        }
    }
}
