//! Change notification for renderers.

use medcart_core::ledger::{Ledger, LedgerChange, Totals};

/// Called after every committed ledger mutation.
///
/// The ledger and totals passed in are the committed state, so a renderer
/// can redraw from them directly.
pub trait LedgerObserver: Send {
    fn on_change(&mut self, change: &LedgerChange, ledger: &Ledger, totals: &Totals);
}

impl<F> LedgerObserver for F
where
    F: FnMut(&LedgerChange, &Ledger, &Totals) + Send,
{
    fn on_change(&mut self, change: &LedgerChange, ledger: &Ledger, totals: &Totals) {
        self(change, ledger, totals)
    }
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    list: Vec<Box<dyn LedgerObserver>>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: Box<dyn LedgerObserver>) {
        self.list.push(observer);
    }

    pub(crate) fn notify(&mut self, change: &LedgerChange, ledger: &Ledger, totals: &Totals) {
        for observer in &mut self.list {
            observer.on_change(change, ledger, totals);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}
