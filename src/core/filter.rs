//! Filter-gated handler groups.
//!
//! Every `append_if` call creates one [`Gate`] shared by all the handlers it
//! appends. The gate's predicate is evaluated at most once per run, by the
//! first member of the group that would actually run; the result is kept in
//! the run's [`FilterFlags`] and every other member of the group reuses it,
//! whatever its kind.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

/// Identifies the handlers appended by one `append_if` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u32);

/// Predicate plus group identity attached to filtered handlers
pub(crate) struct Gate<Req> {
    group: GroupId,
    filter: Rc<dyn Fn(&Req) -> bool>,
}

impl<Req> Gate<Req> {
    pub(crate) fn new(group: GroupId, filter: Rc<dyn Fn(&Req) -> bool>) -> Self {
        Self { group, filter }
    }

    pub(crate) fn group(&self) -> GroupId {
        self.group
    }
}

impl<Req> Clone for Gate<Req> {
    fn clone(&self) -> Self {
        Self {
            group: self.group,
            filter: Rc::clone(&self.filter),
        }
    }
}

impl<Req> fmt::Debug for Gate<Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate").field("group", &self.group).finish_non_exhaustive()
    }
}

/// Per-run table of evaluated filter results
#[derive(Debug, Default)]
pub(crate) struct FilterFlags {
    values: RefCell<HashMap<GroupId, bool>>,
}

impl FilterFlags {
    /// Whether `gate` lets its handlers run for `request`
    ///
    /// The predicate runs only the first time a group is asked about.
    pub(crate) fn is_open<Req>(&self, gate: &Gate<Req>, request: &Req) -> bool {
        if let Some(open) = self.values.borrow().get(&gate.group) {
            return *open;
        }

        let open = (gate.filter)(request);
        tracing::debug!(group = gate.group.0, open, "filter evaluated");
        self.values.borrow_mut().insert(gate.group, open);
        open
    }

    #[cfg(test)]
    pub(crate) fn get(&self, group: GroupId) -> Option<bool> {
        self.values.borrow().get(&group).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn predicate_runs_once_per_group() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let gate = Gate::new(
            GroupId(0),
            Rc::new(move |req: &u32| {
                counter.set(counter.get() + 1);
                *req > 10
            }),
        );
        let flags = FilterFlags::default();

        assert_eq!(flags.get(GroupId(0)), None);
        assert!(flags.is_open(&gate, &42));
        assert!(flags.is_open(&gate, &0));
        assert_eq!(calls.get(), 1);
        assert_eq!(flags.get(GroupId(0)), Some(true));
    }

    #[test]
    fn groups_are_independent() {
        let open = Gate::new(GroupId(1), Rc::new(|_: &u32| true));
        let closed = Gate::new(GroupId(2), Rc::new(|_: &u32| false));
        let flags = FilterFlags::default();

        assert!(flags.is_open(&open, &0));
        assert!(!flags.is_open(&closed, &0));
        assert_eq!(flags.get(GroupId(1)), Some(true));
        assert_eq!(flags.get(GroupId(2)), Some(false));
    }
}
