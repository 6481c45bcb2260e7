use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The modal dialogs the client drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogId {
    Login,
    Register,
    EditUser,
}

/// Per-dialog visibility. Dialogs are independent: there is no mutual
/// exclusion and no global "active dialog" notion; opening one never closes
/// another.
#[derive(Default)]
pub struct DialogManager {
    visible: Mutex<HashSet<DialogId>>,
}

impl DialogManager {
    pub fn open(&self, id: DialogId) {
        self.guard().insert(id);
    }

    pub fn close(&self, id: DialogId) {
        self.guard().remove(&id);
    }

    pub fn is_open(&self, id: DialogId) -> bool {
        self.guard().contains(&id)
    }

    /// Boundary dismissal: a pointer interaction closes the dialog only when
    /// it landed on the backdrop rather than the dialog content.
    pub fn backdrop_click(&self, id: DialogId, on_backdrop: bool) {
        if on_backdrop {
            self.close(id);
        }
    }

    fn guard(&self) -> MutexGuard<'_, HashSet<DialogId>> {
        self.visible.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
