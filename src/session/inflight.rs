//! Per-operation pending flags

use std::cell::Cell;
use std::rc::Rc;

use crate::error::EditorError;

/// Pending flag for one kind of request.
///
/// A request holds an [`InFlightGuard`] while it runs; a second attempt fails
/// with `AlreadyInFlight` until the guard is dropped.
#[derive(Debug, Clone)]
pub struct InFlight {
    operation: &'static str,
    busy: Rc<Cell<bool>>,
}

impl InFlight {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            busy: Rc::new(Cell::new(false)),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is_pending(&self) -> bool {
        self.busy.get()
    }

    pub fn try_begin(&self) -> Result<InFlightGuard, EditorError> {
        if self.busy.replace(true) {
            return Err(EditorError::AlreadyInFlight {
                operation: self.operation.to_string(),
            });
        }
        Ok(InFlightGuard {
            busy: Rc::clone(&self.busy),
        })
    }
}

/// Clears its flag when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Rc<Cell<bool>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}
