//! Per-name upload guard.

use dashmap::DashSet;

/// Set of display names with an upload in progress.
///
/// Acquiring is a non-blocking test-and-set: a second caller for the same
/// name gets `None` instead of waiting.
#[derive(Debug, Default)]
pub struct InFlight {
    names: DashSet<String>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as in progress, or return `None` if it already is.
    pub fn try_acquire(&self, name: &str) -> Option<InFlightGuard<'_>> {
        if self.names.insert(name.to_string()) {
            Some(InFlightGuard {
                names: &self.names,
                name: name.to_string(),
            })
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Releases its name when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    names: &'a DashSet<String>,
    name: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.names.remove(&self.name);
    }
}
