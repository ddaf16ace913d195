//! Attribute change notifications for the reporting/subscription layer.

use log::warn;

use crate::{constants::CHANGE_QUEUE_CAPACITY, interaction_model::AttributePathIB};

use super::handler::ChangeNotifier;

/// Receives "this attribute changed" marks from cluster servers.
pub trait AttributeReporter {
    fn attribute_changed(&mut self, path: AttributePathIB);
}

impl<R> AttributeReporter for &mut R
where
    R: AttributeReporter,
{
    fn attribute_changed(&mut self, path: AttributePathIB) {
        (**self).attribute_changed(path)
    }
}

/// Queues changed paths until the reporting layer consumes them.
///
/// A path already waiting in the queue is not queued twice. When the queue
/// is full the mark is dropped and logged.
pub struct ChangeRecorder {
    pending: heapless::Deque<AttributePathIB, CHANGE_QUEUE_CAPACITY>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self {
            pending: heapless::Deque::new(),
        }
    }

    pub fn is_pending(&self, path: &AttributePathIB) -> bool {
        self.pending.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for ChangeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeReporter for ChangeRecorder {
    fn attribute_changed(&mut self, path: AttributePathIB) {
        if self.is_pending(&path) {
            return;
        }
        if self.pending.push_back(path).is_err() {
            warn!("Change queue full, dropping report for {path:?}");
        }
    }
}

impl ChangeNotifier<AttributePathIB> for ChangeRecorder {
    fn consume_change(&mut self) -> Option<AttributePathIB> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_are_deduplicated() {
        let mut recorder = ChangeRecorder::new();
        let a = AttributePathIB::new(0, 0x0033, 5);
        let b = AttributePathIB::new(1, 0x0033, 5);
        recorder.attribute_changed(a);
        recorder.attribute_changed(b);
        recorder.attribute_changed(a);
        assert_eq!(recorder.len(), 2);

        assert_eq!(recorder.consume_change(), Some(a));
        assert_eq!(recorder.consume_change(), Some(b));
        assert_eq!(recorder.consume_change(), None);
    }
}
