//! Notifications a chip raises for the machine and presenters.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipEvent {
    /// A complete frame is in the framebuffer.
    GraphicsReady,
    /// A buffer of sound samples is ready.
    SoundReady,
    /// Cassette MIC output changed level.
    MicLevel(bool),
}

/// FIFO of events raised since the last drain.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: VecDeque<ChipEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, event: ChipEvent) {
        self.pending.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = ChipEvent> + '_ {
        self.pending.drain(..)
    }

    /// Remove any pending frame notifications, reporting whether there were any.
    pub fn take_graphics_ready(&mut self) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| *e != ChipEvent::GraphicsReady);
        self.pending.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_graphics_ready_leaves_other_events() {
        let mut events = EventQueue::new();
        events.notify(ChipEvent::MicLevel(true));
        events.notify(ChipEvent::GraphicsReady);
        assert!(events.take_graphics_ready());
        assert!(!events.take_graphics_ready());
        assert_eq!(events.drain().collect::<Vec<_>>(), vec![ChipEvent::MicLevel(true)]);
        assert!(events.is_empty());
    }
}
