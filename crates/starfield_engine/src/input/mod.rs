//! Input events
//!
//! The frame driver only cares whether the user asked to quit. Backends
//! translate their native events into [`FrameEvent`] and hand them out one at
//! a time without blocking.

/// An input event as seen by the frame driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// The user closed the window or otherwise asked to stop
    Quit,
    /// Anything else; drained and ignored
    Other,
}

impl FrameEvent {
    /// Whether this event ends the frame loop
    pub fn is_quit(self) -> bool {
        self == Self::Quit
    }
}

/// Non-blocking source of pending input events
pub trait EventSource {
    /// Next pending event, or `None` once the queue is drained
    ///
    /// Must never wait for new events to arrive.
    fn poll_event(&mut self) -> Option<FrameEvent>;

    /// Drain every pending event, reporting whether any of them was a quit
    ///
    /// All events are consumed even after a quit has been seen.
    fn drain_quit(&mut self) -> bool {
        let mut quit = false;
        while let Some(event) = self.poll_event() {
            quit |= event.is_quit();
        }
        quit
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{EventSource, FrameEvent};
    use std::collections::VecDeque;

    /// Event source replaying a fixed script, one batch per frame
    ///
    /// Each call to `poll_event` returns the next event of the current batch;
    /// when a batch runs out it returns `None` once and moves to the next.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedEvents {
        batches: VecDeque<Vec<FrameEvent>>,
        current: VecDeque<FrameEvent>,
        pub(crate) polls: usize,
    }

    impl ScriptedEvents {
        pub(crate) fn new(batches: Vec<Vec<FrameEvent>>) -> Self {
            let mut batches: VecDeque<_> = batches.into();
            let current = batches.pop_front().unwrap_or_default().into();
            Self {
                batches,
                current,
                polls: 0,
            }
        }

        /// Script that quits during frame `frame` (zero-based)
        pub(crate) fn quit_on_frame(frame: usize) -> Self {
            let mut batches = vec![vec![FrameEvent::Other]; frame];
            batches.push(vec![FrameEvent::Other, FrameEvent::Quit, FrameEvent::Other]);
            Self::new(batches)
        }

        /// Events left unread across all batches
        pub(crate) fn remaining(&self) -> usize {
            self.current.len() + self.batches.iter().map(Vec::len).sum::<usize>()
        }
    }

    impl EventSource for ScriptedEvents {
        fn poll_event(&mut self) -> Option<FrameEvent> {
            self.polls += 1;
            match self.current.pop_front() {
                Some(event) => Some(event),
                None => {
                    self.current = self.batches.pop_front().unwrap_or_default().into();
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedEvents;
    use super::*;

    #[test]
    fn test_drain_without_quit() {
        let mut events = ScriptedEvents::new(vec![vec![FrameEvent::Other, FrameEvent::Other]]);

        assert!(!events.drain_quit());
        assert_eq!(events.remaining(), 0);
    }

    #[test]
    fn test_drain_consumes_events_after_quit() {
        let mut events = ScriptedEvents::new(vec![vec![FrameEvent::Quit, FrameEvent::Other, FrameEvent::Other]]);

        assert!(events.drain_quit());
        assert_eq!(events.remaining(), 0);
    }

    #[test]
    fn test_batches_are_drained_one_per_call() {
        let mut events = ScriptedEvents::quit_on_frame(2);

        assert!(!events.drain_quit());
        assert!(!events.drain_quit());
        assert!(events.drain_quit());
        assert!(!events.drain_quit());
    }

    #[test]
    fn test_empty_source_reports_no_quit() {
        let mut events = ScriptedEvents::default();
        assert!(!events.drain_quit());
        assert_eq!(events.polls, 1);
    }
}
