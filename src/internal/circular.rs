//! Cycle detection for recursive resolution.

use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::error::{InjectError, InjectResult};
use crate::internal::Map;
use crate::key::SlotId;
use crate::slot::SlotRef;

type Frames = Vec<(SlotId, String)>;

/// Definitions currently being resolved on this graph, innermost last.
///
/// Frames are kept per thread so two threads resolving through one shared
/// graph never see each other's frames as a cycle.
pub(crate) struct ResolutionStack {
    threads: Mutex<Map<ThreadId, Frames>>,
    max_depth: usize,
    detect_cycles: bool,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize, detect_cycles: bool) -> Self {
        ResolutionStack {
            threads: Mutex::new(Map::default()),
            max_depth,
            detect_cycles,
        }
    }

    /// Pushes `slot`, failing if it is already being resolved.
    pub(crate) fn enter(&self, slot: &SlotRef) -> InjectResult<StackGuard<'_>> {
        let thread = thread::current().id();
        let mut threads = self.threads.lock();
        let frames = threads.entry(thread).or_default();

        // Circular detection BEFORE pushing the new frame
        if self.detect_cycles && frames.iter().any(|(id, _)| *id == slot.id()) {
            let mut path: Vec<String> = frames
                .iter()
                .skip_while(|(id, _)| *id != slot.id())
                .map(|(_, label)| label.clone())
                .collect();
            path.push(slot.label());
            return Err(InjectError::Cyclic(path));
        }

        if frames.len() >= self.max_depth {
            return Err(InjectError::DepthExceeded(self.max_depth));
        }

        frames.push((slot.id(), slot.label()));
        Ok(StackGuard { stack: self, thread, id: slot.id() })
    }

    /// Frames held by the calling thread.
    pub(crate) fn depth(&self) -> usize {
        self.threads
            .lock()
            .get(&thread::current().id())
            .map_or(0, Vec::len)
    }
}

/// Pops its frame when dropped, including on early error returns.
pub(crate) struct StackGuard<'a> {
    stack: &'a ResolutionStack,
    thread: ThreadId,
    id: SlotId,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        let mut threads = self.stack.threads.lock();
        if let Some(frames) = threads.get_mut(&self.thread) {
            if let Some((last, _)) = frames.pop() {
                debug_assert_eq!(last, self.id);
            }
            if frames.is_empty() {
                threads.remove(&self.thread);
            }
        }
    }
}
