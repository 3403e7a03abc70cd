use std::sync::atomic::{AtomicUsize, Ordering};

use super::FixedVertexHandle;

/// A hint generator that returns the last used vertex as hint.
///
/// Input vertices of a single run tend to be spatially coherent (they are usually
/// face loops), so walking from the previous vertex keeps most locate queries short.
///
/// This heuristic takes only a constant additional amount of memory.
#[derive(Default, Debug)]
pub struct LastUsedVertexHintGenerator {
    index: AtomicUsize,
}

impl Clone for LastUsedVertexHintGenerator {
    fn clone(&self) -> Self {
        Self {
            index: AtomicUsize::new(self.index.load(Ordering::Relaxed)),
        }
    }
}

impl LastUsedVertexHintGenerator {
    /// Returns a vertex handle that should be close to the next query.
    ///
    /// The returned vertex handle may be invalid.
    pub fn get_hint(&self) -> FixedVertexHandle {
        FixedVertexHandle::new(self.index.load(Ordering::Relaxed))
    }

    /// Notifies the hint generator that an element was looked up
    pub fn notify_vertex_lookup(&self, vertex: FixedVertexHandle) {
        self.index.store(vertex.index(), Ordering::Relaxed);
    }

    /// Notifies the hint generator that a new vertex is inserted
    pub fn notify_vertex_inserted(&mut self, vertex: FixedVertexHandle) {
        self.notify_vertex_lookup(vertex);
    }
}

#[cfg(test)]
mod test {
    use super::LastUsedVertexHintGenerator;
    use crate::delaunay_core::FixedVertexHandle;

    #[allow(unused)]
    fn make_sure_hint_generator_is_send_and_sync() {
        // This just needs to compile
        fn foo<T: Send + Sync>(_: T) {}

        foo(LastUsedVertexHintGenerator::default());
    }

    #[test]
    fn test_last_used_vertex() {
        let mut generator = LastUsedVertexHintGenerator::default();
        assert_eq!(generator.get_hint(), FixedVertexHandle::new(0));
        generator.notify_vertex_inserted(FixedVertexHandle::new(7));
        assert_eq!(generator.get_hint(), FixedVertexHandle::new(7));

        let cloned = generator.clone();
        generator.notify_vertex_lookup(FixedVertexHandle::new(2));
        assert_eq!(cloned.get_hint(), FixedVertexHandle::new(7));
        assert_eq!(generator.get_hint(), FixedVertexHandle::new(2));
    }
}
