//! Common utility types for assembly.

/// Raw 2D data
///
/// Wraps a raw pointer into pre-sized dense storage so that parallel
/// workers can write disjoint cells without synchronization. Every cell is
/// written by exactly one worker.
pub(crate) struct RawData2D<T> {
    /// Array containing data
    pub(crate) data: *mut T,
    /// Shape of data
    pub(crate) shape: [usize; 2],
}

unsafe impl<T> Sync for RawData2D<T> {}
