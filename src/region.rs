//! Shared region access.
//!
//! A [`RegionBackend`] acquires the named region holding one [`SharedFrame`].
//! The writer gets a [`FrameRegion`] (mutable view); readers only need a
//! [`RegionView`]. Dropping a region releases it.
//!
//! There is no cross-process lock. Readers may observe a frame mid-write and
//! must treat it as eventually consistent (see [`crate::reader`]).

use tracing::debug;

use crate::Result;
use crate::layout::{SHARED_FRAME_SIZE, SharedFrame};

/// Name of the region the simulator plugin publishes to.
pub const DEFAULT_REGION_NAME: &str = "$rFactorShared$";

/// Read access to a mapped frame.
///
/// Another process may write the frame at any time, so it is only exposed as
/// a pointer. Copy it out with [`crate::reader::read_consistent`].
pub trait RegionView {
    /// Start of the frame. Valid for reads of [`SHARED_FRAME_SIZE`] bytes
    /// while `self` is alive.
    fn frame_ptr(&self) -> *const SharedFrame;
}

/// Write access to a mapped frame owned by this process.
pub trait FrameRegion: RegionView {
    fn frame(&self) -> &SharedFrame;
    fn frame_mut(&mut self) -> &mut SharedFrame;
}

/// Acquires the writable region by name.
///
/// Acquisition happens at most once per plugin instance. Any error it returns
/// disables publishing for the lifetime of that instance.
pub trait RegionBackend {
    type Region: FrameRegion;

    fn acquire(&mut self, name: &str) -> Result<Self::Region>;
}

/// Region living in this process's heap.
///
/// Stands in for the named mapping where none is available and in tests.
#[derive(Debug, Clone)]
pub struct HeapRegion {
    name: String,
    frame: Box<SharedFrame>,
}

impl HeapRegion {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), frame: SharedFrame::boxed_zeroed() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RegionView for HeapRegion {
    fn frame_ptr(&self) -> *const SharedFrame {
        &*self.frame
    }
}

impl FrameRegion for HeapRegion {
    fn frame(&self) -> &SharedFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut SharedFrame {
        &mut self.frame
    }
}

/// Backend handing out process-local [`HeapRegion`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapBackend;

impl RegionBackend for HeapBackend {
    type Region = HeapRegion;

    fn acquire(&mut self, name: &str) -> Result<HeapRegion> {
        debug!(name, size = SHARED_FRAME_SIZE, "Allocated process-local region");
        Ok(HeapRegion::new(name))
    }
}

/// Backend for the current platform: the named Windows mapping where
/// available, a process-local region elsewhere.
#[cfg(windows)]
pub type PlatformBackend = crate::windows::WindowsBackend;

/// Backend for the current platform: the named Windows mapping where
/// available, a process-local region elsewhere.
#[cfg(not(windows))]
pub type PlatformBackend = HeapBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_regions_start_zeroed() {
        let region = HeapBackend.acquire(DEFAULT_REGION_NAME).unwrap();
        assert_eq!(region.name(), DEFAULT_REGION_NAME);
        assert!(region.frame().is_zeroed());
    }

    #[test]
    fn heap_region_writes_are_visible_to_views() {
        let mut region = HeapRegion::new("test");
        region.frame_mut().num_vehicles = 7;
        let count = region.frame().num_vehicles;
        assert_eq!(count, 7);

        let copy = unsafe { region.frame_ptr().read() };
        let viewed = copy.num_vehicles;
        assert_eq!(viewed, 7);
    }
}
