//! Page-file backed mapping of the shared frame

use std::ptr::NonNull;
use tracing::{debug, trace, warn};
use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP, FILE_MAP_ALL_ACCESS, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS,
    MapViewOfFile, OpenFileMappingW, PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use crate::layout::{SHARED_FRAME_SIZE, SharedFrame};
use crate::region::{FrameRegion, RegionBackend, RegionView};
use crate::{RelayError, Result};

/// Mapping handle plus the view of one [`SharedFrame`].
struct MappedView {
    mapping: HANDLE,
    base: NonNull<SharedFrame>,
}

impl MappedView {
    /// Map the whole frame from an open mapping handle, closing it on failure.
    fn map(name: &str, mapping: HANDLE, access: FILE_MAP) -> Result<Self> {
        let view = unsafe { MapViewOfFile(mapping, access, 0, 0, SHARED_FRAME_SIZE) };
        match NonNull::new(view.Value as *mut SharedFrame) {
            Some(base) => Ok(Self { mapping, base }),
            None => {
                let win_err = windows::core::Error::from_thread();
                unsafe {
                    let _ = CloseHandle(mapping);
                }
                Err(RelayError::view_map_failed(name, SHARED_FRAME_SIZE, Some(Box::new(win_err))))
            }
        }
    }

    fn frame_ptr(&self) -> *const SharedFrame {
        self.base.as_ptr()
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
        if let Err(e) = unsafe { UnmapViewOfFile(addr) } {
            warn!(error = %RelayError::windows_api_error("UnmapViewOfFile", e), "Failed to unmap view");
        }
        if let Err(e) = unsafe { CloseHandle(self.mapping) } {
            warn!(error = %RelayError::windows_api_error("CloseHandle", e), "Failed to close mapping");
        }
    }
}

/// Read/write mapping owned by the publishing plugin.
pub struct WritableMapping {
    view: MappedView,
}

impl WritableMapping {
    /// Create the named region, reopening it if another process already created it.
    pub fn create(name: &str) -> Result<Self> {
        trace!(name, size = SHARED_FRAME_SIZE, "Creating shared region");
        let wide_name = wide_string(name);
        let pcwstr = PCWSTR::from_raw(wide_name.as_ptr());

        let created = unsafe {
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                0,
                SHARED_FRAME_SIZE as u32,
                pcwstr,
            )
        };

        let mapping = match created {
            Ok(handle) => handle,
            Err(e) if e.code() == ERROR_ALREADY_EXISTS.to_hresult() => {
                debug!(name, "Region already exists, opening it instead");
                unsafe { OpenFileMappingW(FILE_MAP_ALL_ACCESS.0, false, pcwstr) }
                    .map_err(|e| RelayError::region_open_failed(name, Some(Box::new(e))))?
            }
            Err(e) => return Err(RelayError::region_create_failed(name, Some(Box::new(e)))),
        };

        let view = MappedView::map(name, mapping, FILE_MAP_ALL_ACCESS)?;
        debug!(name, size = SHARED_FRAME_SIZE, "Mapped shared region for writing");
        Ok(Self { view })
    }
}

impl RegionView for WritableMapping {
    fn frame_ptr(&self) -> *const SharedFrame {
        self.view.frame_ptr()
    }
}

impl FrameRegion for WritableMapping {
    fn frame(&self) -> &SharedFrame {
        // SAFETY: the view spans SHARED_FRAME_SIZE bytes, SharedFrame has
        // alignment 1 and this process is the only writer.
        unsafe { self.view.base.as_ref() }
    }

    fn frame_mut(&mut self) -> &mut SharedFrame {
        // SAFETY: mapped with FILE_MAP_ALL_ACCESS; this process is the only writer.
        unsafe { self.view.base.as_mut() }
    }
}

/// Read-only mapping of a region created by the plugin.
pub struct ReadOnlyMapping {
    view: MappedView,
}

impl ReadOnlyMapping {
    /// Open an existing region by name.
    pub fn open(name: &str) -> Result<Self> {
        trace!(name, "Opening shared region for reading");
        let wide_name = wide_string(name);

        let mapping = unsafe {
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
        }
        .map_err(|e| {
            warn!(name, "Shared region not available: {}", e);
            RelayError::region_open_failed(name, Some(Box::new(e)))
        })?;

        let view = MappedView::map(name, mapping, FILE_MAP_READ)?;
        debug!(name, "Mapped shared region for reading");
        Ok(Self { view })
    }
}

impl RegionView for ReadOnlyMapping {
    fn frame_ptr(&self) -> *const SharedFrame {
        self.view.frame_ptr()
    }
}

// SAFETY: the mapping only holds a kernel handle and a pointer into a view
// that stays valid until drop; readers never write through it.
unsafe impl Send for ReadOnlyMapping {}
unsafe impl Sync for ReadOnlyMapping {}

/// Backend acquiring [`WritableMapping`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl RegionBackend for WindowsBackend {
    type Region = WritableMapping;

    fn acquire(&mut self, name: &str) -> Result<WritableMapping> {
        WritableMapping::create(name)
    }
}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;
    use crate::reader::{DEFAULT_READ_ATTEMPTS, read_consistent};

    #[test]
    fn wide_names_are_nul_terminated() {
        let wide = wide_string("$rFactorShared$");
        assert_eq!(wide.len(), "$rFactorShared$".len() + 1);
        assert_eq!(wide.last(), Some(&0));
    }

    #[test]
    fn writer_and_reader_share_one_frame() {
        let name = format!("rfshared-test-{}", std::process::id());
        let mut writer = WritableMapping::create(&name).expect("create region");
        writer.frame_mut().num_vehicles = 12;

        let reader = ReadOnlyMapping::open(&name).expect("open region");
        let copy = read_consistent(&reader, DEFAULT_READ_ATTEMPTS).expect("no concurrent writer");
        let count = copy.num_vehicles;
        assert_eq!(count, 12);
    }

    #[test]
    fn opening_missing_region_fails() {
        let result = ReadOnlyMapping::open("rfshared-test-missing-region");
        assert!(matches!(result, Err(RelayError::RegionOpenFailed { .. })));
    }
}
