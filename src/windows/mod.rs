//! Named shared memory on Windows
//!
//! The simulator plugin creates (or reopens) a page-file backed mapping under a
//! fixed name and maps it read/write; external tools open the same name and map
//! it read-only. Both sides release the view and the handle on drop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rfshared::reader::{read_consistent, DEFAULT_READ_ATTEMPTS};
//! use rfshared::region::{RegionBackend, DEFAULT_REGION_NAME};
//! use rfshared::windows::{ReadOnlyMapping, WindowsBackend};
//!
//! // Writer side (inside the simulator)
//! let mut region = WindowsBackend.acquire(DEFAULT_REGION_NAME)?;
//!
//! // Reader side (any other process)
//! let view = ReadOnlyMapping::open(DEFAULT_REGION_NAME)?;
//! if let Some(frame) = read_consistent(&view, DEFAULT_READ_ATTEMPTS) {
//!     println!("{} vehicles", frame.active_vehicles().len());
//! }
//! ```

mod mapping;

pub use mapping::{ReadOnlyMapping, WindowsBackend, WritableMapping};
