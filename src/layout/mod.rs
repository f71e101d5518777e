//! Byte-exact layout of the shared region.
//!
//! The region holds exactly one [`SharedFrame`]. Writers and readers agree on
//! field order, widths and the absence of padding; nothing else is negotiated.
//!
//! ```rust
//! use rfshared::layout::{SharedFrame, SHARED_FRAME_SIZE, write_c_str};
//!
//! let mut frame = SharedFrame::boxed_zeroed();
//! write_c_str(&mut frame.track_name, "Mills Metropark");
//! assert_eq!(frame.track_name(), "Mills Metropark");
//! assert_eq!(frame.as_bytes().len(), SHARED_FRAME_SIZE);
//! ```

mod frame;
mod text;

pub use frame::{
    MAX_VEHICLES, SHARED_FRAME_SIZE, SHARED_VEHICLE_SIZE, SHARED_WHEEL_SIZE, SharedFrame,
    SharedVec3, SharedVehicle, SharedWheel,
};
pub use text::{encode_c_str, read_c_str, write_c_str};
