/// Devices named on the command line
pub mod devices;

/// Backend selection for the binaries
pub mod backend;

/// Option parsing helpers
pub mod options;

pub use devices::{Device, DeviceError};
pub use options::parse_filter_sizes;
