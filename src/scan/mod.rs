//! Scan request model

pub mod request;

pub use request::{
    ColorMode, DeviceSelection, Driver, OutputFormat, OutputPattern, PaperSource, ScanRequest,
    SEQUENCE_PLACEHOLDER, output_dir_from,
};
