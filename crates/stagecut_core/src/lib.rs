pub mod clip;
pub mod document;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod lanes;
pub mod magnet;
pub mod ops;
pub mod selection;
pub mod timeline;
pub mod units;
