pub mod accessors;
pub mod misc;
