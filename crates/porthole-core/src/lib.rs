pub mod error;
pub mod consts;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod source;
pub mod region;
pub mod compose;
pub mod engine;
