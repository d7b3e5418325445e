pub mod error;
pub mod frame;
pub mod pacer;
pub mod source;
pub mod surface;
