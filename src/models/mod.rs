pub mod image;
pub mod request;

pub use image::*;
pub use request::*;
