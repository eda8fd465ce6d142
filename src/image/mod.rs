//! Image module: a read-only grayscale view, an owned buffer, and I/O helpers.
//!
//! Components
//! - `u8`: read-only `ImageU8<'a>` view over 8-bit grayscale buffers.
//! - `io`: helpers for loading/saving grayscale images and writing JSON.
//!
//! Design goals
//! - Keep hot loops simple and cache-friendly via row access.
//! - Expose a fast contiguous path (`as_slice`) when `stride == width`.
//! - Make ownership explicit: views borrow external data; `GrayImageU8`
//!   owns its buffer.
pub mod io;
pub mod u8;

pub use self::io::GrayImageU8;
pub use self::u8::ImageU8;
