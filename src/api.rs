//! The APIs through which tests reach the driver.
pub mod abs;
pub mod c;
pub mod rust;

// Expose the abstract API more directly, as it'll be used a lot.
pub use abs::Test;
