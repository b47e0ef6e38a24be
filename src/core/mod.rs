pub mod error;
pub mod row;
pub mod value;

pub use error::{HydrationError, Result};
pub use row::JoinedRow;
pub use value::{DataType, Value};
