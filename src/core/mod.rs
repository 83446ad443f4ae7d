pub mod clock;
pub mod error;
pub mod types;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PolicyError, Result};
pub use types::{Condition, Criteria, Record};
pub use value::{DataType, Value};
