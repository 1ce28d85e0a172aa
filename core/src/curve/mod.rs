pub mod result;
pub mod table;

pub use result::{JvResult, MaxPowerPoint};
pub use table::{JvTable, Orientation};
