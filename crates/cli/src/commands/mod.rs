pub mod driver;
pub mod extract;
pub mod instrument;

pub use driver::*;
pub use extract::*;
pub use instrument::*;
