pub mod params;
pub mod position;
pub mod ledger;

pub use params::*;
pub use position::*;
pub use ledger::*;
