//! Shared types for the Keel ledger programs
//!
//! Everything the oracle, auction and router programs agree on lives here:
//! identities, WAD fixed-point math, the error taxonomy, the access-control
//! and fungible-asset collaborators, and the instruction codec.

pub mod types;
pub mod math;
pub mod error;
pub mod access;
pub mod token;
pub mod instruction;

pub use types::*;
pub use math::*;
pub use error::*;
pub use access::*;
pub use token::*;
pub use instruction::*;
