//! Keel Price Oracle
//!
//! Accepts externally signed USD prices, rejects stale or replayed updates and
//! serves the latest price per symbol.
//!
//! ## Instructions
//!
//! - **SetPrice** (0): Store a signed price (any submitter, signer must hold Validator)
//! - **UpdateToken** (1): Enable or disable a symbol (admin only)
//! - **SetValidTime** (2): Change the staleness window (admin only)
//! - **GrantRole** (3) / **RevokeRole** (4): Role management (admin only)
//!
//! ## Signed message
//!
//! ```text
//! digest = keccak256(nonce: u256 BE || price: u256 BE || symbol bytes)
//! signed = keccak256("\x19Ethereum Signed Message:\n32" || digest)
//! ```
//!
//! A single nonce is shared by all symbols and must strictly increase.

pub mod entrypoint;
pub mod instructions;
pub mod state;
pub mod verifier;

pub use entrypoint::OracleInstruction;
pub use instructions::{get_price, process_set_price, process_set_valid_time, process_update_token};
pub use state::{PriceOracle, PriceRecord, DEFAULT_VALID_TIME};
pub use verifier::{price_digest, PriceSigner, Secp256k1Verifier, Verifier};
