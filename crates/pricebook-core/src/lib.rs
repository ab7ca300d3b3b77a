//! # pricebook-core: Precise Amounts for the Product Catalog
//!
//! This crate is the **heart** of Pricebook. It turns the integer amounts the
//! catalog stores into the decimal strings its API sends, and back, without
//! ever passing through a float.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pricebook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          HTTP layer / pricebook-cli (request, response)         │   │
//! │  │   ?range=10.00..50.00&rangeby=eur      "amount": "10.90"        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pricebook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   fixed   │  │ currency  │  │  mapper   │  │   query   │  │   │
//! │  │   │  encode   │  │ USD  EUR  │  │ Product → │  │  ranges   │  │   │
//! │  │   │  decode   │  │ JPY BRL   │  │ Resource  │  │  ordering │  │   │
//! │  │   └───────────┘  │ BTC       │  └───────────┘  └───────────┘  │   │
//! │  │                  └───────────┘                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  precise  │  │ exchange  │  │  import   │  │validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        Storage (one unscaled integer column per currency)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`fixed`] - Fixed digit codec (`BigInt` + unit ↔ `"10.90"`)
//! - [`currency`] - Supported currencies and their scales
//! - [`mapper`] - Domain values → API resources
//! - [`query`] - Range filters, ordering and query resolution
//! - [`precise`] - Exact arithmetic and rounding
//! - [`exchange`] - USD to every currency
//! - [`import`] - Product file parsing
//! - [`validation`] - Client-facing validation issues
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Integer Amounts**: Every amount is a `BigInt` in the smallest unit
//! 2. **Strings on the Wire**: Amounts leave as fixed digit strings, never JSON numbers
//! 3. **Lossless Codec**: `decode(encode(a, u)) == (a, u)` for every amount and unit
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use pricebook_core::currency::{CurrencyCode, CurrencyType};
//! use pricebook_core::mapper::serialize_currency;
//! use pricebook_core::fixed::parse_precise_number;
//!
//! let usd = CurrencyType::new(CurrencyCode::Usd, 1090);
//! let serialized = serialize_currency(&usd);
//! assert_eq!(serialized.amount, "10.90");
//!
//! let precise = parse_precise_number(serialized.amount.as_str()).unwrap();
//! assert_eq!(precise.amount, usd.amount);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod error;
pub mod exchange;
pub mod fixed;
pub mod import;
pub mod mapper;
pub mod number;
pub mod precise;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pricebook_core::FixedDigit` instead of
// `use pricebook_core::fixed::FixedDigit`

pub use currency::{get_currency_descriptor, CurrencyCode, CurrencyDescriptor, CurrencyType};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fixed::{encode, parse_precise_number, to_fixed_digit, FixedDigit, PreciseNumber, Unit};
pub use query::{parse_range, ProductQuery, ProductQueryParams, Range};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of the exact-match `name` filter of a product listing.
pub const MAX_NAME_FILTER_LENGTH: usize = 16;
