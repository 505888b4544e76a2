//! External platform protocol layer
//!
//! Request signing, the storefront REST client, the wholesale app callout,
//! and the wire types both speak. Nothing in here touches the database.

pub mod client;
pub mod signer;
pub mod types;
pub mod wholesale;

pub use client::StorefrontClient;
pub use wholesale::WholesaleClient;

/// Errors raised by platform calls
///
/// `Network` is the transient class: eligible for manual retry up to the
/// outbound-log ceiling. `Api` carries the platform's own status and body so
/// the audit trail stays diagnosable without replaying the request.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("invalid credentials: {0}")]
    Credentials(String),
}

/// Derive the external stock status from a quantity
///
/// Hard rule of the platform contract: positive quantity means purchasable,
/// everything else (zero or negative oversell) is out of stock.
pub fn stock_status(quantity: i32) -> &'static str {
    if quantity > 0 { "instock" } else { "outofstock" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_rule() {
        assert_eq!(stock_status(1), "instock");
        assert_eq!(stock_status(250), "instock");
        assert_eq!(stock_status(0), "outofstock");
        assert_eq!(stock_status(-3), "outofstock");
    }
}
