//! Access tokens for Google Cloud control-plane requests.
//!
//! A [`ServiceAccountKey`] is read from the JSON key file, signed into an
//! RS256 assertion and exchanged at the token endpoint using the
//! `urn:ietf:params:oauth:grant-type:jwt-bearer` grant. Callers only see
//! the [`TokenSource`] trait.

mod error;
mod key;
mod token;

pub use error::AuthError;
pub use key::ServiceAccountKey;
pub use token::{
    AccessToken, JwtClaims, ServiceAccountTokenSource, StaticTokenSource, TokenSource,
    CLOUD_PLATFORM_SCOPE, JWT_BEARER_GRANT,
};
