//! Authentication primitives.
//!
//! Users authenticate against the identity provider; this service only
//! validates the access tokens it issues. See [`jwt`].

pub mod jwt;
