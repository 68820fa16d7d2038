//! Client navigation adapters.

mod sign_in;

pub use sign_in::SignInRedirector;
