//! Error taxonomy shared by the REST client and the gateway

mod error;

pub use error::{Error, Result};
