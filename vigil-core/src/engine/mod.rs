//! Client side of the external alert engine: credential acquisition and the
//! authenticated scan dispatch itself.

pub mod client;
pub mod credentials;

pub use client::EngineClient;
pub use credentials::{
    CliCredential, CredentialChain, CredentialError, CredentialProvider,
    MetadataServerCredential, ServiceAccountCredential,
};
