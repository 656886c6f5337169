use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("orphan attestation registry has not received a slot yet")]
    RegistryNotInitialized,
}
