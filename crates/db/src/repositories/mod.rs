pub mod binding_repo;
pub mod credential_repo;
pub mod distribution_repo;
pub mod lock_repo;
pub mod passcode_repo;

pub use binding_repo::{BindingError, BindingRepo};
pub use credential_repo::CredentialRepo;
pub use distribution_repo::DistributionRepo;
pub use lock_repo::LockRepo;
pub use passcode_repo::PasscodeRepo;
