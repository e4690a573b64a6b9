pub mod binding;
pub mod credential;
pub mod distribution;
pub mod lock;
pub mod passcode;
