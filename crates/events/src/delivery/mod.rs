//! External delivery channels for outcome notifications.

pub mod email;
