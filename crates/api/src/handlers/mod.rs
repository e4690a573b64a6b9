pub mod bindings;
pub mod distribution;
pub mod locks;
pub mod vendors;
