//! Host implementations of the platform collaborators

pub mod filesystem;
pub mod label;

pub use filesystem::HostFilesystem;
pub use label::XattrContextApplier;
