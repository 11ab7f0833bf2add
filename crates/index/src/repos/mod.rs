//! Repository traits for index operations.

pub mod icons;

pub use icons::IconRepo;
