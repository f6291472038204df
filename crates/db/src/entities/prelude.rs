//! Entity prelude.

pub use super::responsibles::Entity as Responsibles;
pub use super::school_classes::Entity as SchoolClasses;
pub use super::students::Entity as Students;
pub use super::tuitions::Entity as Tuitions;
