//! `SeaORM` entity definitions.

pub mod prelude;

pub mod responsibles;
pub mod school_classes;
pub mod sea_orm_active_enums;
pub mod students;
pub mod tuitions;
