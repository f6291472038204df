//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod responsible;
pub mod school_class;
pub mod student;
pub mod tuition;

pub use responsible::{CreateResponsibleInput, ResponsibleError, ResponsibleRepository};
pub use school_class::{
    CreateSchoolClassInput, SchoolClassError, SchoolClassRepository, SchoolClassWithStudents,
};
pub use student::{CreateStudentInput, StudentError, StudentFilter, StudentRepository};
pub use tuition::{CreateTuitionInput, TuitionFilter, TuitionRepository, TuitionStoreError};
