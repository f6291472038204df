//! Generic table rendering for entity lists.
//!
//! One renderer serves every entity: columns are inferred from the first row,
//! each cell is rendered from its value's shape, and the view supports
//! case-insensitive filtering, fixed-size pages and confirmed deletes.

pub mod cell;
pub mod column;
pub mod error;
pub mod view;

pub use cell::{Cell, RenderOptions, render_cell};
pub use column::{BOOKKEEPING_KEYS, infer_columns, pluralize, row_id};
pub use error::ListingError;
pub use view::{TablePage, TableRow, TableView};
