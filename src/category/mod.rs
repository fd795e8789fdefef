//! Category management.
//!
//! Categories name what a transaction was for and fix whether it records an
//! expense or income; every transaction must carry its category's type.

mod core;

pub use core::{
    Category, create_categories_table, create_category, delete_category, get_category_by_name,
    list_categories, map_row_to_category,
};
