//! Filtering, ordering and paging of rows.

mod data_filter;
mod filter;
mod order;
mod page;

pub use data_filter::*;
pub use filter::*;
pub use order::*;
pub use page::*;
