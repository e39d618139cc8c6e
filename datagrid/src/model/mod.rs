//! Row and value models

mod option;
mod row;
mod value;

pub use option::*;
pub use row::*;
pub use value::*;
