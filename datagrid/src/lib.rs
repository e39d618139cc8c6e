//! A non-visual data grid engine.
//!
//! Given rows (held in memory or served by a backend) and a column schema,
//! the engine decides which rows and cells are visible, in what order and
//! under which filters, and maps them onto a scrollable viewport.
//!
//! # Example
//!
//! ```
//! use datagrid::model::Row;
//! use datagrid::settings::TableConfig;
//! use datagrid::table::DataTable;
//!
//! let config = TableConfig::from_json(r#"{
//!     "settings": {"perPage": 2},
//!     "columns": [{"name": "name"}, {"name": "age", "type": "number"}]
//! }"#).unwrap();
//!
//! let rows = vec![
//!     Row::new().set("name", "Ada").set("age", 36),
//!     Row::new().set("name", "Alan").set("age", 41),
//!     Row::new().set("name", "Grace").set("age", 85),
//! ];
//!
//! let mut table = DataTable::from_config(config).unwrap().with_rows(rows);
//! table.toggle_sort("age", false).unwrap();
//! table.set_page(2);
//! assert_eq!(table.visible_rows().len(), 1);
//! ```

pub mod column;
pub mod dimensions;
pub mod error;
pub mod events;
pub mod model;
pub mod pager;
pub mod query;
pub mod selection;
pub mod settings;
pub mod source;
pub mod table;
pub mod virtualizer;
pub mod window;

pub use error::ConfigError;
pub use error::DataAccessError;
pub use error::GridError;
pub use table::DataTable;
