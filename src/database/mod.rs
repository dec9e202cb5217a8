pub mod db;

pub use db::{DbError, DbResult};
