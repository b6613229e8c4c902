pub mod catalog_read;
pub mod db;
pub mod games;
pub mod posts;
