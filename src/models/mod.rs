//! Data models shared by the database layer and the HTTP handlers.

pub mod item;

pub use item::DemoItem;
