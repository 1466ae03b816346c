mod store;

pub use store::{NewItem, Store};
