pub mod store;

pub use store::BodyStore;
