pub mod customer_updater;
pub mod seed_loader;

pub use customer_updater::{CustomerUpdater, UpdateError, CUSTOMER_UPDATES};
pub use seed_loader::{LoadError, LoadReport, SeedLoader, TableLoad, SEED_TABLES};
