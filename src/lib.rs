// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod interface;
pub mod models;
pub mod probe;
pub mod scheduler;
pub mod sink;
pub mod version;
