pub mod errors;
pub mod openapi;
pub mod records;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run;
