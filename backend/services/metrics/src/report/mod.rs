pub mod dataset;
pub mod responses;
pub mod service;
