pub mod dtos;
pub mod models;
