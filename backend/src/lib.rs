//! Web form that asks a pretrained classifier whether a patient is
//! potentially diabetic, next to a map of hospitals.

pub mod config;
pub mod errors;
pub mod form;
pub mod map;
pub mod models;
pub mod predictor;
pub mod render;
pub mod routes;
