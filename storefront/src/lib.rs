// storefront/src/lib.rs

//! Storefront backend: catalog, accounts, orders and the client-side cart.

pub mod access;
pub mod cart;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod pricing;
pub mod services;
pub mod state;
pub mod uploads;
pub mod web;
