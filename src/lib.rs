//! # Nutrition Wallet Backend
//!
//! A nutrition-tracking backend: users photograph nutrition labels, an
//! external OCR provider turns the photo into text, and the label parser
//! extracts structured nutrition facts that are stored per user.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod label_parser;
pub mod ocr_client;
pub mod ocr_errors;
pub mod routes;
