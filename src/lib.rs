pub mod aggregation;
pub mod artist;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod form;
pub mod normalization;
pub mod routes;
pub mod show;
pub mod summary;
pub mod urls;
pub mod venue;
pub mod vocabulary;
