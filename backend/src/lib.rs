pub mod config;
pub mod domain;
pub mod error;
pub mod grpc;
pub mod lifecycle;
pub mod repository;
pub mod security;
pub mod services;
