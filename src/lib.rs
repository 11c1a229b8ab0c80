pub mod accounts;
pub mod app_config;
pub mod auth;
pub mod billing;
pub mod catalog;
pub mod content_id;
pub mod datetime;
pub mod db;
pub mod email;
pub mod error;
pub mod media;
pub mod middleware;
pub mod orm;
pub mod requests;
pub mod social;
pub mod storage;
pub mod trending;
pub mod web;
