//! Integration tests for Image-Soup
//!
//! These tests drive the public API end-to-end: configuration to server,
//! crawlers talking to wiremock servers, and the HTTP front end.

mod config_tests;
mod serving_tests;
