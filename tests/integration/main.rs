//! Integration tests for Linkscape
//!
//! These tests run against wiremock servers and temporary files, exercising
//! the public API end to end.

mod config_tests;
mod extraction_tests;
mod fetch_tests;
mod sitemap_tests;
