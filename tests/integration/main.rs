//! Integration tests: sheet grid → normalizer → store → aggregation.

mod fixtures;
mod pipeline;
