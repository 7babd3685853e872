//! ThreatScribe
//!
//! A web front-end that looks up Indicators of Compromise in a MISP
//! instance and asks a locally hosted language model to draft a security
//! report from the findings.

pub mod misp;
pub mod models;
pub mod report;
pub mod web;
