//! Shared fixtures for the gateway integration tests

#![allow(dead_code)]

pub mod audio_fixtures;
pub mod telephony;
