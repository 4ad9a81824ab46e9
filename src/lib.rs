// Gatepost: content posting with automatic moderation
//
// This is the library root. Each module corresponds to a major subsystem:
// the moderation decision pipeline, persistence, and the HTTP boundary.

pub mod config;
pub mod db;
pub mod moderation;
pub mod web;
