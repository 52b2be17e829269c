//! Turns noisy on-screen listing text into a rent-versus-price investment
//! verdict and a multi-scenario buy/wait/avoid decision.

pub mod config;
pub mod engine;
pub mod extraction;
pub mod integration;
pub mod monitoring;
pub mod scenario;
