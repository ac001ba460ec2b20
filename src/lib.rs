//! Scroll reveals, card ripples, smooth anchors, hero parallax and video
//! lifecycle for the portfolio page, plus the speech-recognition demo.

pub mod config;
pub mod dom;
pub mod effects;
pub mod error;
pub mod logging;
pub mod speech;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(test)]
mod testing;
