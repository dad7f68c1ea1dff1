pub mod audio_service;
pub mod content;
pub mod round_controller;
pub mod scoring_service;
pub mod session_service;
