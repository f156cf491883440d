pub mod backend;
pub mod http;

pub use backend::{SpeechBackend, SynthesisOptions};
pub use http::HttpSpeechClient;
