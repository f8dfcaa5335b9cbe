mod client;

pub use client::PredictionClient;
