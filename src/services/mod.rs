pub mod prediction_api;
