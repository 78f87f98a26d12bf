pub mod analytics;
pub mod api_client;
pub mod constants;
pub mod dashboard;
pub mod data_backend;
pub mod data_types;
pub mod errors;
pub mod export;
pub mod forms;
pub mod navigation;
pub mod panels;
pub mod render;
pub mod session;
pub mod shared_main;

#[cfg(test)]
pub mod test_utils;
