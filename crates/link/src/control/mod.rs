mod config;
mod controller;
mod coupling;
mod history;
mod predictor;
mod role;

pub use config::{ConfigError, ControllerConfig, DEFAULT_HISTORY_CAPACITY};
pub use controller::{SessionController, SessionStats};
pub use coupling::{DEFAULT_CHARGE, DEFAULT_STRENGTH, SpringCoupling};
pub use history::BoundedHistory;
pub use predictor::{
    DEFAULT_EPSILON, DEFAULT_PERCEPTUAL_K, PerceptualGate, latest_delta, mean_step, predict,
};
pub use role::{Phase, Role};
