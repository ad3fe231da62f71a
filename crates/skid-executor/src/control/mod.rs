mod ball_control;
mod speed_controller;

pub use ball_control::{ball_control, BallControl};
pub use speed_controller::SpeedController;
