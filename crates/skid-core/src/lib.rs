mod ball_prediction;
mod boost_pads;
mod controls;
mod debug_info;
mod field;
mod math;
mod orientation;
mod packet;
mod settings;
mod steering;

pub use ball_prediction::*;
pub use boost_pads::*;
pub use controls::*;
pub use debug_info::*;
pub use field::*;
pub use math::*;
pub use orientation::*;
pub use packet::*;
pub use settings::*;
pub use steering::*;

/// World-space vector in game units (uu). `+z` is up.
pub type Vector3 = nalgebra::Vector3<f64>;
