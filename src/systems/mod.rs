mod carry;
mod player;

pub use carry::carry_system;
pub use player::player_movement_system;
