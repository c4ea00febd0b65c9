//! Simulation building blocks
//!
//! Everything here is plain data driven by the game loop: the fixed-step
//! accumulator, the timers it ages, and hit boxes for game logic.

pub mod clock;
pub mod hitbox;
pub mod timer;

pub use clock::{FixedTimestep, FpsCounter};
pub use hitbox::HitBox;
pub use timer::{
    TICKS_PER_SECOND, TickOutcome, TimeUnit, Timer, TimerAction, TimerCommands, TimerId,
    TimerSet,
};
