pub mod completion;
pub mod effects;
pub mod emotion;
pub mod interaction;
pub mod memory;
