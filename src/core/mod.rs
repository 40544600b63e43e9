pub mod directive;
pub mod display;
pub mod markup;
pub mod sequencer;
pub mod typewriter;
