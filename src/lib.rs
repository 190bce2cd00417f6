// modules for making sounds
pub mod melody;
pub mod note;
pub mod synth;
pub mod wave;

// getting sounds out
pub mod output;
pub mod render;
