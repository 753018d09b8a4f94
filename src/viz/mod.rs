pub mod convert;
pub mod visualizer;

pub use convert::tensor_to_rgb;
pub use visualizer::{GridVisualizer, SamplePanel, Visualizer};
