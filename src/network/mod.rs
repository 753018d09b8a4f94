pub mod dense_network;
pub mod models;
pub mod network;
pub mod spec;

pub use dense_network::DenseNetwork;
pub use models::CycleGanModels;
pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec};
