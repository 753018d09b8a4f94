pub mod bce;
pub mod mae;
pub mod objectives;

pub use bce::BceWithLogitsLoss;
pub use mae::MaeLoss;
pub use objectives::{cycle_loss, discriminator_loss, generator_loss, identity_loss};
