use crate::network::{Network, NetworkSpec};

/// The four networks of a CycleGAN, built by the caller and handed to the
/// trainer. Field names double as checkpoint file stems.
pub struct CycleGanModels {
    pub generator_clear2fog: Box<dyn Network>,
    pub generator_fog2clear: Box<dyn Network>,
    pub discriminator_clear: Box<dyn Network>,
    pub discriminator_fog: Box<dyn Network>,
}

impl CycleGanModels {
    pub const GENERATOR_CLEAR2FOG: &'static str = "generator_clear2fog";
    pub const GENERATOR_FOG2CLEAR: &'static str = "generator_fog2clear";
    pub const DISCRIMINATOR_CLEAR: &'static str = "discriminator_clear";
    pub const DISCRIMINATOR_FOG: &'static str = "discriminator_fog";

    pub fn new(
        generator_clear2fog: Box<dyn Network>,
        generator_fog2clear: Box<dyn Network>,
        discriminator_clear: Box<dyn Network>,
        discriminator_fog: Box<dyn Network>,
    ) -> Self {
        CycleGanModels {
            generator_clear2fog,
            generator_fog2clear,
            discriminator_clear,
            discriminator_fog,
        }
    }

    /// Dense reference models for images flattened to `features` values.
    /// Each network gets its own seed derived from `seed`.
    pub fn dense(features: usize, hidden: usize, seed: u64) -> Self {
        CycleGanModels::new(
            Box::new(NetworkSpec::generator(Self::GENERATOR_CLEAR2FOG, features, hidden).build_seeded(seed)),
            Box::new(NetworkSpec::generator(Self::GENERATOR_FOG2CLEAR, features, hidden).build_seeded(seed + 1)),
            Box::new(NetworkSpec::discriminator(Self::DISCRIMINATOR_CLEAR, features, hidden).build_seeded(seed + 2)),
            Box::new(NetworkSpec::discriminator(Self::DISCRIMINATOR_FOG, features, hidden).build_seeded(seed + 3)),
        )
    }

    pub fn named(&self) -> [(&'static str, &dyn Network); 4] {
        [
            (Self::GENERATOR_CLEAR2FOG, self.generator_clear2fog.as_ref()),
            (Self::GENERATOR_FOG2CLEAR, self.generator_fog2clear.as_ref()),
            (Self::DISCRIMINATOR_CLEAR, self.discriminator_clear.as_ref()),
            (Self::DISCRIMINATOR_FOG, self.discriminator_fog.as_ref()),
        ]
    }

    pub fn named_mut(&mut self) -> [(&'static str, &mut (dyn Network + 'static)); 4] {
        [
            (Self::GENERATOR_CLEAR2FOG, self.generator_clear2fog.as_mut()),
            (Self::GENERATOR_FOG2CLEAR, self.generator_fog2clear.as_mut()),
            (Self::DISCRIMINATOR_CLEAR, self.discriminator_clear.as_mut()),
            (Self::DISCRIMINATOR_FOG, self.discriminator_fog.as_mut()),
        ]
    }
}
