use crate::autograd::Tape;
use crate::error::Result;
use crate::loss::{cycle_loss, discriminator_loss, generator_loss, identity_loss};
use crate::math::Tensor;
use crate::network::CycleGanModels;
use crate::optim::{Optimizer, OptimizerConfig};

/// One optimizer per network, never shared and never persisted.
pub struct Optimizers {
    pub generator_clear2fog: Box<dyn Optimizer>,
    pub generator_fog2clear: Box<dyn Optimizer>,
    pub discriminator_clear: Box<dyn Optimizer>,
    pub discriminator_fog: Box<dyn Optimizer>,
}

impl Optimizers {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Optimizers {
            generator_clear2fog: config.build(),
            generator_fog2clear: config.build(),
            discriminator_clear: config.build(),
            discriminator_fog: config.build(),
        }
    }
}

/// Losses of one training step. Generator values are totals
/// (adversarial + cycle + identity).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepLosses {
    pub gen_clear2fog: f64,
    pub gen_fog2clear: f64,
    pub disc_clear: f64,
    pub disc_fog: f64,
}

/// Runs one CycleGAN update on a clear batch and a fog batch.
///
/// All four losses come from a single forward recording; each is then
/// differentiated against its own network's parameters only, and every
/// network is updated by its own optimizer. Every optimizer checks its
/// update before the first one is applied, so parameters are untouched
/// unless the whole step succeeds.
pub fn train_step(
    models: &mut CycleGanModels,
    optimizers: &mut Optimizers,
    lambda: f64,
    real_clear: &Tensor,
    real_fog: &Tensor,
) -> Result<StepLosses> {
    let (losses, grads) = {
        let g_c2f = models.generator_clear2fog.as_ref();
        let g_f2c = models.generator_fog2clear.as_ref();
        let d_clear = models.discriminator_clear.as_ref();
        let d_fog = models.discriminator_fog.as_ref();

        let mut tape = Tape::new();
        let g_c2f_params = g_c2f.watch(&mut tape);
        let g_f2c_params = g_f2c.watch(&mut tape);
        let d_clear_params = d_clear.watch(&mut tape);
        let d_fog_params = d_fog.watch(&mut tape);

        let real_clear = tape.leaf(real_clear.clone());
        let real_fog = tape.leaf(real_fog.clone());

        // clear -> fog -> clear, fog -> clear -> fog
        let fake_fog = g_c2f.forward(&mut tape, &g_c2f_params, real_clear)?;
        let cycled_clear = g_f2c.forward(&mut tape, &g_f2c_params, fake_fog)?;
        let fake_clear = g_f2c.forward(&mut tape, &g_f2c_params, real_fog)?;
        let cycled_fog = g_c2f.forward(&mut tape, &g_c2f_params, fake_clear)?;

        // Identity probes: each generator fed its own target domain.
        let same_clear = g_f2c.forward(&mut tape, &g_f2c_params, real_clear)?;
        let same_fog = g_c2f.forward(&mut tape, &g_c2f_params, real_fog)?;

        let disc_real_clear = d_clear.forward(&mut tape, &d_clear_params, real_clear)?;
        let disc_real_fog = d_fog.forward(&mut tape, &d_fog_params, real_fog)?;
        let disc_fake_clear = d_clear.forward(&mut tape, &d_clear_params, fake_clear)?;
        let disc_fake_fog = d_fog.forward(&mut tape, &d_fog_params, fake_fog)?;

        let gen_clear2fog_adv = generator_loss(&mut tape, disc_fake_fog);
        let gen_fog2clear_adv = generator_loss(&mut tape, disc_fake_clear);

        let cycle_clear = cycle_loss(&mut tape, real_clear, cycled_clear, lambda)?;
        let cycle_fog = cycle_loss(&mut tape, real_fog, cycled_fog, lambda)?;
        let total_cycle = tape.add(cycle_clear, cycle_fog)?;

        let identity_fog = identity_loss(&mut tape, real_fog, same_fog, lambda)?;
        let identity_clear = identity_loss(&mut tape, real_clear, same_clear, lambda)?;

        let total_clear2fog = tape.add(gen_clear2fog_adv, total_cycle)?;
        let total_clear2fog = tape.add(total_clear2fog, identity_fog)?;
        let total_fog2clear = tape.add(gen_fog2clear_adv, total_cycle)?;
        let total_fog2clear = tape.add(total_fog2clear, identity_clear)?;

        let disc_clear_loss = discriminator_loss(&mut tape, disc_real_clear, disc_fake_clear)?;
        let disc_fog_loss = discriminator_loss(&mut tape, disc_real_fog, disc_fake_fog)?;

        let grads = [
            tape.gradient(total_clear2fog, &g_c2f_params)?,
            tape.gradient(total_fog2clear, &g_f2c_params)?,
            tape.gradient(disc_clear_loss, &d_clear_params)?,
            tape.gradient(disc_fog_loss, &d_fog_params)?,
        ];
        let losses = StepLosses {
            gen_clear2fog: tape.value(total_clear2fog).item(),
            gen_fog2clear: tape.value(total_fog2clear).item(),
            disc_clear: tape.value(disc_clear_loss).item(),
            disc_fog: tape.value(disc_fog_loss).item(),
        };
        (losses, grads)
    };

    let [g_c2f_grads, g_f2c_grads, d_clear_grads, d_fog_grads] = grads;
    optimizers.generator_clear2fog.check(&models.generator_clear2fog.parameters(), &g_c2f_grads)?;
    optimizers.generator_fog2clear.check(&models.generator_fog2clear.parameters(), &g_f2c_grads)?;
    optimizers.discriminator_clear.check(&models.discriminator_clear.parameters(), &d_clear_grads)?;
    optimizers.discriminator_fog.check(&models.discriminator_fog.parameters(), &d_fog_grads)?;

    optimizers
        .generator_clear2fog
        .step(models.generator_clear2fog.parameters_mut(), &g_c2f_grads)?;
    optimizers
        .generator_fog2clear
        .step(models.generator_fog2clear.parameters_mut(), &g_f2c_grads)?;
    optimizers
        .discriminator_clear
        .step(models.discriminator_clear.parameters_mut(), &d_clear_grads)?;
    optimizers
        .discriminator_fog
        .step(models.discriminator_fog.parameters_mut(), &d_fog_grads)?;

    Ok(losses)
}
