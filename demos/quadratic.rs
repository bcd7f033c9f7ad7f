//! Fits `y = x^2 + x + 1` with three dense layers and leaky ReLU activations.

use rand::Rng;
use synapse::activation::{Identity, LeakyRelu};
use synapse::config::TrainingConfig;
use synapse::cost;
use synapse::error::Result;
use synapse::layer::{Dense, Layer};
use synapse::model::Model;
use synapse::numbers::*;

const HIDDEN: usize = 100;
const RANGE: Float = 0.5;
const MAX_LOSS: Float = 1e-3;

fn main() -> Result<()> {
    env_logger::init();

    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(Dense::new(1, HIDDEN, LeakyRelu)?),
        Box::new(Dense::new(HIDDEN, HIDDEN, LeakyRelu)?),
        Box::new(Dense::new(HIDDEN, 1, Identity)?),
    ];
    let config = TrainingConfig::new()
        .learning_rate(0.05)
        .clamp_gradient(true);
    let mut model = Model::new(layers, config)?;

    let mut rng = rand::thread_rng();
    // stop once the loss stays below the target for a run of samples
    let mut hits = 0;
    let mut step = 0;
    while hits <= 20 && step < 1_000_000 {
        let x: Float = rng.gen_range(-RANGE..RANGE);
        let target = x * x + x + 1.0;

        let output = model.forward(&[x])?.get(0)?;
        let loss = cost::mse(target, output);
        model.backward(&[cost::mse_derivative(target, output)])?;

        if step % 1000 == 0 {
            log::info!("step {}: x {:.5}, output {:.5}, loss {:.6}", step, x, output, loss);
        }

        hits = if loss < MAX_LOSS { hits + 1 } else { 0 };
        step += 1;
    }

    println!("converged after {} steps", step);
    for &x in &[-0.4, -0.2, 0.0, 0.2, 0.4] {
        let output = model.forward(&[x])?.get(0)?;
        println!("f({:.1}) = {:.4}, expected {:.4}", x, output, x * x + x + 1.0);
    }

    Ok(())
}
