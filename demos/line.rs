//! Fits `y = 3x + 1` with a single dense layer.

use rand::Rng;
use synapse::activation::Identity;
use synapse::cost;
use synapse::error::Result;
use synapse::layer::{Dense, Layer};
use synapse::numbers::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let mut dense = Dense::new(1, 1, Identity)?;

    let mut loss: Float = 1.0;
    let mut step = 0;
    while loss > 1e-5 && step < 100_000 {
        let x: Float = rng.gen_range(-5.0..5.0);
        let target = 3.0 * x + 1.0;

        dense.input().set(0, x)?;
        dense.forward()?;
        let output = dense.output().get(0)?;
        loss = cost::mse(target, output);

        if step % 100 == 0 {
            log::info!(
                "step {}: weight {:.4}, bias {:.4}, loss {:.6}",
                step,
                dense.weights().get(0, 0)?,
                dense.biases().get(0)?,
                loss
            );
        }

        dense
            .incoming_gradient()
            .set(0, cost::mse_derivative(target, output))?;
        dense.backward(0.01)?;
        step += 1;
    }

    println!("fitted after {} steps, loss {:.6}", step, loss);
    println!("weights:\n{}", dense.weights());
    println!("biases:\n{}", dense.biases());
    Ok(())
}
