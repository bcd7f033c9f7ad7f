//! Classifies points by the quadrant they fall in, with softmax outputs and a cross entropy loss.

use rand::Rng;
use synapse::activation::{LeakyRelu, Softmax};
use synapse::config::TrainingConfig;
use synapse::cost;
use synapse::error::Result;
use synapse::layer::{Dense, Layer};
use synapse::model::Model;
use synapse::numbers::*;
use synapse::tensor::Vector;

const CLASSES: usize = 4;

fn quadrant(x: Float, y: Float) -> usize {
    match (x >= 0.0, y >= 0.0) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(Dense::new(2, 32, LeakyRelu)?),
        Box::new(Dense::new(32, CLASSES, Softmax)?),
    ];
    let mut model = Model::new(layers, TrainingConfig::new().learning_rate(0.05))?;

    let mut rng = rand::thread_rng();
    let label = Vector::zeros(CLASSES);
    let gradient = Vector::zeros(CLASSES);

    let mut average = 1.0;
    for step in 0..20_000 {
        let (x, y): (Float, Float) = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        label.fill(0.0);
        label.set(quadrant(x, y), 1.0)?;

        let output = model.forward(&[x, y])?;
        let loss = cost::cross_entropy(&label, &output)?;
        cost::cross_entropy_derivative(&label, &output, &gradient)?;
        model.backward(&gradient.to_vec())?;

        average = 0.99 * average + 0.01 * loss;
        if step % 1000 == 0 {
            log::info!("step {}: average loss {:.4}", step, average);
        }
    }

    let mut correct = 0;
    let total = 1000;
    for _ in 0..total {
        let (x, y): (Float, Float) = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let output = model.forward(&[x, y])?.to_vec();

        let prediction = (0..CLASSES)
            .fold(0, |best, i| if output[i] > output[best] { i } else { best });
        if prediction == quadrant(x, y) {
            correct += 1;
        }
    }

    println!("accuracy: {} / {}", correct, total);
    Ok(())
}
