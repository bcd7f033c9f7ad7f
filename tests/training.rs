#[macro_use]
extern crate synapse;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use synapse::activation::{Identity, LeakyRelu, Sigmoid};
use synapse::config::TrainingConfig;
use synapse::cost;
use synapse::layer::{connect, Conv, Dense, Layer, Pool};
use synapse::model::Model;
use synapse::numbers::*;
use synapse::tensor::{Matrix, Vector};

/// Replaces the weights of `dense` with Xavier values drawn from `rng`.
fn reinitialize(dense: Dense, rng: &mut StdRng) -> Dense {
    let weights = Matrix::xavier_with(dense.output_size(), dense.input_size(), rng);
    dense
        .weights()
        .to_vector()
        .copy_from_slice(&weights.to_vec())
        .unwrap();
    dense
}

#[test]
fn test_forward_deterministic() {
    let mut dense = Dense::new(3, 2, Sigmoid).unwrap();
    dense.input().copy_from_slice(&[0.3, -0.1, 0.7]).unwrap();

    dense.forward().unwrap();
    let first = dense.output().duplicate();
    dense.forward().unwrap();
    assert_eq!(dense.output(), first);
}

#[test]
fn test_fit_line() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut dense = reinitialize(Dense::new(1, 1, Identity).unwrap(), &mut rng);

    for _ in 0..5000 {
        let x: Float = rng.gen_range(-5.0..5.0);
        let target = 3.0 * x + 1.0;

        dense.input().set(0, x).unwrap();
        dense.forward().unwrap();
        let output = dense.output().get(0).unwrap();
        dense
            .incoming_gradient()
            .set(0, cost::mse_derivative(target, output))
            .unwrap();
        dense.backward(0.01).unwrap();
    }

    assert_relative_eq!(dense.weights().get(0, 0).unwrap(), 3.0, epsilon = 1e-3);
    assert_relative_eq!(dense.biases().get(0).unwrap(), 1.0, epsilon = 1e-3);
}

#[test]
fn test_chain_rule_through_identity_layers() {
    let mut first = Dense::new(1, 1, Identity).unwrap();
    let mut second = Dense::new(1, 1, Identity).unwrap();
    first.weights().set(0, 0, 2.0).unwrap();
    second.weights().set(0, 0, 3.0).unwrap();
    connect(&mut first, &mut second).unwrap();

    first.input().set(0, 1.5).unwrap();
    first.forward().unwrap();
    second.forward().unwrap();
    assert_eq!(second.output(), vector![9.0]);
    assert!(second.input().shares_values_with(&first.output()));

    second.incoming_gradient().set(0, 1.0).unwrap();
    second.backward(0.0).unwrap();
    first.backward(0.0).unwrap();

    assert_eq!(first.incoming_gradient(), vector![3.0]);
    assert_eq!(first.outgoing_gradient(), vector![6.0]);
    assert_eq!(first.weights_gradient().get(0, 0).unwrap(), 4.5);
    assert_eq!(second.weights_gradient().get(0, 0).unwrap(), 3.0);
}

#[test]
fn test_gradient_alias_holds_every_step() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut first = reinitialize(Dense::new(1, 1, Identity).unwrap(), &mut rng);
    let mut second = reinitialize(Dense::new(1, 1, Identity).unwrap(), &mut rng);
    connect(&mut first, &mut second).unwrap();

    for step in 0..50 {
        let x: Float = rng.gen_range(-1.0..1.0);
        let target = 2.0 * x - 0.5;

        first.input().set(0, x).unwrap();
        first.forward().unwrap();
        second.forward().unwrap();
        assert_eq!(second.input(), first.output(), "step {}", step);

        let output = second.output().get(0).unwrap();
        second
            .incoming_gradient()
            .set(0, cost::mse_derivative(target, output))
            .unwrap();
        let weight = second.weights().get(0, 0).unwrap();
        second.backward(0.01).unwrap();

        // the outgoing gradient uses the weight before the update
        let delta = second.biases_gradient().get(0).unwrap();
        assert_relative_eq!(first.incoming_gradient().get(0).unwrap(), delta * weight);
        assert_eq!(
            first.incoming_gradient(),
            second.outgoing_gradient(),
            "step {}",
            step
        );

        first.backward(0.01).unwrap();
        assert_eq!(
            first.incoming_gradient(),
            second.outgoing_gradient(),
            "step {}",
            step
        );
    }
}

#[test]
fn test_model_fits_vector_function() {
    let mut rng = StdRng::seed_from_u64(7);
    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(reinitialize(Dense::new(2, 16, LeakyRelu).unwrap(), &mut rng)),
        Box::new(reinitialize(Dense::new(16, 2, Identity).unwrap(), &mut rng)),
    ];
    let mut model = Model::new(layers, TrainingConfig::new().learning_rate(0.01)).unwrap();

    let loss = |model: &mut Model, x: Float, y: Float| -> Float {
        let output = model.forward(&[x, y]).unwrap().to_vec();
        let target = [2.0 * y, 0.5 * x + 1.0];
        output
            .iter()
            .zip(target.iter())
            .map(|(o, t)| cost::mse(*t, *o))
            .sum()
    };

    let before = loss(&mut model, 0.05, -0.05);
    for _ in 0..5000 {
        let (x, y): (Float, Float) = (rng.gen_range(-0.1..0.1), rng.gen_range(-0.1..0.1));
        let output = model.forward(&[x, y]).unwrap().to_vec();
        let target = [2.0 * y, 0.5 * x + 1.0];

        let gradient = output
            .iter()
            .zip(target.iter())
            .map(|(o, t)| cost::mse_derivative(*t, *o))
            .collect::<Vec<Float>>();
        model.backward(&gradient).unwrap();
    }

    let after = loss(&mut model, 0.05, -0.05);
    assert!(after < before);
    assert!(after < 1e-2);
}

#[test]
fn test_convolutional_model_backward() {
    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(Conv::new(1, 4, 4, 3).unwrap()),
        Box::new(Pool::new(1, 2, 2, 2).unwrap()),
        Box::new(Dense::new(1, 1, Identity).unwrap()),
    ];
    let mut model = Model::new(layers, TrainingConfig::default()).unwrap();

    let input = (0..16).map(|x| x as Float).collect::<Vec<Float>>();
    model.forward(&input).unwrap();
    model.backward(&[1.0]).unwrap();

    let outgoing = model.layers()[0].outgoing_gradient();
    assert_eq!(outgoing.len(), 16);
    assert!(outgoing.values().iter().all(|x| x.is_finite()));
    assert_eq!(
        model.layers()[1].incoming_gradient(),
        model.layers()[2].outgoing_gradient()
    );
    assert_ne!(model.layers()[1].outgoing_gradient(), Vector::zeros(4));
}
