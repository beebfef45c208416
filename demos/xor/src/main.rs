use axon::{AxonResult, ConfigParser, Genome, Population, init_logging, random_provider};
use std::process::ExitCode;

// 2-input XOR inputs and expected outputs.
const XOR_INPUTS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const XOR_OUTPUTS: [f32; 4] = [0.0, 1.0, 1.0, 0.0];

fn eval_genomes(genome: &Genome) -> AxonResult<f32> {
    let mut fitness = 4.0;
    for (input, expected) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = genome.forward(input)?;
        fitness -= (output[0] - expected).powi(2);
    }
    Ok(fitness)
}

fn run(config_file: &str) -> AxonResult<()> {
    println!("Running experiment with config at: {config_file}");

    let config = ConfigParser::from_file(config_file)?;
    println!("{config}");

    let mut population = Population::new(&config)?;

    // Run for up to 300 generations.
    let mut best = population.run(eval_genomes, 300)?;

    println!("\nBest genome: {} (fitness {:.4})", best.key(), best.fitness());
    println!("Nodes:");
    for node in best.nodes().values() {
        println!("\t{node}");
    }
    println!("Connections:");
    for conn in best.connections().values() {
        println!("\t{conn}");
    }

    // Show the winner against the training data.
    println!("\nOutput:");
    best.activate();
    for (input, expected) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = best.forward(input)?;
        println!(
            "input {{{}, {}}}, expected output {{{}}}, got {{{:.4}}}",
            input[0], input[1], expected, output[0]
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let Some(config_file) = std::env::args().nth(1) else {
        eprintln!("usage: xor <config-file> [seed]");
        return ExitCode::FAILURE;
    };
    if let Some(seed) = std::env::args().nth(2).and_then(|arg| arg.parse().ok()) {
        random_provider::set_seed(seed);
    }

    match run(&config_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
