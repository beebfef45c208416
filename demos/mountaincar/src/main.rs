use axon::{AxonResult, ConfigParser, Genome, Population, init_logging, random_provider};
use std::process::ExitCode;

const GRAVITY: f32 = 0.0025;
const MIN_POSITION: f32 = -1.2;
const MAX_POSITION: f32 = 0.6;
const MAX_SPEED: f32 = 0.07;
const FORCE: f32 = 0.001;
const GOAL_POSITION: f32 = 0.5;

/// The classic mountain-car control task: an underpowered car in a valley
/// must rock back and forth to build enough momentum to reach the right hill.
struct MountainCar {
    position: f32,
    velocity: f32,
}

impl MountainCar {
    fn new() -> Self {
        MountainCar {
            position: -0.5,
            velocity: 0.0,
        }
    }

    /// Actions: 0 pushes left, 1 coasts, 2 pushes right.
    fn apply_force(&mut self, action: usize) {
        let force = match action {
            0 => -FORCE,
            1 => 0.0,
            _ => FORCE,
        };

        self.velocity += force - (3.0 * self.position).cos() * GRAVITY;
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);

        // The left wall is inelastic.
        if self.position == MIN_POSITION && self.velocity < 0.0 {
            self.velocity = 0.0;
        }
    }

    fn reached_goal(&self) -> bool {
        self.position >= GOAL_POSITION
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Fitness is the negated number of steps spent before reaching the goal;
/// an episode that never gets there scores the full -1000.
fn eval_genomes(genome: &Genome) -> AxonResult<f32> {
    let max_steps = 1000;
    let mut car = MountainCar::new();
    let mut fitness = 0.0;

    for _ in 0..max_steps {
        let output = genome.forward(&[car.position, car.velocity])?;
        car.apply_force(argmax(&output));

        if car.reached_goal() {
            break;
        }

        fitness -= 1.0;
    }

    Ok(fitness)
}

fn run(config_file: &str) -> AxonResult<()> {
    println!("Running experiment with config at: {config_file}");

    let config = ConfigParser::from_file(config_file)?;
    println!("{config}");

    let mut population = Population::new(&config)?;
    let mut best = population.run(eval_genomes, 300)?;

    println!("\nBest genome: {} (fitness {:.1})", best.key(), best.fitness());
    println!("Nodes:");
    for node in best.nodes().values() {
        println!("\t{node}");
    }
    println!("Connections:");
    for conn in best.connections().values() {
        println!("\t{conn}");
    }

    // Replay one episode with the winner.
    best.activate();
    let mut car = MountainCar::new();
    for step in 0..1000 {
        let output = best.forward(&[car.position, car.velocity])?;
        car.apply_force(argmax(&output));
        if car.reached_goal() {
            println!("\nReached the goal in {} steps", step + 1);
            break;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let Some(config_file) = std::env::args().nth(1) else {
        eprintln!("usage: mountaincar <config-file> [seed]");
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
