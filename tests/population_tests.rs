//! Integration tests for the generational loop

use std::sync::Arc;

use gp_evo::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

type Comparator = FitnessComparator<fn(&Program) -> f64>;

/// Negative absolute error against x^2 + x on a few sample points
fn quadratic_fitness(program: &Program) -> f64 {
    -(-3..=3)
        .map(|i| {
            let x = i as f64;
            (program.evaluate(&[x]) - (x * x + x)).abs()
        })
        .sum::<f64>()
}

fn prefer_x(program: &Program) -> f64 {
    if *program == Program::variable("x", 0) {
        1.0
    } else {
        0.0
    }
}

fn comparator(fitness: fn(&Program) -> f64) -> Comparator {
    FitnessComparator::new(fitness)
}

fn arithmetic_population(config: PopulationConfig) -> Population<Comparator> {
    let primitives = Arc::new(PrimitiveSet::arithmetic(&["x"]).unwrap());
    Population::builder(primitives.clone(), comparator(quadratic_fitness))
        .config(config)
        .selection(TournamentSelection::new(comparator(quadratic_fitness), 3))
        .crossover(SubtreeCrossover)
        .mutation(PointMutation::new(primitives, 0.1))
        .generator(RampedHalfAndHalf::default())
        .build()
        .unwrap()
}

fn terminal_only_population(
    terminals: &[(&str, usize)],
    config: PopulationConfig,
) -> Population<Comparator> {
    let mut builder = PrimitiveSet::builder();
    for (name, index) in terminals {
        builder = builder.variable(*name, *index);
    }
    let primitives = Arc::new(builder.build().unwrap());
    Population::builder(primitives, comparator(prefer_x))
        .config(config)
        .selection(TournamentSelection::new(comparator(prefer_x), 2))
        .crossover(SubtreeCrossover)
        .mutation(HoistMutation)
        .generator(GrowGenerator)
        .build()
        .unwrap()
}

fn seeds() -> Vec<Program> {
    let x = Program::variable("x", 0);
    vec![
        Program::new(Primitive::Add, vec![x.clone(), x.clone()]).unwrap(),
        Program::new(Primitive::Mul, vec![x.clone(), x.clone()]).unwrap(),
        Program::new(Primitive::Sub, vec![x.clone(), Program::constant(1.0)]).unwrap(),
        Program::new(Primitive::Div, vec![Program::constant(1.0), x.clone()]).unwrap(),
        Program::new(
            Primitive::Add,
            vec![Program::new(Primitive::Mul, vec![x.clone(), x.clone()]).unwrap(), x],
        )
        .unwrap(),
    ]
}

#[test]
fn test_init_with_seeds() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut population = arithmetic_population(PopulationConfig::default().with_max_size(50));
    let seeds = seeds();

    population.init(&seeds, &mut rng).unwrap();

    assert_eq!(population.len(), 50);
    for seed in &seeds {
        assert!(population.contains(seed));
    }
    // Seeds come first, in order.
    assert_eq!(&population.members()[..5], seeds.as_slice());

    // The exact solution is among the seeds and must be the best.
    assert_eq!(population.best_program(), Some(&seeds[4]));
}

#[test]
fn test_init_truncates_seeds_to_max_size() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut population = arithmetic_population(PopulationConfig::default().with_max_size(3));
    population.init(&seeds(), &mut rng).unwrap();
    assert_eq!(population.members(), &seeds()[..3]);
}

#[test]
fn test_step_keeps_elites() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = PopulationConfig::default()
        .with_max_size(100)
        .with_crossover_percent(0.6)
        .with_mutation_percent(0.2)
        .with_elitism_percent(0.1);
    let mut population = arithmetic_population(config);
    population.init(&[], &mut rng).unwrap();
    let previous: Vec<Program> = population.members().to_vec();

    let report = population.step(&mut rng).unwrap();

    assert!(population.len() <= 100);
    assert_eq!(report.elites, 10);
    assert_eq!(
        report.crossover_offspring + report.dropped_for_length,
        60
    );
    assert_eq!(report.mutation_offspring, 20);
    assert_eq!(report.members, population.len());

    let survivors = previous.iter().filter(|p| population.contains(p)).count();
    assert!(survivors >= 10);
}

#[test]
fn test_crossover_length_cap() {
    let mut rng = StdRng::seed_from_u64(8);
    let config = PopulationConfig::default()
        .with_max_size(40)
        .with_max_element_length(3)
        .with_crossover_percent(0.5)
        .with_mutation_percent(0.0)
        .with_elitism_percent(0.0);
    let mut population = arithmetic_population(config);
    population.init(&[], &mut rng).unwrap();

    let report = population.step(&mut rng).unwrap();
    assert_eq!(report.crossover_offspring + report.dropped_for_length, 20);
    assert!(report.dropped_for_length > 0);
    assert_eq!(
        report.crossover_offspring + report.fresh,
        40,
        "dropped offspring are replaced by fresh programs"
    );
}

#[test]
fn test_duplicates_collapse_below_max_size() {
    let mut rng = StdRng::seed_from_u64(3);
    let config = PopulationConfig::default()
        .with_max_size(3)
        .with_crossover_percent(0.0)
        .with_mutation_percent(0.0)
        .with_elitism_percent(0.0);
    let mut population = terminal_only_population(&[("x", 0)], config);
    population
        .init(
            &[
                Program::variable("a", 1),
                Program::variable("b", 2),
                Program::variable("c", 3),
            ],
            &mut rng,
        )
        .unwrap();
    assert_eq!(population.len(), 3);

    // Only `x` can be generated, so three fresh draws collapse into one.
    let report = population.step(&mut rng).unwrap();
    assert_eq!(report.fresh, 3);
    assert_eq!(report.members, 1);
    assert_eq!(population.members(), &[Program::variable("x", 0)]);
}

#[test]
fn test_capacity_exhausted_keeps_previous_members() {
    let mut rng = StdRng::seed_from_u64(4);
    let config = PopulationConfig::default()
        .with_max_size(5)
        .with_max_init_retries(10);
    let mut population = terminal_only_population(&[("x", 0)], config);

    let err = population.init(&[], &mut rng).unwrap_err();
    assert_eq!(
        err,
        EvolutionError::CapacityExhausted {
            members: 1,
            target: 5,
            retries: 10,
        }
    );
    assert!(population.is_empty());
    assert_eq!(population.state(), PopulationState::Uninitialized);

    let seeds: Vec<Program> = (1..=5).map(|i| Program::variable("v", i)).collect();
    population.init(&seeds, &mut rng).unwrap();
    assert!(population.init(&[], &mut rng).is_err());
    assert_eq!(population.members(), seeds.as_slice());
}

#[test]
fn test_best_program_may_regress_without_keep_best() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = PopulationConfig::default()
        .with_max_size(1)
        .with_crossover_percent(0.0)
        .with_mutation_percent(0.0)
        .with_elitism_percent(0.0);
    let mut population = terminal_only_population(&[("x", 0), ("y", 1)], config);
    population
        .init(&[Program::variable("x", 0)], &mut rng)
        .unwrap();

    let mut regressed = false;
    for _ in 0..50 {
        population.step(&mut rng).unwrap();
        if population.best_program() == Some(&Program::variable("y", 1)) {
            regressed = true;
            break;
        }
    }
    assert!(regressed);
}

#[test]
fn test_keep_best_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = PopulationConfig::default()
        .with_max_size(1)
        .with_crossover_percent(0.0)
        .with_mutation_percent(0.0)
        .with_elitism_percent(0.0)
        .with_keep_best(true);
    let mut population = terminal_only_population(&[("x", 0), ("y", 1)], config);
    population
        .init(&[Program::variable("x", 0)], &mut rng)
        .unwrap();

    for _ in 0..50 {
        let report = population.step(&mut rng).unwrap();
        assert!(report.best_carried);
        assert_eq!(population.best_program(), Some(&Program::variable("x", 0)));
    }
}

#[test]
fn test_keep_best_fitness_never_decreases() {
    let mut rng = StdRng::seed_from_u64(11);
    let config = PopulationConfig::default()
        .with_max_size(40)
        .with_elitism_percent(0.0)
        .with_keep_best(true);
    let mut population = arithmetic_population(config);
    population.init(&[], &mut rng).unwrap();

    let mut last = quadratic_fitness(population.best_program().unwrap());
    for _ in 0..10 {
        population.step(&mut rng).unwrap();
        let current = quadratic_fitness(population.best_program().unwrap());
        assert!(current >= last);
        last = current;
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut population = arithmetic_population(PopulationConfig::default().with_max_size(30));
        population.init(&[], &mut rng).unwrap();
        for _ in 0..5 {
            population.step(&mut rng).unwrap();
        }
        population.members().to_vec()
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_evolve_stops_on_max_generations() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut population = arithmetic_population(PopulationConfig::default().with_max_size(30));

    let summary = population
        .evolve(&quadratic_fitness, &MaxGenerations::new(5), &mut rng)
        .unwrap();

    assert_eq!(summary.generations, 5);
    assert_eq!(summary.fitness_history.len(), 6);
    assert_eq!(summary.reason, "Maximum generations reached");
    assert!(population.contains(&summary.best));
}

#[test]
fn test_evolve_stops_on_target_fitness() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut population = arithmetic_population(PopulationConfig::default().with_max_size(20));
    population.init(&seeds(), &mut rng).unwrap();

    let criterion = AnyOf::new(vec![
        Box::new(TargetFitness::new(0.0)),
        Box::new(MaxGenerations::new(100)),
    ]);
    let summary = population
        .evolve(&quadratic_fitness, &criterion, &mut rng)
        .unwrap();

    // The seeded exact solution is found before any step runs.
    assert_eq!(summary.generations, 0);
    assert_eq!(summary.best_fitness, 0.0);
    assert_eq!(summary.best, seeds()[4]);
}
