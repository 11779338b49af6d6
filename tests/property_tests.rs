//! Property-based tests for gp-evo
//!
//! Uses proptest to verify invariants of program trees and operators. Trees
//! are drawn from seeded generators so every failing case can be replayed.

use std::sync::Arc;

use gp_evo::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn primitives() -> Arc<PrimitiveSet> {
    Arc::new(
        PrimitiveSet::builder()
            .variable("x", 0)
            .variable("y", 1)
            .constant(1.0)
            .constant(2.0)
            .function(Primitive::Add)
            .function(Primitive::Mul)
            .function(Primitive::Sin)
            .function(Primitive::IfGreater)
            .build()
            .unwrap(),
    )
}

fn random_tree(seed: u64, depth: usize) -> Program {
    let mut rng = StdRng::seed_from_u64(seed);
    GrowGenerator.generate(&primitives(), depth, &mut rng).unwrap()
}

fn is_valid(program: &Program) -> bool {
    program.children().len() == program.arity()
        && program.length() == 1 + program.children().iter().map(Program::length).sum::<usize>()
        && program.children().iter().all(is_valid)
}

proptest! {
    // ==================== Tree Properties ====================

    #[test]
    fn program_at_zero_is_self(seed in any::<u64>(), depth in 0usize..6) {
        let tree = random_tree(seed, depth);
        prop_assert_eq!(tree.program_at(0).unwrap(), &tree);
    }

    #[test]
    fn length_is_one_plus_children(seed in any::<u64>(), depth in 0usize..6) {
        let tree = random_tree(seed, depth);
        prop_assert!(is_valid(&tree));
        prop_assert_eq!(tree.iter().count(), tree.length());
        prop_assert!(tree.depth() <= depth);
    }

    #[test]
    fn replace_with_own_subtree_is_identity(seed in any::<u64>(), depth in 0usize..5) {
        let tree = random_tree(seed, depth);
        for i in 0..tree.length() {
            let sub = tree.program_at(i).unwrap().clone();
            prop_assert_eq!(tree.replace(i, sub).unwrap(), tree.clone());
        }
        prop_assert!(tree.program_at(tree.length()).is_err());
    }

    #[test]
    fn replace_puts_program_at_index(seed in any::<u64>(), depth in 1usize..5, pick in any::<prop::sample::Index>()) {
        let tree = random_tree(seed, depth);
        let i = pick.index(tree.length());
        let graft = Program::constant(42.0);
        let edited = tree.replace(i, graft.clone()).unwrap();
        prop_assert_eq!(edited.program_at(i).unwrap(), &graft);
        prop_assert_eq!(edited.length(), tree.length() - tree.program_at(i).unwrap().length() + 1);
    }

    #[test]
    fn common_region_is_closed(seed1 in any::<u64>(), seed2 in any::<u64>()) {
        let a = random_tree(seed1, 4);
        let b = random_tree(seed2, 4);
        let region = a.common_region_indexes(&b);

        prop_assert_eq!(region.get(&0).copied(), if a.arity() == b.arity() { Some(0) } else { None });
        for (&i, &j) in &region {
            let na = a.program_at(i).unwrap();
            let nb = b.program_at(j).unwrap();
            prop_assert_eq!(na.arity(), nb.arity());

            let mut ci = i + 1;
            let mut cj = j + 1;
            for (ca, cb) in na.children().iter().zip(nb.children()) {
                if ca.arity() == cb.arity() {
                    prop_assert_eq!(region.get(&ci).copied(), Some(cj));
                }
                ci += ca.length();
                cj += cb.length();
            }
        }
    }

    #[test]
    fn common_region_with_self_covers_every_node(seed in any::<u64>()) {
        let tree = random_tree(seed, 4);
        let region = tree.common_region_indexes(&tree);
        prop_assert_eq!(region.len(), tree.length());
        prop_assert!(region.iter().all(|(i, j)| i == j));
    }

    // ==================== Operator Properties ====================

    #[test]
    fn crossover_produces_valid_trees(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = random_tree(seed, 4);
        let b = random_tree(seed.wrapping_add(1), 4);

        let operators: Vec<Box<dyn CrossoverOperator>> = vec![
            Box::new(SubtreeCrossover),
            Box::new(OnePointCrossover),
            Box::new(ContextPreservingCrossover),
            Box::new(UniformCrossover),
        ];
        for operator in &operators {
            let child = operator.crossover(&a, &b, &mut rng).unwrap();
            prop_assert!(is_valid(&child));
        }
    }

    #[test]
    fn mutation_produces_valid_trees(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = random_tree(seed, 4);
        let set = primitives();

        let operators: Vec<Box<dyn MutationOperator>> = vec![
            Box::new(PointMutation::new(set.clone(), 0.3)),
            Box::new(ShrinkMutation::new(set.clone())),
            Box::new(SubtreeMutation::new(FullGenerator, set, 2)),
            Box::new(SwapMutation),
            Box::new(HoistMutation),
        ];
        for operator in &operators {
            let child = operator.mutate(&tree, &mut rng).unwrap();
            prop_assert!(is_valid(&child));
        }
    }

    #[test]
    fn hoist_never_grows(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = random_tree(seed, 5);
        prop_assert!(HoistMutation.mutate(&tree, &mut rng).unwrap().length() <= tree.length());
    }

    #[test]
    fn serde_round_trip_preserves_structure(seed in any::<u64>()) {
        let tree = random_tree(seed, 4);
        let json = serde_json::to_string(&tree).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, tree);
    }
}
