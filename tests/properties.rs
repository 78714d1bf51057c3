use linear3::{Gf2, Gf3, Linear3Solver, ToTriple, XorGraph, to_equation};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

fn random_keys(n: usize, seed: u64) -> Vec<[u64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.next_u64(), rng.next_u64(), rng.next_u64()])
        .collect()
}

/// Number of equations for `n` variables at `load`, at most `n`.
fn equations(n: u32, load: f64) -> u32 {
    ((n as f64 * load) as u32).min(n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn peeling_conserves_degrees(
        n in 1u32..400,
        load in 0.1f64..1.2,
        key_seed in any::<u64>(),
        seed in any::<u64>(),
    ) {
        let m = (n as f64 * load) as u32;
        let keys = random_keys(m as usize, key_seed);
        let mut g = XorGraph::new(n, m);
        g.build(&keys, seed).unwrap();
        let built: u32 = (0..n as usize).map(|v| g.degree(v)).sum();
        prop_assert_eq!(built, 3 * m);

        let complete = g.peel();
        let peeled = g.peeled_edges();
        prop_assert!(peeled <= m as usize);
        prop_assert_eq!(complete, peeled == m as usize);
        prop_assert_eq!(g.peeling_order().len(), peeled);

        let live = (0..m as usize).filter(|&e| !g.is_peeled(e)).count() as u32;
        prop_assert_eq!(live as usize, m as usize - peeled);
        let left: u32 = (0..n as usize).map(|v| g.degree(v)).sum();
        prop_assert_eq!(left, 3 * live);
        // A 2-core has no vertex of degree one.
        prop_assert!((0..n as usize).all(|v| g.degree(v) != 1));
    }

    #[test]
    fn gf2_solutions_satisfy_every_equation(
        n in 1u32..600,
        load in 0.3f64..0.95,
        key_seed in any::<u64>(),
        seed in any::<u64>(),
    ) {
        let m = equations(n, load);
        let keys = random_keys(m as usize, key_seed);
        let values: Vec<u64> = random_keys(m as usize, !key_seed)
            .into_iter()
            .map(|t| t[1])
            .collect();

        let mut s = Linear3Solver::<Gf2>::new(n, m);
        let solved = s.generate_and_solve(&keys, seed, &values).unwrap();
        prop_assert_eq!(solved, s.unsolvable() == 0);
        if solved {
            let x = s.solution();
            for (key, &value) in keys.iter().zip(&values) {
                let [a, b, c] = to_equation(key, seed, n).unwrap();
                prop_assert_eq!(x[a as usize] ^ x[b as usize] ^ x[c as usize], value);
            }
        }
    }

    #[test]
    fn gf3_solutions_satisfy_every_equation(
        n in 1u32..600,
        load in 0.3f64..0.95,
        key_seed in any::<u64>(),
        seed in any::<u64>(),
    ) {
        let m = equations(n, load);
        let keys = random_keys(m as usize, key_seed);

        let mut s = Linear3Solver::<Gf3>::new(n, m);
        let solved = s.generate_and_solve(&keys, seed).unwrap();
        prop_assert_eq!(solved, s.unsolvable() + s.unorientable() == 0);
        prop_assert!(s.unsolvable() + s.unorientable() <= 1);
        if solved {
            let encoded: Vec<u8> = s.encoded_solution().collect();
            for key in &keys {
                let e = to_equation(key, seed, n).unwrap();
                let sum: u32 = e.iter().map(|&v| u32::from(encoded[v as usize])).sum();
                // The hinge is assigned (never encoded as 0) and sits at slot `sum mod 3`.
                let k = (sum % 3) as usize;
                prop_assert!(encoded[e[k] as usize] != 0, "{:?} -> {:?}", key.hash_triple(seed), e);
            }
            // One assigned vertex per equation, none elsewhere.
            prop_assert_eq!(encoded.iter().filter(|&&x| x != 0).count(), m as usize);
        }
    }

    #[test]
    fn equations_stay_in_range(
        n in 1u32..u32::MAX,
        key in any::<[u64; 3]>(),
        seed in any::<u64>(),
    ) {
        let e = to_equation(&key, seed, n).unwrap();
        prop_assert!(e.iter().all(|&v| v < n));
        prop_assert_eq!(Some(e), to_equation(&key, seed, n));
    }
}
