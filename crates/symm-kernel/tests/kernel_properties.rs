use proptest::prelude::*;
use symm_kernel::{
    build_kernel, compare_steady_states, dominant_eigenpair, power_iteration, MistakeRates,
    RateVector, ROW_SUM_TOLERANCE,
};

fn prime_rates() -> impl Strategy<Value = Vec<(u32, f64)>> {
    (0.0f64..0.2, 0.0f64..0.2, 0.0f64..0.2, 0.0f64..0.2)
        .prop_map(|(r2, r3, r5, r7)| vec![(2, r2), (3, r3), (5, r5), (7, r7)])
}

proptest! {
    #[test]
    fn kernels_are_row_stochastic(
        forward in prime_rates(),
        inverse in prime_rates(),
        epsilon in 0.0f64..0.01,
    ) {
        let rates = MistakeRates {
            forward: RateVector::from_prime_rates(&forward).unwrap(),
            inverse: RateVector::from_prime_rates(&inverse).unwrap(),
            cases_used: 0,
        };
        let kernel = build_kernel(&rates, epsilon).unwrap();
        for sum in kernel.row_sums() {
            prop_assert!((sum - 1.0).abs() < ROW_SUM_TOLERANCE);
        }
        for value in kernel.matrix().iter() {
            prop_assert!((0.0..=1.0).contains(value));
        }
        for i in 1..=8usize {
            for j in 1..=8usize {
                if i == j {
                    continue;
                }
                let cell = kernel.get(i, j).unwrap();
                if i % j == 0 && (i / j == 2 || i / j == 3 || i / j == 5 || i / j == 7) {
                    let rate = rates.forward.rate_for((i / j) as u32).unwrap();
                    prop_assert!((cell - rate - epsilon).abs() < 1e-12);
                } else if j % i == 0 && (j / i == 2 || j / i == 3 || j / i == 5 || j / i == 7) {
                    let rate = rates.inverse.rate_for((j / i) as u32).unwrap();
                    prop_assert!((cell - rate - epsilon).abs() < 1e-12);
                } else {
                    prop_assert!((cell - epsilon).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn smoothed_kernels_have_agreeing_steady_states(
        forward in prime_rates(),
        inverse in prime_rates(),
        epsilon in 0.001f64..0.01,
    ) {
        let rates = MistakeRates {
            forward: RateVector::from_prime_rates(&forward).unwrap(),
            inverse: RateVector::from_prime_rates(&inverse).unwrap(),
            cases_used: 0,
        };
        let kernel = build_kernel(&rates, epsilon).unwrap();
        let power = power_iteration(&kernel, 1e-12, 100_000).unwrap();
        let eigen = dominant_eigenpair(&kernel).unwrap();
        prop_assert!((eigen.eigenvalue - 1.0).abs() < 1e-9);

        let comparison = compare_steady_states(&power, &eigen, 1e-4).unwrap();
        prop_assert!(comparison.agrees, "max diff {}", comparison.max_abs_diff);
        prop_assert!((comparison.eigen.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        prop_assert!(comparison.eigen.iter().all(|p| *p >= 0.0));
        prop_assert!(power.row_spread < 1e-6);
    }
}
