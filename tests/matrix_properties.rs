// tests/matrix_properties.rs

use proptest::prelude::*;
use watchmatrix::matrix::{build_matrix, Flavor, MatrixConfig, TaskKind};

fn matrix_strategy() -> impl Strategy<Value = MatrixConfig> {
    let variants = proptest::collection::vec("[a-z0-9]{1,4}", 0..6);
    let flavors = proptest::collection::vec(("[A-Z][a-z]{0,5}", "( [a-z]{1,4})?"), 0..5);

    (variants, flavors).prop_map(|(variants, flavors)| MatrixConfig {
        template: "run {variant}{suffix}".to_string(),
        variants,
        flavors: flavors
            .into_iter()
            .map(|(label, suffix)| Flavor::new(label, suffix))
            .collect(),
    })
}

proptest! {
    #[test]
    fn spec_count_is_flavors_plus_flavors_times_variants(cfg in matrix_strategy()) {
        let specs = build_matrix(&cfg);
        let f = cfg.flavors.len();
        let v = cfg.variants.len();

        prop_assert_eq!(specs.len(), f + f * v);
        prop_assert_eq!(specs.len(), cfg.task_count());
    }

    #[test]
    fn specs_are_grouped_flavor_major(cfg in matrix_strategy()) {
        let specs = build_matrix(&cfg);
        let group = 1 + cfg.variants.len();

        for (i, spec) in specs.iter().enumerate() {
            prop_assert_eq!(spec.slot, i);

            let flavor = &cfg.flavors[i / group];
            prop_assert_eq!(&spec.flavor, &flavor.label);

            match i % group {
                0 => {
                    prop_assert_eq!(&spec.kind, &TaskKind::Separator);
                    prop_assert_eq!(&spec.label, &flavor.label);
                }
                k => {
                    let variant = &cfg.variants[k - 1];
                    prop_assert_eq!(&spec.label, variant);
                    let expected = format!("run {}{}", variant, flavor.suffix);
                    prop_assert_eq!(spec.command(), Some(expected.as_str()));
                }
            }
        }
    }
}
