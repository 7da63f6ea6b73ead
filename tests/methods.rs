mod common;

use approx::assert_abs_diff_eq;
use common::{
    ABEEM_PARAMETERS, CHARGE2_PARAMETERS, DELRE_PARAMETERS, DENR_PARAMETERS, EEM_PARAMETERS,
    GDAC_PARAMETERS, KCM_PARAMETERS, MPEOE_PARAMETERS, PEOE_PARAMETERS, SFKEEM_PARAMETERS,
    SMPQEQ_PARAMETERS, SQE_PARAMETERS, SQEQP_PARAMETERS, TSEF_PARAMETERS, assert_total, ethanol,
    molecule, parameters, prepared, water,
};
use eqcharge::{
    Atom, Bond, Calculator, ChargeError, Molecule, MoleculeSet, available_methods,
    best_parameters, load_method, periodic_table, suitable_methods,
};

fn hydroxide() -> Molecule {
    let el = |s: &str| periodic_table().by_symbol(s).unwrap();
    Molecule::new(
        "hydroxide",
        vec![
            Atom::new(el("O"), [0.0, 0.0, 0.0]).with_formal_charge(-1),
            Atom::new(el("H"), [0.97, 0.02, -0.01]),
        ],
        vec![Bond::new(0, 1, 1)],
    )
    .unwrap()
}

#[test]
fn parameter_free_methods_conserve_charge() {
    for name in ["eqeq", "mgc", "veem", "formal", "dummy"] {
        let calculator = Calculator::from_name(name).unwrap();
        let set = prepared(&calculator, vec![water(), ethanol(), hydroxide()]);
        let result = calculator.calculate_set(&set);

        assert!(result.failures.is_empty(), "{name}: {:?}", result.failures);
        for (molecule, (_, charges)) in set.molecules().iter().zip(result.charges.iter()) {
            assert_eq!(charges.len(), molecule.len());
            assert_total(charges, molecule.total_charge() as f64);
        }
    }
}

#[test]
fn electronegative_atoms_are_negative() {
    for name in ["eqeq", "mgc", "veem"] {
        let calculator = Calculator::from_name(name).unwrap();
        let set = prepared(&calculator, vec![water()]);
        let q = calculator.calculate_charges(&set.molecules()[0]).unwrap();
        assert!(q[0] < 0.0, "{name}: oxygen charge {}", q[0]);
        assert_abs_diff_eq!(q[1], q[2], epsilon = 1e-6);
    }
}

#[test]
fn formal_and_dummy_report_fixed_charges() {
    let formal = Calculator::from_name("formal").unwrap();
    let q = formal.calculate_charges(&hydroxide()).unwrap();
    assert_eq!(q, vec![-1.0, 0.0]);

    let dummy = Calculator::from_name("dummy").unwrap();
    let q = dummy.calculate_charges(&water()).unwrap();
    assert_eq!(q, vec![0.0; 3]);
}

#[test]
fn valence_method_refuses_transition_metals() {
    let calculator = Calculator::from_name("veem").unwrap();
    let iron_oxide = molecule(
        "iron monoxide",
        &[("Fe", [0.0, 0.0, 0.0]), ("O", [1.62, 0.01, 0.02])],
        &[(0, 1, 2)],
    );
    let set = prepared(&calculator, vec![iron_oxide]);
    assert!(matches!(
        calculator.calculate_charges(&set.molecules()[0]),
        Err(ChargeError::UnsuitableMolecule { .. })
    ));
}

#[test]
fn eem_parameters_bind_only_to_eem() {
    let params = parameters(EEM_PARAMETERS);
    for method in available_methods() {
        let name = method.name();
        let bound = Calculator::new(method).with_parameters(&params);
        if name == "eem" {
            assert!(bound.is_ok());
        } else {
            assert!(
                matches!(bound, Err(ChargeError::SignatureMismatch { .. })),
                "{name} accepted eem parameters"
            );
        }
    }
}

#[test]
fn methods_needing_parameters_refuse_to_run_without_them() {
    let calculator = Calculator::from_name("eem").unwrap();
    let mut set = eqcharge::MoleculeSet::new(vec![water()]);
    assert!(matches!(
        calculator.prepare(&mut set, false),
        Err(ChargeError::MissingParameters(_))
    ));
}

/// Runs `name` with the parameter set `toml` on water and ethanol and checks that both come
/// out neutral with the oxygen negative and the hydroxyl hydrogen positive.
fn assert_oxygen_pulls_charge(name: &str, toml: &str) {
    let params = parameters(toml);
    let calculator = Calculator::from_name(name)
        .unwrap()
        .with_parameters(&params)
        .unwrap();
    let set = prepared(&calculator, vec![water(), ethanol()]);
    assert_eq!(set.len(), 2, "{name} dropped a molecule during classification");

    let result = calculator.calculate_set(&set);
    assert!(result.failures.is_empty(), "{name}: {:?}", result.failures);

    let water = result.charges.get("water").unwrap();
    assert_eq!(water.len(), 3);
    assert_total(water, 0.0);
    assert!(water[0] < 0.0, "{name}: water oxygen charge {}", water[0]);

    let ethanol = result.charges.get("ethanol").unwrap();
    assert_eq!(ethanol.len(), 9);
    assert_total(ethanol, 0.0);
    assert!(ethanol[2] < 0.0, "{name}: ethanol oxygen charge {}", ethanol[2]);
    assert!(ethanol[8] > 0.0, "{name}: hydroxyl hydrogen charge {}", ethanol[8]);
}

#[test]
fn sfkeem_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("sfkeem", SFKEEM_PARAMETERS);
}

#[test]
fn smpqeq_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("smpqeq", SMPQEQ_PARAMETERS);
}

#[test]
fn tsef_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("tsef", TSEF_PARAMETERS);
}

#[test]
fn kcm_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("kcm", KCM_PARAMETERS);
}

#[test]
fn denr_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("denr", DENR_PARAMETERS);
}

#[test]
fn mpeoe_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("mpeoe", MPEOE_PARAMETERS);
}

#[test]
fn gdac_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("gdac", GDAC_PARAMETERS);
}

#[test]
fn delre_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("delre", DELRE_PARAMETERS);
}

#[test]
fn sqe_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("sqe", SQE_PARAMETERS);
}

#[test]
fn sqeqp_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("sqeqp", SQEQP_PARAMETERS);
}

#[test]
fn abeem_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("abeem", ABEEM_PARAMETERS);
}

#[test]
fn charge2_polarises_hydroxyl_groups() {
    assert_oxygen_pulls_charge("charge2", CHARGE2_PARAMETERS);
}

#[test]
fn smpqeq_cutoff_matches_full_with_a_covering_radius() {
    let params = parameters(SMPQEQ_PARAMETERS);
    let charges = |strategy: &str| {
        let calculator = Calculator::from_name("smpqeq")
            .unwrap()
            .with_parameters(&params)
            .unwrap()
            .with_option("type", strategy)
            .unwrap()
            .with_option("radius", "100.0")
            .unwrap();
        let set = prepared(&calculator, vec![ethanol()]);
        calculator.calculate_charges(&set.molecules()[0]).unwrap()
    };

    let full = charges("full");
    let cutoff = charges("cutoff");
    for (a, b) in full.iter().zip(&cutoff) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

const EEM_WITHOUT_CARBON: &str = r#"
    [metadata]
    name = "eem-no-carbon"
    method = "eem"
    [common]
    names = ["kappa"]
    values = [0.502]
    [atom]
    names = ["A", "B"]
    data = [
        { key = ["H", "plain", "*"], value = [2.396, 0.959] },
        { key = ["O", "plain", "*"], value = [2.625, 0.858] },
    ]
"#;

#[test]
fn suitable_methods_need_covering_parameters() {
    let candidates = vec![
        parameters(EEM_WITHOUT_CARBON),
        parameters(EEM_PARAMETERS),
        parameters(PEOE_PARAMETERS),
        parameters(SFKEEM_PARAMETERS),
    ];
    let mut set = MoleculeSet::new(vec![water(), ethanol()]);

    let found = suitable_methods(&mut set, &candidates, false);
    assert_eq!(set.len(), 2);

    let names: Vec<&str> = found.iter().map(|c| c.method.name()).collect();
    for expected in ["eem", "sfkeem", "peoe", "eqeq", "mgc", "veem", "formal", "dummy"] {
        assert!(names.contains(&expected), "{expected} missing from {names:?}");
    }
    for absent in ["qeq", "kcm", "abeem", "charge2"] {
        assert!(!names.contains(&absent), "{absent} listed without parameters");
    }

    let priorities: Vec<u32> = found.iter().map(|c| c.method.metadata().priority).collect();
    assert!(priorities.windows(2).all(|w| w[0] >= w[1]));

    let eem = found.iter().find(|c| c.method.name() == "eem").unwrap();
    let eem_sets: Vec<&str> = eem.parameters.iter().map(|p| p.name()).collect();
    assert_eq!(eem_sets, ["eem-test"]);
    let dummy = found.iter().find(|c| c.method.name() == "dummy").unwrap();
    assert!(dummy.parameters.is_empty());
}

#[test]
fn best_parameters_takes_the_first_covering_set() {
    let candidates = vec![parameters(EEM_WITHOUT_CARBON), parameters(EEM_PARAMETERS)];
    let eem = load_method("eem").unwrap();

    let mut only_water = MoleculeSet::new(vec![water()]);
    let best = best_parameters(&mut only_water, eem.as_ref(), &candidates, false).unwrap();
    assert_eq!(best.map(|p| p.name()), Some("eem-no-carbon"));

    let mut with_ethanol = MoleculeSet::new(vec![water(), ethanol()]);
    let best = best_parameters(&mut with_ethanol, eem.as_ref(), &candidates, false).unwrap();
    assert_eq!(best.map(|p| p.name()), Some("eem-test"));

    let kcm = load_method("kcm").unwrap();
    assert!(
        best_parameters(&mut with_ethanol, kcm.as_ref(), &candidates, false)
            .unwrap()
            .is_none()
    );

    let dummy = load_method("dummy").unwrap();
    assert!(matches!(
        best_parameters(&mut with_ethanol, dummy.as_ref(), &candidates, false),
        Err(ChargeError::ParameterFreeMethod(_))
    ));
}
