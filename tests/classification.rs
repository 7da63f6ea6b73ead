mod common;

use common::{EEM_PARAMETERS, ethanol, molecule, parameters, water};
use eqcharge::{AtomScheme, BondScheme, Calculator, MoleculeSet, Parameters, load_method};

fn hydrogen_chloride() -> eqcharge::Molecule {
    molecule(
        "hydrogen chloride",
        &[("H", [0.0, 0.0, 0.0]), ("Cl", [1.274, 0.004, 0.002])],
        &[(0, 1, 1)],
    )
}

#[test]
fn molecules_with_unknown_elements_are_removed() {
    let params = parameters(EEM_PARAMETERS);
    let calculator = Calculator::from_name("eem")
        .unwrap()
        .with_parameters(&params)
        .unwrap();
    let mut set = MoleculeSet::new(vec![water(), hydrogen_chloride(), ethanol()]);

    let removed = calculator.prepare(&mut set, false).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(set.len(), 2);
    let names: Vec<&str> = set.molecules().iter().map(|m| m.name()).collect();
    assert_eq!(names, ["water", "ethanol"]);
    assert!(set.molecules().iter().all(|m| m.unclassified_count() == 0));
}

#[test]
fn unclassified_molecules_can_be_kept() {
    let params = parameters(EEM_PARAMETERS);
    let mut set = MoleculeSet::new(vec![hydrogen_chloride(), water()]);

    let unclassified = set.classify_set_from_parameters(&params, false, false);

    assert_eq!(unclassified, 1);
    assert_eq!(set.len(), 2);
    assert_eq!(set.molecules()[0].unclassified_count(), 1);
    assert_eq!(set.molecules()[1].unclassified_count(), 0);
}

#[test]
fn type_indices_follow_parameter_order() {
    let params = parameters(EEM_PARAMETERS);
    let mut set = MoleculeSet::new(vec![water()]);
    set.classify_set_from_parameters(&params, true, false);

    // Parameter order is H, C, N, O.
    let water = &set.molecules()[0];
    assert_eq!(water.atom(0).atom_type(), Some(3));
    assert_eq!(water.atom(1).atom_type(), Some(0));
    assert_eq!(set.atom_types().len(), 4);
}

#[test]
fn reclassification_is_idempotent() {
    let mut set = MoleculeSet::new(vec![ethanol(), water()]);
    set.classify_atoms(AtomScheme::Hbo);
    set.classify_bonds(BondScheme::Bo);
    let registry = set.atom_types().to_vec();
    let types: Vec<Option<usize>> = set
        .molecules()
        .iter()
        .flat_map(|m| m.atoms().iter().map(|a| a.atom_type()))
        .collect();

    set.classify_atoms(AtomScheme::Hbo);
    set.classify_bonds(BondScheme::Bo);

    assert_eq!(set.atom_types(), registry.as_slice());
    let again: Vec<Option<usize>> = set
        .molecules()
        .iter()
        .flat_map(|m| m.atoms().iter().map(|a| a.atom_type()))
        .collect();
    assert_eq!(types, again);
    // C, O and H, all with highest bond order 1; bonds C-C, C-O, C-H and O-H.
    assert_eq!(registry.len(), 3);
    assert_eq!(set.bond_types().len(), 4);
}

#[test]
fn permissive_matching_relaxes_highest_bond_order() {
    let toml = r#"
        [metadata]
        name = "hbo-test"
        method = "eem"
        [common]
        names = ["kappa"]
        values = [0.5]
        [atom]
        names = ["A", "B"]
        data = [
            { key = ["C", "hbo", "1"], value = [2.46, 0.61] },
            { key = ["O", "hbo", "1"], value = [2.63, 0.86] },
            { key = ["H", "hbo", "1"], value = [2.40, 0.96] },
        ]
    "#;
    let params = parameters(toml);
    let formaldehyde = || {
        molecule(
            "formaldehyde",
            &[
                ("C", [0.0, 0.0, -0.5297]),
                ("O", [0.0013, 0.0, 0.6757]),
                ("H", [0.9353, 0.0021, -1.1122]),
                ("H", [-0.9359, -0.0017, -1.1119]),
            ],
            &[(0, 1, 2), (0, 2, 1), (0, 3, 1)],
        )
    };

    let mut strict = MoleculeSet::new(vec![formaldehyde()]);
    assert_eq!(strict.classify_set_from_parameters(&params, true, false), 1);
    assert!(strict.is_empty());

    let mut permissive = MoleculeSet::new(vec![formaldehyde()]);
    assert_eq!(permissive.classify_set_from_parameters(&params, true, true), 0);
    let m = &permissive.molecules()[0];
    assert_eq!(m.atom(0).atom_type(), Some(0));
    assert_eq!(m.atom(1).atom_type(), Some(1));
    assert_eq!(m.atom(2).atom_type(), Some(2));
}

#[test]
fn templates_follow_the_type_registries() {
    let mut set = MoleculeSet::new(vec![water(), ethanol()]);
    set.classify_atoms(AtomScheme::Hbo);
    set.classify_bonds(BondScheme::Bo);
    let abeem = load_method("abeem").unwrap();

    let mut template = Parameters::for_method(&set, abeem.as_ref());

    assert_eq!(template.metadata().method, "abeem");
    let atom = template.atom().unwrap();
    let bond = template.bond().unwrap();
    assert_eq!(atom.keys(), set.atom_types());
    assert_eq!(bond.keys(), set.bond_types());
    assert_eq!(atom.names(), ["a", "b", "c"]);
    assert_eq!(template.common().unwrap().names(), ["k"]);

    let expected = 1 + 3 * set.atom_types().len() + 4 * set.bond_types().len();
    assert_eq!(template.vector_len(), expected);
    assert_eq!(template.to_vector().len(), template.vector_len());
    assert!(template.to_vector().iter().all(|&v| v == 0.0));

    let values: Vec<f64> = (0..expected).map(|i| i as f64).collect();
    template.set_from_vector(&values).unwrap();
    assert_eq!(template.to_vector(), values);
    assert!(
        Calculator::new(abeem)
            .with_parameters(&template)
            .is_ok()
    );
}
