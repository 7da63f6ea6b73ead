mod common;

use common::{PEOE_PARAMETERS, assert_total, ethanol, parameters, prepared, water};
use eqcharge::Calculator;

#[test]
fn single_iteration_leaves_every_atom_neutral() {
    let params = parameters(PEOE_PARAMETERS);
    let calculator = Calculator::from_name("peoe")
        .unwrap()
        .with_parameters(&params)
        .unwrap()
        .with_option("iters", "1")
        .unwrap();
    let set = prepared(&calculator, vec![water(), ethanol()]);

    let result = calculator.calculate_set(&set);
    assert!(result.failures.is_empty());
    for (_, charges) in result.charges.iter() {
        assert!(charges.iter().all(|&q| q == 0.0), "{charges:?}");
    }
}

#[test]
fn charge_flows_towards_oxygen() {
    let params = parameters(PEOE_PARAMETERS);
    let calculator = Calculator::from_name("peoe")
        .unwrap()
        .with_parameters(&params)
        .unwrap();
    let set = prepared(&calculator, vec![water(), ethanol()]);

    let result = calculator.calculate_set(&set);
    assert_eq!(result.charges.len(), 2);

    let water = result.charges.get("water").unwrap();
    assert_total(water, 0.0);
    assert!(water[0] < 0.0);
    assert!((water[1] - water[2]).abs() < 1e-12);

    let ethanol = result.charges.get("ethanol").unwrap();
    assert_total(ethanol, 0.0);
    assert!(ethanol[2] < 0.0);
    assert!(ethanol[8] > 0.0);
}

#[test]
fn more_iterations_move_more_charge() {
    let params = parameters(PEOE_PARAMETERS);
    let oxygen_charge = |iters: &str| {
        let calculator = Calculator::from_name("peoe")
            .unwrap()
            .with_parameters(&params)
            .unwrap()
            .with_option("iters", iters)
            .unwrap();
        let set = prepared(&calculator, vec![water()]);
        calculator.calculate_charges(&set.molecules()[0]).unwrap()[0]
    };
    assert!(oxygen_charge("2") < 0.0);
    assert!(oxygen_charge("4") < oxygen_charge("2"));
}
