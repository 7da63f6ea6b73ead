mod common;

use approx::assert_abs_diff_eq;
use common::{
    EEM_PARAMETERS, QEQ_PARAMETERS, alkane, assert_total, ethanol, hydrogen_fluoride,
    hydrogen_molecule, parameters, prepared,
};
use eqcharge::Calculator;
use eqcharge::shielding::OverlapKernel;

fn eem_charges(strategy: &str, radius: &str) -> Vec<f64> {
    let params = parameters(EEM_PARAMETERS);
    let calculator = Calculator::from_name("eem")
        .unwrap()
        .with_parameters(&params)
        .unwrap()
        .with_option("type", strategy)
        .unwrap()
        .with_option("radius", radius)
        .unwrap();
    let set = prepared(&calculator, vec![alkane(10)]);
    calculator.calculate_charges(&set.molecules()[0]).unwrap()
}

#[test]
fn every_strategy_conserves_total_charge() {
    for strategy in ["full", "cutoff", "cover"] {
        let charges = eem_charges(strategy, "4.0");
        assert_eq!(charges.len(), 32);
        assert_total(&charges, 0.0);
    }
}

#[test]
fn cutoff_covering_the_whole_molecule_reproduces_full() {
    let full = eem_charges("full", "12");
    let cutoff = eem_charges("cutoff", "100");
    for (a, b) in full.iter().zip(&cutoff) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn cover_covering_the_whole_molecule_reproduces_full() {
    let full = eem_charges("full", "12");
    let cover = eem_charges("cover", "100");
    for (a, b) in full.iter().zip(&cover) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn identical_atoms_stay_neutral() {
    let params = parameters(QEQ_PARAMETERS);
    for kernel in OverlapKernel::ALL {
        let calculator = Calculator::from_name("qeq")
            .unwrap()
            .with_parameters(&params)
            .unwrap()
            .with_option("overlap_term", kernel.as_str())
            .unwrap();
        let set = prepared(&calculator, vec![hydrogen_molecule()]);
        let q = calculator.calculate_charges(&set.molecules()[0]).unwrap();
        assert_abs_diff_eq!(q[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(q[1], 0.0, epsilon = 1e-9);
    }
}

#[test]
fn diatomic_charges_are_equal_and_opposite() {
    let params = parameters(QEQ_PARAMETERS);
    let calculator = Calculator::from_name("qeq")
        .unwrap()
        .with_parameters(&params)
        .unwrap();
    let set = prepared(&calculator, vec![hydrogen_fluoride()]);
    let q = calculator.calculate_charges(&set.molecules()[0]).unwrap();
    assert!(q[1] < 0.0, "fluorine should be negative, got {q:?}");
    assert_abs_diff_eq!(q[0], -q[1], epsilon = 1e-9);
}

#[test]
fn oxygen_is_negative_for_every_overlap_kernel() {
    let params = parameters(QEQ_PARAMETERS);
    for kernel in OverlapKernel::ALL {
        let calculator = Calculator::from_name("qeq")
            .unwrap()
            .with_parameters(&params)
            .unwrap()
            .with_option("overlap_term", kernel.as_str())
            .unwrap();
        let set = prepared(&calculator, vec![ethanol()]);
        let q = calculator.calculate_charges(&set.molecules()[0]).unwrap();
        assert_total(&q, 0.0);
        assert!(q[2] < 0.0, "{kernel}: oxygen charge {}", q[2]);
        assert!(q[8] > 0.0, "{kernel}: hydroxyl hydrogen charge {}", q[8]);
    }
}
