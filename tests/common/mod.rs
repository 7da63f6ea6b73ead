#![allow(dead_code)]

use eqcharge::{Atom, Bond, Calculator, Molecule, MoleculeSet, Parameters, periodic_table};

pub const EEM_PARAMETERS: &str = r#"
[metadata]
name = "eem-test"
method = "eem"

[common]
names = ["kappa"]
values = [0.502]

[atom]
names = ["A", "B"]
data = [
    { key = ["H", "plain", "*"], value = [2.396, 0.959] },
    { key = ["C", "plain", "*"], value = [2.459, 0.611] },
    { key = ["N", "plain", "*"], value = [2.597, 0.790] },
    { key = ["O", "plain", "*"], value = [2.625, 0.858] },
]
"#;

pub const QEQ_PARAMETERS: &str = r#"
[metadata]
name = "qeq-test"
method = "qeq"

[atom]
names = ["electronegativity", "hardness"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126] },
    { key = ["N", "plain", "*"], value = [6.899, 11.760] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364] },
    { key = ["F", "plain", "*"], value = [10.874, 14.948] },
]
"#;

pub const PEOE_PARAMETERS: &str = r#"
[metadata]
name = "peoe-test"
method = "peoe"

[common]
names = ["dampH"]
values = [20.02]

[atom]
names = ["A", "B", "C"]
data = [
    { key = ["H", "plain", "*"], value = [7.17, 6.24, -0.56] },
    { key = ["C", "plain", "*"], value = [7.98, 9.18, 1.88] },
    { key = ["O", "plain", "*"], value = [14.18, 12.92, 1.39] },
]
"#;

pub const SFKEEM_PARAMETERS: &str = r#"
[metadata]
name = "sfkeem-test"
method = "sfkeem"

[common]
names = ["sigma"]
values = [1.5]

[atom]
names = ["A", "B"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 6.945] },
    { key = ["C", "plain", "*"], value = [5.343, 5.063] },
    { key = ["O", "plain", "*"], value = [8.741, 6.682] },
]
"#;

pub const SMPQEQ_PARAMETERS: &str = r#"
[metadata]
name = "smpqeq-test"
method = "smpqeq"

[atom]
names = ["first", "second", "third", "fourth"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 6.945, 0.3, 0.5] },
    { key = ["C", "plain", "*"], value = [5.343, 5.063, 0.3, 0.5] },
    { key = ["O", "plain", "*"], value = [8.741, 6.682, 0.3, 0.5] },
]
"#;

pub const TSEF_PARAMETERS: &str = r#"
[metadata]
name = "tsef-test"
method = "tsef"

[atom]
names = ["electronegativity", "hardness"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364] },
]
"#;

pub const KCM_PARAMETERS: &str = r#"
[metadata]
name = "kcm-test"
method = "kcm"

[atom]
names = ["electronegativity", "hardness"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364] },
]
"#;

pub const DENR_PARAMETERS: &str = r#"
[metadata]
name = "denr-test"
method = "denr"

[common]
names = ["step", "iterations"]
values = [0.1, 10.0]

[atom]
names = ["electronegativity", "hardness"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364] },
]
"#;

pub const MPEOE_PARAMETERS: &str = r#"
[metadata]
name = "mpeoe-test"
method = "mpeoe"

[common]
names = ["Hplus"]
values = [20.02]

[atom]
names = ["A", "B"]
data = [
    { key = ["H", "plain", "*"], value = [7.17, 6.24] },
    { key = ["C", "plain", "*"], value = [7.98, 9.18] },
    { key = ["O", "plain", "*"], value = [14.18, 12.92] },
]

[bond]
names = ["f"]
data = [
    { key = ["C", "C", "plain", "*"], value = [0.5] },
    { key = ["C", "O", "plain", "*"], value = [0.5] },
    { key = ["C", "H", "plain", "*"], value = [0.5] },
    { key = ["O", "H", "plain", "*"], value = [0.5] },
]
"#;

pub const GDAC_PARAMETERS: &str = r#"
[metadata]
name = "gdac-test"
method = "gdac"

[atom]
names = ["A", "B"]
data = [
    { key = ["H", "plain", "*"], value = [7.17, 6.24] },
    { key = ["C", "plain", "*"], value = [7.98, 9.18] },
    { key = ["O", "plain", "*"], value = [14.18, 12.92] },
]
"#;

pub const DELRE_PARAMETERS: &str = r#"
[metadata]
name = "delre-test"
method = "delre"

[atom]
names = ["delta"]
data = [
    { key = ["H", "plain", "*"], value = [0.0] },
    { key = ["C", "plain", "*"], value = [0.07] },
    { key = ["O", "plain", "*"], value = [0.4] },
]

[bond]
names = ["eps", "gammaA", "gammaB"]
data = [
    { key = ["C", "C", "plain", "*"], value = [1.0, 0.1, 0.1] },
    { key = ["C", "O", "plain", "*"], value = [0.8, 0.15, 0.15] },
    { key = ["C", "H", "plain", "*"], value = [1.0, 0.1, 0.1] },
    { key = ["O", "H", "plain", "*"], value = [0.9, 0.2, 0.2] },
]
"#;

pub const SQE_PARAMETERS: &str = r#"
[metadata]
name = "sqe-test"
method = "sqe"

[atom]
names = ["electronegativity", "hardness", "width"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890, 0.5] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126, 0.7] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364, 0.6] },
]

[bond]
names = ["kappa"]
data = [
    { key = ["C", "C", "plain", "*"], value = [5.0] },
    { key = ["C", "O", "plain", "*"], value = [5.0] },
    { key = ["C", "H", "plain", "*"], value = [5.0] },
    { key = ["O", "H", "plain", "*"], value = [5.0] },
]
"#;

pub const SQEQP_PARAMETERS: &str = r#"
[metadata]
name = "sqeqp-test"
method = "sqeqp"

[atom]
names = ["electronegativity", "hardness", "width", "q0"]
data = [
    { key = ["H", "plain", "*"], value = [4.528, 13.890, 0.5, 0.1] },
    { key = ["C", "plain", "*"], value = [5.343, 10.126, 0.7, 0.0] },
    { key = ["O", "plain", "*"], value = [8.741, 13.364, 0.6, -0.3] },
]

[bond]
names = ["kappa"]
data = [
    { key = ["C", "C", "plain", "*"], value = [5.0] },
    { key = ["C", "O", "plain", "*"], value = [5.0] },
    { key = ["C", "H", "plain", "*"], value = [5.0] },
    { key = ["O", "H", "plain", "*"], value = [5.0] },
]
"#;

pub const ABEEM_PARAMETERS: &str = r#"
[metadata]
name = "abeem-test"
method = "abeem"

[common]
names = ["k"]
values = [1.0]

[atom]
names = ["a", "b", "c"]
data = [
    { key = ["H", "plain", "*"], value = [4.4, 13.0, 1.0] },
    { key = ["C", "plain", "*"], value = [5.3, 10.0, 1.2] },
    { key = ["O", "plain", "*"], value = [8.5, 13.0, 1.1] },
]

[bond]
names = ["A", "B", "C", "D"]
data = [
    { key = ["C", "C", "plain", "*"], value = [6.0, 12.0, 1.5, 1.5] },
    { key = ["C", "O", "plain", "*"], value = [6.0, 12.0, 1.5, 1.5] },
    { key = ["C", "H", "plain", "*"], value = [6.0, 12.0, 1.5, 1.5] },
    { key = ["O", "H", "plain", "*"], value = [6.0, 12.0, 1.5, 1.5] },
]
"#;

pub const CHARGE2_PARAMETERS: &str = r#"
[metadata]
name = "charge2-test"
method = "charge2"

[common]
names = ["a1", "a2", "a3", "b", "c", "alpha"]
values = [20.0, 30.0, 25.0, 50.0, 2.5, 0.2]

[atom]
names = ["chi", "P0", "q0"]
data = [
    { key = ["H", "plain", "*"], value = [7.17, 0.1, 0.0] },
    { key = ["C", "plain", "*"], value = [7.98, 0.3, 0.0] },
    { key = ["O", "plain", "*"], value = [14.18, 0.25, 0.0] },
]
"#;

pub fn parameters(toml: &str) -> Parameters {
    Parameters::load_from_str(toml).expect("fixture parameters must parse")
}

pub fn molecule(name: &str, atoms: &[(&str, [f64; 3])], bonds: &[(usize, usize, u8)]) -> Molecule {
    let atoms = atoms
        .iter()
        .map(|&(symbol, position)| Atom::new(periodic_table().by_symbol(symbol).unwrap(), position))
        .collect();
    let bonds = bonds.iter().map(|&(a, b, o)| Bond::new(a, b, o)).collect();
    Molecule::new(name, atoms, bonds).unwrap()
}

pub fn water() -> Molecule {
    molecule(
        "water",
        &[
            ("O", [0.0, 0.0, 0.1173]),
            ("H", [0.7572, 0.0021, -0.4692]),
            ("H", [-0.7572, -0.0013, -0.4690]),
        ],
        &[(0, 1, 1), (0, 2, 1)],
    )
}

pub fn hydrogen_fluoride() -> Molecule {
    molecule(
        "hydrogen fluoride",
        &[("H", [0.0, 0.0, 0.0]), ("F", [0.917, 0.003, -0.002])],
        &[(0, 1, 1)],
    )
}

pub fn hydrogen_molecule() -> Molecule {
    molecule(
        "dihydrogen",
        &[("H", [0.0, 0.0, 0.0]), ("H", [0.741, 0.002, 0.001])],
        &[(0, 1, 1)],
    )
}

pub fn ethanol() -> Molecule {
    molecule(
        "ethanol",
        &[
            ("C", [-1.1712, -0.2241, 0.0012]),
            ("C", [0.1941, 0.4361, -0.0021]),
            ("O", [1.2018, -0.5682, 0.0007]),
            ("H", [-1.2785, -0.8567, 0.8864]),
            ("H", [-1.2807, -0.8539, -0.8865]),
            ("H", [-1.9767, 0.5131, 0.0035]),
            ("H", [0.3052, 1.0733, 0.8832]),
            ("H", [0.3028, 1.0764, -0.8851]),
            ("H", [2.0581, -0.1012, -0.0031]),
        ],
        &[
            (0, 1, 1),
            (1, 2, 1),
            (0, 3, 1),
            (0, 4, 1),
            (0, 5, 1),
            (1, 6, 1),
            (1, 7, 1),
            (2, 8, 1),
        ],
    )
}

/// A zig-zag alkane `CnH(2n+2)` laid out along x, with small deterministic offsets so no
/// two atoms share a coordinate.
pub fn alkane(carbons: usize) -> Molecule {
    let mut atoms: Vec<(&str, [f64; 3])> = Vec::new();
    let mut bonds = Vec::new();
    let jitter = |k: usize| 0.001 * ((k * 37 % 17) as f64);

    for c in 0..carbons {
        let x = 1.26 * c as f64 + jitter(c);
        let y = if c % 2 == 0 { 0.0 } else { 0.89 } + jitter(c + 5);
        atoms.push(("C", [x, y, jitter(c + 11)]));
        if c > 0 {
            bonds.push((c - 1, c, 1));
        }
    }
    for c in 0..carbons {
        let [x, y, _] = atoms[c].1;
        let dy = if c % 2 == 0 { -0.63 } else { 0.63 };
        let k = atoms.len();
        atoms.push(("H", [x + jitter(k), y + dy, 0.89 + jitter(k + 1)]));
        atoms.push(("H", [x - jitter(k + 2), y + dy, -0.89 - jitter(k + 3)]));
        bonds.push((c, k, 1));
        bonds.push((c, k + 1, 1));
    }
    for (c, sign) in [(0, -1.0), (carbons - 1, 1.0)] {
        let [x, y, z] = atoms[c].1;
        let k = atoms.len();
        atoms.push(("H", [x + sign * 1.05, y + jitter(k), z + 0.02]));
        bonds.push((c, k, 1));
    }

    molecule(&format!("C{carbons}"), &atoms, &bonds)
}

/// A planar zig-zag carbon chain with every atom at `z = 0`, as read from a 2-D SDF record.
pub fn flat_chain(carbons: usize) -> Molecule {
    let atoms: Vec<(&str, [f64; 3])> = (0..carbons)
        .map(|c| ("C", [1.26 * c as f64, if c % 2 == 0 { 0.0 } else { 0.89 }, 0.0]))
        .collect();
    let bonds: Vec<(usize, usize, u8)> = (1..carbons).map(|c| (c - 1, c, 1)).collect();
    molecule(&format!("flat C{carbons}"), &atoms, &bonds)
}

/// Classifies `molecules` for `calculator` and builds everything it requires.
pub fn prepared(calculator: &Calculator<'_>, molecules: Vec<Molecule>) -> MoleculeSet {
    let mut set = MoleculeSet::new(molecules);
    calculator
        .prepare(&mut set, false)
        .expect("preparation must succeed");
    set
}

pub fn assert_total(charges: &[f64], total: f64) {
    let sum: f64 = charges.iter().sum();
    assert!(
        (sum - total).abs() < 1e-6,
        "charges sum to {sum}, expected {total}"
    );
    assert!(charges.iter().all(|q| q.is_finite()), "non-finite charge in {charges:?}");
}
