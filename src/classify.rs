//! Atom and bond classification schemes and the type keys they produce.
//!
//! A type key names a class of atoms (or bonds) that share one parameter vector. Keys are
//! either derived from structures ([`AtomTypeKey::describe`]) when building a registry from
//! scratch, or taken from a parameter file and tested against structures
//! ([`AtomTypeKey::matches`]) when binding parameters.
//!
//! Matching rules:
//!
//! - An element symbol of `*` matches every element.
//! - `plain` keys carry the value `*` and match on the symbol alone.
//! - `hbo` keys match the highest bond order incident to the atom, as a decimal string.
//! - `bonded` keys match the sorted concatenation of neighboring element symbols.
//! - `bo` bond keys match the bond order; bond endpoints match in either order.
//!
//! Permissive matching relaxes only the order-based schemes: `hbo` compares against the
//! next-lower order (an isolated atom is treated as order 1) and `bo` against the bond
//! order minus one. Element symbols are never relaxed.

use crate::error::ChargeError;
use crate::model::{Bond, Molecule};
use std::fmt;
use std::str::FromStr;

/// The value used by `plain` keys.
pub const WILDCARD: &str = "*";

/// Atom classification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomScheme {
    /// Element symbol only.
    Plain,
    /// Element symbol plus highest incident bond order.
    Hbo,
    /// Element symbol plus the symbols of bonded neighbors.
    Bonded,
}

impl AtomScheme {
    /// The scheme name as written in parameter keys.
    pub fn as_str(self) -> &'static str {
        match self {
            AtomScheme::Plain => "plain",
            AtomScheme::Hbo => "hbo",
            AtomScheme::Bonded => "bonded",
        }
    }
}

impl FromStr for AtomScheme {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(AtomScheme::Plain),
            "hbo" => Ok(AtomScheme::Hbo),
            "bonded" => Ok(AtomScheme::Bonded),
            other => Err(ChargeError::UnknownScheme {
                kind: "atom",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AtomScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bond classification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondScheme {
    /// Endpoint elements only.
    Plain,
    /// Endpoint elements plus bond order.
    Bo,
}

impl BondScheme {
    /// The scheme name as written in parameter keys.
    pub fn as_str(self) -> &'static str {
        match self {
            BondScheme::Plain => "plain",
            BondScheme::Bo => "bo",
        }
    }
}

impl FromStr for BondScheme {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(BondScheme::Plain),
            "bo" => Ok(BondScheme::Bo),
            other => Err(ChargeError::UnknownScheme {
                kind: "bond",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BondScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type key of an atom: `(symbol, scheme, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomTypeKey {
    /// Element symbol.
    pub symbol: String,
    /// Scheme that produced `value`.
    pub scheme: AtomScheme,
    /// Scheme value, or `*` to match any atom of the element.
    pub value: String,
}

impl AtomTypeKey {
    /// Creates a key from its three fields.
    pub fn new(symbol: impl Into<String>, scheme: AtomScheme, value: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            scheme,
            value: value.into(),
        }
    }

    /// A `plain` key for `symbol`.
    pub fn plain(symbol: impl Into<String>) -> Self {
        Self::new(symbol, AtomScheme::Plain, WILDCARD)
    }

    /// Derives the key of atom `atom` of `molecule` under `scheme`.
    pub fn describe(molecule: &Molecule, atom: usize, scheme: AtomScheme) -> Self {
        let symbol = molecule.atom(atom).element().symbol.clone();
        let value = match scheme {
            AtomScheme::Plain => WILDCARD.to_string(),
            AtomScheme::Hbo => molecule.max_bond_order(atom).to_string(),
            AtomScheme::Bonded => molecule.bonded_elements(atom).to_string(),
        };
        Self {
            symbol,
            scheme,
            value,
        }
    }

    /// Tests whether atom `atom` of `molecule` belongs to this type.
    pub fn matches(&self, molecule: &Molecule, atom: usize, permissive: bool) -> bool {
        let symbol = &molecule.atom(atom).element().symbol;
        if self.symbol != WILDCARD && &self.symbol != symbol {
            return false;
        }
        match self.scheme {
            AtomScheme::Plain => self.value == WILDCARD,
            AtomScheme::Hbo => {
                let order = molecule.max_bond_order(atom);
                let expected = if !permissive {
                    order.to_string()
                } else if order == 0 {
                    "1".to_string()
                } else {
                    (order - 1).to_string()
                };
                self.value == expected
            }
            AtomScheme::Bonded => self.value == molecule.bonded_elements(atom),
        }
    }
}

impl fmt::Display for AtomTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.scheme, self.value)
    }
}

/// Type key of a bond: one atom key per endpoint plus the bond's own scheme and value.
///
/// The compact file form `(symbol1, symbol2, scheme, value)` expands to `plain` endpoint
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BondTypeKey {
    /// Key of the first endpoint.
    pub first: AtomTypeKey,
    /// Key of the second endpoint.
    pub second: AtomTypeKey,
    /// Scheme that produced `value`.
    pub scheme: BondScheme,
    /// Bond order under `bo`, `*` under `plain`.
    pub value: String,
}

impl BondTypeKey {
    /// A key with `plain` endpoints.
    pub fn new(
        symbol1: impl Into<String>,
        symbol2: impl Into<String>,
        scheme: BondScheme,
        value: impl Into<String>,
    ) -> Self {
        Self {
            first: AtomTypeKey::plain(symbol1),
            second: AtomTypeKey::plain(symbol2),
            scheme,
            value: value.into(),
        }
    }

    /// Returns `true` if both endpoint keys are `plain` wildcards, so the key can be written in
    /// the compact four-field form.
    pub fn has_plain_endpoints(&self) -> bool {
        self.first.scheme == AtomScheme::Plain
            && self.first.value == WILDCARD
            && self.second.scheme == AtomScheme::Plain
            && self.second.value == WILDCARD
    }

    /// Derives the key of `bond` under `scheme`, keeping the bond's endpoint order.
    pub fn describe(molecule: &Molecule, bond: &Bond, scheme: BondScheme) -> Self {
        let symbol = |i: usize| molecule.atom(i).element().symbol.clone();
        let value = match scheme {
            BondScheme::Plain => WILDCARD.to_string(),
            BondScheme::Bo => bond.order().to_string(),
        };
        Self::new(symbol(bond.first()), symbol(bond.second()), scheme, value)
    }

    /// Tests whether `bond` belongs to this type. Endpoint keys are always matched strictly;
    /// `permissive` relaxes only the bond order.
    pub fn matches(&self, molecule: &Molecule, bond: &Bond, permissive: bool) -> bool {
        let in_order = |a: usize, b: usize| {
            self.first.matches(molecule, a, false) && self.second.matches(molecule, b, false)
        };
        if !in_order(bond.first(), bond.second()) && !in_order(bond.second(), bond.first()) {
            return false;
        }
        match self.scheme {
            BondScheme::Plain => self.value == WILDCARD,
            BondScheme::Bo => {
                let order = if permissive {
                    bond.order().saturating_sub(1)
                } else {
                    bond.order()
                };
                self.value == order.to_string()
            }
        }
    }
}

impl fmt::Display for BondTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_plain_endpoints() {
            write!(
                f,
                "{}-{} {} {}",
                self.first.symbol, self.second.symbol, self.scheme, self.value
            )
        } else {
            write!(
                f,
                "[{}]-[{}] {} {}",
                self.first, self.second, self.scheme, self.value
            )
        }
    }
}
