//! Chemical element reference data.
//!
//! The periodic table is embedded in the library as TOML and parsed once on first access.
//! Every [`Element`] handed out by [`periodic_table`] has a `'static` lifetime, so atoms
//! can hold plain references to their element without reference counting.

use crate::error::ChargeError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Static properties of one chemical element.
///
/// Scalar properties that are undefined or not tabulated for an element are stored as `0.0`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Element {
    /// Atomic number (number of protons).
    #[serde(rename = "z")]
    pub atomic_number: u8,
    /// Canonical element symbol, e.g. `"C"` or `"Cl"`.
    pub symbol: String,
    /// English element name.
    pub name: String,
    /// Period (row) of the periodic table.
    pub period: u8,
    /// Group (column) of the periodic table; lanthanides are placed in group 3.
    pub group: u8,
    /// Pauling electronegativity.
    pub electronegativity: f64,
    /// Covalent radius in angstroms.
    pub covalent_radius: f64,
    /// Van der Waals radius in angstroms.
    pub vdw_radius: f64,
    /// First ionization potential in electronvolts.
    pub ionization_potential: f64,
    /// Electron affinity in electronvolts.
    pub electron_affinity: f64,
}

impl Element {
    /// Number of valence electrons derived from the group.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UndefinedValence`] for groups 3 to 12, where the count is not
    /// defined by this simple rule.
    pub fn valence_electron_count(&self) -> Result<u32, ChargeError> {
        match self.group {
            g @ 1..=2 => Ok(g as u32),
            g @ 13..=18 => Ok(g as u32 - 10),
            _ => Err(ChargeError::UndefinedValence(self.symbol.clone())),
        }
    }

    /// Returns `true` for hydrogen.
    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[derive(Deserialize)]
struct ElementTable {
    element: Vec<Element>,
}

/// Lookup table over all known elements.
#[derive(Debug)]
pub struct PeriodicTable {
    elements: Vec<Element>,
    by_symbol: HashMap<String, usize>,
}

impl PeriodicTable {
    fn from_toml(content: &str) -> Result<Self, ChargeError> {
        let table: ElementTable = toml::from_str(content)?;
        let mut elements = table.element;
        elements.sort_by_key(|e| e.atomic_number);

        for (i, element) in elements.iter().enumerate() {
            if element.atomic_number as usize != i + 1 {
                return Err(ChargeError::InvalidParameters(format!(
                    "periodic table is not contiguous at element '{}'",
                    element.symbol
                )));
            }
        }

        let by_symbol = elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.symbol.clone(), i))
            .collect();

        Ok(Self {
            elements,
            by_symbol,
        })
    }

    /// Looks up an element by symbol.
    ///
    /// Matching ignores case (`"CL"`, `"cl"` and `"Cl"` are all chlorine) and treats
    /// deuterium (`"D"`) as hydrogen.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UnknownElement`] if the symbol is not in the table.
    pub fn by_symbol(&self, symbol: &str) -> Result<&Element, ChargeError> {
        let normalized = normalize_symbol(symbol.trim());
        let key = if normalized == "D" { "H" } else { normalized.as_str() };
        self.by_symbol
            .get(key)
            .map(|&i| &self.elements[i])
            .ok_or_else(|| ChargeError::UnknownElement(symbol.to_string()))
    }

    /// Looks up an element by atomic number.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UnknownElement`] if the number is outside the table.
    pub fn by_atomic_number(&self, atomic_number: u8) -> Result<&Element, ChargeError> {
        (atomic_number as usize)
            .checked_sub(1)
            .and_then(|i| self.elements.get(i))
            .ok_or_else(|| ChargeError::UnknownElement(atomic_number.to_string()))
    }

    /// Number of elements in the table.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over all elements in order of atomic number.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }
}

fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

static PERIODIC_TABLE: OnceLock<PeriodicTable> = OnceLock::new();

/// Returns the process-wide periodic table, parsing the embedded data on first use.
pub fn periodic_table() -> &'static PeriodicTable {
    PERIODIC_TABLE.get_or_init(|| {
        const ELEMENTS_TOML: &str = include_str!("../resources/elements.toml");
        PeriodicTable::from_toml(ELEMENTS_TOML)
            .expect("Failed to parse embedded periodic table. This is a library bug.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn embedded_table_is_complete_and_cached() {
        let table = periodic_table();
        assert_eq!(table.len(), 86);
        assert_eq!(table.by_atomic_number(86).unwrap().symbol, "Rn");
        assert!(std::ptr::eq(table, periodic_table()));
    }

    #[test]
    fn symbol_lookup_ignores_case_and_maps_deuterium() {
        let table = periodic_table();
        assert_eq!(table.by_symbol("CL").unwrap().atomic_number, 17);
        assert_eq!(table.by_symbol("cl").unwrap().atomic_number, 17);
        assert_eq!(table.by_symbol("D").unwrap().atomic_number, 1);
        assert!(matches!(
            table.by_symbol("Xx"),
            Err(ChargeError::UnknownElement(_))
        ));
        assert!(table.by_atomic_number(0).is_err());
    }

    #[test]
    fn carbon_properties_are_loaded() {
        let carbon = periodic_table().by_symbol("C").unwrap();
        assert_eq!(carbon.period, 2);
        assert_eq!(carbon.group, 14);
        assert_relative_eq!(carbon.electronegativity, 2.55);
        assert_relative_eq!(carbon.covalent_radius, 0.76);
    }

    #[test]
    fn valence_count_follows_group() {
        let table = periodic_table();
        assert_eq!(table.by_symbol("H").unwrap().valence_electron_count().unwrap(), 1);
        assert_eq!(table.by_symbol("Mg").unwrap().valence_electron_count().unwrap(), 2);
        assert_eq!(table.by_symbol("O").unwrap().valence_electron_count().unwrap(), 6);
        assert!(matches!(
            table.by_symbol("Fe").unwrap().valence_electron_count(),
            Err(ChargeError::UndefinedValence(_))
        ));
    }
}
