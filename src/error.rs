use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `eqcharge` library.
///
/// Variants are grouped by the stage that produces them: loading inputs (I/O and parsing),
/// binding parameters to a method, classifying atoms and bonds, and the numerical work of a
/// single charge calculation. Errors from the last group are per-molecule and never abort
/// a whole molecule set.
#[derive(Error, Debug)]
pub enum ChargeError {
    /// An I/O error that occurred while reading or writing a parameter file.
    ///
    /// The path to the file and the underlying I/O error are provided for context.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// The parameter text is not valid TOML or does not have the expected layout.
    #[error("Failed to deserialize TOML parameters: {0}")]
    DeserializationError(#[from] toml::de::Error),

    /// Parameters could not be rendered back to TOML.
    #[error("Failed to serialize parameters to TOML: {0}")]
    SerializationError(#[from] toml::ser::Error),

    /// The parameter file parsed but its content is inconsistent, for example a value vector
    /// whose length differs from the block's name list.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The names of one parameter block differ from the names the method declares.
    #[error(
        "Parameters do not match method '{method}': {section} names expected {expected:?}, got {got:?}"
    )]
    SignatureMismatch {
        /// The method that rejected the parameters.
        method: String,
        /// The block that differs (`common`, `atom` or `bond`).
        section: &'static str,
        /// The names declared by the method.
        expected: Vec<String>,
        /// The names found in the parameter set.
        got: Vec<String>,
    },

    /// Parameters were requested for a method that reads none.
    #[error("Method '{0}' uses no parameters")]
    ParameterFreeMethod(String),

    /// The method needs parameters but none were bound.
    #[error("Method '{0}' requires parameters but none were provided")]
    MissingParameters(String),

    /// A classification scheme name that is not one of the built-in schemes.
    #[error("Unknown {kind} classification scheme: '{name}'")]
    UnknownScheme {
        /// Either `atom` or `bond`.
        kind: &'static str,
        /// The scheme name as given.
        name: String,
    },

    /// An atom or bond of the molecule has no type in the current registry.
    #[error("Molecule '{molecule}' contains {count} unclassified atoms or bonds")]
    Unclassified {
        /// The name of the offending molecule.
        molecule: String,
        /// How many atoms and bonds lack a type.
        count: usize,
    },

    /// A failure within the dense linear solver, for example a singular matrix.
    #[error("Failed to solve the linear matrix system: {0}")]
    LinalgError(String),

    /// The method produced NaN or infinite charges.
    #[error("Method '{method}' produced non-finite charges for molecule '{molecule}'")]
    NonFiniteCharges {
        /// The method that produced the charges.
        method: String,
        /// The molecule they were computed for.
        molecule: String,
    },

    /// The method returned a vector whose length differs from the atom count.
    #[error("Method '{method}' returned {got} charges for {expected} atoms")]
    ChargeCountMismatch {
        /// The method that produced the charges.
        method: String,
        /// The number of atoms of the molecule.
        expected: usize,
        /// The number of charges returned.
        got: usize,
    },

    /// A structural inconsistency in the molecule as supplied by a reader.
    #[error("Invalid molecular topology: {0}")]
    InvalidTopology(String),

    /// At least one atom is required for a calculation.
    #[error("Input validation failed: at least one atom is required for a calculation")]
    NoAtoms,

    /// An element symbol or atomic number missing from the periodic table.
    #[error("No such element: '{0}'")]
    UnknownElement(String),

    /// The valence-electron count is undefined for transition metals.
    #[error("Valence electron count is undefined for element '{0}'")]
    UndefinedValence(String),

    /// A derived molecular structure needed by the method was never built.
    #[error("Molecule '{molecule}' is missing required feature {feature}")]
    MissingFeature {
        /// The molecule that lacks the feature.
        molecule: String,
        /// The feature name.
        feature: &'static str,
    },

    /// No method is registered under this name.
    #[error("Unknown method: '{0}'")]
    UnknownMethod(String),

    /// The method does not declare an option with this name.
    #[error("Method '{method}' has no option named '{option}'")]
    UnknownOption {
        /// The method that was configured.
        method: String,
        /// The option name as given.
        option: String,
    },

    /// An option value of the wrong type or outside the allowed choices.
    #[error("Invalid value '{value}' for option '{option}': {reason}")]
    InvalidOptionValue {
        /// The option name.
        option: String,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The method refuses this molecule.
    #[error("Method '{method}' is not suitable for molecule '{molecule}': {reason}")]
    UnsuitableMolecule {
        /// The method that refused.
        method: String,
        /// The molecule that was refused.
        molecule: String,
        /// A short explanation.
        reason: String,
    },

    /// A flat parameter vector of the wrong length.
    #[error("Parameter vector has {got} values, expected {expected}")]
    VectorLength {
        /// The number of free parameters.
        expected: usize,
        /// The number of values supplied.
        got: usize,
    },

    /// Two charge sets could not be compared because their molecules differ.
    #[error("Charge sets are not comparable: {0}")]
    MismatchedCharges(String),
}
