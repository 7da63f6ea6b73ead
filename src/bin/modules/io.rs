use super::cli::OutputFormat;
use super::error::CliError;
use eqcharge::{Atom, Bond, Calculator, Molecule, MoleculeSet, SetResult, periodic_table};
use prettytable::*;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

const RECORD_SEPARATOR: &str = "$$$$";

pub fn read_molecules(input_spec: &str) -> Result<(MoleculeSet, String), CliError> {
    let mut content = String::new();
    let source_name = if input_spec == "-" {
        io::stdin().read_to_string(&mut content)?;
        "stdin".to_string()
    } else {
        let mut file = std::fs::File::open(input_spec).map_err(|e| CliError::Io {
            path: PathBuf::from(input_spec),
            source: e,
        })?;
        file.read_to_string(&mut content)
            .map_err(|e| CliError::Io {
                path: PathBuf::from(input_spec),
                source: e,
            })?;
        input_spec.to_string()
    };

    let molecules = parse_sdf(&content, &source_name)?;
    Ok((MoleculeSet::new(molecules), source_name))
}

/// Parses every record of an SDF (V2000) document.
///
/// Records whose atoms or bonds cannot form a molecule (unknown element, bond to a missing
/// atom) are skipped with a warning; malformed lines abort the whole read.
pub fn parse_sdf(content: &str, source_name: &str) -> Result<Vec<Molecule>, CliError> {
    let mut molecules = Vec::new();
    let mut record: Vec<&str> = Vec::new();
    let mut index = 0;

    let lines = content.lines().chain(std::iter::once(RECORD_SEPARATOR));
    for line in lines {
        if line.trim_end() != RECORD_SEPARATOR {
            record.push(line);
            continue;
        }
        if record.iter().any(|l| !l.trim().is_empty()) {
            index += 1;
            match parse_record(&record, index, source_name) {
                Ok(molecule) => molecules.push(molecule),
                Err(CliError::Calculation(e)) => {
                    warn!(record = index, error = %e, "Skipping SDF record");
                }
                Err(e) => return Err(e),
            }
        }
        record.clear();
    }

    debug!(source = source_name, molecules = molecules.len(), "Parsed SDF");
    Ok(molecules)
}

fn parse_record(lines: &[&str], index: usize, source_name: &str) -> Result<Molecule, CliError> {
    let parse_error = |details: String| CliError::SdfParse {
        source_name: source_name.to_string(),
        details: format!("record {index}: {details}"),
    };

    if lines.len() < 4 {
        return Err(parse_error("missing header or counts line".to_string()));
    }
    let name = match lines[0].trim() {
        "" => format!("molecule_{index}"),
        name => name.to_string(),
    };

    let counts = lines[3];
    if counts.contains("V3000") {
        return Err(parse_error("V3000 connection tables are not supported".to_string()));
    }
    let atom_count: usize = parse_field(counts, 0, 3)
        .ok_or_else(|| parse_error(format!("invalid counts line '{counts}'")))?;
    let bond_count: usize = parse_field(counts, 3, 3)
        .ok_or_else(|| parse_error(format!("invalid counts line '{counts}'")))?;

    let atom_lines = lines
        .get(4..4 + atom_count)
        .ok_or_else(|| parse_error(format!("expected {atom_count} atom lines")))?;
    let bond_lines = lines
        .get(4 + atom_count..4 + atom_count + bond_count)
        .ok_or_else(|| parse_error(format!("expected {bond_count} bond lines")))?;
    let property_lines = &lines[4 + atom_count + bond_count..];

    let mut atoms = Vec::with_capacity(atom_count);
    for (i, line) in atom_lines.iter().enumerate() {
        let coordinate = |start: usize| {
            parse_field::<f64>(line, start, 10)
                .ok_or_else(|| parse_error(format!("atom {}: invalid coordinates", i + 1)))
        };
        let position = [coordinate(0)?, coordinate(10)?, coordinate(20)?];
        let symbol = field(line, 31, 3);
        let element = periodic_table().by_symbol(symbol)?;
        let charge = parse_field::<u8>(line, 36, 3).map_or(0, charge_from_code);
        atoms.push(Atom::new(element, position).with_formal_charge(charge));
    }

    let mut bonds = Vec::with_capacity(bond_count);
    for (i, line) in bond_lines.iter().enumerate() {
        let endpoint = |start: usize| {
            parse_field::<usize>(line, start, 3)
                .filter(|&a| a >= 1)
                .ok_or_else(|| parse_error(format!("bond {}: invalid atom index", i + 1)))
        };
        let (first, second) = (endpoint(0)?, endpoint(3)?);
        let order = match parse_field::<u8>(line, 6, 3) {
            Some(order @ 1..=3) => order,
            Some(_) => 1,
            None => return Err(parse_error(format!("bond {}: invalid bond order", i + 1))),
        };
        bonds.push(Bond::new(first - 1, second - 1, order));
    }

    let mut property_charges = None;
    for line in property_lines {
        if line.starts_with("M  END") {
            break;
        }
        if line.starts_with("M  CHG") {
            let charges = property_charges.get_or_insert_with(|| vec![0; atoms.len()]);
            let tokens: Vec<&str> = line.split_whitespace().skip(3).collect();
            for pair in tokens.chunks(2) {
                let (atom, charge) = match pair {
                    [a, c] => (a.parse::<usize>().ok(), c.parse::<i32>().ok()),
                    _ => (None, None),
                };
                match (atom, charge) {
                    (Some(a), Some(c)) if (1..=atoms.len()).contains(&a) => charges[a - 1] = c,
                    _ => return Err(parse_error(format!("invalid charge property '{line}'"))),
                }
            }
        }
    }
    if let Some(charges) = property_charges {
        for (atom, charge) in atoms.iter_mut().zip(charges) {
            atom.set_formal_charge(charge);
        }
    }

    Ok(Molecule::new(name, atoms, bonds)?)
}

fn field(line: &str, start: usize, len: usize) -> &str {
    line.get(start..(start + len).min(line.len()))
        .unwrap_or("")
        .trim()
}

fn parse_field<T: std::str::FromStr>(line: &str, start: usize, len: usize) -> Option<T> {
    field(line, start, len).parse().ok()
}

/// Converts the atom block charge code to a formal charge. Code 4 marks a radical.
fn charge_from_code(code: u8) -> i32 {
    match code {
        1..=3 | 5..=7 => 4 - code as i32,
        _ => 0,
    }
}

pub fn get_writer(output_path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Summary of one run, shown in the pretty output.
pub struct RunInfo<'a> {
    pub source_name: &'a str,
    pub read: usize,
    pub removed: usize,
}

pub fn write_results(
    mut writer: Box<dyn Write>,
    set: &MoleculeSet,
    calculator: &Calculator<'_>,
    result: &SetResult,
    info: &RunInfo<'_>,
    format: OutputFormat,
    precision: usize,
) -> Result<(), CliError> {
    let calculated = calculated_molecules(set, result);
    match format {
        OutputFormat::Pretty => {
            write_pretty_tables(&mut writer, &calculated, calculator, result, info, precision)?
        }
        OutputFormat::Csv => write_csv(&mut writer, &calculated, precision)?,
        OutputFormat::Txt => write_txt(&mut writer, &calculated, precision)?,
    }
    writer.flush()?;
    Ok(())
}

/// Pairs every successful molecule with its charges. Charges are stored in set order, so a
/// single lockstep walk suffices.
fn calculated_molecules<'a>(
    set: &'a MoleculeSet,
    result: &'a SetResult,
) -> Vec<(&'a Molecule, &'a [f64])> {
    let mut entries = result.charges.iter().peekable();
    let mut paired = Vec::with_capacity(result.charges.len());
    for molecule in set.molecules() {
        if let Some(&(name, charges)) = entries.peek() {
            if name == molecule.name() && charges.len() == molecule.len() {
                paired.push((molecule, charges));
                entries.next();
            }
        }
    }
    paired
}

fn box_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Intern],
            format::LineSeparator::new('─', '┼', '├', '┤'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build()
}

fn no_intern_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build()
}

fn write_pretty_tables(
    writer: &mut dyn Write,
    calculated: &[(&Molecule, &[f64])],
    calculator: &Calculator<'_>,
    result: &SetResult,
    info: &RunInfo<'_>,
    precision: usize,
) -> Result<(), CliError> {
    let metadata = calculator.method().metadata();

    let mut title_table = Table::new();
    title_table.set_format(box_format());
    title_table.add_row(row![bc->"Eqcharge Partial Charge Results"]);
    title_table.print(writer)?;
    writeln!(writer)?;

    let mut summary_table = Table::new();
    summary_table.set_format(no_intern_format());
    summary_table.add_row(row![b->"Source File:", info.source_name]);
    summary_table.add_row(row![b->"Method:", format!("{} ({})", metadata.full_name, metadata.name)]);
    summary_table.add_row(row![
        b->"Parameters:",
        calculator.parameters().map_or("none", |p| p.name())
    ]);
    summary_table.add_row(row![b->"Molecules Read:", info.read]);
    summary_table.add_row(row![b->"Unclassified (removed):", info.removed]);
    summary_table.add_row(row![b->"Calculated:", result.charges.len()]);
    summary_table.add_row(row![b->"Failed:", result.failures.len()]);
    summary_table.print(writer)?;

    for (molecule, charges) in calculated {
        writeln!(writer)?;
        let total: f64 = charges.iter().sum();

        let mut data_table = Table::new();
        data_table.set_format(box_format());
        data_table.set_titles(row![bc->"Index", bc->"Element", bc->"Formal", bc->"Charge (e)"]);
        for (atom, &charge) in molecule.atoms().iter().zip(charges.iter()) {
            data_table.add_row(row![
                r->atom.index(),
                l->atom.element().symbol,
                r->atom.formal_charge(),
                r->format!("{:.prec$}", charge, prec = precision)
            ]);
        }

        writeln!(
            writer,
            "{} ({} atoms, total charge {:.prec$} e)",
            molecule.name(),
            molecule.len(),
            total,
            prec = precision
        )?;
        data_table.print(writer)?;
    }

    if !result.failures.is_empty() {
        writeln!(writer)?;
        let mut failure_table = Table::new();
        failure_table.set_format(box_format());
        failure_table.set_titles(row![bc->"Molecule", bc->"Error"]);
        for (name, error) in &result.failures {
            failure_table.add_row(row![l->name, l->error]);
        }
        failure_table.print(writer)?;
    }

    Ok(())
}

fn write_csv(
    writer: &mut dyn Write,
    calculated: &[(&Molecule, &[f64])],
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "molecule,index,element,charge")?;
    for (molecule, charges) in calculated {
        for (atom, &charge) in molecule.atoms().iter().zip(charges.iter()) {
            writeln!(
                writer,
                "{},{},{},{:.*}",
                molecule.name(),
                atom.index(),
                atom.element().symbol,
                precision,
                charge
            )?;
        }
    }
    Ok(())
}

fn write_txt(
    writer: &mut dyn Write,
    calculated: &[(&Molecule, &[f64])],
    precision: usize,
) -> Result<(), CliError> {
    for (molecule, charges) in calculated {
        writeln!(writer, "{}", molecule.name())?;
        let line: Vec<String> = charges
            .iter()
            .map(|q| format!("{:.*}", precision, q))
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

pub fn write_method_list(mut writer: Box<dyn Write>) -> Result<(), CliError> {
    let mut table = Table::new();
    table.set_format(box_format());
    table.set_titles(row![bc->"Name", bc->"Full Name", bc->"Kind", bc->"Parameters", bc->"Publication"]);
    for method in eqcharge::available_methods() {
        let metadata = method.metadata();
        let uses_parameters = if method.signature().is_empty() { "no" } else { "yes" };
        table.add_row(row![
            b->metadata.name,
            metadata.full_name,
            c->metadata.kind,
            c->uses_parameters,
            metadata.publication.unwrap_or("-")
        ]);
    }
    table.print(&mut writer)?;
    writer.flush()?;
    Ok(())
}
