//! Reading and writing problems in the table format.
//!
//! The data rows of the table are laid out as
//!
//! ```text
//!  (ignored)  d_0    d_1    ...  d_n-1
//!  s_0        c_0,0  c_0,1  ...  c_0,n-1
//!  ...
//!  s_m-1      c_m-1,0       ...  c_m-1,n-1
//! ```
//!
//! with the demand in the first row, the supply in the first column and the unit costs in the rest.
//! By default the table is preceded by a header line, which is skipped.
use std::io::{Read, Write};
use std::path::Path;

use derive_more::Display;
use log::{debug, trace};
use ndarray::Array2;

use crate::problem::{Problem, ProblemConstructionError, Quantity};

/// How a table is read and written
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether the first line is a header to be skipped
    pub has_headers: bool,
    /// The field delimiter
    pub delimiter: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
        }
    }
}

/// Row and column numbers refer to the data rows, that is, not counting the header line.
#[derive(Debug, Display)]
pub enum ParseProblemError {
    #[display(fmt = "{}", _0)]
    Csv(csv::Error),
    #[display(fmt = "cell ({}, {}) is not a number: {:?}", row, column, value)]
    NotANumber {
        row: usize,
        column: usize,
        value: String,
    },
    #[display(fmt = "row {} has {} cells, expected {}", row, actual, expected)]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// Need the demand row and at least one origin
    #[display(fmt = "expected at least 2 rows, found {}", _0)]
    TooFewRows(usize),
    /// Need the supply column and at least one destination
    #[display(fmt = "expected at least 2 columns, found {}", _0)]
    TooFewColumns(usize),
    #[display(fmt = "{}", _0)]
    Problem(ProblemConstructionError),
}

impl std::error::Error for ParseProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseProblemError::Csv(err) => Some(err),
            ParseProblemError::Problem(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ParseProblemError {
    fn from(err: csv::Error) -> Self {
        ParseProblemError::Csv(err)
    }
}

impl From<ProblemConstructionError> for ParseProblemError {
    fn from(err: ProblemConstructionError) -> Self {
        ParseProblemError::Problem(err)
    }
}

/// Read a problem from the table at `path`
pub fn read_problem<P: AsRef<Path>>(
    path: P,
    config: &ReaderConfig,
) -> Result<Problem, ParseProblemError> {
    debug!("reading problem from {}", path.as_ref().display());
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    parse_problem(std::io::BufReader::new(file), config)
}

/// Parse a problem from a table
pub fn parse_problem<R: Read>(
    reader: R,
    config: &ReaderConfig,
) -> Result<Problem, ParseProblemError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(config.has_headers)
        .delimiter(config.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    trace!("read {} data rows", records.len());

    if records.len() < 2 {
        return Err(ParseProblemError::TooFewRows(records.len()));
    }

    let width = records[0].len();
    if width < 2 {
        return Err(ParseProblemError::TooFewColumns(width));
    }

    if let Some((row, record)) = records
        .iter()
        .enumerate()
        .find(|(_, record)| record.len() != width)
    {
        return Err(ParseProblemError::Ragged {
            row,
            expected: width,
            actual: record.len(),
        });
    }

    let number = |row: usize, column: usize| -> Result<Quantity, ParseProblemError> {
        let value = &records[row][column];
        value.parse::<f64>().map_err(|_| ParseProblemError::NotANumber {
            row,
            column,
            value: value.to_string(),
        })
    };

    let (m, n) = (records.len() - 1, width - 1);

    let demand = (1..=n)
        .map(|column| number(0, column))
        .collect::<Result<Vec<_>, _>>()?;
    let supply = (1..=m)
        .map(|row| number(row, 0))
        .collect::<Result<Vec<_>, _>>()?;

    let mut cost = Array2::zeros((m, n));
    for ((i, j), c) in cost.indexed_iter_mut() {
        *c = number(i + 1, j + 1)?;
    }

    debug!("parsed {}x{} problem", m, n);
    Ok(Problem::new(supply, demand, cost)?)
}

/// Write `problem` as a table. A header line is written if the config asks for one.
pub fn write_problem<W: Write>(
    writer: W,
    problem: &Problem,
    config: &ReaderConfig,
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(writer);

    if config.has_headers {
        let header = std::iter::once("supply".to_string())
            .chain((1..=problem.destinations()).map(|j| format!("D{}", j)));
        writer.write_record(header)?;
    }

    let demand = std::iter::once("demand".to_string())
        .chain(problem.demand().iter().map(|d| d.to_string()));
    writer.write_record(demand)?;

    for (supply, row) in problem.supply().iter().zip(problem.cost().rows()) {
        let record = std::iter::once(supply.to_string()).chain(row.iter().map(|c| c.to_string()));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const TABLE: &str = "\
,D1,D2,D3
,10,25,40
20,4,8,8
30,16,24,16
25, 8 ,16,24
";

    #[test]
    fn reads_demand_supply_and_costs() {
        let problem = parse_problem(TABLE.as_bytes(), &ReaderConfig::default()).unwrap();

        assert_eq!(problem.supply(), &[20.0, 30.0, 25.0]);
        assert_eq!(problem.demand(), &[10.0, 25.0, 40.0]);
        assert_eq!(
            problem.cost(),
            &array![[4.0, 8.0, 8.0], [16.0, 24.0, 16.0], [8.0, 16.0, 24.0]]
        );
    }

    #[test]
    fn headerless_tables_with_other_delimiters() {
        let config = ReaderConfig {
            has_headers: false,
            delimiter: b';',
        };
        let problem = parse_problem("x;3;4\n7;1;2\n".as_bytes(), &config).unwrap();

        assert_eq!(problem.supply(), &[7.0]);
        assert_eq!(problem.demand(), &[3.0, 4.0]);
        assert_eq!(problem.cost(), &array![[1.0, 2.0]]);
    }

    #[test]
    fn reports_the_offending_cell() {
        let table = ",a,b\n,1,2\n3,1,two\n";
        match parse_problem(table.as_bytes(), &ReaderConfig::default()) {
            Err(ParseProblemError::NotANumber { row, column, value }) => {
                assert_eq!((row, column, value.as_str()), (1, 2, "two"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_tables() {
        let config = ReaderConfig::default();

        assert!(matches!(
            parse_problem(",a\n,1\n".as_bytes(), &config),
            Err(ParseProblemError::TooFewRows(1))
        ));
        assert!(matches!(
            parse_problem("a\n1\n2\n".as_bytes(), &config),
            Err(ParseProblemError::TooFewColumns(1))
        ));
        assert!(matches!(
            parse_problem(",a,b\n,1,2\n3,1\n".as_bytes(), &config),
            Err(ParseProblemError::Ragged {
                row: 1,
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            parse_problem(",a\n,1\n-3,1\n".as_bytes(), &config),
            Err(ParseProblemError::Problem(
                ProblemConstructionError::NegativeSupply { origin: 0, .. }
            ))
        ));
    }

    #[test]
    fn reads_tables_from_files() {
        let path = std::env::temp_dir().join(format!("transport-{}.csv", std::process::id()));
        std::fs::write(&path, TABLE).unwrap();

        let problem = read_problem(&path, &ReaderConfig::default());
        std::fs::remove_file(&path).unwrap();

        let problem = problem.unwrap();
        assert_eq!(problem.supply(), &[20.0, 30.0, 25.0]);
        assert_eq!(problem.cost().dim(), (3, 3));
    }

    #[test]
    fn missing_files_are_csv_errors() {
        let path = std::env::temp_dir().join("transport-does-not-exist/problem.csv");

        match read_problem(&path, &ReaderConfig::default()) {
            Err(ParseProblemError::Csv(err)) => assert!(err.is_io_error()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn written_tables_read_back() {
        let problem = parse_problem(TABLE.as_bytes(), &ReaderConfig::default()).unwrap();

        let mut buffer = Vec::new();
        write_problem(&mut buffer, &problem, &ReaderConfig::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("supply,D1,D2,D3\ndemand,10,25,40\n20,4,8,8\n"));
        assert_eq!(
            parse_problem(text.as_bytes(), &ReaderConfig::default()).unwrap(),
            problem
        );
    }
}
