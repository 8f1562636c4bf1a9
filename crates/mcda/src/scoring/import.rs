use std::io::Read;

use super::domain::FlatRequest;

/// Decision matrix read from a CSV export.
///
/// The header row names the criteria. A leading `alternative` column, when present, labels the
/// rows instead of contributing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMatrix {
    pub criteria: Vec<String>,
    pub alternatives: Option<Vec<String>>,
    pub rows: Vec<Vec<f64>>,
}

impl ImportedMatrix {
    pub fn into_flat_request(
        self,
        criteria_weights: Vec<f64>,
        criteria_types: Option<Vec<String>>,
    ) -> FlatRequest {
        FlatRequest {
            criteria_weights,
            decision_matrix: self.rows,
            criteria_types,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to read decision matrix csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("value '{value}' in row {row}, column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("decision matrix csv has no criteria columns")]
    NoCriteria,
}

pub fn read_matrix_csv<R: Read>(reader: R) -> Result<ImportedMatrix, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let labelled = headers
        .first()
        .is_some_and(|first| first.eq_ignore_ascii_case("alternative"));
    let criteria: Vec<String> = headers
        .iter()
        .skip(usize::from(labelled))
        .cloned()
        .collect();
    if criteria.is_empty() {
        return Err(ImportError::NoCriteria);
    }

    let mut alternatives = Vec::new();
    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        if labelled {
            alternatives.push(fields.next().unwrap_or_default().to_string());
        }

        let row = fields
            .zip(&criteria)
            .map(|(raw, column)| {
                raw.parse::<f64>().map_err(|_| ImportError::InvalidNumber {
                    row: index + 1,
                    column: column.clone(),
                    value: raw.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, ImportError>>()?;
        rows.push(row);
    }

    Ok(ImportedMatrix {
        criteria,
        alternatives: labelled.then_some(alternatives),
        rows,
    })
}
