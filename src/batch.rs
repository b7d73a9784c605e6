// 🗂️ Batch Scoring - run one model over every row of a CSV file
//
// Input columns use the training names (age, workclass, ..., hours-per-week).
// A bad row is written out with its error and does not stop the batch.

use crate::features::UserInput;
use crate::models::ModelKind;
use crate::predictor::PredictionContext;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{Read, Write};

#[derive(Debug, Serialize)]
struct ScoredRow {
    row: usize,
    age: Option<i64>,
    workclass: Option<String>,
    education: Option<String>,
    #[serde(rename = "marital-status")]
    marital_status: Option<String>,
    occupation: Option<String>,
    relationship: Option<String>,
    race: Option<String>,
    sex: Option<String>,
    #[serde(rename = "hours-per-week")]
    hours_per_week: Option<i64>,
    model: &'static str,
    label: Option<u8>,
    prediction: Option<&'static str>,
    error: Option<String>,
}

impl ScoredRow {
    fn empty(row: usize, model: ModelKind) -> Self {
        ScoredRow {
            row,
            age: None,
            workclass: None,
            education: None,
            marital_status: None,
            occupation: None,
            relationship: None,
            race: None,
            sex: None,
            hours_per_week: None,
            model: model.as_str(),
            label: None,
            prediction: None,
            error: None,
        }
    }

    fn from_input(row: usize, model: ModelKind, input: UserInput) -> Self {
        ScoredRow {
            age: Some(input.age),
            workclass: Some(input.workclass),
            education: Some(input.education),
            marital_status: Some(input.marital_status),
            occupation: Some(input.occupation),
            relationship: Some(input.relationship),
            race: Some(input.race),
            sex: Some(input.sex),
            hours_per_week: Some(input.hours_per_week),
            ..ScoredRow::empty(row, model)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub scored: usize,
    pub above_50k: usize,
    pub failed: usize,
}

/// Score every record from `reader`, writing one output row per input row
pub fn score_csv<R: Read, W: Write>(
    ctx: &PredictionContext,
    model: ModelKind,
    reader: R,
    writer: W,
) -> Result<BatchSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut wtr = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for (i, record) in rdr.deserialize::<UserInput>().enumerate() {
        let row = i + 1;
        summary.rows += 1;

        let scored = match record {
            Ok(input) => {
                let result = ctx.predict(&input, model);
                let mut out = ScoredRow::from_input(row, model, input);
                match result {
                    Ok(prediction) => {
                        summary.scored += 1;
                        if prediction.label.class() == 1 {
                            summary.above_50k += 1;
                        }
                        out.label = Some(prediction.label.class());
                        out.prediction = Some(prediction.label.message());
                    }
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(row, error = %e, "row not scored");
                        out.error = Some(e.to_string());
                    }
                }
                out
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(row, error = %e, "row not parsed");
                ScoredRow {
                    error: Some(e.to_string()),
                    ..ScoredRow::empty(row, model)
                }
            }
        };

        wtr.serialize(&scored)
            .with_context(|| format!("Failed to write output row {}", row))?;
    }

    wtr.flush().context("Failed to flush output")?;
    tracing::info!(
        rows = summary.rows,
        scored = summary.scored,
        failed = summary.failed,
        model = %model,
        "batch complete"
    );
    Ok(summary)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::tests::fake_context;

    const HEADER: &str =
        "age,workclass,education,marital-status,occupation,relationship,race,sex,hours-per-week,income\n";

    #[test]
    fn test_scores_every_row() {
        let ctx = fake_context();
        let input = format!(
            "{}{}{}",
            HEADER,
            "39, Private, Bachelors, Never-married, Tech-support, Not-in-family, White, Male, 40, <=50K\n",
            "62, Self-emp-inc, Masters, Married-civ-spouse, Exec-managerial, Husband, White, Male, 60, >50K\n",
        );
        let mut out = Vec::new();

        let summary = score_csv(&ctx, ModelKind::Knn, input.as_bytes(), &mut out).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.above_50k, 1);
        assert_eq!(summary.failed, 0);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("row,age,workclass"));
        assert!(lines[1].contains("Income <=50K"));
        assert!(lines[2].contains("Income >50K"));
    }

    #[test]
    fn test_bad_rows_are_recorded_and_skipped() {
        let ctx = fake_context();
        let input = format!(
            "{}{}{}{}",
            HEADER,
            "abc, Private, Bachelors, Never-married, Tech-support, Not-in-family, White, Male, 40, x\n",
            "39, Private, Bachelors, Never-married, Astronaut, Not-in-family, White, Male, 40, x\n",
            "39, Private, Bachelors, Never-married, Tech-support, Not-in-family, White, Male, 40, x\n",
        );
        let mut out = Vec::new();

        let summary =
            score_csv(&ctx, ModelKind::DecisionTree, input.as_bytes(), &mut out).unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.scored, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown category 'Astronaut'"));
        assert_eq!(text.lines().count(), 4);
    }
}
