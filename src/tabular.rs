use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::batch::BatchReport;
use crate::model::InputRow;

pub const REQUIRED_COLUMNS: [&str; 3] = ["prompt", "response", "grade_level"];

pub const RESULT_COLUMNS: [&str; 9] = [
    "Test_ID",
    "Prompt",
    "Response",
    "Grade_Level",
    "Expected_Quality",
    "Educational_Quality",
    "Overall_Rating",
    "Matches_Expected",
    "Notes",
];

/// Parses delimited text with a header row. Columns are matched by header
/// name, never by position.
pub fn parse_rows(input: &str, delimiter: char) -> Result<Vec<InputRow>> {
    let mut records = split_records(input, delimiter)?
        .into_iter()
        .filter(|fields| !is_blank_record(fields));

    let Some(header) = records.next() else {
        bail!("input has no header row");
    };
    let columns = header
        .iter()
        .map(|name| normalize_column(name))
        .collect::<Vec<String>>();

    for (index, column) in columns.iter().enumerate() {
        if !column.is_empty() && columns[..index].contains(column) {
            bail!("duplicate column '{column}' in header");
        }
    }
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            bail!("input header is missing required column '{required}'");
        }
    }

    let rows = records
        .enumerate()
        .map(|(index, values)| {
            let fields = columns
                .iter()
                .zip(values)
                .filter(|(column, _)| !column.is_empty())
                .map(|(column, value)| (column.clone(), value))
                .collect::<HashMap<String, String>>();
            InputRow {
                row: index + 1,
                fields,
            }
        })
        .collect();

    Ok(rows)
}

/// Maps header spellings such as `Expected_Quality`, `expected quality` or
/// `Grade` onto the canonical field names.
pub fn normalize_column(name: &str) -> String {
    let normalized = name
        .trim_start_matches('\u{feff}')
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_");

    match normalized.as_str() {
        "grade" | "grade_level" | "gradelevel" => "grade_level".to_string(),
        "expected" | "expected_quality" | "expected_tier" | "expectedquality" => {
            "expected_quality".to_string()
        }
        _ => normalized,
    }
}

fn is_blank_record(fields: &[String]) -> bool {
    fields.iter().all(|field| field.trim().is_empty())
}

/// Splits input into records of fields, honoring double-quoted fields with
/// `""` escapes and embedded delimiters or newlines.
fn split_records(input: &str, delimiter: char) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(character) = chars.next() {
        if in_quotes {
            match character {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(character);
                }
                _ => field.push(character),
            }
            continue;
        }

        match character {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
                line += 1;
            }
            value if value == delimiter => fields.push(std::mem::take(&mut field)),
            _ => field.push(character),
        }
    }

    if in_quotes {
        bail!("unterminated quoted field starting on line {quote_line}");
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(fields);
    }

    Ok(records)
}

pub fn write_results<W: Write>(
    writer: &mut W,
    report: &BatchReport,
    delimiter: char,
) -> Result<()> {
    write_record(writer, RESULT_COLUMNS.iter().copied(), delimiter)?;

    for result in &report.results {
        let test_id = result.test_id.to_string();
        let quality = format!("{:.2}", result.verdict.quality_score);
        let notes = result.verdict.notes_line();
        let matches = if result.verdict.matches_expected {
            "True"
        } else {
            "False"
        };
        let values = [
            test_id.as_str(),
            result.record.prompt.as_str(),
            result.record.response.as_str(),
            result.record.grade_level.as_str(),
            result.record.expected_quality.as_str(),
            quality.as_str(),
            result.verdict.rating.as_str(),
            matches,
            notes.as_str(),
        ];
        write_record(writer, values.into_iter(), delimiter)
            .with_context(|| format!("failed to write result row {}", result.test_id))?;
    }

    writer.flush().context("failed to flush results")?;
    Ok(())
}

fn write_record<'a, W: Write>(
    writer: &mut W,
    values: impl Iterator<Item = &'a str>,
    delimiter: char,
) -> Result<()> {
    let line = values
        .map(|value| escape_field(value, delimiter))
        .collect::<Vec<String>>()
        .join(&delimiter.to_string());
    writeln!(writer, "{line}")?;
    Ok(())
}

fn escape_field(value: &str, delimiter: char) -> String {
    let needs_quotes = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r')
        || value.starts_with(' ')
        || value.ends_with(' ');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_column, parse_rows, write_results};
    use crate::batch::evaluate_batch;
    use crate::config::EvaluationConfig;
    use crate::model::EvaluationRecord;
    use crate::verdict::Evaluator;

    #[test]
    fn header_order_is_authoritative() {
        let input = "grade_level,expected_quality,response,prompt\n5th,Good,\"Plants, like trees, use light.\",What is photosynthesis?\n";
        let rows = parse_rows(input, ',').expect("input should parse");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.row, 1);
        assert_eq!(row.get("prompt"), Some("What is photosynthesis?"));
        assert_eq!(row.get("response"), Some("Plants, like trees, use light."));
        assert_eq!(row.get("grade_level"), Some("5th"));
        assert_eq!(row.get("expected_quality"), Some("Good"));
    }

    #[test]
    fn quoted_fields_keep_newlines_and_escaped_quotes() {
        let input = "prompt,response,grade_level\r\n\"Say \"\"hi\"\"\",\"line one\nline two\",3rd\r\n\r\n";
        let rows = parse_rows(input, ',').expect("input should parse");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("prompt"), Some("Say \"hi\""));
        assert_eq!(rows[0].get("response"), Some("line one\nline two"));
        assert_eq!(rows[0].get("grade_level"), Some("3rd"));
    }

    #[test]
    fn short_rows_leave_fields_missing() {
        let input = "prompt,response,grade_level,expected_quality\nWhat is gravity?\n";
        let rows = parse_rows(input, ',').expect("input should parse");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("response").is_none());
        assert!(EvaluationRecord::from_row(&rows[0]).is_err());
    }

    #[test]
    fn header_missing_required_column_is_rejected() {
        let error =
            parse_rows("prompt,response\nq,a\n", ',').expect_err("header should be rejected");
        assert!(error.to_string().contains("grade_level"), "{error}");
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let error = parse_rows("prompt,response,grade_level\n\"open,a,b\n", ',')
            .expect_err("unterminated quote should fail");
        assert!(error.to_string().contains("line 2"), "{error}");
    }

    #[test]
    fn alternative_delimiters_are_supported() {
        let rows =
            parse_rows("Prompt\tResponse\tGrade\nq\ta\t5th", '\t').expect("tsv should parse");
        assert_eq!(rows[0].get("grade_level"), Some("5th"));
    }

    #[test]
    fn normalize_column_accepts_common_spellings() {
        assert_eq!(normalize_column("\u{feff}Prompt"), "prompt");
        assert_eq!(normalize_column("Expected_Quality"), "expected_quality");
        assert_eq!(normalize_column("expected quality"), "expected_quality");
        assert_eq!(normalize_column("Grade Level"), "grade_level");
        assert_eq!(normalize_column("Grade"), "grade_level");
    }

    #[test]
    fn results_are_written_with_fixed_columns_and_two_decimals() {
        let records = vec![EvaluationRecord::new(
            "Explain photosynthesis to a student.",
            "Plants just eat sunlight, and make stuff idk lol",
            "5th",
            "Poor",
        )];
        let report = evaluate_batch(&Evaluator::new(&EvaluationConfig::default()), &records);

        let mut buffer = Vec::new();
        write_results(&mut buffer, &report, ',').expect("results should be written");
        let output = String::from_utf8(buffer).expect("utf-8 output");
        let lines = output.lines().collect::<Vec<&str>>();

        assert_eq!(
            lines[0],
            "Test_ID,Prompt,Response,Grade_Level,Expected_Quality,Educational_Quality,Overall_Rating,Matches_Expected,Notes"
        );
        assert!(
            lines[1].starts_with(
                "1,Explain photosynthesis to a student.,\"Plants just eat sunlight, and make stuff idk lol\",5th,Poor,0.44,Poor,True,"
            ),
            "{}",
            lines[1]
        );

        let reparsed = parse_rows(&output, ',').expect("written results should parse back");
        assert_eq!(
            reparsed[0].get("response"),
            Some("Plants just eat sunlight, and make stuff idk lol")
        );
    }

    #[test]
    fn notes_column_joins_verdict_notes() {
        let records = vec![EvaluationRecord::new(
            "Why was the printing press important?",
            "It helped.",
            "sophomore-ish",
            "",
        )];
        let report = evaluate_batch(&Evaluator::new(&EvaluationConfig::default()), &records);
        assert_eq!(report.results[0].verdict.notes.len(), 2);

        let mut buffer = Vec::new();
        write_results(&mut buffer, &report, ',').expect("results should be written");
        let output = String::from_utf8(buffer).expect("utf-8 output");
        let rows = parse_rows(&output, ',').expect("written results should parse back");
        let notes = rows[0].get("notes").expect("notes column");

        assert_eq!(
            notes,
            "no recognized topic in prompt, accuracy estimated from completeness; no expected tier provided"
        );
    }
}
