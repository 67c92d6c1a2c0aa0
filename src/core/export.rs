use crate::domain::model::MonthlyRecord;
use crate::utils::error::{Result, SstError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// One rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Headered `date,mean_sst` table. A missing value is an empty field.
pub fn render_delimited(records: &[MonthlyRecord], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| SstError::IoError(e.into_error()))
}

pub fn render_json(records: &[MonthlyRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Render every requested format as `<description>.<format>`.
pub fn render_exports(
    records: &[MonthlyRecord],
    description: &str,
    formats: &[String],
) -> Result<Vec<ExportFile>> {
    formats
        .iter()
        .map(|format| {
            let contents = match format.as_str() {
                "csv" => render_delimited(records, b',')?,
                "tsv" => render_delimited(records, b'\t')?,
                "json" => render_json(records)?,
                other => {
                    return Err(SstError::InvalidConfigValueError {
                        field: "export.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            };
            Ok(ExportFile {
                name: format!("{}.{}", description, format),
                contents,
            })
        })
        .collect()
}

pub fn bundle_zip(files: &[ExportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
