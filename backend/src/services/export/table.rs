use crate::error::BackCheckError;
use crate::services::export::columns;
use common::model::back_check::BackCheckRecord;
use std::io::Write;

/// Writes the header row and one row per record in the fixed column order.
pub fn write_csv<W: Write>(records: &[BackCheckRecord], writer: W) -> Result<(), BackCheckError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns::headers())?;
    for record in records {
        csv_writer.write_record(columns::row(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}
