use crate::domain::record::ChargeRecord;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ChargeRow<'a> {
    id: u64,
    user_id: u64,
    name: &'a str,
    status: &'a str,
    processor_charge_id: &'a str,
}

impl<'a> From<&'a ChargeRecord> for ChargeRow<'a> {
    fn from(record: &'a ChargeRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: &record.name,
            status: &record.status,
            processor_charge_id: &record.processor_charge_id,
        }
    }
}

/// Writes charge records as CSV: `id,user_id,name,status,processor_charge_id`.
pub struct ChargeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ChargeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_charges(&mut self, charges: impl IntoIterator<Item = ChargeRecord>) -> Result<()> {
        for charge in charges {
            self.writer.serialize(ChargeRow::from(&charge))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
