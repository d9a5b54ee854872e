use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 9] = [
    "user",
    "name",
    "amount",
    "quantity",
    "currency",
    "coupon",
    "invoice",
    "payment_method",
    "token",
];

/// Writes a charge order CSV with the standard header followed by `rows`.
pub fn write_orders(path: &Path, rows: &[[&str; 9]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
