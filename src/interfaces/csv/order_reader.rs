use crate::domain::order::ChargeOrder;
use crate::error::{ChargeError, Result};
use std::io::Read;

/// Reads charge orders from a CSV source.
///
/// Handles whitespace trimming and flexible record lengths; blank optional columns become `None`.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes orders, one `Result` per row.
    pub fn orders(self) -> impl Iterator<Item = Result<ChargeOrder>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ChargeError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "user,name,amount,quantity,currency,coupon,invoice,payment_method,token";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n1, Widget, 1999, , , , , pm_card_visa,\n2, Seats, 500, 3, eur, LAUNCH, true, , tok_visa"
        );
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<ChargeOrder>> = reader.orders().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.user, 1);
        assert_eq!(first.amount, 1999);
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.coupon.as_deref(), Some("LAUNCH"));
        assert_eq!(second.invoice, Some(true));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\n1, Widget, nineteen, , , , , pm_card_visa,");
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<ChargeOrder>> = reader.orders().collect();

        assert!(matches!(results[0], Err(ChargeError::Csv(_))));
    }
}
