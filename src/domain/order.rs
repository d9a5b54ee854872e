use serde::Deserialize;

/// One charge to run on behalf of a user, as read from a batch file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ChargeOrder {
    pub user: u64,
    pub name: String,
    pub amount: i64,
    pub quantity: Option<u32>,
    pub currency: Option<String>,
    pub coupon: Option<String>,
    pub invoice: Option<bool>,
    pub payment_method: Option<String>,
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserialization_with_blank_fields() {
        let csv = "user,name,amount,quantity,currency,coupon,invoice,payment_method,token\n\
                   1,Widget,1999,,,,,pm_card_visa,";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let mut iter = reader.deserialize();

        let order: ChargeOrder = iter
            .next()
            .unwrap()
            .expect("Failed to deserialize charge order");

        assert_eq!(order.user, 1);
        assert_eq!(order.amount, 1999);
        assert_eq!(order.quantity, None);
        assert_eq!(order.coupon, None);
        assert_eq!(order.invoice, None);
        assert_eq!(order.payment_method.as_deref(), Some("pm_card_visa"));
        assert_eq!(order.token, None);
    }

    #[test]
    fn test_invoiced_order_deserialization() {
        let csv = "user,name,amount,quantity,currency,coupon,invoice,payment_method,token\n\
                   2, Seats, 500, 4, EUR, LAUNCH, true, , tok_visa";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let mut iter = reader.deserialize();

        let order: ChargeOrder = iter.next().unwrap().unwrap();
        assert_eq!(order.name, "Seats");
        assert_eq!(order.quantity, Some(4));
        assert_eq!(order.currency.as_deref(), Some("EUR"));
        assert_eq!(order.invoice, Some(true));
        assert_eq!(order.payment_method, None);
        assert_eq!(order.token.as_deref(), Some("tok_visa"));
    }
}
