use thiserror::Error;

/// Failures reported by a payment processor client.
///
/// The builder never retries; these surface verbatim through [`ChargeError::Processor`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessorError {
    #[error("Processor rejected the request ({code}): {message}")]
    Api { code: String, message: String },
    #[error("Processor authentication failed: {0}")]
    Authentication(String),
    #[error("Processor unreachable: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum ChargeError {
    #[error("{field} must be positive, got {value}")]
    InvalidAmount { field: &'static str, value: i64 },
    #[error("{unit_amount} x {quantity} exceeds the maximum chargeable amount")]
    AmountOverflow { unit_amount: i64, quantity: u32 },
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),
    #[error("{0} is not valid.")]
    InvalidCoupon(String),
    #[error("{0} cannot be used on a charge, please ensure the coupon type is set to once.")]
    IneligibleCoupon(String),
    #[error("{code} cannot discount a {currency} charge, its amount off is in another currency.")]
    CouponCurrencyMismatch { code: String, currency: String },
    #[error("No payment method provided.")]
    MissingPaymentMethod,
    #[error("No customer available to attach the invoice item to.")]
    MissingCustomer,
    #[error("Payment {id} failed with status {status}")]
    PaymentFailed { id: String, status: String },
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ChargeError>;
