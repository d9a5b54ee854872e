use crate::domain::discount::RawCoupon;
use crate::domain::money::Currency;
use crate::error::Result;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Runs a batch of one-off charges against the sandbox processor.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input charge orders CSV file
    pub input: PathBuf,

    /// JSON file with the processor's coupon catalogue (an array of coupon objects)
    #[arg(long, env = "CASHIER_COUPONS")]
    pub coupons: Option<PathBuf>,

    /// Preferred currency of every owner
    #[arg(long, env = "CASHIER_CURRENCY", default_value = "usd")]
    pub currency: String,

    /// Path to persistent charge database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CASHIER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CASHIER_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn default_currency(&self) -> Result<Currency> {
        Currency::new(&self.currency)
    }

    /// Loads the coupon catalogue, empty when no file was configured.
    pub fn load_coupons(&self) -> Result<Vec<RawCoupon>> {
        let Some(path) = &self.coupons else {
            return Ok(Vec::new());
        };
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::CouponDuration;
    use crate::error::ChargeError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["cashier-charge", "orders.csv"]).unwrap();
        assert_eq!(config.input, PathBuf::from("orders.csv"));
        assert_eq!(config.default_currency().unwrap().as_str(), "usd");
        assert!(config.db_path.is_none());
        assert!(config.load_coupons().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_currency() {
        let config =
            Config::try_parse_from(["cashier-charge", "orders.csv", "--currency", "u$d"]).unwrap();
        assert!(matches!(
            config.default_currency(),
            Err(ChargeError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_load_coupons() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"id":"LAUNCH","amount_off":500,"duration":"once"}},
                {{"id":"LOYAL","percent_off":10,"duration":"forever"}}]"#
        )
        .unwrap();

        let config = Config::try_parse_from([
            "cashier-charge",
            "orders.csv",
            "--coupons",
            file.path().to_str().unwrap(),
        ])
        .unwrap();

        let coupons = config.load_coupons().unwrap();
        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].amount_off, Some(500));
        assert_eq!(coupons[1].duration, CouponDuration::Forever);
    }

    #[test]
    fn test_load_coupons_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let config = Config {
            coupons: Some(file.path().to_path_buf()),
            ..Config::try_parse_from(["cashier-charge", "orders.csv"]).unwrap()
        };
        assert!(matches!(config.load_coupons(), Err(ChargeError::Json(_))));
    }
}
