use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One account as persisted in the ledger document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub name: String,
    #[serde(alias = "pin_number")]
    pub pin: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision", alias = "bank_balance")]
    pub balance: Decimal,
}

impl Account {
    pub fn new(name: impl Into<String>, pin: impl Into<String>, balance: Decimal) -> Self {
        Self {
            name: name.into(),
            pin: pin.into(),
            balance,
        }
    }

    /// Case-insensitive identity check.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// The whole ledger: every account, in insertion order.
///
/// Names are unique case-insensitively. Nothing here enforces that, so anything
/// that inserts accounts must check [`Document::position`] first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default, alias = "users")]
    pub accounts: Vec<Account>,
}

impl Document {
    /// Initial content written to an empty store.
    pub fn seed() -> Self {
        Self {
            accounts: vec![
                Account::new("Ali", "1234", Decimal::from(5000)),
                Account::new("Mona", "5678", Decimal::from(7500)),
                Account::new("Saif", "9876", Decimal::from(3200)),
            ],
        }
    }

    /// Index of the first account matching `name`, ignoring case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|account| account.is_named(name))
    }

    pub fn find(&self, name: &str) -> Option<&Account> {
        self.position(name).map(|idx| &self.accounts[idx])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.is_named(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.accounts.iter().map(|account| account.name.clone()).collect()
    }

    pub fn total(&self) -> Decimal {
        self.accounts.iter().map(|account| account.balance).sum()
    }
}

/// `name,balance` output row. Never carries a PIN.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalanceRow {
    pub name: String,
    pub balance: Decimal,
}

impl From<&Account> for BalanceRow {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            balance: account.balance,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NameRow {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Transfer,
}

/// A row of a batch file: `type,name,pin,receiver,amount`.
///
/// `pin` and `receiver` are only used by transfers and may be left empty for deposits.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchRow {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub name: String,
    pub pin: Option<String>,
    pub receiver: Option<String>,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_batch_row(row: &str) -> Result<BatchRow, csv::Error> {
        let data_with_header = format!("type,name,pin,receiver,amount\n{}", row);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_document() {
        let json = r#"{"accounts":[{"name":"Ali","pin":"1234","balance":5000},
                      {"name":"Mona","pin":"5678","balance":12.75}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(
            doc,
            Document {
                accounts: vec![
                    Account::new("Ali", "1234", dec!(5000)),
                    Account::new("Mona", "5678", dec!(12.75)),
                ]
            }
        );
    }

    #[test]
    fn test_parse_legacy_keys() {
        let json = r#"{"users":[{"name":"Ali","pin_number":"1234","bank_balance":5000.5}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.accounts, vec![Account::new("Ali", "1234", dec!(5000.5))]);
    }

    #[test]
    fn test_missing_accounts_key_is_empty_ledger() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.accounts.is_empty());
        assert!(doc.names().is_empty());
    }

    #[test]
    fn test_serialized_layout_uses_canonical_keys() {
        let value = serde_json::to_value(Document::seed()).unwrap();
        let first = &value["accounts"][0];
        assert_eq!(first["name"], "Ali");
        assert_eq!(first["pin"], "1234");
        assert_eq!(first["balance"].as_f64(), Some(5000.0));
        assert_eq!(value["accounts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_balance_is_an_exact_json_number() {
        let doc = Document {
            accounts: vec![Account::new("Ali", "1234", dec!(5000.0000000000001))],
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""balance":5000.0000000000001"#));

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.accounts[0].balance, dec!(5000.0000000000001));
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let doc = Document::seed();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.names(), vec!["Ali", "Mona", "Saif"]);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let doc = Document::seed();
        assert_eq!(doc.position("ali"), Some(0));
        assert_eq!(doc.position("MONA"), Some(1));
        assert_eq!(doc.find("sAiF").map(|a| a.balance), Some(dec!(3200)));
        assert!(doc.find("Zed").is_none());
    }

    #[test]
    fn test_find_returns_first_match() {
        let doc = Document {
            accounts: vec![
                Account::new("ali", "1", dec!(1)),
                Account::new("ALI", "2", dec!(2)),
            ],
        };
        assert_eq!(doc.find("Ali").map(|a| a.pin.as_str()), Some("1"));
    }

    #[test]
    fn test_pin_is_not_part_of_identity() {
        let account = Account::new("Mona", "5678", dec!(1));
        assert!(account.is_named("mona"));
        assert!(!account.is_named("mona "));
    }

    #[test]
    fn test_total() {
        assert_eq!(Document::seed().total(), dec!(15700));
        assert_eq!(Document::default().total(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_deposit_row() {
        assert_eq!(
            parse_batch_row("deposit,Ali,,,100.5").unwrap(),
            BatchRow {
                op_type: OperationType::Deposit,
                name: "Ali".to_string(),
                pin: None,
                receiver: None,
                amount: dec!(100.5),
            }
        );
    }

    #[test]
    fn test_parse_transfer_row() {
        assert_eq!(
            parse_batch_row("transfer, Mona, 5678, Saif, 2500").unwrap(),
            BatchRow {
                op_type: OperationType::Transfer,
                name: "Mona".to_string(),
                pin: Some("5678".to_string()),
                receiver: Some("Saif".to_string()),
                amount: dec!(2500),
            }
        );
    }

    #[test]
    fn test_parse_invalid_operation_type() {
        assert!(parse_batch_row("withdrawal,Ali,,,1.0").is_err());
    }

    #[test]
    fn test_parse_invalid_amount_format() {
        assert!(parse_batch_row("deposit,Ali,,,abc").is_err());
    }
}
