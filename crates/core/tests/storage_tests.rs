// ═══════════════════════════════════════════════════════════════════
// Storage Tests — container format, encryption round-trips, tampering
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};

use moneytrack_core::errors::CoreError;
use moneytrack_core::models::portfolio::Portfolio;
use moneytrack_core::models::position::{AssetClass, InterestKind, InterestPayment, Position};
use moneytrack_core::models::transaction::{Ledger, Transaction, TransactionKind};
use moneytrack_core::storage::format::{FORMAT_VERSION, HEADER_LEN, MAGIC};
use moneytrack_core::storage::manager::StorageManager;

fn date(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// One position of every class, with the optional fields exercised.
fn populated_portfolio() -> Portfolio {
    let now = date(2025, 5, 20);
    let mut portfolio = Portfolio::new();
    portfolio
        .positions
        .push(Position::new("CHECKING", "Main Account", AssetClass::Bank, 1.0, 2500.0, now));
    portfolio
        .positions
        .push(Position::new("SAVINGS", "Rainy Day", AssetClass::Savings, 1.0, 5000.0, now));
    portfolio
        .positions
        .push(Position::new("BTC", "Bitcoin", AssetClass::Crypto, 0.5, 35_000.0, now));
    portfolio
        .positions
        .push(Position::new("AAPL", "Apple Inc.", AssetClass::Equity, 10.0, 150.0, now));
    let mut cert = Position::new("CA", "Savings Certificates", AssetClass::Interest, 1.0, 3000.0, now);
    cert.annual_rate = Some(2.5);
    cert.interest_kind = Some(InterestKind::Investment);
    cert.last_interest_payment = InterestPayment::PaidAt(date(2025, 4, 1));
    portfolio.positions.push(cert);
    portfolio
}

// ═══════════════════════════════════════════════════════════════════
// Round-trips
// ═══════════════════════════════════════════════════════════════════

mod round_trips {
    use super::*;

    #[test]
    fn empty_portfolio_round_trips() {
        let storage = StorageManager::new();
        let bytes = storage.save_to_bytes(&Portfolio::new(), "password123").unwrap();
        let loaded: Portfolio = storage.load_from_bytes(&bytes, "password123").unwrap();
        assert!(loaded.positions.is_empty());
    }

    #[test]
    fn populated_portfolio_round_trips_exactly() {
        let storage = StorageManager::new();
        let original = populated_portfolio();

        let bytes = storage.save_to_bytes(&original, "hunter2").unwrap();
        let loaded: Portfolio = storage.load_from_bytes(&bytes, "hunter2").unwrap();

        assert_eq!(loaded.positions.len(), original.positions.len());
        for (a, b) in original.positions.iter().zip(&loaded.positions) {
            assert_eq!(a, b);
        }
        let cert = loaded.find("CA", AssetClass::Interest).unwrap();
        assert_eq!(cert.annual_rate, Some(2.5));
        assert_eq!(cert.interest_kind, Some(InterestKind::Investment));
        assert_eq!(cert.last_interest_payment, InterestPayment::PaidAt(date(2025, 4, 1)));
    }

    #[test]
    fn ledger_round_trips() {
        let storage = StorageManager::new();
        let mut ledger = Ledger::default();
        ledger.monthly_budget = 1200.0;
        ledger.transactions.push(
            Transaction::new(
                date(2025, 5, 1),
                TransactionKind::CryptoBuy,
                "Crypto Investments",
                500.0,
                "Bought BTC",
            )
            .with_asset("BTC", Some(0.01), Some(50_000.0)),
        );

        let bytes = storage.save_to_bytes(&ledger, "password").unwrap();
        let loaded: Ledger = storage.load_from_bytes(&bytes, "password").unwrap();
        assert_eq!(loaded.monthly_budget, 1200.0);
        assert_eq!(loaded.transactions, ledger.transactions);
        assert_eq!(loaded.categories, ledger.categories);
    }

    #[test]
    fn every_save_produces_different_bytes() {
        // Fresh salt and nonce per write: identical state must never
        // produce identical ciphertext.
        let storage = StorageManager::new();
        let portfolio = Portfolio::new();
        let a = storage.save_to_bytes(&portfolio, "pw").unwrap();
        let b = storage.save_to_bytes(&portfolio, "pw").unwrap();
        assert_ne!(a, b);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Wrong password & tampering
// ═══════════════════════════════════════════════════════════════════

mod integrity {
    use super::*;

    #[test]
    fn wrong_password_is_a_decryption_error() {
        let storage = StorageManager::new();
        let bytes = storage.save_to_bytes(&populated_portfolio(), "correct").unwrap();
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "wrong");
        assert!(matches!(result, Err(CoreError::Decryption)));
    }

    #[test]
    fn flipped_ciphertext_byte_fails_authentication() {
        let storage = StorageManager::new();
        let mut bytes = storage.save_to_bytes(&populated_portfolio(), "pw").unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::Decryption)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Container format
// ═══════════════════════════════════════════════════════════════════

mod container {
    use super::*;

    #[test]
    fn snapshot_starts_with_magic_and_version() {
        let storage = StorageManager::new();
        let bytes = storage.save_to_bytes(&Portfolio::new(), "pw").unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
        assert!(bytes.len() > HEADER_LEN);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let storage = StorageManager::new();
        let mut bytes = storage.save_to_bytes(&Portfolio::new(), "pw").unwrap();
        bytes[0] = b'X';
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn unknown_version_is_reported_distinctly() {
        let storage = StorageManager::new();
        let mut bytes = storage.save_to_bytes(&Portfolio::new(), "pw").unwrap();
        bytes[4] = 0xFF;
        bytes[5] = 0xFF;
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::UnsupportedVersion(0xFFFF))));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let storage = StorageManager::new();
        let result: Result<Portfolio, _> = storage.load_from_bytes(&[0u8; 10], "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let storage = StorageManager::new();
        let mut bytes = storage.save_to_bytes(&Portfolio::new(), "pw").unwrap();
        bytes.truncate(bytes.len() - 4);
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn out_of_range_kdf_params_are_rejected() {
        let storage = StorageManager::new();
        let mut bytes = storage.save_to_bytes(&Portfolio::new(), "pw").unwrap();
        // Zero the memory-cost field.
        bytes[6..10].copy_from_slice(&0u32.to_le_bytes());
        let result: Result<Portfolio, _> = storage.load_from_bytes(&bytes, "pw");
        assert!(matches!(result, Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn kdf_params_validate_their_ranges() {
        use moneytrack_core::storage::encryption::KdfParams;

        assert!(KdfParams::default().validate().is_ok());

        let zero_memory = KdfParams {
            memory_cost: 0,
            ..KdfParams::default()
        };
        assert!(matches!(
            zero_memory.validate(),
            Err(CoreError::InvalidFileFormat(_))
        ));

        let absurd_iterations = KdfParams {
            time_cost: KdfParams::MAX_TIME_COST + 1,
            ..KdfParams::default()
        };
        assert!(absurd_iterations.validate().is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// File helpers (native)
// ═══════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
mod files {
    use super::*;

    #[test]
    fn save_and_load_via_file() {
        let storage = StorageManager::new();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("moneytrack-test-{}.mtrk", uuid::Uuid::new_v4()));

        storage
            .save_to_file(&populated_portfolio(), "pw", &path)
            .unwrap();
        let loaded: Portfolio = storage.load_from_file(&path, "pw").unwrap();
        assert_eq!(loaded.positions.len(), 5);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_a_file_io_error() {
        let storage = StorageManager::new();
        let result: Result<Portfolio, _> =
            storage.load_from_file("/nonexistent/path/file.mtrk", "pw");
        assert!(matches!(result, Err(CoreError::FileIO(_))));
    }
}
