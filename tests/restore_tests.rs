//! Restore and round-trip tests against the in-memory backend

use platine_dump::{
    DatabaseBackend, DatabaseDump, DumpError, FileSystemStorageBackend, MemoryBackend,
    StorageBackend,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const ORDERS: &str = "CREATE TABLE `orders` (\n  `id` int(11) NOT NULL AUTO_INCREMENT,\n  `customer` varchar(64) NOT NULL,\n  `total` decimal(10,2) DEFAULT NULL,\n  `note` text,\n  PRIMARY KEY (`id`),\n  KEY `customer` (`customer`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
const CUSTOMERS: &str = "CREATE TABLE `customers` (\n  `name` varchar(64) NOT NULL,\n  `vip` tinyint(1) NOT NULL DEFAULT 0\n) ENGINE=InnoDB";
const BIG_ORDERS: &str = "CREATE ALGORITHM=UNDEFINED DEFINER=`root`@`localhost` SQL SECURITY DEFINER VIEW `big_orders` AS select `orders`.`id` AS `id` from `orders` where `orders`.`total` > 100";

fn source() -> MemoryBackend {
    let backend = MemoryBackend::new("shop");
    backend.create_table(ORDERS).unwrap();
    backend.create_table(CUSTOMERS).unwrap();
    backend.create_view(BIG_ORDERS).unwrap();

    let rows = [
        (1, "ada", json!("120.50"), json!("first; order")),
        (2, "o'hara", json!("-3.10"), serde_json::Value::Null),
        (3, "bob", serde_json::Value::Null, json!("line one\nline two")),
        (4, "back\\slash", json!("0.00"), json!("tab\there \"quoted\"")),
    ];
    for (id, customer, total, note) in rows {
        backend
            .insert_row("orders", vec![json!(id), json!(customer), total, note])
            .unwrap();
    }
    backend
        .insert_row("customers", vec![json!("ada"), json!(1)])
        .unwrap();
    backend
}

#[tokio::test]
async fn test_round_trip_preserves_schema_and_rows() {
    let dir = tempdir().unwrap();
    let original = source();
    let dump = DatabaseDump::new(original, FileSystemStorageBackend::new(dir.path()));
    dump.backup("shop.sql").await.unwrap();

    let target = MemoryBackend::new("scratch");
    let mut restore = DatabaseDump::new(target, FileSystemStorageBackend::new(dir.path()));
    let report = restore.restore("shop.sql").await.unwrap();
    assert!(report.statements > 0);

    let original = dump.backend();
    let restored = restore.backend();
    assert_eq!(restored.database(), "shop");
    assert_eq!(
        restored.schema().await.unwrap(),
        original.schema().await.unwrap()
    );
    for name in ["orders", "customers", "big_orders"] {
        assert_eq!(
            restored.create_statement(name),
            original.create_statement(name),
            "CREATE text of {}",
            name
        );
    }
    for table in ["orders", "customers"] {
        assert_eq!(restored.row_count(table), original.row_count(table));
        assert_eq!(restored.table_rows(table), original.table_rows(table));
    }
}

#[cfg(feature = "gzip")]
#[tokio::test]
async fn test_compressed_and_plain_restores_match() {
    let dir = tempdir().unwrap();
    let mut dump = DatabaseDump::new(source(), FileSystemStorageBackend::new(dir.path()));
    dump.backup("plain.sql").await.unwrap();
    dump.set_compress(true).unwrap();
    let report = dump.backup("packed.sql.gz").await.unwrap();
    assert!(report.compressed);

    let packed = std::fs::read(dir.path().join("packed.sql.gz")).unwrap();
    assert_eq!(&packed[..2], &[0x1f, 0x8b]);

    let mut plain = DatabaseDump::new(
        MemoryBackend::new("a"),
        FileSystemStorageBackend::new(dir.path()),
    );
    let plain_report = plain.restore("plain.sql").await.unwrap();

    let mut gz = DatabaseDump::new(
        MemoryBackend::new("b"),
        FileSystemStorageBackend::new(dir.path()),
    );
    gz.set_compress(true).unwrap();
    let gz_report = gz.restore("packed.sql.gz").await.unwrap();

    assert!(gz_report.compressed);
    assert_eq!(plain_report.statements, gz_report.statements);
    assert_eq!(plain.backend().executed(), gz.backend().executed());
}

#[cfg(feature = "gzip")]
#[tokio::test]
async fn test_compressed_file_read_as_plain_fails() {
    let dir = tempdir().unwrap();
    let mut dump = DatabaseDump::new(source(), FileSystemStorageBackend::new(dir.path()));
    dump.set_compress(true).unwrap();
    dump.backup("packed.sql.gz").await.unwrap();

    let mut plain = DatabaseDump::new(
        MemoryBackend::new("a"),
        FileSystemStorageBackend::new(dir.path()),
    );
    assert!(plain.restore("packed.sql.gz").await.is_err());
}

#[cfg(not(feature = "gzip"))]
#[test]
fn test_compression_unavailable() {
    let dir = tempdir().unwrap();
    let mut dump = DatabaseDump::new(source(), FileSystemStorageBackend::new(dir.path()));
    assert!(matches!(
        dump.set_compress(true).err(),
        Some(DumpError::CompressionUnavailable)
    ));
    assert!(dump.set_compress(false).is_ok());
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempdir().unwrap();
    let mut dump = DatabaseDump::new(
        MemoryBackend::new("shop"),
        FileSystemStorageBackend::new(dir.path()),
    );

    let err = dump.restore("nope.sql").await.unwrap_err();
    assert!(matches!(err, DumpError::NotFound(ref f) if f == "nope.sql"));
    assert!(dump.backend().executed().is_empty());
}

#[tokio::test]
async fn test_progress_is_reported_per_statement() {
    let dir = tempdir().unwrap();
    let storage = FileSystemStorageBackend::new(dir.path());
    storage
        .write_file(
            "small.sql",
            b"-- comment\nSET NAMES utf8;\nCREATE TABLE `t` (\n  `id` int(11)\n);\nINSERT INTO `t` (`id`) VALUES (1\t);\nCOMMIT;\n",
        )
        .await
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut dump = DatabaseDump::new(MemoryBackend::new("shop"), storage);
    dump.set_on_progress(Some(Box::new(move |count, percent| {
        sink.lock().unwrap().push((count, percent));
    })));

    let report = dump.restore("small.sql").await.unwrap();
    assert_eq!(report.statements, 4);

    let seen = seen.lock().unwrap();
    let counts: Vec<usize> = seen.iter().map(|(c, _)| *c).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
    assert!(seen.windows(2).all(|w| w[0].1 < w[1].1));
    assert!(seen.iter().all(|(_, p)| *p > 0.0 && *p <= 100.0));
    assert_eq!(dump.backend().row_count("t"), Some(1));
}

#[tokio::test]
async fn test_failing_statement_stops_restore() {
    let dir = tempdir().unwrap();
    let storage = FileSystemStorageBackend::new(dir.path());
    storage
        .write_file(
            "broken.sql",
            b"SET NAMES utf8;\nINSERT INTO `missing` VALUES (1);\nCOMMIT;\n",
        )
        .await
        .unwrap();

    let mut dump = DatabaseDump::new(MemoryBackend::new("shop"), storage);
    let err = dump.restore("broken.sql").await.unwrap_err();

    match &err {
        DumpError::StatementFailed { sql, message } => {
            assert_eq!(sql, "INSERT INTO `missing` VALUES (1)");
            assert!(message.contains("doesn't exist"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("INSERT INTO `missing` VALUES (1)"));
    assert_eq!(dump.backend().executed(), vec!["SET NAMES utf8".to_string()]);
}

#[tokio::test]
async fn test_delimiter_directive_keeps_routine_bodies_whole() {
    let dir = tempdir().unwrap();
    let storage = FileSystemStorageBackend::new(dir.path());
    storage
        .write_file(
            "routines.sql",
            b"SET NAMES utf8;\nDELIMITER //\nCREATE TRIGGER `stamp` BEFORE INSERT ON `orders` FOR EACH ROW\nBEGIN\n  SET NEW.total = 0;\nEND//\ndelimiter ;\nCOMMIT;\n",
        )
        .await
        .unwrap();

    let mut dump = DatabaseDump::new(MemoryBackend::new("shop"), storage);
    let report = dump.restore("routines.sql").await.unwrap();
    assert_eq!(report.statements, 3);

    assert_eq!(
        dump.backend().executed(),
        vec![
            "SET NAMES utf8".to_string(),
            "CREATE TRIGGER `stamp` BEFORE INSERT ON `orders` FOR EACH ROW\nBEGIN\n  SET NEW.total = 0;\nEND".to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unsupported_dialect_restores_nothing() {
    let dir = tempdir().unwrap();
    let storage = FileSystemStorageBackend::new(dir.path());
    storage
        .write_file("x.sql", b"DROP TABLE `orders`;\n")
        .await
        .unwrap();

    let mut dump = DatabaseDump::new(MemoryBackend::new("app").with_dialect("sqlite"), storage);
    let report = dump.restore("x.sql").await.unwrap();
    assert_eq!(report.statements, 0);
    assert!(dump.backend().executed().is_empty());
}
