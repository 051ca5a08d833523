use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use ledger::{
    ApplyCmd, ArchiveProductCmd, EntryKind, EntryListFilter, EntryRef, Ledger, LedgerError,
    OpenAccountCmd, PurchaseCmd, SaleCmd, SourceType, VoucherCmd, VoucherDirection,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (ledger, db)
}

async fn ledger_with_file_db() -> (Ledger, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    // One pooled connection: concurrent transactions queue on the pool
    // instead of tripping over sqlite busy errors.
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(1);
    let db = Database::connect(opts).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (ledger, db, path)
}

async fn onboarded_vendor(ledger: &Ledger, initial_minor: i64) -> String {
    let vendor = ledger.create_vendor("Nile Home Goods").await.unwrap();
    let vendor_id = vendor.id.to_string();
    ledger
        .open_account(OpenAccountCmd::new(vendor_id.clone(), initial_minor))
        .await
        .unwrap();
    vendor_id
}

async fn balance(ledger: &Ledger, vendor_id: &str) -> i64 {
    ledger
        .account(vendor_id)
        .await
        .unwrap()
        .current_balance_minor
}

#[tokio::test]
async fn open_account_starts_at_initial_capital() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    let account = ledger.account(&vendor_id).await.unwrap();
    assert_eq!(account.initial_capital_minor, 7_500_00);
    assert_eq!(account.current_balance_minor, 7_500_00);

    let err = ledger
        .open_account(OpenAccountCmd::new(vendor_id.clone(), 1_00))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountExists(vendor_id));
}

#[tokio::test]
async fn apply_without_account_fails() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor = ledger.create_vendor("No Account Yet").await.unwrap();
    let vendor_id = vendor.id.to_string();

    let err = ledger
        .apply(ApplyCmd::new(
            vendor_id.clone(),
            EntryKind::ReceiptFromSupplier,
            100_00,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(vendor_id));
}

#[tokio::test]
async fn owned_purchase_and_sale_track_the_margin() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    // 10 units @ 100.00 owned: full cost leaves the account.
    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Kettle",
            SourceType::Owned,
            100_00,
            10,
        ))
        .await
        .unwrap();
    let entry = purchase.entry.expect("owned purchase writes an entry");
    assert_eq!(entry.kind, EntryKind::Purchase);
    assert_eq!(entry.amount_minor, 1_000_00);
    assert_eq!(entry.balance_before_minor, 7_500_00);
    assert_eq!(entry.balance_after_minor, 6_500_00);
    assert!(purchase.warning.is_none());
    assert_eq!(balance(&ledger, &vendor_id).await, 6_500_00);

    // 5 units @ 180.00: only the margin is credited, not the sale price.
    let sale = ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            5,
            180_00,
            "order-item-1",
        ))
        .await
        .unwrap();
    assert_eq!(sale.profit_minor, 5 * 80_00);
    let entry = sale.entry.expect("owned sale writes a profit entry");
    assert_eq!(entry.kind, EntryKind::SaleProfit);
    assert_eq!(entry.balance_after_minor, 6_900_00);
    assert_eq!(balance(&ledger, &vendor_id).await, 6_900_00);

    let product = ledger
        .product(&vendor_id, purchase.product_id)
        .await
        .unwrap();
    assert_eq!(product.quantity_on_hand, 5);
    assert_eq!(product.quantity_sold, 5);
}

#[tokio::test]
async fn overdrawing_purchase_warns_but_still_commits() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 500_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Fridge",
            SourceType::Owned,
            100_00,
            10,
        ))
        .await
        .unwrap();

    let warning = purchase.warning.expect("overdraw must be reported");
    assert_eq!(warning.balance_after_minor, -500_00);
    assert_eq!(warning.shortfall_minor, 500_00);
    // The purchase went through anyway: the account may go negative.
    assert!(purchase.entry.is_some());
    assert_eq!(balance(&ledger, &vendor_id).await, -500_00);
}

#[tokio::test]
async fn consignment_stock_never_touches_capital_at_purchase_or_sale() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 6_900_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Blender",
            SourceType::Consignment,
            150_00,
            5,
        ))
        .await
        .unwrap();
    assert!(purchase.entry.is_none());
    assert_eq!(balance(&ledger, &vendor_id).await, 6_900_00);

    let sale = ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            3,
            250_00,
            "order-item-2",
        ))
        .await
        .unwrap();
    assert!(sale.entry.is_none());
    assert_eq!(sale.profit_minor, 0);
    assert_eq!(balance(&ledger, &vendor_id).await, 6_900_00);

    // No entries at all were written for the consignment flow.
    let (entries, _) = ledger
        .list_entries(&vendor_id, 50, None, &EntryListFilter::default())
        .await
        .unwrap();
    assert!(entries.is_empty());

    // The sold-but-unsettled cost shows up as a payable in the valuation.
    let valuation = ledger.valuation(&vendor_id).await.unwrap();
    assert_eq!(valuation.consignment_sold_unsettled_value_minor, 3 * 150_00);
    assert_eq!(valuation.consignment_stock_value_minor, 2 * 150_00);
}

#[tokio::test]
async fn supplier_receipt_realizes_consignment_margin_and_settles() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 6_900_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Blender",
            SourceType::Consignment,
            150_00,
            5,
        ))
        .await
        .unwrap();
    ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            3,
            250_00,
            "order-item-2",
        ))
        .await
        .unwrap();

    // Supplier kicks back the vendor margin: 3 × (250 − 150).
    let voucher = ledger
        .record_voucher(
            VoucherCmd::new(
                vendor_id.clone(),
                VoucherDirection::Receipt,
                300_00,
                "voucher-17",
            )
            .settles_product(purchase.product_id),
        )
        .await
        .unwrap();

    assert_eq!(voucher.entry.kind, EntryKind::ReceiptFromSupplier);
    assert_eq!(voucher.settled_value_minor, 3 * 150_00);
    assert_eq!(balance(&ledger, &vendor_id).await, 7_200_00);

    let valuation = ledger.valuation(&vendor_id).await.unwrap();
    assert_eq!(valuation.consignment_sold_unsettled_value_minor, 0);
}

#[tokio::test]
async fn archiving_owned_product_refunds_unsold_stock_once() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Kettle",
            SourceType::Owned,
            100_00,
            10,
        ))
        .await
        .unwrap();
    ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            5,
            180_00,
            "order-item-1",
        ))
        .await
        .unwrap();
    assert_eq!(balance(&ledger, &vendor_id).await, 6_900_00);

    // 5 units @ 100.00 still on the shelf go back to capital.
    let archived = ledger
        .archive_product(ArchiveProductCmd::new(vendor_id.clone(), purchase.product_id))
        .await
        .unwrap();
    assert_eq!(archived.refunded_minor, 500_00);
    let entry = archived.entry.expect("refund entry");
    assert_eq!(entry.kind, EntryKind::Refund);
    assert_eq!(balance(&ledger, &vendor_id).await, 7_400_00);

    let product = ledger
        .product(&vendor_id, purchase.product_id)
        .await
        .unwrap();
    assert!(product.archived);
    assert_eq!(product.quantity_on_hand, 0);

    // A second archive cannot double-refund.
    let err = ledger
        .archive_product(ArchiveProductCmd::new(vendor_id.clone(), purchase.product_id))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(balance(&ledger, &vendor_id).await, 7_400_00);
}

#[tokio::test]
async fn duplicate_reference_is_rejected_and_posts_nothing() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 1_000_00).await;

    let cmd = VoucherCmd::new(
        vendor_id.clone(),
        VoucherDirection::Payment,
        200_00,
        "voucher-9",
    );
    ledger.record_voucher(cmd.clone()).await.unwrap();
    assert_eq!(balance(&ledger, &vendor_id).await, 800_00);

    // A blind retry with the same voucher id must not double-post.
    let err = ledger.record_voucher(cmd).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateReference(_)));
    assert_eq!(balance(&ledger, &vendor_id).await, 800_00);

    let (entries, _) = ledger
        .list_entries(&vendor_id, 50, None, &EntryListFilter::default())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);

    // Same voucher id under the other direction is a different event.
    ledger
        .record_voucher(VoucherCmd::new(
            vendor_id.clone(),
            VoucherDirection::Receipt,
            50_00,
            "voucher-9",
        ))
        .await
        .unwrap();
    assert_eq!(balance(&ledger, &vendor_id).await, 850_00);
}

#[tokio::test]
async fn sale_rejects_insufficient_stock_and_below_cost_pricing() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Kettle",
            SourceType::Owned,
            100_00,
            3,
        ))
        .await
        .unwrap();

    let err = ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            4,
            180_00,
            "order-item-1",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock(_)));

    let err = ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            1,
            90_00,
            "order-item-2",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    // Nothing moved: stock and balance are as after the purchase.
    let product = ledger
        .product(&vendor_id, purchase.product_id)
        .await
        .unwrap();
    assert_eq!(product.quantity_on_hand, 3);
    assert_eq!(balance(&ledger, &vendor_id).await, 7_500_00 - 300_00);
}

#[tokio::test]
async fn account_balance_equals_initial_plus_signed_entry_sum() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    let purchase = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Kettle",
            SourceType::Owned,
            100_00,
            10,
        ))
        .await
        .unwrap();
    ledger
        .record_sale(SaleCmd::new(
            vendor_id.clone(),
            purchase.product_id,
            5,
            180_00,
            "order-item-1",
        ))
        .await
        .unwrap();
    ledger
        .record_voucher(VoucherCmd::new(
            vendor_id.clone(),
            VoucherDirection::Payment,
            150_00,
            "voucher-3",
        ))
        .await
        .unwrap();

    let account = ledger.account(&vendor_id).await.unwrap();
    let (entries, _) = ledger
        .list_entries(&vendor_id, 50, None, &EntryListFilter::default())
        .await
        .unwrap();

    let signed_sum: i64 = entries.iter().map(|e| e.signed_amount_minor()).sum();
    assert_eq!(
        account.current_balance_minor,
        account.initial_capital_minor + signed_sum
    );
    for entry in &entries {
        assert_eq!(
            entry.balance_after_minor,
            entry.balance_before_minor + entry.signed_amount_minor()
        );
    }
}

#[tokio::test]
async fn entry_listing_paginates_in_replay_order() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 10_000_00).await;

    for i in 0..5 {
        ledger
            .record_voucher(VoucherCmd::new(
                vendor_id.clone(),
                VoucherDirection::Payment,
                10_00,
                format!("voucher-{i}"),
            ))
            .await
            .unwrap();
    }

    let (first, cursor) = ledger
        .list_entries(&vendor_id, 3, None, &EntryListFilter::default())
        .await
        .unwrap();
    assert_eq!(first.len(), 3);
    let cursor = cursor.expect("more pages");

    let (rest, cursor) = ledger
        .list_entries(&vendor_id, 3, Some(&cursor), &EntryListFilter::default())
        .await
        .unwrap();
    assert_eq!(rest.len(), 2);
    assert!(cursor.is_none());

    // Replay order: balances chain oldest → newest across pages.
    let all: Vec<_> = first.into_iter().chain(rest).collect();
    for pair in all.windows(2) {
        assert_eq!(pair[0].balance_after_minor, pair[1].balance_before_minor);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_for_one_vendor_lose_no_update() {
    let (ledger, _db, _path) = ledger_with_file_db().await;
    let vendor_id = onboarded_vendor(&ledger, 100_000_00).await;
    let ledger = Arc::new(ledger);

    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        let vendor_id = vendor_id.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .record_purchase(PurchaseCmd::new(
                    vendor_id,
                    format!("Batch {i}"),
                    SourceType::Owned,
                    10_00,
                    10,
                ))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Every purchase landed exactly once, whatever the interleaving.
    assert_eq!(
        balance(&ledger, &vendor_id).await,
        100_000_00 - 10 * 10 * 10_00
    );
    let report = ledger.reconcile(&vendor_id).await.unwrap();
    assert!(report.is_clean(), "{:?}", report.explanations);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_flows_for_different_vendors_both_land() {
    let (ledger, _db, _path) = ledger_with_file_db().await;

    let vendor_a = onboarded_vendor(&ledger, 5_000_00).await;
    let vendor_b = {
        let vendor = ledger.create_vendor("Cairo Textiles").await.unwrap();
        let id = vendor.id.to_string();
        ledger
            .open_account(OpenAccountCmd::new(id.clone(), 5_000_00))
            .await
            .unwrap();
        id
    };

    let ledger = Arc::new(ledger);
    let a = {
        let ledger = ledger.clone();
        let vendor_a = vendor_a.clone();
        tokio::spawn(async move {
            for i in 0..5 {
                ledger
                    .record_voucher(VoucherCmd::new(
                        vendor_a.clone(),
                        VoucherDirection::Payment,
                        100_00,
                        format!("a-{i}"),
                    ))
                    .await
                    .unwrap();
            }
        })
    };
    let b = {
        let ledger = ledger.clone();
        let vendor_b = vendor_b.clone();
        tokio::spawn(async move {
            for i in 0..5 {
                ledger
                    .record_voucher(VoucherCmd::new(
                        vendor_b.clone(),
                        VoucherDirection::Receipt,
                        100_00,
                        format!("b-{i}"),
                    ))
                    .await
                    .unwrap();
            }
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(balance(&ledger, &vendor_a).await, 4_500_00);
    assert_eq!(balance(&ledger, &vendor_b).await, 5_500_00);
}

#[tokio::test]
async fn apply_reference_helper_builds_distinct_keys() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 1_000_00).await;

    // Raw apply with an explicit reference behaves like the flow ops.
    ledger
        .apply(
            ApplyCmd::new(vendor_id.clone(), EntryKind::ReceiptFromSupplier, 25_00)
                .reference(EntryRef::voucher("v-1"))
                .description("manual posting"),
        )
        .await
        .unwrap();
    let err = ledger
        .apply(
            ApplyCmd::new(vendor_id.clone(), EntryKind::ReceiptFromSupplier, 25_00)
                .reference(EntryRef::voucher("v-1")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateReference(_)));
    assert_eq!(balance(&ledger, &vendor_id).await, 1_025_00);
}
