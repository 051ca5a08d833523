use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{
    ApplyCmd, ArchiveProductCmd, DriftExplanation, EntryKind, EntryListFilter, EntryRef, Ledger,
    LedgerError, OpenAccountCmd, PurchaseCmd, SaleCmd, SourceType, VoucherCmd, VoucherDirection,
};
use migration::MigratorTrait;

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

async fn onboarded_vendor(ledger: &Ledger, initial_minor: i64) -> String {
    let vendor = ledger.create_vendor("Nile Home Goods").await.unwrap();
    let vendor_id = vendor.id.to_string();
    ledger
        .open_account(OpenAccountCmd::new(vendor_id.clone(), initial_minor))
        .await
        .unwrap();
    vendor_id
}

/// Runs the full owned + consignment lifecycle:
/// purchase 10×100 owned, sell 5 @ 180, consign 5×150, sell 3 @ 250,
/// settle via a 300 receipt, archive the owned product (refund 500).
/// Leaves the balance at 7700.00 for an initial capital of 7500.00.
async fn full_scenario(ledger: &Ledger, vendor_id: &str) {
    let owned = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.to_string(),
            "Kettle",
            SourceType::Owned,
            100_00,
            10,
        ))
        .await
        .unwrap();
    ledger
        .record_sale(SaleCmd::new(
            vendor_id.to_string(),
            owned.product_id,
            5,
            180_00,
            "order-item-1",
        ))
        .await
        .unwrap();

    let consigned = ledger
        .record_purchase(PurchaseCmd::new(
            vendor_id.to_string(),
            "Blender",
            SourceType::Consignment,
            150_00,
            5,
        ))
        .await
        .unwrap();
    ledger
        .record_sale(SaleCmd::new(
            vendor_id.to_string(),
            consigned.product_id,
            3,
            250_00,
            "order-item-2",
        ))
        .await
        .unwrap();
    ledger
        .record_voucher(
            VoucherCmd::new(
                vendor_id.to_string(),
                VoucherDirection::Receipt,
                300_00,
                "voucher-17",
            )
            .settles_product(consigned.product_id),
        )
        .await
        .unwrap();

    ledger
        .archive_product(ArchiveProductCmd::new(
            vendor_id.to_string(),
            owned.product_id,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn reconcile_is_clean_after_the_full_lifecycle() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    full_scenario(&ledger, &vendor_id).await;

    let report = ledger.reconcile(&vendor_id).await.unwrap();
    assert_eq!(report.actual_minor, 7_700_00);
    assert_eq!(report.expected_minor, 7_700_00);
    assert_eq!(report.delta_minor, 0);
    assert!(report.is_clean(), "{:?}", report.explanations);
}

#[tokio::test]
async fn unsettled_consignment_payable_is_attributed_not_unexplained() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 6_900_00).await;

    let consigned = ledger
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
            consigned.product_id,
            3,
            250_00,
            "order-item-2",
        ))
        .await
        .unwrap();

    // Between the sale and the supplier voucher, the stored balance
    // overstates freely available capital by the payable.
    let report = ledger.reconcile(&vendor_id).await.unwrap();
    assert_eq!(report.delta_minor, 3 * 150_00);
    assert!(report.explanations.iter().any(|e| matches!(
        e,
        DriftExplanation::UnsettledConsignmentPayable {
            amount_minor: 450_00
        }
    )));
    assert!(
        !report
            .explanations
            .iter()
            .any(|e| matches!(e, DriftExplanation::Unexplained { .. }))
    );
}

#[tokio::test]
async fn corrupted_balance_after_reports_ledger_divergence() {
    let (ledger, db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;
    full_scenario(&ledger, &vendor_id).await;

    let (entries, _) = ledger
        .list_entries(&vendor_id, 1, None, &EntryListFilter::default())
        .await
        .unwrap();
    let victim = entries[0].id.to_string();

    // Corrupt one audit pair directly, the way a non-atomic writer would.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE ledger_entries SET balance_after_minor = balance_after_minor + 100 WHERE id = ?",
        vec![victim.into()],
    ))
    .await
    .unwrap();

    let report = ledger.reconcile(&vendor_id).await.unwrap();
    // The stored balance and the signed sum both still agree, so the delta
    // stays zero; the per-entry audit is what catches it.
    assert_eq!(report.delta_minor, 0);
    assert!(report.explanations.iter().any(|e| matches!(
        e,
        DriftExplanation::LedgerDivergence {
            entry_violations: 1,
            ..
        }
    )));
}

#[tokio::test]
async fn skipped_balance_update_reports_ledger_divergence() {
    let (ledger, db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;
    full_scenario(&ledger, &vendor_id).await;

    // Simulate the classic bug: someone bumped the account without writing
    // an entry.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE capital_accounts SET current_balance_minor = current_balance_minor + 250 \
         WHERE vendor_id = ?",
        vec![vendor_id.clone().into()],
    ))
    .await
    .unwrap();

    let report = ledger.reconcile(&vendor_id).await.unwrap();
    assert_eq!(report.delta_minor, 250);
    assert!(report.explanations.iter().any(|e| matches!(
        e,
        DriftExplanation::LedgerDivergence {
            entry_violations: 0,
            account_drift_minor: 250
        }
    )));
    assert!(
        !report
            .explanations
            .iter()
            .any(|e| matches!(e, DriftExplanation::Unexplained { .. }))
    );
}

#[tokio::test]
async fn legacy_consignment_profit_posting_is_attributed() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 6_900_00).await;

    let consigned = ledger
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
            consigned.product_id,
            3,
            250_00,
            "order-item-2",
        ))
        .await
        .unwrap();
    ledger
        .record_voucher(
            VoucherCmd::new(
                vendor_id.clone(),
                VoucherDirection::Receipt,
                300_00,
                "voucher-17",
            )
            .settles_product(consigned.product_id),
        )
        .await
        .unwrap();
    assert!(ledger.reconcile(&vendor_id).await.unwrap().is_clean());

    // Replay the historical bug shape: profit posted directly against a
    // consignment product.
    ledger
        .apply(
            ApplyCmd::new(vendor_id.clone(), EntryKind::ConsignmentProfit, 300_00)
                .reference(EntryRef::product(consigned.product_id))
                .description("legacy direct posting"),
        )
        .await
        .unwrap();

    let report = ledger.reconcile(&vendor_id).await.unwrap();
    assert_eq!(report.delta_minor, 300_00);
    assert!(report.explanations.iter().any(|e| matches!(
        e,
        DriftExplanation::ConsignmentProfitPostings {
            amount_minor: 300_00,
            entries: 1
        }
    )));
    assert!(
        !report
            .explanations
            .iter()
            .any(|e| matches!(e, DriftExplanation::Unexplained { .. }))
    );
}

#[tokio::test]
async fn reconcile_without_account_is_an_error_not_a_report() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor = ledger.create_vendor("No Account Yet").await.unwrap();
    let vendor_id = vendor.id.to_string();

    let err = ledger.reconcile(&vendor_id).await.unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(vendor_id));
}

#[tokio::test]
async fn valuation_reflects_a_single_snapshot_of_stock() {
    let (ledger, _db) = ledger_with_db().await;
    let vendor_id = onboarded_vendor(&ledger, 7_500_00).await;

    let owned = ledger
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
        .record_purchase(PurchaseCmd::new(
            vendor_id.clone(),
            "Blender",
            SourceType::Consignment,
            150_00,
            5,
        ))
        .await
        .unwrap();

    let valuation = ledger.valuation(&vendor_id).await.unwrap();
    assert_eq!(valuation.owned_stock_value_minor, 10 * 100_00);
    assert_eq!(valuation.consignment_stock_value_minor, 5 * 150_00);
    assert_eq!(valuation.consignment_sold_unsettled_value_minor, 0);

    // Archived stock drops out of the on-shelf numbers.
    ledger
        .archive_product(ArchiveProductCmd::new(vendor_id.clone(), owned.product_id))
        .await
        .unwrap();
    let valuation = ledger.valuation(&vendor_id).await.unwrap();
    assert_eq!(valuation.owned_stock_value_minor, 0);
}
