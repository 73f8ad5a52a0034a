//! Repository behaviour on a seeded SQLite store.

mod common;

use chrono::Utc;
use ssms_core::{
    BusinessRules, CoreError, Money, MovementType, NewAuditEntry, NewCustomer, NewProduct,
    NewPurchase, NewSale, NewSupplier, NewUser, PaymentMethod, PaymentStatus, ReferenceType, Role,
    SecurityPolicy, SettingType, TaxRate,
};
use ssms_db::repository::StockAdjustment;
use ssms_db::{DbError, FailureKind};
use tempfile::TempDir;

#[tokio::test]
async fn sale_takes_stock_and_logs_movement() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let rules = BusinessRules::default();

    let tshirt = store.products().get_by_sku("TSH001").await.unwrap().unwrap();
    let john = store.customers().search("john").await.unwrap().remove(0);

    let mut order = NewSale::new(tshirt.id, 2)
        .customer(john.id)
        .payment_method(PaymentMethod::Upi);
    order.discount = Money::from_cents(10_000);
    order.tax_rate = Some(TaxRate::from_bps(1800));

    let sale = store.sales().record(&order, &rules).await.unwrap();
    assert_eq!(sale.invoice_number, "INV-000004");
    assert_eq!(sale.customer_name.as_deref(), Some("John Doe"));
    assert_eq!(sale.unit_price.cents(), 50_000);
    assert_eq!(sale.discount_amount.cents(), 10_000);
    assert_eq!(sale.tax_amount.cents(), 16_200);
    assert_eq!(sale.total_amount.cents(), 106_200);

    let after = store.products().get(tshirt.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, 48);

    let movements = store.products().movements(tshirt.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Out);
    assert_eq!(movements[0].quantity, 2);
    assert_eq!(movements[0].reference_type, ReferenceType::Sale);
    assert_eq!(movements[0].reference_id, Some(sale.id));
}

#[tokio::test]
async fn sale_stands_when_its_movement_cannot_be_logged() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;

    store
        .query("DROP TABLE stock_movements", ())
        .await
        .into_affected()
        .unwrap();

    let coffee = store.products().get_by_sku("COF001").await.unwrap().unwrap();
    let sale = store
        .sales()
        .record(&NewSale::new(coffee.id, 3), &BusinessRules::default())
        .await
        .unwrap();
    assert_eq!(sale.invoice_number, "INV-000004");
    assert_eq!(sale.quantity, 3);

    let stored = store.sales().get_by_invoice("INV-000004").await.unwrap();
    assert_eq!(stored.map(|s| s.id), Some(sale.id));
    let after = store.products().get(coffee.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, coffee.stock_quantity - 3);
}

#[tokio::test]
async fn oversell_is_rejected_and_stock_kept() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;

    let garden = store.products().get_by_sku("GAR001").await.unwrap().unwrap();
    let err = store
        .sales()
        .record(&NewSale::new(garden.id, 9), &BusinessRules::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DbError::Core(CoreError::InsufficientStock {
            sku: "GAR001".to_string(),
            available: 8,
            requested: 9,
        })
    );

    let after = store.products().get(garden.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, 8);
    assert_eq!(store.sales().recent(10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn sale_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let rules = BusinessRules::default();

    let err = store.sales().record(&NewSale::new(1, 0), &rules).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Statement);
    assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

    let err = store.sales().record(&NewSale::new(999, 1), &rules).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));

    let err = store
        .sales()
        .record(&NewSale::new(1, 1).customer(999), &rules)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn manual_adjustment_and_scanner_lookup() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let products = store.products();

    let product = products
        .insert(&NewProduct {
            name: "Cricket Bat".to_string(),
            sku: "SPT001".to_string(),
            category: Some("Sports".to_string()),
            description: None,
            purchase_price: Money::from_cents(120_000),
            selling_price: Money::from_cents(180_000),
            stock_quantity: 4,
            min_stock_level: 1,
            unit: "Pieces".to_string(),
            supplier: None,
            barcode: Some("8901234567890".to_string()),
        })
        .await
        .unwrap();

    let scanned = products.find_by_code("8901234567890").await.unwrap().unwrap();
    assert_eq!(scanned.id, product.id);
    let by_sku = products.find_by_code(" SPT001 ").await.unwrap().unwrap();
    assert_eq!(by_sku.id, product.id);
    assert!(products.find_by_code("0000").await.unwrap().is_none());

    let adjusted = products
        .adjust_stock(&StockAdjustment::manual(product.id, -3).notes("damaged"))
        .await
        .unwrap();
    assert_eq!(adjusted.stock_quantity, 1);

    let err = products
        .adjust_stock(&StockAdjustment::manual(product.id, -2))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));

    let movements = products.movements(product.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Adjustment);
    assert_eq!(movements[0].quantity, -3);

    assert_eq!(products.count().await.unwrap(), 6);
    assert_eq!(products.count_in_stock().await.unwrap(), 6);

    let duplicate = products
        .insert(&NewProduct {
            name: "Another Bat".to_string(),
            ..adjusted_to_new(&product)
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), FailureKind::Integrity);
}

fn adjusted_to_new(product: &ssms_core::Product) -> NewProduct {
    NewProduct {
        name: product.name.clone(),
        sku: product.sku.clone(),
        category: product.category.clone(),
        description: product.description.clone(),
        purchase_price: product.purchase_price,
        selling_price: product.selling_price,
        stock_quantity: 0,
        min_stock_level: 0,
        unit: product.unit.clone(),
        supplier: None,
        barcode: None,
    }
}

#[tokio::test]
async fn low_stock_lists_emptiest_first() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;

    let low = store.products().low_stock(10).await.unwrap();
    let skus: Vec<&str> = low.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, ["GAR001", "LAP001"]);
}

#[tokio::test]
async fn purchase_adds_stock() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let rules = BusinessRules::default();

    let coffee = store.products().get_by_sku("COF001").await.unwrap().unwrap();
    let purchases = store.purchases();

    let purchase = purchases
        .insert(
            &NewPurchase {
                supplier_name: "Food Supplier".to_string(),
                product_id: Some(coffee.id),
                product_name: None,
                quantity: 20,
                unit_price: Money::from_cents(29_000),
                purchase_date: Utc::now().date_naive(),
                payment_method: PaymentMethod::BankTransfer,
                payment_status: PaymentStatus::Pending,
                notes: None,
            },
            &rules,
        )
        .await
        .unwrap();
    assert_eq!(purchase.purchase_number, "PUR-000001");
    assert_eq!(purchase.product_name.as_deref(), Some("Coffee"));
    assert_eq!(purchase.total_amount.cents(), 580_000);

    let after = store.products().get(coffee.id).await.unwrap().unwrap();
    assert_eq!(after.stock_quantity, 45);
    let movements = store.products().movements(coffee.id).await.unwrap();
    assert_eq!(movements[0].movement_type, MovementType::In);
    assert_eq!(movements[0].reference_type, ReferenceType::Purchase);

    assert_eq!(purchases.pending_count().await.unwrap(), 1);
    purchases.update_status(purchase.id, PaymentStatus::Paid).await.unwrap();
    assert_eq!(purchases.pending_count().await.unwrap(), 0);

    assert_eq!(
        purchases.next_purchase_number(&rules).await.unwrap(),
        "PUR-000002"
    );

    purchases.delete(purchase.id).await.unwrap();
    assert!(purchases.list().await.unwrap().is_empty());
    assert!(matches!(
        purchases.delete(purchase.id).await.unwrap_err(),
        DbError::NotFound { .. }
    ));
}

#[tokio::test]
async fn contacts() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;

    let found = store.customers().search("jane").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].city.as_deref(), Some("Bangalore"));

    let added = store
        .customers()
        .insert(&NewCustomer {
            name: "Ravi Traders".to_string(),
            email: Some("ravi@traders.in".to_string()),
            customer_type: ssms_core::CustomerType::Wholesale,
            credit_limit: Money::from_cents(2_000_000),
            ..NewCustomer::default()
        })
        .await
        .unwrap();
    assert_eq!(added.customer_type, ssms_core::CustomerType::Wholesale);
    assert_eq!(store.customers().count().await.unwrap(), 4);

    let bad = store
        .customers()
        .insert(&NewCustomer {
            name: "Broken".to_string(),
            email: Some("not-an-email".to_string()),
            ..NewCustomer::default()
        })
        .await;
    assert!(matches!(bad, Err(DbError::Core(CoreError::Validation(_)))));

    let supplier = store
        .suppliers()
        .insert(&NewSupplier {
            name: "Sports Supplier".to_string(),
            payment_terms: Some("Net 30".to_string()),
            ..NewSupplier::default()
        })
        .await
        .unwrap();
    assert_eq!(supplier.payment_terms.as_deref(), Some("Net 30"));
    assert_eq!(store.suppliers().list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn settings_upsert() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let settings = store.settings();

    let timeout = settings.get("session_timeout").await.unwrap().unwrap();
    assert_eq!(timeout.setting_type, SettingType::Number);
    assert_eq!(timeout.as_i64(), Some(30));

    settings.set("session_timeout", "45", SettingType::Number).await.unwrap();
    settings.set("theme", "Light", SettingType::String).await.unwrap();

    let timeout = settings.get("session_timeout").await.unwrap().unwrap();
    assert_eq!(timeout.as_i64(), Some(45));
    assert_eq!(timeout.description.as_deref(), Some("Session timeout in minutes"));
    assert_eq!(settings.all().await.unwrap().len(), 7);
}

#[tokio::test]
async fn users_and_audit_trail() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let policy = SecurityPolicy::default();

    let cashier = store
        .users()
        .create(
            &NewUser {
                username: "cashier1".to_string(),
                password: "till-pass".to_string(),
                email: "cashier@ssms.com".to_string(),
                role: Role::Employee,
                first_name: Some("Asha".to_string()),
                last_name: None,
            },
            &policy,
        )
        .await
        .unwrap();
    assert_ne!(cashier.password_hash, "till-pass");

    let users = store.users();
    assert!(users.authenticate("cashier1", "till-pass").await.unwrap().is_some());
    assert!(users.authenticate("cashier1", "wrong").await.unwrap().is_none());
    assert!(users.authenticate("nobody", "till-pass").await.unwrap().is_none());

    let short = users
        .create(
            &NewUser {
                username: "cashier2".to_string(),
                password: "abc".to_string(),
                email: "c2@ssms.com".to_string(),
                role: Role::Employee,
                first_name: None,
                last_name: None,
            },
            &policy,
        )
        .await;
    assert!(matches!(short, Err(DbError::Core(CoreError::Validation(_)))));

    store
        .audit()
        .record(
            &NewAuditEntry::new("CREATE")
                .on("users", cashier.id)
                .by(cashier.id),
        )
        .await
        .unwrap();
    store
        .audit()
        .record(&NewAuditEntry {
            new_values: Some(serde_json::json!({ "role": "Employee" })),
            ..NewAuditEntry::new("LOGIN")
        })
        .await
        .unwrap();

    let trail = store.audit().recent(10).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, "LOGIN");
    assert_eq!(trail[0].new_values.as_deref(), Some(r#"{"role":"Employee"}"#));
    assert_eq!(trail[1].table_name.as_deref(), Some("users"));
    assert_eq!(trail[1].record_id, Some(cashier.id));
}

#[tokio::test]
async fn reports_over_seeded_sales() {
    let dir = TempDir::new().unwrap();
    let store = common::seeded_store(&dir).await;
    let reports = store.reports();
    let today = Utc::now().date_naive();

    let dashboard = reports.dashboard(10, today).await.unwrap();
    assert_eq!(dashboard.total_products, 5);
    assert_eq!(dashboard.low_stock_products, 2);
    assert_eq!(dashboard.total_customers, 3);
    assert_eq!(dashboard.today_transactions, 3);
    assert_eq!(dashboard.today_sales.cents(), 7_090_000);
    assert_eq!(dashboard.pending_purchases, 0);
    assert_eq!(dashboard.inventory_value.cents(), 53_550_000);

    let summary = reports.sales_summary(today, today).await.unwrap();
    assert_eq!(summary.transactions, 3);
    assert_eq!(summary.units, 13);
    assert_eq!(summary.revenue.cents(), 7_090_000);

    let top = reports.top_products(today, today, 2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].product_name.as_deref(), Some("Laptop"));
    assert_eq!(top[1].product_name.as_deref(), Some("T-Shirt"));

    let profit = reports.profit(today, today).await.unwrap();
    assert_eq!(profit.cost.cents(), 5_260_000);
    assert_eq!(profit.gross_profit().cents(), 1_830_000);

    let yesterday = today.pred_opt().unwrap();
    let empty = reports.sales_summary(yesterday, yesterday).await.unwrap();
    assert_eq!(empty.transactions, 0);
    assert_eq!(empty.revenue, Money::zero());

    assert!(reports.sales_summary(today, yesterday).await.is_err());
}
