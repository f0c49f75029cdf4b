mod common;

use common::TestApp;
use mercantile_core::{
    entities::{order, order_line, payment},
    errors::ServiceError,
    services::customers::RegisterCustomerInput,
    services::orders::PayOrderInput,
};
use sea_orm::EntityTrait;

#[tokio::test]
async fn customer_numbers_start_at_one_and_increase() {
    let app = TestApp::new().await;

    let first = app.seed_customer("Ada Lovelace", "ada@example.pt").await;
    let second = app.seed_customer("Alan Turing", "alan@example.pt").await;

    assert_eq!(first.cust_no, 1);
    assert_eq!(second.cust_no, 2);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_leaves_one_row() {
    let app = TestApp::new().await;
    let customers = app.state.customer_service();

    app.seed_customer("Ada Lovelace", "ada@example.pt").await;

    let duplicate = customers
        .register_customer(RegisterCustomerInput {
            name: "Augusta Ada".into(),
            email: "ada@example.pt".into(),
            phone: String::new(),
            address: String::new(),
        })
        .await;

    assert!(matches!(
        duplicate,
        Err(ServiceError::Conflict { entity: "customer", .. })
    ));
    assert_eq!(customers.list_customers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn name_must_be_alphabetic() {
    let app = TestApp::new().await;

    let result = app
        .state
        .customer_service()
        .register_customer(RegisterCustomerInput {
            name: "R2D2".into(),
            email: "droid@example.pt".into(),
            phone: String::new(),
            address: String::new(),
        })
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Validation { field: "name", .. })
    ));
}

#[tokio::test]
async fn optional_contact_fields_normalize_to_null() {
    let app = TestApp::new().await;

    let customer = app.seed_customer("Ada Lovelace", "ada@example.pt").await;
    assert_eq!(customer.phone, None);
    assert_eq!(customer.address, None);
}

#[tokio::test]
async fn delete_customer_cascades_through_orders_lines_and_payments() {
    let app = TestApp::new().await;
    let db = &*app.state.db;

    app.seed_product("A1", "10.25").await;
    app.seed_product("B2", "3.75").await;
    let customer = app.seed_customer("Ada Lovelace", "ada@example.pt").await;
    let bystander = app.seed_customer("Alan Turing", "alan@example.pt").await;

    let first = app.seed_order(customer.cust_no, "A1", "2").await;
    app.seed_order(customer.cust_no, "B2", "1").await;
    let kept = app.seed_order(bystander.cust_no, "A1", "4").await;

    // Pay one of the doomed orders so the payment cascade is exercised.
    app.state
        .order_service()
        .pay_order(
            first.order_no,
            PayOrderInput {
                payment_method: "Visa".into(),
                cust_no: customer.cust_no.to_string(),
            },
        )
        .await
        .unwrap();

    app.state
        .customer_service()
        .delete_customer(customer.cust_no)
        .await
        .unwrap();

    let orders = order::Entity::find().all(db).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_no, kept.order_no);

    let lines = order_line::Entity::find().all(db).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].order_no, kept.order_no);

    let payments = payment::Entity::find().all(db).await.unwrap();
    assert!(payments.is_empty());

    assert!(matches!(
        app.state
            .customer_service()
            .customer_info(customer.cust_no)
            .await,
        Err(ServiceError::NotFound { entity: "customer", .. })
    ));
}

#[tokio::test]
async fn delete_missing_customer_is_a_noop() {
    let app = TestApp::new().await;

    app.state
        .customer_service()
        .delete_customer(404)
        .await
        .expect("deleting an absent customer is not an error");
}

#[tokio::test]
async fn customer_info_returns_the_row() {
    let app = TestApp::new().await;

    let created = app.seed_customer("Ada Lovelace", "ada@example.pt").await;
    let fetched = app
        .state
        .customer_service()
        .customer_info(created.cust_no)
        .await
        .unwrap();

    assert_eq!(fetched, created);
}
