mod common;

use common::TestApp;
use mercantile_core::{
    entities::delivery,
    errors::ServiceError,
    services::catalog::{RegisterProductInput, RegisterSupplierInput, UpdateProductInput},
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

fn product_input(sku: &str) -> RegisterProductInput {
    RegisterProductInput {
        sku: sku.to_owned(),
        name: format!("Product {sku}"),
        description: "shelf stock".to_owned(),
        price: "10.25".to_owned(),
        ean: String::new(),
    }
}

#[tokio::test]
async fn register_product_normalizes_fields() {
    let app = TestApp::new().await;

    let product = app
        .state
        .catalog_service()
        .register_product(RegisterProductInput {
            sku: "A1".into(),
            name: "Hammer".into(),
            description: String::new(),
            price: "12,50".into(),
            ean: "0".into(),
        })
        .await
        .expect("registration should succeed");

    assert_eq!(product.sku, "A1");
    assert_eq!(product.price, dec!(12.50));
    assert_eq!(product.description, None);
    assert_eq!(product.ean, None, "zero EAN means absent");
}

#[tokio::test]
async fn duplicate_sku_conflicts_and_leaves_one_row() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();

    catalog.register_product(product_input("A1")).await.unwrap();
    let second = catalog.register_product(product_input("A1")).await;

    assert!(
        matches!(second, Err(ServiceError::Conflict { entity: "product", .. })),
        "second registration must conflict, got {second:?}"
    );

    let products = catalog.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
}

#[tokio::test]
async fn duplicate_ean_conflicts() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();

    let mut first = product_input("A1");
    first.ean = "5601234567890".into();
    catalog.register_product(first).await.unwrap();

    let mut second = product_input("A2");
    second.ean = "5601234567890".into();
    let result = catalog.register_product(second).await;

    assert!(matches!(
        result,
        Err(ServiceError::Conflict { entity: "product", .. })
    ));
}

#[tokio::test]
async fn register_product_rejects_bad_price() {
    let app = TestApp::new().await;

    let mut input = product_input("A1");
    input.price = "12x50".into();
    let result = app.state.catalog_service().register_product(input).await;

    assert!(matches!(
        result,
        Err(ServiceError::Validation { field: "price", .. })
    ));
}

#[tokio::test]
async fn update_product_changes_only_supplied_fields() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();
    app.seed_product("A1", "10.25").await;

    let updated = catalog
        .update_product(
            "A1",
            UpdateProductInput {
                price: "11.75".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, dec!(11.75));
    assert_eq!(updated.name, "Product A1");

    let updated = catalog
        .update_product(
            "A1",
            UpdateProductInput {
                price: String::new(),
                description: "back in stock".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("back in stock"));
    assert_eq!(updated.price, dec!(11.75), "price keeps its last value");
}

#[tokio::test]
async fn update_product_requires_some_change() {
    let app = TestApp::new().await;
    app.seed_product("A1", "10.25").await;

    let result = app
        .state
        .catalog_service()
        .update_product("A1", UpdateProductInput::default())
        .await;

    assert!(matches!(result, Err(ServiceError::Validation { .. })));
}

#[tokio::test]
async fn update_missing_product_is_not_found() {
    let app = TestApp::new().await;

    let result = app
        .state
        .catalog_service()
        .update_product(
            "GHOST",
            UpdateProductInput {
                price: "1.00".into(),
                description: String::new(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::NotFound { entity: "product", .. })
    ));
}

#[tokio::test]
async fn delete_product_cascades_to_suppliers_and_order_lines() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();

    app.seed_product("A1", "10.25").await;
    catalog
        .register_supplier(RegisterSupplierInput {
            tin: "PT501234567".into(),
            name: "Ferragens Lda".into(),
            address: String::new(),
            sku: "A1".into(),
            date: "2024-01-10".into(),
        })
        .await
        .unwrap();

    let customer = app.seed_customer("Ada Lovelace", "ada@example.pt").await;
    let order = app.seed_order(customer.cust_no, "A1", "2").await;

    catalog.delete_product("A1").await.unwrap();

    let supplier = catalog.supplier_info("PT501234567").await.unwrap();
    assert_eq!(supplier.sku, None, "supplier reference must be cleared");

    let info = app.state.order_service().order_info(order.order_no).await.unwrap();
    assert!(info.lines.is_empty(), "order lines naming the product must go");

    assert!(matches!(
        catalog.get_product("A1").await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn delete_missing_product_is_a_noop() {
    let app = TestApp::new().await;

    app.state
        .catalog_service()
        .delete_product("GHOST")
        .await
        .expect("deleting an absent product is not an error");
}

#[tokio::test]
async fn register_supplier_checks_tin_and_product() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();
    app.seed_product("A1", "10.25").await;

    let input = RegisterSupplierInput {
        tin: "PT501234567".into(),
        name: String::new(),
        address: String::new(),
        sku: "A1".into(),
        date: String::new(),
    };

    catalog.register_supplier(input.clone()).await.unwrap();

    let duplicate = catalog.register_supplier(input).await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::Conflict { entity: "supplier", .. })
    ));

    let unknown_product = catalog
        .register_supplier(RegisterSupplierInput {
            tin: "PT509999999".into(),
            name: String::new(),
            address: String::new(),
            sku: "GHOST".into(),
            date: String::new(),
        })
        .await;
    assert!(matches!(
        unknown_product,
        Err(ServiceError::NotFound { entity: "product", .. })
    ));
}

#[tokio::test]
async fn delete_supplier_removes_its_deliveries() {
    let app = TestApp::new().await;
    let catalog = app.state.catalog_service();

    app.seed_product("A1", "10.25").await;
    catalog
        .register_supplier(RegisterSupplierInput {
            tin: "PT501234567".into(),
            name: String::new(),
            address: String::new(),
            sku: "A1".into(),
            date: String::new(),
        })
        .await
        .unwrap();

    // Delivery rows come from outside the core; plant one directly.
    delivery::ActiveModel {
        address: Set("Armazem 3, Lisboa".into()),
        tin: Set("PT501234567".into()),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();

    catalog.delete_supplier("PT501234567").await.unwrap();

    let deliveries = delivery::Entity::find().all(&*app.state.db).await.unwrap();
    assert!(deliveries.is_empty());
    assert!(matches!(
        catalog.supplier_info("PT501234567").await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_products_orders_by_sku() {
    let app = TestApp::new().await;

    app.seed_product("B2", "2.50").await;
    app.seed_product("A1", "1.25").await;

    let products = app.state.catalog_service().list_products().await.unwrap();
    let skus: Vec<&str> = products.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, ["A1", "B2"]);
}
