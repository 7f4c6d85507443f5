// NetworkOrderService against a local HTTP server speaking the order API

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use shared::ErrorCode;
use shared::models::{
    ConfigureTables, MenuItem, Order, OrderCreate, OrderCreated, OrderItem, OrderStatus,
    OrderUpdateStatus, ReadyOrder, TableInfo, TableLookup, TableNumber, TablesResponse,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tableside_client::admin::MSG_TABLE_COUNT;
use tableside_client::session::{MSG_NETWORK_ERROR, MSG_PIN_NOT_FOUND};
use tableside_client::{
    AdminGate, ClientConfig, ClientError, ErrorKind, NetworkOrderService, NotificationCenter, OrderQuery,
    OrderService, TableAdmin, TableAdminService, TableService, TableSessionManager,
};

type Db = Arc<Mutex<Vec<Order>>>;

#[derive(Deserialize)]
struct ListParams {
    status: Option<OrderStatus>,
    table: Option<String>,
}

async fn table_by_token(Path(token): Path<String>) -> Result<Json<TableLookup>, StatusCode> {
    match token.as_str() {
        "tok 4" => Ok(Json(TableLookup {
            table_number: TableNumber::from("4"),
        })),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn table_by_pin(Path(pin): Path<String>) -> Result<Json<TableLookup>, StatusCode> {
    match pin.as_str() {
        "1234" => Ok(Json(TableLookup {
            table_number: TableNumber::from("4"),
        })),
        "5000" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        "0000" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(StatusCode::GATEWAY_TIMEOUT)
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn list_orders(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Order>> {
    let orders = db.lock().unwrap();
    Json(
        orders
            .iter()
            .filter(|o| params.status.is_none_or(|s| o.status == s))
            .filter(|o| params.table.as_deref().is_none_or(|t| o.table_number.as_str() == t))
            .cloned()
            .collect(),
    )
}

async fn create_order(
    State(db): State<Db>,
    Json(body): Json<OrderCreate>,
) -> Result<Json<OrderCreated>, StatusCode> {
    body.validate().map_err(|_| StatusCode::BAD_REQUEST)?;
    let order_id = uuid::Uuid::new_v4().to_string();
    db.lock().unwrap().push(body.into_order(order_id.clone()));
    Ok(Json(OrderCreated { order_id }))
}

async fn update_order(
    State(db): State<Db>,
    Path(order_id): Path<String>,
    Json(body): Json<OrderUpdateStatus>,
) -> Result<Json<Order>, StatusCode> {
    let mut orders = db.lock().unwrap();
    let order = orders
        .iter_mut()
        .find(|o| o.order_id == order_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if !order.status.can_advance_to(body.status) {
        return Err(StatusCode::CONFLICT);
    }
    order.status = body.status;
    Ok(Json(order.clone()))
}

async fn ready_orders(State(db): State<Db>) -> Json<Vec<ReadyOrder>> {
    let orders = db.lock().unwrap();
    Json(
        orders
            .iter()
            .filter(|o| o.status == OrderStatus::Ready)
            .map(|o| ReadyOrder {
                table_number: o.table_number.clone(),
                order_id: o.order_id.clone(),
            })
            .collect(),
    )
}

async fn configure_tables(Json(body): Json<ConfigureTables>) -> Json<TablesResponse> {
    Json(TablesResponse {
        tables: (1..=body.total_tables)
            .map(|n| TableInfo {
                table_number: TableNumber::new(n.to_string()),
                token: Some(format!("tok-{n}")),
                pin: Some(format!("{:04}", n)),
                qr_url: None,
            })
            .collect(),
    })
}

async fn qr_png(Path(table): Path<String>) -> Result<Vec<u8>, StatusCode> {
    if table == "4" {
        Ok(b"\x89PNG-table-4".to_vec())
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn spawn_server() -> (String, Db) {
    let db: Db = Arc::default();
    let api = Router::new()
        .route("/table/{token}", get(table_by_token))
        .route("/table/pin/{pin}", get(table_by_pin))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/ready", get(ready_orders))
        .route("/orders/{order_id}", patch(update_order))
        .route("/admin/tables/configure", post(configure_tables))
        .route("/admin/qr-codes/{table}", get(qr_png))
        .with_state(db.clone());
    let app = Router::new().nest("/api/qr-menu", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), db)
}

fn snapshot_order(table: &str) -> OrderCreate {
    let item = MenuItem::new(7i64, "Masala Dosa", 1499).with_category("Breakfast");
    OrderCreate::from_snapshot(
        TableNumber::from(table),
        vec![OrderItem::from_menu_item(&item, 2)],
        2998,
        "2026-10-14T12:00:00.000Z".into(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_table_lookup_paths() {
    let (base, _) = spawn_server().await;
    let service = NetworkOrderService::new(&ClientConfig::new(base)).unwrap();

    let lookup = service.validate_token("tok 4").await.unwrap();
    assert_eq!(lookup.table_number.as_str(), "4");
    assert!(matches!(
        service.validate_token("nope").await,
        Err(ClientError::NotFound { .. })
    ));

    assert_eq!(service.validate_pin("1234").await.unwrap().table_number.as_str(), "4");
    let err = service.validate_pin("5000").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_order_round_trip() {
    let (base, db) = spawn_server().await;
    let service = NetworkOrderService::new(&ClientConfig::new(base)).unwrap();

    let created = service.create_order(&snapshot_order("4")).await.unwrap();
    service.create_order(&snapshot_order("7")).await.unwrap();
    assert_eq!(db.lock().unwrap().len(), 2);

    let query = OrderQuery::for_table(TableNumber::from("4"));
    let orders = service.fetch_orders(&query).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, created.order_id);
    assert_eq!(orders[0].total, 2998);
    assert_eq!(orders[0].status, OrderStatus::Pending);

    let updated = service
        .update_status(&created.order_id, OrderStatus::Ready)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Ready);

    let ready = service.ready_orders().await.unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].order_id, created.order_id);

    let pending = service
        .fetch_orders(&OrderQuery::all().with_status(Some(OrderStatus::Pending)))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].table_number.as_str(), "7");

    let err = service
        .update_status(&created.order_id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 409, .. }));
}

#[tokio::test]
async fn test_admin_passthrough() {
    let (base, _) = spawn_server().await;
    let service = NetworkOrderService::new(&ClientConfig::new(base)).unwrap();

    let tables = service
        .configure_tables(&ConfigureTables { total_tables: 3 })
        .await
        .unwrap();
    assert_eq!(tables.tables.len(), 3);
    assert_eq!(tables.tables[2].pin.as_deref(), Some("0003"));

    let png = service.download_qr_code(&TableNumber::from("4")).await.unwrap();
    assert!(png.starts_with(b"\x89PNG"));
    assert!(matches!(
        service.download_qr_code(&TableNumber::from("99")).await,
        Err(ClientError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_pin_timeout_reports_network_error() {
    let (base, _) = spawn_server().await;
    let config = ClientConfig::new(base).with_timeout(1);
    let service = Arc::new(NetworkOrderService::new(&config).unwrap());
    let notices = NotificationCenter::default();
    let mut session = TableSessionManager::new(service, notices.clone());

    let err = session.present_pin("0000").await.unwrap_err();
    assert!(matches!(&err, ClientError::Http(e) if e.is_timeout()));
    assert_eq!(session.error_message(), Some(MSG_NETWORK_ERROR));

    session.present_pin("9999").await.unwrap_err();
    assert_eq!(session.error_message(), Some(MSG_PIN_NOT_FOUND));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = NetworkOrderService::new(&ClientConfig::new(format!("http://{}", addr))).unwrap();
    let err = service.fetch_orders(&OrderQuery::all()).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_table_admin_checks_count_before_calling() {
    let (base, _) = spawn_server().await;
    let config = ClientConfig::new(base).with_admin_secret("kitchen-42");
    let admin = TableAdmin::new(Arc::new(config.build_order_service().unwrap()));
    let gate = AdminGate::from_config(&config);

    let err = gate.unlock("wrong").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    let dashboard = gate.unlock("kitchen-42").unwrap();

    let err = admin.configure_tables(&dashboard, 101).await.unwrap_err();
    assert!(
        matches!(&err, ClientError::Validation { message, .. } if message == MSG_TABLE_COUNT)
    );
    assert_eq!(err.code(), ErrorCode::ValueOutOfRange);
    let tables = admin.configure_tables(&dashboard, 2).await.unwrap();
    assert_eq!(tables.tables.len(), 2);
}
