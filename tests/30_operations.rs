mod common;

use anyhow::Result;
use common::{assert_envelope, decimal, TestServer, PASSWORD};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn sales_order_is_priced_from_the_catalogue() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, customer) = server
        .post(
            "/api/v1/sales/customers",
            json!({ "name": "华东贸易", "phone": "13800138000" }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", customer);

    let (status, product) = server
        .post(
            "/api/v1/inventory/products",
            json!({ "sku": "SKU-1", "name": "螺丝", "unit": "个", "unit_price": "9.90" }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", product);

    let (status, body) = server
        .post(
            "/api/v1/sales/orders",
            json!({
                "customer_id": customer["data"]["id"],
                "order_date": "2024-05-01",
                "items": [ { "product_id": product["data"]["id"], "quantity": "2" } ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "订单创建成功");
    assert_eq!(decimal(&body["data"]["total_amount"]), Decimal::new(1980, 2));
    assert_eq!(decimal(&body["data"]["items"][0]["unit_price"]), Decimal::new(990, 2));

    let customer_id = customer["data"]["id"].as_u64().expect("customer id");
    let (_, body) = server
        .get(&format!("/api/v1/sales/orders?customer_id={}", customer_id), Some(&token))
        .await?;
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn order_for_unknown_customer_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/sales/orders",
            json!({
                "customer_id": 77,
                "order_date": "2024-05-01",
                "items": [ { "product_id": 1, "quantity": "1" } ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "客户不存在");
    Ok(())
}

#[tokio::test]
async fn order_without_items_fails_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post("/api/v1/sales/orders", json!({ "customer_id": 1, "order_date": "2024-05-01" }), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field_errors"]["items"], "订单至少需要一条明细");
    Ok(())
}

#[tokio::test]
async fn order_item_violations_are_indexed() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/sales/orders",
            json!({
                "customer_id": 1,
                "order_date": "2024-05-01",
                "items": [ { "quantity": "0" } ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_envelope(&body);
    let field_errors = &body["details"]["field_errors"];
    assert_eq!(field_errors["items[0].product_id"], "该字段为必填项");
    assert_eq!(field_errors["items[0].quantity"], "数值必须大于0");
    assert!(field_errors.get("items").is_none());
    Ok(())
}

#[tokio::test]
async fn supplier_crud() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post("/api/v1/purchase/suppliers", json!({ "name": "钢材供应商" }), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_u64().expect("supplier id");

    let (status, body) = server
        .put(
            &format!("/api/v1/purchase/suppliers/{}", id),
            json!({ "contact_person": "李四" }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["contact_person"], "李四");
    assert_eq!(body["data"]["name"], "钢材供应商");

    let (status, _) = server.delete(&format!("/api/v1/purchase/suppliers/{}", id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/api/v1/purchase/suppliers/{}", id), Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "供应商不存在");
    Ok(())
}

#[tokio::test]
async fn work_order_dates_must_be_ordered() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/production/work-orders",
            json!({
                "product_id": 1,
                "quantity": "10",
                "planned_start": "2024-06-10",
                "planned_end": "2024-06-01"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field_errors"]["planned_end"], "结束日期不能早于开始日期");
    Ok(())
}

#[tokio::test]
async fn employee_id_card_is_masked_and_people_lists_page_by_twenty() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/hr/employees",
            json!({
                "employee_no": "E001",
                "name": "张三",
                "id_card": "11010519491231002X",
                "phone": "13800138000",
                "hire_date": "2023-09-01"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["id_card"], "110105********002X");

    let (_, body) = server.get("/api/v1/hr/employees", Some(&token)).await?;
    assert_eq!(body["meta"]["page_size"], 20);
    assert_eq!(body["meta"]["total"], 1);

    let (status, body) = server
        .post(
            "/api/v1/hr/employees",
            json!({
                "employee_no": "E001",
                "name": "李四",
                "id_card": "11010519491231002X",
                "phone": "13800138001",
                "hire_date": "2023-09-01"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "员工编号已存在");
    Ok(())
}

#[tokio::test]
async fn department_and_project_lists() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, _) = server.post("/api/v1/hr/departments", json!({ "name": "财务部" }), Some(&token)).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server
        .post(
            "/api/v1/project/projects",
            json!({ "code": "PRJ-1", "name": "ERP 上线", "start_date": "2024-01-01", "manager_id": 3 }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (_, body) = server.get("/api/v1/project/projects?manager_id=3", Some(&token)).await?;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["page_size"], 20);

    let (_, body) = server.get("/api/v1/project/projects?manager_id=4", Some(&token)).await?;
    assert_eq!(body["meta"]["total"], 0);

    let (status, _) = server.get("/api/v1/project/projects?status=someday", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deleting_a_department_detaches_its_employees() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (_, department) = server.post("/api/v1/hr/departments", json!({ "name": "财务部" }), Some(&token)).await?;
    let department_id = department["data"]["id"].as_u64().expect("department id");

    let (status, employee) = server
        .post(
            "/api/v1/hr/employees",
            json!({
                "employee_no": "E001",
                "name": "张三",
                "id_card": "11010519491231002X",
                "phone": "13800138000",
                "department_id": department_id,
                "hire_date": "2023-09-01"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", employee);
    let employee_id = employee["data"]["id"].as_u64().expect("employee id");

    let path = format!("/api/v1/hr/employees?department_id={}", department_id);
    let (_, body) = server.get(&path, Some(&token)).await?;
    assert_eq!(body["meta"]["total"], 1);

    let (status, body) = server
        .delete(&format!("/api/v1/hr/departments/{}", department_id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = server.get(&path, Some(&token)).await?;
    assert_eq!(body["meta"]["total"], 0);
    let (_, body) = server.get(&format!("/api/v1/hr/employees/{}", employee_id), Some(&token)).await?;
    assert!(body["data"]["department_id"].is_null());
    Ok(())
}

#[tokio::test]
async fn administrators_can_disable_other_users() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.login_as("admin").await?;
    server.login_as("bob").await?;

    let (_, body) = server.get("/api/v1/system/users", Some(&admin)).await?;
    assert_eq!(body["meta"]["total"], 2);
    let bob_id = body["data"]
        .as_array()
        .and_then(|users| users.iter().find(|u| u["username"] == "bob"))
        .and_then(|u| u["id"].as_u64())
        .expect("bob listed");

    let (status, body) = server
        .patch(&format!("/api/v1/system/users/{}/status", bob_id), json!({ "status": "inactive" }), Some(&admin))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");

    let (status, body) = server
        .post("/api/v1/auth/login", json!({ "username": "bob", "password": PASSWORD }), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "账号已被禁用");

    let (_, me) = server.get("/api/v1/auth/me", Some(&admin)).await?;
    let admin_id = me["data"]["id"].as_u64().expect("admin id");
    let (status, body) = server
        .patch(&format!("/api/v1/system/users/{}/status", admin_id), json!({ "status": "inactive" }), Some(&admin))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_envelope(&body);
    Ok(())
}
