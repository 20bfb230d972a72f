mod common;

use anyhow::Result;
use common::{assert_envelope, decimal, TestServer};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

async fn create_account(server: &TestServer, token: &str, code: &str, name: &str, account_type: &str) -> Result<Value> {
    let (status, body) = server
        .post(
            "/api/v1/accounting/accounts",
            json!({ "code": code, "name": name, "account_type": account_type }),
            Some(token),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create account failed: {} {}", status, body);
    Ok(body["data"].clone())
}

#[tokio::test]
async fn list_clamps_paging_and_reports_meta() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    create_account(&server, &token, "1001", "库存现金", "asset").await?;
    create_account(&server, &token, "6001", "主营业务收入", "revenue").await?;

    let (status, body) = server
        .get("/api/v1/accounting/accounts?account_type=asset&page=0&page_size=500", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_envelope(&body);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["page_size"], 100);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["code"], "1001");
    Ok(())
}

#[tokio::test]
async fn default_page_size_is_ten() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    for i in 0..12 {
        create_account(&server, &token, &format!("10{:02}", i), &format!("科目{}", i), "asset").await?;
    }

    let (_, body) = server.get("/api/v1/accounting/accounts", Some(&token)).await?;
    assert_eq!(body["meta"]["page_size"], 10);
    assert_eq!(body["meta"]["total"], 12);
    assert_eq!(body["meta"]["total_pages"], 2);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(10));

    let (_, body) = server.get("/api/v1/accounting/accounts?page=2&page_size=-5", Some(&token)).await?;
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["page_size"], 1);
    Ok(())
}

#[tokio::test]
async fn unknown_account_type_filter_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server.get("/api/v1/accounting/accounts?account_type=gold", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "参数验证失败");
    Ok(())
}

#[tokio::test]
async fn duplicate_account_code_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    create_account(&server, &token, "1001", "库存现金", "asset").await?;

    let (status, body) = server
        .post(
            "/api/v1/accounting/accounts",
            json!({ "code": "1001", "name": "重复", "account_type": "asset" }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "科目编码已存在");
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_account_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server.delete("/api/v1/accounting/accounts/999999", Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "科目不存在");
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server.get("/api/v1/accounting/accounts/abc", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body);
    Ok(())
}

#[tokio::test]
async fn unbalanced_entry_is_rejected_and_not_stored() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    let cash = create_account(&server, &token, "1001", "库存现金", "asset").await?;
    let revenue = create_account(&server, &token, "6001", "主营业务收入", "revenue").await?;

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({
                "entry_date": "2024-05-01",
                "lines": [
                    { "account_id": cash["id"], "debit": "100" },
                    { "account_id": revenue["id"], "credit": "80" }
                ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "借贷金额不平衡");

    let (_, body) = server.get("/api/v1/accounting/journal-entries", Some(&token)).await?;
    assert_eq!(body["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn single_line_entry_fails_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({ "entry_date": "2024-05-01", "lines": [ { "account_id": 1, "debit": "10" } ] }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field_errors"]["lines"], "凭证至少需要两条分录");
    Ok(())
}

#[tokio::test]
async fn single_incomplete_line_reports_count_and_item() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({ "entry_date": "2024-01-15", "lines": [ { "debit": "10" } ] }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_envelope(&body);
    assert_eq!(body["message"], "参数验证失败");
    let field_errors = &body["details"]["field_errors"];
    assert_eq!(field_errors["lines"], "凭证至少需要两条分录");
    assert_eq!(field_errors["lines[0].account_id"], "该字段为必填项");
    Ok(())
}

#[tokio::test]
async fn replacing_lines_with_one_bad_line_fails_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    let cash = create_account(&server, &token, "1001", "库存现金", "asset").await?;
    let revenue = create_account(&server, &token, "6001", "主营业务收入", "revenue").await?;

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({
                "entry_date": "2024-05-01",
                "lines": [
                    { "account_id": cash["id"], "debit": "20" },
                    { "account_id": revenue["id"], "credit": "20" }
                ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_u64().expect("entry id");

    let (status, body) = server
        .put(
            &format!("/api/v1/accounting/journal-entries/{}", id),
            json!({ "lines": [ { "account_id": cash["id"], "debit": "-5" } ] }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    let field_errors = &body["details"]["field_errors"];
    assert_eq!(field_errors["lines"], "凭证至少需要两条分录");
    assert_eq!(field_errors["lines[0].debit"], "金额不能为负数");

    let (_, body) = server
        .get(&format!("/api/v1/accounting/journal-entries/{}", id), Some(&token))
        .await?;
    assert_eq!(body["data"]["lines"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn balanced_entry_lifecycle() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    let cash = create_account(&server, &token, "1001", "库存现金", "asset").await?;
    let revenue = create_account(&server, &token, "6001", "主营业务收入", "revenue").await?;

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({
                "entry_date": "2024-05-01",
                "description": "现金销售",
                "lines": [
                    { "account_id": cash["id"], "debit": "100.00", "summary": "收款" },
                    { "account_id": revenue["id"], "credit": "100.00" }
                ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let entry = &body["data"];
    assert_eq!(entry["status"], "draft");
    assert_eq!(decimal(&entry["total_debit"]), Decimal::new(100, 0));
    assert_eq!(decimal(&entry["total_credit"]), Decimal::new(100, 0));
    let id = entry["id"].as_u64().expect("entry id");

    let (status, body) = server
        .post(&format!("/api/v1/accounting/journal-entries/{}/post", id), json!({}), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "posted");

    // Posted entries are read-only
    let (status, body) = server
        .delete(&format!("/api/v1/accounting/journal-entries/{}", id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body);

    let (status, body) = server
        .post(&format!("/api/v1/accounting/journal-entries/{}/void", id), json!({}), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "voided");

    let (_, body) = server
        .get("/api/v1/accounting/journal-entries?status=voided", Some(&token))
        .await?;
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn entry_against_unknown_account_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/accounting/journal-entries",
            json!({
                "entry_date": "2024-05-01",
                "lines": [
                    { "account_id": 41, "debit": "5" },
                    { "account_id": 42, "credit": "5" }
                ]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "分录引用的科目不存在: 41");
    Ok(())
}
