//! Duty slip settlement integration tests.

mod common;

use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn acme_slip() -> Value {
    json!({
        "companyname": "Acme Travels",
        "dutyslipno": "DS-101",
        "reportingaddress": "Terminal 2",
        "date": "2024-03-05",
        "name": "Ravi Kumar",
        "vehicle": "Sedan Car",
        "vehiclenumber": "MH 01 AB 1234",
        "from": "Airport",
        "to": "Pune",
        "startingkm": "1000",
        "closingkm": "1120",
        "startingtime": "09:00",
        "closingtime": "18:30",
        "title": "One Day /80km",
        "advanceamount": "500",
        "paymentmethod": "Cash"
    })
}

async fn settle(app: &TestApp, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/duty-slips/settle"))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn settles_a_one_day_trip() {
    let app = TestApp::spawn().await;

    let response = settle(&app, &acme_slip()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["rate_id"], "r-acme-80");
    assert_eq!(decimal(&body["total_km"]), dec!(120));
    assert_eq!(decimal(&body["total_hours"]), dec!(9.5));
    assert_eq!(decimal(&body["base_amount"]), dec!(2000));
    assert_eq!(decimal(&body["extra_km_amount"]), dec!(480));
    assert_eq!(decimal(&body["extra_hour_amount"]), dec!(0));
    assert_eq!(decimal(&body["total_amount"]), dec!(1980));
    assert_eq!(body["balance"]["state"], "owed_by_customer");
    assert_eq!(body["company_name"], "Acme Travels");
    assert_eq!(body["closing_time"], "18:30");
    assert!(body.get("warnings").is_none());

    assert!(app.upstream.duty_slips().is_empty());
}

#[tokio::test]
async fn trip_past_midnight_wraps_hours() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["startingtime"] = json!("22:00");
    slip["closingtime"] = json!("02:00");

    let body: Value = settle(&app, &slip).await.json().await.unwrap();

    assert_eq!(decimal(&body["total_hours"]), dec!(4));
}

#[tokio::test]
async fn closing_km_below_starting_km_is_rejected() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["closingkm"] = json!("900");

    let response = settle(&app, &slip).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn missing_odometer_reading_is_rejected() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["closingkm"] = json!("");

    let response = settle(&app, &slip).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("closing_km"));
}

#[tokio::test]
async fn unknown_plan_is_unprocessable() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["title"] = json!("Two Days / 500km");

    let response = settle(&app, &slip).await;

    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn plan_is_found_by_customer_name() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["companyname"] = json!("meera shah");

    let body: Value = settle(&app, &slip).await.json().await.unwrap();

    assert_eq!(body["rate_id"], "r-blue-80");
    // 2200 + 40 km x 14 - 500
    assert_eq!(decimal(&body["total_amount"]), dec!(2260));
}

#[tokio::test]
async fn unreadable_title_settles_with_warning() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["companyname"] = json!("Zen Corp");
    slip["title"] = json!("Airport Transfer");
    slip["advanceamount"] = json!("");

    let response = settle(&app, &slip).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(decimal(&body["total_amount"]), dec!(900));
    assert_eq!(body["warnings"][0]["kind"], "unparseable_title");
}

#[tokio::test]
async fn large_advance_leaves_business_owing() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["advanceamount"] = json!(3000);

    let body: Value = settle(&app, &slip).await.json().await.unwrap();

    assert_eq!(decimal(&body["total_amount"]), dec!(-520));
    assert_eq!(body["balance"]["state"], "owed_by_business");
    assert_eq!(decimal(&body["balance"]["amount"]), dec!(520));
}

#[tokio::test]
async fn create_stores_settled_slip_upstream() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/duty-slips"))
        .json(&acme_slip())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "slip-1");
    assert_eq!(decimal(&body["duty_slip"]["total_amount"]), dec!(1980));

    let stored = app.upstream.duty_slips();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["duty_slip_no"], "DS-101");
    assert_eq!(decimal(&stored[0]["total_amount"]), dec!(1980));
}

#[tokio::test]
async fn refused_create_returns_pending_slip() {
    let app = TestApp::spawn().await;
    app.upstream.fail_writes(true);

    let response = app
        .client
        .post(app.url("/duty-slips"))
        .json(&acme_slip())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(decimal(&body["pending"]["total_amount"]), dec!(1980));
    assert!(app.upstream.duty_slips().is_empty());
}

#[tokio::test]
async fn update_resettles_and_overwrites() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["closingkm"] = json!("1300");

    let response = app
        .client
        .patch(app.url("/duty-slips/slip-9"))
        .json(&slip)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "slip-9");
    // 2000 + 220 km x 12 - 500
    assert_eq!(decimal(&body["duty_slip"]["total_amount"]), dec!(4140));

    let stored = app.upstream.duty_slips();
    assert_eq!(stored[0]["_id"], "slip-9");
}

#[tokio::test]
async fn odometer_reading_beyond_range_is_rejected() {
    let app = TestApp::spawn().await;
    let mut slip = acme_slip();
    slip["closingkm"] = json!("79228162514264337593543950335");

    let response = settle(&app, &slip).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn settlement_reports_the_advance_deducted() {
    let app = TestApp::spawn().await;

    let body: Value = settle(&app, &acme_slip()).await.json().await.unwrap();

    assert_eq!(decimal(&body["advance_amount"]), dec!(500));
    assert_eq!(decimal(&body["advance_deducted"]), dec!(500));
}
