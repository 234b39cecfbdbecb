#[macro_use]
mod common;

use actix_web::http::StatusCode;
use common::{admin, delete, employee, get, post, put, send};
use hrm_portal::store::Stores;
use hrm_portal::store::leave::LeavePolicy;
use serde_json::{Value, json};

fn single(name: &str, date: &str) -> Value {
    json!({ "name": name, "startDate": date, "type": "National" })
}

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|h| h["name"].as_str().unwrap())
        .collect()
}

#[actix_web::test]
async fn employees_see_upcoming_and_past_with_days_left() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    for (name, date) in [
        ("Founders Day", "2099-03-01"),
        ("Launch Day", "2098-07-15"),
        ("Old Memorial Day", "2001-05-28"),
    ] {
        let (status, _) = send(&app, post("/api/admin/holiday", &admin(), &single(name, date)).to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/api/user/holidays", &employee("e-1")).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["upcoming"]), vec!["Launch Day", "Founders Day"]);
    assert_eq!(names(&body["past"]), vec!["Old Memorial Day"]);
    assert!(body["upcoming"][0]["daysUntil"].as_i64().unwrap() > 0);
    assert!(body["past"][0]["daysUntil"].as_i64().unwrap() < 0);
    assert_eq!(body["upcoming"][0]["type"], "National");

    let (_, desc) = send(&app, get("/api/user/holidays?order=desc", &employee("e-1")).to_request()).await;
    assert_eq!(names(&desc["upcoming"]), vec!["Founders Day", "Launch Day"]);
}

#[actix_web::test]
async fn ranged_holiday_is_active_through_its_last_day() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let body = json!({
        "name": "Winter Break",
        "startDate": "2098-12-24",
        "endDate": "2099-01-01",
        "isDateRange": true,
        "type": "Corporate"
    });
    send(&app, post("/api/admin/holiday", &admin(), &body).to_request()).await;

    let (_, active) = send(&app, get("/api/admin/holidays/active?date=2099-01-01", &admin()).to_request()).await;
    assert_eq!(names(&active["data"]), vec!["Winter Break"]);
    let (_, active) = send(&app, get("/api/admin/holidays/active?date=2099-01-02", &admin()).to_request()).await;
    assert!(active["data"].as_array().unwrap().is_empty());

    let (status, err) = send(&app, get("/api/admin/holidays/active?date=someday", &admin()).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "date");
}

#[actix_web::test]
async fn invalid_holiday_is_rejected_by_field() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let body = json!({
        "name": "Winter Break",
        "startDate": "2098-12-24",
        "endDate": "2098-12-20",
        "isDateRange": true
    });
    let (status, err) = send(&app, post("/api/admin/holiday", &admin(), &body).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "endDate");

    let (status, err) = send(&app, post("/api/admin/holiday", &admin(), &single("NY", "2099-01-01")).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "name");

    let (status, _) = send(&app, post("/api/admin/holiday", &employee("e-1"), &single("New Year", "2099-01-01")).to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_updates_lists_and_removes() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let (_, created) = send(&app, post("/api/admin/holiday", &admin(), &single("Company Day", "2099-03-01")).to_request()).await;
    send(&app, post("/api/admin/holiday", &admin(), &single("Old Day", "2001-03-01")).to_request()).await;
    let uri = format!("/api/admin/holiday/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(&app, put(&uri, &admin(), &json!({"name": "Company Anniversary"})).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Company Anniversary");
    assert_eq!(updated["startDate"], "2099-03-01");

    let (_, all) = send(&app, get("/api/admin/holidays", &admin()).to_request()).await;
    assert_eq!(names(&all["data"]), vec!["Old Day", "Company Anniversary"]);
    let (_, past) = send(&app, get("/api/admin/holidays?scope=past", &admin()).to_request()).await;
    assert_eq!(names(&past["data"]), vec!["Old Day"]);

    assert_eq!(send(&app, delete(&uri, &admin()).to_request()).await.0, StatusCode::OK);
    assert_eq!(send(&app, delete(&uri, &admin()).to_request()).await.0, StatusCode::NOT_FOUND);
    let (_, upcoming) = send(&app, get("/api/admin/holidays?scope=upcoming", &admin()).to_request()).await;
    assert!(upcoming["data"].as_array().unwrap().is_empty());
}
