#[macro_use]
mod common;

use actix_web::http::StatusCode;
use common::{admin, delete, employee, get, post, put, send};
use hrm_portal::store::Stores;
use hrm_portal::store::leave::LeavePolicy;
use serde_json::{Value, json};

fn person(name: &str, position: &str, department: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
        "position": position,
        "department": department,
        "joinDate": "2020-03-15"
    })
}

#[actix_web::test]
async fn directory_is_searchable_and_paged() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    for (name, position, department) in [
        ("John Doe", "Software Engineer", "Engineering"),
        ("Jane Smith", "Product Manager", "Product"),
        ("Thomas Moore", "DevOps Engineer", "Engineering"),
    ] {
        let (status, _) = send(&app, post("/api/admin/employee", &admin(), &person(name, position, department)).to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, get("/api/user/get-users?search=engineer", &employee("e-1")).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 2);
    assert_eq!(page["data"]["users"][0]["name"], "John Doe");

    let (_, page) = send(
        &app,
        get("/api/user/get-users?sortBy=name&order=desc&perPage=2&page=2", &employee("e-1")).to_request(),
    )
    .await;
    assert_eq!(page["data"]["users"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["users"][0]["name"], "Jane Smith");
    assert_eq!(page["data"]["perPage"], 2);
    assert_eq!(page["data"]["page"], 2);
}

#[actix_web::test]
async fn employee_reads_own_profile() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let (_, created) = send(&app, post("/api/admin/employee", &admin(), &person("Emily Davis", "Designer", "Design")).to_request()).await;
    let id = created["id"].as_str().unwrap();

    let (status, profile) = send(&app, get("/api/user/get-user", &employee(id)).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["data"]["id"], id);
    assert_eq!(profile["data"]["email"], "emily.davis@company.com");

    let (status, _) = send(&app, get("/api/user/get-user", &employee("no-such-employee")).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_manages_profiles() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let (_, created) = send(&app, post("/api/admin/employee", &admin(), &person("Jane Smith", "PM", "Product")).to_request()).await;
    let uri = format!("/api/admin/employee/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(&app, put(&uri, &admin(), &json!({"status": "Inactive"})).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Inactive");
    assert_eq!(send(&app, get(&uri, &admin()).to_request()).await.1["status"], "Inactive");

    let mut bad = person("Jane Doe", "PM", "Product");
    bad["email"] = json!("not-an-email");
    let (status, err) = send(&app, post("/api/admin/employee", &admin(), &bad).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "email");

    assert_eq!(send(&app, get(&uri, &employee("e-1")).to_request()).await.0, StatusCode::FORBIDDEN);
    assert_eq!(send(&app, delete(&uri, &admin()).to_request()).await.0, StatusCode::OK);
    assert_eq!(send(&app, get(&uri, &admin()).to_request()).await.0, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn dashboard_rolls_up_every_store() {
    let app = test_app!(Stores::in_memory(LeavePolicy::default()));
    let today = chrono::Local::now().date_naive().to_string();

    let mut ids = Vec::new();
    for name in ["John Doe", "Jane Smith", "Emily Davis"] {
        let (_, e) = send(&app, post("/api/admin/employee", &admin(), &person(name, "Engineer", "Engineering")).to_request()).await;
        ids.push(e["id"].as_str().unwrap().to_string());
    }
    let roster = json!({
        "date": today,
        "entries": [{"subjectId": ids[0], "status": "Present", "checkIn": "09:00"}]
    });
    send(&app, post("/api/admin/attendance", &admin(), &roster).to_request()).await;

    let leave = json!({
        "leaveType": "Sick",
        "fromDate": "2099-02-01",
        "toDate": "2099-02-02",
        "reason": "Recovering from surgery"
    });
    send(&app, post("/api/user/leave-form", &employee(&ids[1]), &leave).to_request()).await;
    send(
        &app,
        post("/api/admin/holiday", &admin(), &json!({"name": "Founders Day", "startDate": "2099-03-01"})).to_request(),
    )
    .await;

    let (status, summary) = send(&app, get("/api/admin/dashboard", &admin()).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalEmployees"], 3);
    assert_eq!(summary["attendanceToday"]["present"], 1);
    assert_eq!(summary["attendanceToday"]["unmarked"], 2);
    assert_eq!(summary["pendingLeaves"], 1);
    assert_eq!(summary["upcomingHolidays"]["count"], 1);
    assert_eq!(summary["upcomingHolidays"]["next"]["name"], "Founders Day");

    let (status, _) = send(&app, get("/api/admin/dashboard", &employee(&ids[0])).to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
