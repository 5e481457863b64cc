mod test_support;

use serde_json::json;
use test_support::{login, request_err, request_ok, spawn_sidecar};

fn names(list: &serde_json::Value, key: &str, field: &str) -> Vec<String> {
    list[key]
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v[field].as_str().unwrap_or("").to_string())
        .collect()
}

#[test]
fn accounts_search_filter_sort_and_create() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "admin@demo.com");

    let all = request_ok(&mut stdin, &mut reader, "1", "accounts.list", json!({}));
    assert_eq!(all["total"], 4);
    assert_eq!(
        names(&all, "users", "name"),
        vec!["John Smith", "Sarah Davis", "Mike Wilson", "Emily Brown"]
    );

    let hits = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "accounts.list",
        json!({ "search": "  SARAH ", "filters": { "role": "all" } }),
    );
    assert_eq!(names(&hits, "users", "name"), vec!["Sarah Davis"]);

    let teachers = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "accounts.list",
        json!({ "filters": { "role": "teacher" }, "sort": "name_desc" }),
    );
    assert_eq!(names(&teachers, "users", "name"), vec!["Mike Wilson", "John Smith"]);

    let none = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "accounts.list",
        json!({ "search": "zzz-no-match" }),
    );
    assert!(none["users"].as_array().expect("array").is_empty());

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "accounts.create",
        json!({ "name": "  ", "email": "x@edu.com" }),
    );
    assert_eq!(code, "validation_failed");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "accounts.create",
        json!({ "name": "Nina Cruz", "email": "nina@edu.com", "role": "admin" }),
    );
    let new_id = created["user"]["id"].as_str().expect("id").to_string();
    assert_eq!(new_id.len(), 36);

    let after = request_ok(&mut stdin, &mut reader, "7", "accounts.list", json!({}));
    assert_eq!(after["total"], 5);
    assert_eq!(
        names(&after, "users", "name"),
        vec!["Nina Cruz", "John Smith", "Sarah Davis", "Mike Wilson", "Emily Brown"]
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "accounts.delete",
        json!({ "id": new_id }),
    );
    let code = request_err(
        &mut stdin,
        &mut reader,
        "9",
        "accounts.delete",
        json!({ "id": new_id }),
    );
    assert_eq!(code, "not_found");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "10",
        "accounts.list",
        json!({ "filters": { "color": "red" } }),
    );
    assert_eq!(code, "bad_params");
}

#[test]
fn students_filters_and_soft_delete() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "admin@demo.com");

    let sections = request_ok(&mut stdin, &mut reader, "1", "students.sections", json!({}));
    assert_eq!(sections["sections"], json!(["A", "B"]));

    let in_a = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.list",
        json!({ "filters": { "section": "A", "yearLevel": "all" }, "sort": "year_desc" }),
    );
    assert_eq!(names(&in_a, "students", "name"), vec!["James Wilson", "Sarah Davis"]);

    let by_id = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.list",
        json!({ "search": "stu2023" }),
    );
    assert_eq!(names(&by_id, "students", "name"), vec!["James Wilson"]);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "name": "New Kid", "email": "kid@edu.com" }),
    );
    assert_eq!(code, "validation_failed");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "name": "New Kid", "email": "kid@edu.com", "studentId": "STU2024001" }),
    );
    assert_eq!(code, "conflict");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.create",
        json!({ "name": "New Kid", "email": "kid@edu.com", "studentId": "STU2024099", "yearLevel": 2 }),
    );
    assert_eq!(created["student"]["section"], "A");
    assert_eq!(created["student"]["status"], "active");

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.delete",
        json!({ "id": "3" }),
    );
    assert_eq!(removed["student"]["status"], "inactive");
    let inactive = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.list",
        json!({ "filters": { "status": "inactive" } }),
    );
    assert_eq!(names(&inactive, "students", "name"), vec!["James Wilson"]);
}

#[test]
fn section_detail_edits_show_in_list() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "admin@demo.com");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "sections.update",
        json!({ "id": "1", "name": "F1-Renamed", "students": ["Ana", " ", "Ben"] }),
    );
    let list = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "sections.list",
        json!({ "search": "renamed" }),
    );
    let rows = list["sections"].as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["size"], 2);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "sections.create",
        json!({ "name": "" }),
    );
    assert_eq!(code, "validation_failed");

    let gone = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "sections.delete",
        json!({ "id": "2" }),
    );
    assert_eq!(gone["section"]["status"], "inactive");
    assert_eq!(gone["size"], 0);
}

#[test]
fn teachers_catalog_and_assignments() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "admin@demo.com");

    let s = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "catalog.suggest",
        json!({ "query": "itc 11" }),
    );
    assert_eq!(names(&s, "suggestions", "code"), vec!["ITC111", "ITC112"]);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.create",
        json!({ "firstName": "Ada", "lastName": "", "email": "ada@edu.com", "employeeId": "EMP010" }),
    );
    assert_eq!(code, "validation_failed");

    let t = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.create",
        json!({
            "firstName": "Ada",
            "lastName": "Reyes",
            "email": "ada@edu.com",
            "employeeId": "EMP010",
            "assignedCourses": [{ "course": "itc111", "sections": ["F4", "F4"] }]
        }),
    );
    let course = &t["teacher"]["assignedCourses"][0];
    assert_eq!(course["course"], "ITC111");
    assert_eq!(course["sections"], json!(["F4"]));
    assert!(course["title"].is_string());

    let rows = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "assignments.list",
        json!({ "search": "ada reyes" }),
    );
    let rows = rows["assignments"].as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["section"], "F4");
    assert_eq!(rows[0]["students"], 7);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.update",
        json!({ "id": "1", "assignedCourses": [{ "course": "CS101", "sections": ["Z9"] }] }),
    );
    assert_eq!(code, "validation_failed");
}

#[test]
fn enrollment_decisions_and_payments() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "admin@demo.com");

    let list = request_ok(&mut stdin, &mut reader, "1", "enrollment.list", json!({}));
    assert_eq!(list["pendingCount"], 2);

    let decided = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "enrollment.decide",
        json!({ "requestId": "1", "decision": "approve" }),
    );
    assert_eq!(decided["request"]["status"], "approved");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "enrollment.decide",
        json!({ "requestId": "1", "decision": "reject" }),
    );
    assert_eq!(code, "conflict");

    let pay = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "payments.list",
        json!({ "status": "pending" }),
    );
    assert_eq!(pay["payments"].as_array().expect("array").len(), 1);
    assert_eq!(pay["totals"]["paidCents"], 55_000);
    assert_eq!(pay["totals"]["pendingCents"], 50_000);
}
