mod test_support;

use serde_json::json;
use test_support::{login, request_err, request_ok, spawn_sidecar};

#[test]
fn student_pages_follow_activity_records() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "student@demo.com");

    let courses = request_ok(&mut stdin, &mut reader, "1", "student.courses", json!({}));
    let rows = courses["courses"].as_array().expect("courses");
    let codes: Vec<&str> = rows.iter().filter_map(|c| c["code"].as_str()).collect();
    assert_eq!(codes, vec!["CS101", "MATH101", "ENG101"]);
    assert_eq!(rows[0]["completed"], 3);
    assert_eq!(rows[0]["total"], 4);
    assert_eq!(rows[0]["progress"], 75.0);
    assert_eq!(rows[0]["average"], 89.0);
    assert_eq!(rows[0]["letter"], "B");

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "student.courseDetails",
        json!({ "courseId": "cs101" }),
    );
    assert_eq!(detail["latestGrade"]["title"], "Midterm Exam");
    assert_eq!(detail["latestGrade"]["percentage"], 85.0);
    let titles: Vec<&str> = detail["activities"]
        .as_array()
        .expect("activities")
        .iter()
        .filter_map(|a| a["title"].as_str())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Programming Assignment 1",
            "Midterm Exam",
            "Quiz 1: Data Structures",
            "Group Project Proposal"
        ]
    );

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "student.courseDetails",
        json!({ "courseId": "CS201" }),
    );
    assert_eq!(code, "not_found");

    let pending = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "student.activities",
        json!({ "status": "pending" }),
    );
    let pending = pending["activities"].as_array().expect("activities");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["courseTitle"], "Introduction to Computer Science");

    let progress = request_ok(&mut stdin, &mut reader, "5", "student.progress", json!({}));
    assert_eq!(progress["overall"]["completed"], 6);
    assert_eq!(progress["overall"]["total"], 7);
    assert_eq!(progress["overall"]["percentage"], 86.0);

    let grades = request_ok(&mut stdin, &mut reader, "6", "student.grades", json!({}));
    let cs = &grades["courses"][0];
    assert_eq!(cs["grades"].as_array().expect("grades").len(), 3);
}

#[test]
fn teacher_sees_own_courses_and_proposals_need_approval() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, "teacher@demo.com");

    let mine = request_ok(&mut stdin, &mut reader, "1", "courses.list", json!({}));
    let codes: Vec<&str> = mine["courses"]
        .as_array()
        .expect("courses")
        .iter()
        .filter_map(|c| c["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["CS101", "MATH101", "GEOM101"]);

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "courses.get",
        json!({ "courseId": "1" }),
    );
    assert_eq!(detail["activities"].as_array().expect("activities").len(), 4);
    assert_eq!(detail["students"][0]["name"], "Sarah Davis");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "courses.get",
        json!({ "courseId": "5" }),
    );
    assert_eq!(code, "not_found");

    let proposed = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "courses.create",
        json!({ "code": "itc111", "section": "C" }),
    );
    assert_eq!(proposed["course"]["status"], "pending");
    assert_eq!(proposed["course"]["teacher"], "Demo Teacher");
    let id = proposed["course"]["id"].as_str().expect("id").to_string();

    login(&mut stdin, &mut reader, "admin@demo.com");
    let pending = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "courses.list",
        json!({ "status": "pending" }),
    );
    assert_eq!(pending["courses"].as_array().expect("courses").len(), 2);

    let approved = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "courses.approve",
        json!({ "courseId": id }),
    );
    assert_eq!(approved["course"]["status"], "approved");
}
