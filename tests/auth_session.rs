mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, spawn_sidecar_with, temp_dir};

#[test]
fn demo_login_lands_on_role_dashboard() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (i, (email, landing)) in [
        ("student@demo.com", "/student/dashboard"),
        ("teacher@demo.com", "/teacher/dashboard"),
        ("admin@demo.com", "/admin/dashboard"),
    ]
    .iter()
    .enumerate()
    {
        let r = request_ok(
            &mut stdin,
            &mut reader,
            &format!("{i}"),
            "auth.login",
            json!({ "email": email, "password": "demo123" }),
        );
        assert_eq!(r["redirect"], *landing);
        assert_eq!(r["user"]["email"], *email);
    }

    let code = request_err(
        &mut stdin,
        &mut reader,
        "bad",
        "auth.login",
        json!({ "email": "student@demo.com", "password": "demo124" }),
    );
    assert_eq!(code, "invalid_credentials");

    // The failed attempt leaves the previous sign-in in place.
    let s = request_ok(&mut stdin, &mut reader, "s", "auth.session", json!({}));
    assert_eq!(s["user"]["role"], "admin");
}

#[test]
fn route_guard_redirects_wrong_roles_to_auth() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "routes.resolve",
        json!({ "path": "/admin/users" }),
    );
    assert_eq!(r["allowed"], false);
    assert_eq!(r["redirect"], "/auth");

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "email": "teacher@demo.com", "password": "demo123" }),
    );
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "routes.resolve",
        json!({ "path": "/teacher/grades/edit?course=math101&term=final" }),
    );
    assert_eq!(r["allowed"], true);
    assert_eq!(r["route"]["page"], "teacher.grades_edit");
    assert_eq!(r["gradeEditor"]["course"], "math101");
    assert_eq!(r["gradeEditor"]["section"], "12-polaris");
    assert_eq!(r["gradeEditor"]["term"], "final");

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "routes.resolve",
        json!({ "path": "/admin/payments" }),
    );
    assert_eq!(r["allowed"], false);

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "routes.resolve",
        json!({ "path": "/does/not/exist" }),
    );
    assert_eq!(r["route"]["page"], "not_found");
    assert_eq!(r["allowed"], true);

    let code = request_err(&mut stdin, &mut reader, "6", "accounts.list", json!({}));
    assert_eq!(code, "forbidden");
}

#[test]
fn session_survives_restart_on_same_workspace() {
    let workspace = temp_dir("edutrack-session");
    let ws = workspace.path().to_string_lossy().to_string();

    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": ws }),
        );
        request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "auth.login",
            json!({ "email": "teacher@demo.com", "password": "demo123" }),
        );
        drop(stdin);
        child.wait().expect("sidecar exit");
    }

    let (mut child, mut stdin, mut reader) = spawn_sidecar_with(&["--workspace", &ws]);
    let check = request_ok(&mut stdin, &mut reader, "1", "auth.check", json!({}));
    assert_eq!(check["authenticated"], true);
    assert_eq!(check["redirect"], "/teacher/dashboard");

    let out = request_ok(&mut stdin, &mut reader, "2", "auth.logout", json!({}));
    assert_eq!(out["redirect"], "/auth");
    drop(stdin);
    child.wait().expect("sidecar exit");

    let (_child, mut stdin, mut reader) = spawn_sidecar_with(&["--workspace", &ws]);
    let check = request_ok(&mut stdin, &mut reader, "1", "auth.check", json!({}));
    assert_eq!(check["authenticated"], false);
    assert!(check["redirect"].is_null());
}

#[test]
fn guarded_calls_without_session_are_unauthenticated() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let resp = test_support::request(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(resp["error"]["code"], "unauthenticated");
    assert_eq!(resp["error"]["details"]["redirect"], "/auth");
}
