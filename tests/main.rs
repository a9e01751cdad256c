extern crate ptth;
mod setup;

use self::setup::*;
use ptth::{CookieJar, Error, Method, Request};

#[test]
fn test_get_params_in_query() {
    setup();
    let body = get_body(
        ptth::get(url("/echo_query"))
            .with_param("q", "rust lang")
            .with_param("q", "2")
            .execute(),
    );
    assert_eq!(body, "/echo_query?q=rust+lang&q=2");
}

#[test]
fn test_post_params_as_form() {
    setup();
    let body = get_body(
        ptth::post(url("/form"))
            .with_params(&["user", "ady", "note", "a&b"])
            .unwrap()
            .execute(),
    );
    assert_eq!(
        body,
        "application/x-www-form-urlencoded; charset=UTF-8|user=ady&note=a%26b"
    );
}

#[test]
fn test_body_wins_over_params() {
    setup();
    let body = get_body(
        ptth::post(url("/echo"))
            .with_param("ignored", "1")
            .with_text("raw body")
            .execute(),
    );
    assert_eq!(body, "raw body");
}

#[test]
fn test_headers() {
    setup();
    let body = get_body(
        ptth::get(url("/header_pong"))
            .with_header("Ping", "Qwerty")
            .execute(),
    );
    assert_eq!("Qwerty", body);
}

#[test]
fn test_default_user_agent() {
    setup();
    let body = get_body(ptth::get(url("/user_agent")).execute());
    assert_eq!(
        body,
        format!(
            "ptth by shijiebang.com (imxylz@gmail.com, {})",
            ptth::local_site_address()
        )
    );
}

#[test]
fn test_unexpected_status() {
    setup();
    let err = ptth::get(url("/nowhere")).execute().unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    match err {
        Error::UnexpectedStatus(response) => {
            assert_eq!(&*response.as_string().unwrap(), "Not Found");
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[test]
fn test_status_without_force_ok() {
    setup();
    let response = ptth::get(url("/nowhere"))
        .with_force_ok(false)
        .execute()
        .unwrap();
    assert_eq!(response.status_code, 404);
    assert!(!response.is_ok());
}

#[test]
fn test_head() {
    setup();
    assert_eq!(
        get_status_code(ptth::head(url("/b")).with_force_ok(false).execute()),
        418
    );
}

#[test]
fn test_put() {
    setup();
    let body = get_body(ptth::put(url("/d")).with_body("R").execute());
    assert_eq!(body, "m: R");
}

#[test]
fn test_delete() {
    setup();
    assert_eq!(get_body(ptth::delete(url("/e")).execute()), "n: ");
}

#[test]
fn test_patch() {
    setup();
    let body = get_body(ptth::patch(url("/i")).with_param("o", "1").execute());
    assert_eq!(body, "r: o=1");
}

#[test]
fn test_custom_method() {
    setup();
    let body = get_body(Request::new(Method::Custom("PURGE".to_string()), url("/cache")).execute());
    assert_eq!(body, "purged");
}

#[test]
fn test_cookie_session() {
    setup();
    let jar = CookieJar::shared();
    let response = ptth::get(url("/login"))
        .with_cookie_jar(jar.clone())
        .execute()
        .unwrap();
    assert_eq!(response.cookie_value("sid"), Some("abc123"));

    let body = get_body(ptth::get(url("/whoami")).with_cookie_jar(jar).execute());
    assert_eq!(body, "sid=abc123");
}

#[test]
fn test_added_cookie_is_sent() {
    setup();
    let body = get_body(
        ptth::get(url("/whoami"))
            .add_cookie("lang", "en", "localhost", "/", None, 0)
            .execute(),
    );
    assert_eq!(body, "lang=en");
}

#[test]
fn test_response_encoding() {
    setup();
    let response = ptth::get(url("/gbk")).execute().unwrap();
    assert!(response.as_string().is_err());
    assert_eq!(&*response.as_string_with(encoding_rs::GBK).unwrap(), "北京");
}

#[test]
fn test_timeout_too_low() {
    setup();
    let result = ptth::get(url("/slow_a")).with_read_timeout(1_000).execute();
    assert!(matches!(result, Err(Error::Transport(_))));
}

#[test]
fn test_timeout_high_enough() {
    setup();
    let body = get_body(ptth::get(url("/slow_a")).with_read_timeout(6_000).execute());
    assert_eq!(body, "j: slow");
}

#[test]
fn test_connection_refused() {
    let result = ptth::get("http://127.0.0.1:1/").with_connect_timeout(1_000).execute();
    assert!(matches!(result, Err(Error::Transport(_))));
}

#[test]
fn test_execute_get_and_post() {
    setup();
    let body = get_body(
        ptth::post(url("/echo_query"))
            .with_param("q", "1")
            .execute_get(),
    );
    assert_eq!(body, "/echo_query?q=1");

    let body = get_body(ptth::get(url("/form")).with_param("q", "1").execute_post());
    assert_eq!(
        body,
        "application/x-www-form-urlencoded; charset=UTF-8|q=1"
    );
}
