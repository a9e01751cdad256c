/// Carries a cookie session across two requests by sharing one jar.

fn main() -> Result<(), ptth::Error> {
    let jar = ptth::CookieJar::shared();
    ptth::get("http://httpbin.org/response-headers")
        .with_param("Set-Cookie", "session=ptth; Path=/")
        .with_cookie_jar(jar.clone())
        .execute()?;

    let response = ptth::get("http://httpbin.org/cookies")
        .with_cookie_jar(jar)
        .execute()?;
    println!("session cookie: {:?}", response.cookie_value("session"));
    println!("{}", response.as_string()?);
    Ok(())
}
