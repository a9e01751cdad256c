/// This is a simple example to demonstrate the usage of this
/// library: build a request, execute it, read the response.

fn main() -> Result<(), ptth::Error> {
    let request = ptth::get("http://httpbin.org/anything")
        .with_param("hello", "world")
        .with_self_referer()
        .with_read_timeout(10_000);
    println!("{}", request.to_debug_string());

    let response = request.execute()?;
    println!(
        "status_code={} cost={} ms",
        response.status_code,
        response.elapsed_millis()
    );
    println!("{}", response.as_string()?);
    Ok(())
}
