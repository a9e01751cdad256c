/// This example demonstrates the `json-using-serde` feature.

#[derive(serde::Deserialize)]
struct Response {
    data: String,
}

fn main() -> Result<(), ptth::Error> {
    let response = ptth::post("http://httpbin.org/anything")
        .with_text("Hello, world!")
        .execute()?;
    let json: Response = response.json()?;
    println!("{}", json.data);
    Ok(())
}
