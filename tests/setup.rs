extern crate ptth;
extern crate tiny_http;
use self::tiny_http::{Header, Method, Response, Server};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let server = Arc::new(Server::http("localhost:35564").unwrap());
        for _ in 0..4 {
            let server = server.clone();

            thread::spawn(move || loop {
                let mut request = {
                    if let Ok(request) = server.recv() {
                        request
                    } else {
                        continue; // If .recv() fails, just try again.
                    }
                };
                let mut content = String::new();
                request.as_reader().read_to_string(&mut content).ok();
                let headers = Vec::from(request.headers());
                let header = |name: &str| {
                    headers
                        .iter()
                        .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
                        .map(|header| header.value.to_string())
                };

                let url = String::from(request.url());
                match request.method() {
                    Method::Get if url.starts_with("/echo_query") => {
                        request.respond(Response::from_string(url)).ok();
                    }

                    Method::Get if url == "/header_pong" => {
                        let body = header("Ping").unwrap_or_else(|| "No header!".to_string());
                        request.respond(Response::from_string(body)).ok();
                    }

                    Method::Get if url == "/user_agent" => {
                        let body = header("User-Agent").unwrap_or_default();
                        request.respond(Response::from_string(body)).ok();
                    }

                    Method::Get if url == "/slow_a" => {
                        thread::sleep(Duration::from_secs(3));
                        let response = Response::from_string("j: slow");
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/login" => {
                        let response = Response::from_string("welcome").with_header(
                            Header::from_bytes(&b"Set-Cookie"[..], &b"sid=abc123; Path=/"[..])
                                .unwrap(),
                        );
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/whoami" => {
                        let body = header("Cookie").unwrap_or_else(|| "anonymous".to_string());
                        request.respond(Response::from_string(body)).ok();
                    }

                    Method::Get if url == "/gbk" => {
                        // "北京" in GBK.
                        let response = Response::from_data(vec![0xB1, 0xB1, 0xBE, 0xA9]);
                        request.respond(response).ok();
                    }

                    Method::Post if url == "/form" => {
                        let content_type = header("Content-Type").unwrap_or_default();
                        let response = Response::from_string(format!("{}|{}", content_type, content));
                        request.respond(response).ok();
                    }
                    Method::Post if url == "/echo" => {
                        request.respond(Response::from_string(content)).ok();
                    }

                    Method::Head if url == "/b" => {
                        request.respond(Response::empty(418)).ok();
                    }
                    Method::Put if url == "/d" => {
                        let response = Response::from_string(format!("m: {}", content));
                        request.respond(response).ok();
                    }
                    Method::Delete if url == "/e" => {
                        let response = Response::from_string(format!("n: {}", content));
                        request.respond(response).ok();
                    }
                    Method::Patch if url == "/i" => {
                        let response = Response::from_string(format!("r: {}", content));
                        request.respond(response).ok();
                    }
                    Method::NonStandard(_) if url == "/cache" => {
                        request.respond(Response::from_string("purged")).ok();
                    }

                    _ => {
                        request
                            .respond(Response::from_string("Not Found").with_status_code(404))
                            .ok();
                    }
                }
            });
        }
    });
}

pub fn url(req: &str) -> String {
    format!("http://localhost:35564{}", req)
}

pub fn get_body(request: Result<ptth::Response, ptth::Error>) -> String {
    match request {
        Ok(response) => match response.as_string() {
            Ok(str) => String::from(&*str),
            Err(err) => {
                println!("\n[ERROR]: {}\n", err);
                String::new()
            }
        },
        Err(err) => {
            println!("\n[ERROR]: {}\n", err);
            String::new()
        }
    }
}

pub fn get_status_code(request: Result<ptth::Response, ptth::Error>) -> i32 {
    match request {
        Ok(response) => response.status_code,
        Err(err) => {
            println!("\n[ERROR]: {}\n", err);
            -1
        }
    }
}
