#![allow(dead_code)]

use routekit::prelude::*;

pub struct Greeter;

impl Greeter {
    #[get("/greet")]
    async fn greet(&self) -> String {
        "Hello, world!".to_string()
    }
}

fn main() {}
