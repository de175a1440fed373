#![allow(dead_code)]

use routekit::prelude::*;

#[controller(prefix = "/home")]
pub struct HomeController;

#[routes]
impl HomeController {
    #[get("/greet")]
    async fn greet() -> String {
        "Hello, world!".to_string()
    }
}

fn main() {}
