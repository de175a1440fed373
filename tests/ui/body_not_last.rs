#![allow(dead_code)]

use routekit::prelude::*;

#[controller(prefix = "/items")]
pub struct ItemController;

#[routes]
impl ItemController {
    #[post("")]
    async fn create(&self, #[body] name: String, #[param] id: u32) -> String {
        format!("{} {}", name, id)
    }
}

fn main() {}
