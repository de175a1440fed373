#![allow(dead_code)]

use routekit::prelude::*;

#[controller(prefix = "/items")]
pub struct ItemController;

#[routes]
impl ItemController {
    #[post("", status = 42)]
    async fn create(&self) -> String {
        String::new()
    }
}

fn main() {}
