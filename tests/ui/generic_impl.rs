#![allow(dead_code)]

use routekit::prelude::*;

pub struct Wrapper<T>(T);

#[routes]
impl<T> Wrapper<T> {
    #[get("/value")]
    async fn value(&self) -> String {
        String::new()
    }
}

fn main() {}
